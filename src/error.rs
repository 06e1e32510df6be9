use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 应用统一错误类型
#[derive(Error, Debug, utoipa::ToSchema)]
pub enum AppError {
    /// 认证失败（缺少或无效的管理员令牌）
    #[error("认证失败: {0}")]
    Auth(String),

    /// 参数校验错误
    #[error("参数校验错误: {0}")]
    Validation(String),

    /// 资源不存在
    #[error("资源不存在: {0}")]
    NotFound(String),

    /// 持久化错误
    #[error("存储错误: {0}")]
    Storage(String),

    /// 内部服务器错误
    #[error("内部错误: {0}")]
    Internal(String),

    /// 媒体目录/图片处理错误
    #[error("媒体处理错误: {0}")]
    Media(#[from] MediaError),
}

/// 媒体目录与图片缓存相关错误
#[derive(Error, Debug, utoipa::ToSchema)]
pub enum MediaError {
    /// 非法的相对路径（绝对路径或包含 `..`）
    #[error("非法路径: {0}")]
    InvalidPath(String),

    /// 源图片不存在
    #[error("源图片不存在: {0}")]
    SourceMissing(String),

    /// I/O 错误
    #[error("I/O 错误: {0}")]
    Io(String),

    /// 图片解码/编码错误
    #[error("图片处理失败: {0}")]
    Image(String),

    /// 展示配置（view.yaml）读取或解析失败
    #[error("展示配置错误: {0}")]
    ViewConfig(String),
}

/// RFC7807 风格的错误响应（Problem Details）。
///
/// 设计目标：
/// - 让所有 API 错误返回结构化 JSON，便于调用方稳定处理
/// - 与 OpenAPI 一致（content-type = application/problem+json）
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    /// 问题类型（URI）。若无更细分的类型，可使用 about:blank。
    #[serde(rename = "type")]
    #[schema(example = "about:blank")]
    pub type_url: String,

    /// 简短标题，用于概括错误。
    #[schema(example = "Validation Failed")]
    pub title: String,

    /// HTTP 状态码（与响应 status 一致）。
    #[schema(example = 422)]
    pub status: u16,

    /// 人类可读的详细信息（尽量稳定，不建议依赖解析）。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// 稳定的错误码，用于程序化处理。
    #[schema(example = "VALIDATION_FAILED")]
    pub code: String,

    /// 可选：请求追踪 ID。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Media(e) => match e {
                MediaError::InvalidPath(_) => StatusCode::BAD_REQUEST,
                MediaError::SourceMissing(_) => StatusCode::NOT_FOUND,
                // 图片本身不可解码属于“请求可理解但无法处理”
                MediaError::Image(_) => StatusCode::UNPROCESSABLE_ENTITY,
                MediaError::Io(_) | MediaError::ViewConfig(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn stable_code(&self) -> &'static str {
        match self {
            AppError::Auth(_) => "UNAUTHORIZED",
            AppError::Validation(_) => "VALIDATION_FAILED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
            AppError::Media(e) => match e {
                MediaError::InvalidPath(_) => "MEDIA_INVALID_PATH",
                MediaError::SourceMissing(_) => "MEDIA_SOURCE_MISSING",
                MediaError::Image(_) => "MEDIA_IMAGE_FAILED",
                MediaError::Io(_) => "MEDIA_IO_ERROR",
                MediaError::ViewConfig(_) => "VIEW_CONFIG_INVALID",
            },
        }
    }

    fn title(&self) -> &'static str {
        match self.status_code() {
            StatusCode::BAD_REQUEST => "Bad Request",
            StatusCode::UNAUTHORIZED => "Unauthorized",
            StatusCode::NOT_FOUND => "Not Found",
            StatusCode::UNPROCESSABLE_ENTITY => "Validation Failed",
            StatusCode::INTERNAL_SERVER_ERROR => "Internal Server Error",
            _ => "Error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("请求处理失败: {}", self);
        }

        let problem = ProblemDetails {
            type_url: "about:blank".to_string(),
            title: self.title().to_string(),
            status: status.as_u16(),
            detail: Some(self.to_string()),
            code: self.stable_code().to_string(),
            request_id: crate::request_id::current_request_id(),
        };

        let mut res = Json(problem).into_response();
        *res.status_mut() = status;
        res.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        res
    }
}

// =============== Error conversions for common external errors ===============

impl From<std::io::Error> for MediaError {
    fn from(err: std::io::Error) -> Self {
        MediaError::Io(err.to_string())
    }
}

impl From<image::ImageError> for MediaError {
    fn from(err: image::ImageError) -> Self {
        MediaError::Image(err.to_string())
    }
}

impl From<serde_yaml::Error> for MediaError {
    fn from(err: serde_yaml::Error) -> Self {
        MediaError::ViewConfig(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}
