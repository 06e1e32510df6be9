use axum::{
    Json, Router,
    extract::State,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

use super::cache::{CacheKeyInfo, CacheRemovalReport};
use super::resize::ResizeReport;

/// 单次请求允许的最大文件数
const MAX_FILES_PER_REQUEST: usize = 1000;

/// 商品图片文件列表（相对商品图片基础路径，如 `i/m/image.jpg`）
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ImageFilesRequest {
    #[schema(example = json!(["i/m/image.jpg"]))]
    pub files: Vec<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct FlushResponse {
    /// 是否确有缓存目录被删除
    pub flushed: bool,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ResizeFailure {
    pub file: String,
    pub error: String,
}

/// 批量生成缓存变体的汇总结果
#[derive(Debug, Default, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchResizeResponse {
    pub generated: usize,
    pub skipped: usize,
    pub variants: Vec<String>,
    /// 单个文件失败不影响其余文件
    pub failures: Vec<ResizeFailure>,
}

impl BatchResizeResponse {
    fn absorb(&mut self, report: ResizeReport) {
        self.generated += report.generated;
        self.skipped += report.skipped;
        self.variants.extend(report.variants);
    }
}

fn check_file_count(files: &[String]) -> Result<(), AppError> {
    if files.len() > MAX_FILES_PER_REQUEST {
        return Err(AppError::Validation(format!(
            "files 数量超过上限 {MAX_FILES_PER_REQUEST}"
        )));
    }
    Ok(())
}

/// 将同步文件/图片操作放到 blocking 线程池执行
async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(r) => r,
        Err(e) => {
            let e_str = e.to_string();
            if let Ok(panic) = e.try_into_panic() {
                std::panic::resume_unwind(panic);
            }
            Err(AppError::Internal(format!(
                "spawn_blocking cancelled: {e_str}"
            )))
        }
    }
}

#[utoipa::path(
    post,
    path = "/admin/catalog/product/image-cache/remove",
    summary = "删除已删除源图的缓存变体",
    description = "按每个前台图片视图计算缓存键，删除 `<base>/cache/<cache_id>/<file>`。需要 X-Admin-Token。",
    request_body = ImageFilesRequest,
    params(("X-Admin-Token" = String, Header, description = "管理员令牌（config.admin.tokens）")),
    responses(
        (status = 200, description = "清理结果", body = CacheRemovalReport),
        (status = 400, description = "非法路径", body = AppError),
        (status = 401, description = "未授权", body = AppError)
    ),
    security(("AdminToken" = [])),
    tag = "CatalogImage"
)]
pub async fn post_remove_from_cache(
    State(state): State<AppState>,
    Json(req): Json<ImageFilesRequest>,
) -> Result<Json<CacheRemovalReport>, AppError> {
    check_file_count(&req.files)?;
    let cache = state.image_cache.clone();
    let report =
        run_blocking(move || Ok(cache.remove_deleted_images_from_cache(&req.files)?)).await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/admin/catalog/product/image-cache/keys",
    summary = "查看图片视图缓存键",
    description = "返回每个前台图片视图的可读参数与缓存键，用于排查缓存目录命名。需要 X-Admin-Token。",
    params(("X-Admin-Token" = String, Header, description = "管理员令牌（config.admin.tokens）")),
    responses(
        (status = 200, description = "缓存键列表", body = [CacheKeyInfo]),
        (status = 401, description = "未授权", body = AppError)
    ),
    security(("AdminToken" = [])),
    tag = "CatalogImage"
)]
pub async fn get_cache_keys(
    State(state): State<AppState>,
) -> Result<Json<Vec<CacheKeyInfo>>, AppError> {
    Ok(Json(state.image_cache.cache_keys()?))
}

#[utoipa::path(
    delete,
    path = "/admin/catalog/product/image-cache",
    summary = "清空商品图片缓存",
    params(("X-Admin-Token" = String, Header, description = "管理员令牌（config.admin.tokens）")),
    responses(
        (status = 200, description = "清空结果", body = FlushResponse),
        (status = 401, description = "未授权", body = AppError)
    ),
    security(("AdminToken" = [])),
    tag = "CatalogImage"
)]
pub async fn delete_image_cache(
    State(state): State<AppState>,
) -> Result<Json<FlushResponse>, AppError> {
    let cache = state.image_cache.clone();
    let flushed = run_blocking(move || Ok(cache.flush()?)).await?;
    Ok(Json(FlushResponse { flushed }))
}

#[utoipa::path(
    post,
    path = "/admin/catalog/product/images/resize",
    summary = "生成商品图片缓存变体",
    description = "为每个文件按全部前台图片视图生成缩放后的缓存变体；已存在的变体跳过。需要 X-Admin-Token。",
    request_body = ImageFilesRequest,
    params(("X-Admin-Token" = String, Header, description = "管理员令牌（config.admin.tokens）")),
    responses(
        (status = 200, description = "生成结果", body = BatchResizeResponse),
        (status = 401, description = "未授权", body = AppError),
        (status = 422, description = "参数错误", body = AppError)
    ),
    security(("AdminToken" = [])),
    tag = "CatalogImage"
)]
pub async fn post_resize_images(
    State(state): State<AppState>,
    Json(req): Json<ImageFilesRequest>,
) -> Result<Json<BatchResizeResponse>, AppError> {
    check_file_count(&req.files)?;
    let resizer = state.image_resizer.clone();
    let resp = run_blocking(move || {
        let mut resp = BatchResizeResponse::default();
        for file in &req.files {
            match resizer.resize(file) {
                Ok(report) => resp.absorb(report),
                Err(e) => {
                    tracing::warn!("缓存变体生成失败: {} ({})", file, e);
                    resp.failures.push(ResizeFailure {
                        file: file.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        Ok(resp)
    })
    .await?;

    tracing::info!(
        target: "storefront_backend::catalog_image",
        "缓存变体生成完成: generated={}, skipped={}, failures={}",
        resp.generated,
        resp.skipped,
        resp.failures.len()
    );
    Ok(Json(resp))
}

/// 商品图片缓存管理路由（挂载在管理端令牌校验之后）
pub fn create_catalog_image_router() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/catalog/product/image-cache/remove",
            post(post_remove_from_cache),
        )
        .route("/admin/catalog/product/image-cache/keys", get(get_cache_keys))
        .route("/admin/catalog/product/image-cache", delete(delete_image_cache))
        .route("/admin/catalog/product/images/resize", post(post_resize_images))
}

#[cfg(test)]
mod tests {
    use super::check_file_count;

    #[test]
    fn file_count_limit_is_enforced() {
        assert!(check_file_count(&vec!["a.jpg".to_string(); 3]).is_ok());
        assert!(check_file_count(&vec!["a.jpg".to_string(); 1001]).is_err());
    }
}
