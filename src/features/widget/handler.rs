use axum::{
    Form, Json, Router,
    extract::State,
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, i18n::Phrase, state::AppState};

use super::messages::{MessageCollection, MessagesBlock};
use super::model::{INCORRECT_WIDGET, ValidateResponse, WidgetInstance};

/// 组件实例表单（全部字段可选，数值字段宽松解析）
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct WidgetInstanceForm {
    pub instance_id: Option<String>,
    pub code: Option<String>,
    pub theme_id: Option<String>,
    pub title: Option<String>,
    /// 逗号分隔的店铺 ID
    #[schema(example = "0,1")]
    pub store_ids: Option<String>,
    pub sort_order: Option<String>,
    /// JSON 对象字符串
    #[schema(example = "{\"page_id\":\"5\"}")]
    pub widget_parameters: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SaveResponse {
    pub instance_id: i64,
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// 空串/非数字视为未提供
fn parse_id(v: &Option<String>) -> Option<i64> {
    non_empty(v).and_then(|s| s.parse().ok())
}

fn parse_store_ids(v: &Option<String>) -> Vec<i64> {
    non_empty(v)
        .map(|s| {
            s.split(',')
                .filter_map(|part| part.trim().parse().ok())
                .collect()
        })
        .unwrap_or_default()
}

impl WidgetInstanceForm {
    fn instance_id(&self) -> Option<i64> {
        parse_id(&self.instance_id)
    }

    fn code(&self) -> Option<String> {
        non_empty(&self.code).map(str::to_string)
    }
}

/// 初始化组件实例：带 ID 时读取已有实例（不存在返回 None），否则按组件代码新建。
async fn init_widget_instance(
    state: &AppState,
    form: &WidgetInstanceForm,
) -> Result<Option<WidgetInstance>, AppError> {
    let code = form.code();
    if let Some(id) = form.instance_id() {
        let Some(mut instance) = state.widget_storage.load(id).await? else {
            return Ok(None);
        };
        if code.is_some() {
            instance.code = code;
        }
        return Ok(Some(instance));
    }

    let instance_type = code
        .as_deref()
        .and_then(|c| state.widget_catalog.type_of(c))
        .map(str::to_string);
    Ok(Some(WidgetInstance::new(
        instance_type,
        code,
        parse_id(&form.theme_id),
    )))
}

/// 初始化 + 校验；失败时返回待展示的文案
async fn prepare_instance(
    state: &AppState,
    form: &WidgetInstanceForm,
) -> Result<Result<WidgetInstance, Phrase>, AppError> {
    let Some(instance) = init_widget_instance(state, form).await? else {
        return Ok(Err(Phrase::new(INCORRECT_WIDGET)));
    };
    Ok(instance.validate().map(|()| instance))
}

#[utoipa::path(
    post,
    path = "/admin/widget_instance/validate",
    summary = "校验组件实例",
    description = "校验组件实例表单。校验失败不返回 HTTP 错误，而是返回 `{error:true, html_message}`，其中 html_message 为分组消息块 HTML。需要 X-Admin-Token。",
    request_body(content = WidgetInstanceForm, content_type = "application/x-www-form-urlencoded"),
    params(("X-Admin-Token" = String, Header, description = "管理员令牌（config.admin.tokens）")),
    responses(
        (status = 200, description = "校验结果", body = ValidateResponse),
        (status = 401, description = "未授权", body = AppError)
    ),
    security(("AdminToken" = [])),
    tag = "Widget"
)]
pub async fn post_validate(
    State(state): State<AppState>,
    Form(form): Form<WidgetInstanceForm>,
) -> Result<Response, AppError> {
    let mut response = ValidateResponse::default();

    let mut messages = MessageCollection::new();
    if let Err(phrase) = prepare_instance(&state, &form).await? {
        tracing::info!("组件实例校验未通过: {}", phrase);
        messages.add_error(phrase);
    }
    if !messages.is_empty() {
        let html = MessagesBlock::new(&state.translator).grouped_html(&messages)?;
        response.error = true;
        response.html_message = Some(html);
    }

    let mut body = serde_json::to_string(&response)
        .map_err(|e| AppError::Internal(format!("序列化校验结果失败: {e}")))?;
    state.inline_translation.process_response_body(&mut body);

    let mut resp = body.into_response();
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    Ok(resp)
}

#[utoipa::path(
    post,
    path = "/admin/widget_instance/save",
    summary = "保存组件实例",
    description = "与校验动作相同的初始化与校验；通过后新增或更新实例。需要 X-Admin-Token。",
    request_body(content = WidgetInstanceForm, content_type = "application/x-www-form-urlencoded"),
    params(("X-Admin-Token" = String, Header, description = "管理员令牌（config.admin.tokens）")),
    responses(
        (status = 200, description = "保存成功", body = SaveResponse),
        (status = 401, description = "未授权", body = AppError),
        (status = 422, description = "校验失败", body = AppError)
    ),
    security(("AdminToken" = [])),
    tag = "Widget"
)]
pub async fn post_save(
    State(state): State<AppState>,
    Form(form): Form<WidgetInstanceForm>,
) -> Result<Json<SaveResponse>, AppError> {
    let mut instance = prepare_instance(&state, &form)
        .await?
        .map_err(|phrase| AppError::Validation(state.translator.render_plain(&phrase)))?;

    if let Some(title) = non_empty(&form.title) {
        instance.title = Some(title.to_string());
    }
    if form.store_ids.is_some() {
        instance.store_ids = parse_store_ids(&form.store_ids);
    }
    if let Some(order) = parse_id(&form.sort_order) {
        instance.sort_order = order;
    }
    if let Some(raw) = non_empty(&form.widget_parameters) {
        let params: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| AppError::Validation(format!("widget_parameters 不是合法 JSON: {e}")))?;
        if !params.is_object() {
            return Err(AppError::Validation(
                "widget_parameters 必须是 JSON 对象".into(),
            ));
        }
        instance.widget_parameters = params;
    }

    let instance_id = match instance.instance_id {
        Some(id) => {
            if !state.widget_storage.update(&instance).await? {
                return Err(AppError::NotFound(format!("组件实例 {id}")));
            }
            id
        }
        None => state.widget_storage.insert(&instance).await?,
    };

    tracing::info!(
        "组件实例已保存: id={}, code={:?}",
        instance_id,
        instance.code
    );
    Ok(Json(SaveResponse { instance_id }))
}

pub fn create_widget_router() -> Router<AppState> {
    Router::new()
        .route("/admin/widget_instance/validate", post(post_validate))
        .route("/admin/widget_instance/save", post(post_save))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_parsing_treats_garbage_as_absent() {
        assert_eq!(parse_id(&Some(" 12 ".into())), Some(12));
        assert_eq!(parse_id(&Some("".into())), None);
        assert_eq!(parse_id(&Some("abc".into())), None);
        assert_eq!(parse_id(&None), None);
        assert_eq!(parse_store_ids(&Some("0, 1,x,3".into())), vec![0, 1, 3]);
        assert!(parse_store_ids(&None).is_empty());
    }
}
