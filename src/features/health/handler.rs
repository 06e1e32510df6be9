use axum::{extract::State, response::Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `healthy`，或商品图片目录缺失时的 `degraded`
    #[schema(example = "healthy")]
    pub status: String,
    #[schema(example = "storefront-backend")]
    pub service: String,
    #[schema(example = "0.1.0")]
    pub version: String,
    /// 商品图片基础路径（相对媒体根目录）
    #[schema(example = "catalog/product")]
    pub media_base_path: String,
    pub media_ready: bool,
}

/// 进程存活即返回 200；媒体目录不可用只降级，不影响组件实例接口。
#[utoipa::path(
    get,
    path = "/health",
    summary = "健康检查",
    description = "返回服务版本，以及商品图片基础目录是否就绪。",
    responses((status = 200, description = "服务存活", body = HealthResponse)),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let base = state.image_cache.base_media_path();
    let media_ready = match state.image_cache.media_directory().exists(&base) {
        Ok(ready) => ready,
        Err(e) => {
            tracing::warn!("健康检查无法访问媒体目录 {}: {}", base, e);
            false
        }
    };
    Json(HealthResponse {
        status: if media_ready { "healthy" } else { "degraded" }.to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        media_base_path: base,
        media_ready,
    })
}
