use axum::{Router, middleware, routing::get};
use tower_http::compression::CompressionLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::admin::admin_guard;
use crate::features::catalog_image::create_catalog_image_router;
use crate::features::health::handler::health_check;
use crate::features::widget::create_widget_router;
use crate::openapi::ApiDoc;
use crate::request_id::request_id_middleware;
use crate::state::AppState;

/// 压缩策略：排除图片与二进制下载等收益低的响应，保留默认最小大小阈值。
pub fn compression_predicate() -> impl tower_http::compression::predicate::Predicate {
    use tower_http::compression::predicate::{NotForContentType, Predicate, SizeAbove};

    SizeAbove::default()
        .and(NotForContentType::GRPC)
        .and(NotForContentType::IMAGES)
        .and(NotForContentType::SSE)
        .and(NotForContentType::const_new("application/octet-stream"))
        .and(NotForContentType::const_new("application/zip"))
        .and(NotForContentType::const_new("application/gzip"))
}

/// 组装完整路由：`/health`、`{api_prefix}` 下的管理端接口（令牌校验）、Swagger UI，
/// 以及 request_id 与压缩中间件。
pub fn create_app(state: AppState, api_prefix: &str) -> Router {
    let admin_router = Router::<AppState>::new()
        .merge(create_catalog_image_router())
        .merge(create_widget_router())
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_guard));

    Router::<AppState>::new()
        .route("/health", get(health_check))
        .nest(api_prefix, admin_router)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(CompressionLayer::new().compress_when(compression_predicate()))
        .layer(middleware::from_fn(request_id_middleware))
}
