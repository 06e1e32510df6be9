use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::openapi::server::{ServerBuilder, ServerVariableBuilder};
use utoipa::{Modify, OpenApi};

/// 在 OpenAPI 中注入 `X-Admin-Token` 的安全定义，供管理端接口复用。
struct AdminTokenSecurity;

impl Modify for AdminTokenSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "AdminToken",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Admin-Token"))),
        );
    }
}

/// 业务接口挂载在 `config.api.prefix` 下；`/health` 不带前缀，额外提供 `/`。
struct ApiServers;

impl Modify for ApiServers {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let api = ServerBuilder::new()
            .url("{api_prefix}")
            .description(Some("业务接口（默认 /api/v1）"))
            .parameter(
                "api_prefix",
                ServerVariableBuilder::new()
                    .default_value("/api/v1")
                    .description(Some(
                        "业务接口前缀：对应 config.api.prefix（可通过 APP_API_PREFIX 覆盖）",
                    )),
            )
            .build();

        let root = ServerBuilder::new()
            .url("/")
            .description(Some("根路径（用于 /health）"))
            .build();

        openapi.servers = Some(vec![api, root]);
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::features::health::handler::health_check,
        crate::features::catalog_image::handler::post_remove_from_cache,
        crate::features::catalog_image::handler::get_cache_keys,
        crate::features::catalog_image::handler::delete_image_cache,
        crate::features::catalog_image::handler::post_resize_images,
        crate::features::widget::handler::post_validate,
        crate::features::widget::handler::post_save,
    ),
    components(schemas(crate::error::ProblemDetails)),
    modifiers(&AdminTokenSecurity, &ApiServers),
    tags(
        (
            name = "CatalogImage",
            description = "商品图片缓存：缓存键查看、删除源图后的缓存清理、变体生成与整体清空。"
        ),
        (
            name = "Widget",
            description = "组件实例：后台表单校验（JSON + 消息块 HTML）与保存。"
        ),
        (name = "Health", description = "健康检查：服务探活。"),
    ),
    info(
        title = "Storefront Backend API",
        version = env!("CARGO_PKG_VERSION"),
        description = "商品图片缓存与组件实例管理 API（Axum + utoipa）。除 /health 外，接口实际挂载在 `config.api.prefix`（默认 /api/v1）下，OpenAPI 的 paths 不包含该前缀。"
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::ApiDoc;
    use utoipa::OpenApi;

    #[test]
    fn document_lists_admin_routes_and_security() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/admin/widget_instance/validate"));
        assert!(
            doc.paths
                .paths
                .contains_key("/admin/catalog/product/image-cache/remove")
        );
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("AdminToken"));
    }
}
