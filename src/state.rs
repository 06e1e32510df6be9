use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::features::catalog_image::{
    DigestEncryptor, ImageResizer, LocalMediaDirectory, ParamsBuilder, ProductImageCache,
    ViewConfigSet,
};
use crate::features::widget::{WidgetCatalog, WidgetStorage};
use crate::i18n::{InlineTranslation, Translator};

/// 聚合的应用共享状态
#[derive(Clone)]
pub struct AppState {
    pub image_cache: ProductImageCache,
    pub image_resizer: ImageResizer,
    pub widget_catalog: Arc<WidgetCatalog>,
    pub widget_storage: WidgetStorage,
    pub translator: Arc<Translator>,
    pub inline_translation: InlineTranslation,
    /// 管理员令牌（X-Admin-Token）
    pub admin_tokens: Arc<Vec<String>>,
}

impl AppState {
    /// 按配置装配全部依赖：展示配置、组件目录、翻译字典与 SQLite 存储
    pub async fn build(config: &AppConfig) -> Result<Self, AppError> {
        let view_path = config.view_file_path();
        let presentation = if view_path.exists() {
            ViewConfigSet::load(&view_path)?
        } else {
            tracing::warn!("未找到展示配置 {:?}，商品图片视图为空", view_path);
            ViewConfigSet::default()
        };

        let widgets_path = config.widgets_file_path();
        let widget_catalog = if widgets_path.exists() {
            WidgetCatalog::load(&widgets_path)?
        } else {
            tracing::warn!("未找到组件目录 {:?}，组件代码将无法解析类型", widgets_path);
            WidgetCatalog::default()
        };

        let translator = Translator::load_csv(&config.i18n.locale, &config.i18n_file_path())?
            .with_inline(config.i18n.inline_translation);

        let widget_storage =
            WidgetStorage::connect_sqlite(&config.widget.sqlite_path, config.widget.sqlite_wal)
                .await?;
        widget_storage.init_schema().await?;

        let image_cache = ProductImageCache::new(
            Arc::new(presentation),
            Arc::new(DigestEncryptor),
            Arc::new(config.media.clone()),
            Arc::new(LocalMediaDirectory::new(config.media_root())),
            ParamsBuilder::from_media_config(&config.media),
        );

        Ok(Self {
            image_resizer: ImageResizer::new(image_cache.clone()),
            image_cache,
            widget_catalog: Arc::new(widget_catalog),
            widget_storage,
            translator: Arc::new(translator),
            inline_translation: InlineTranslation::new(config.i18n.inline_translation),
            admin_tokens: Arc::new(config.admin.tokens.clone()),
        })
    }
}
