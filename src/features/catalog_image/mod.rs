//! 商品图片缓存：图片视图配置 → 规范化参数 → 可读参数 → MD5 缓存键，
//! 以及基于缓存键的变体删除、清空与生成。

pub mod cache;
pub mod encryptor;
pub mod handler;
pub mod media;
pub mod params;
pub mod readable;
pub mod resize;
pub mod view_config;

pub use cache::{CacheKeyInfo, CacheRemovalReport, ProductImageCache};
pub use encryptor::{DigestEncryptor, Encryptor, HashVersion};
pub use handler::create_catalog_image_router;
pub use media::{CatalogMediaConfig, LocalMediaDirectory, MediaDirectory};
pub use params::{ImageParams, ParamsBuilder};
pub use resize::{ImageResizer, ResizeReport};
pub use view_config::{Area, MediaEntity, PresentationConfig, ViewConfig, ViewConfigSet};

#[cfg(test)]
pub(crate) mod fixtures {
    use super::view_config::{Background, MediaEntity};

    /// 前台缩略图视图：100x50、带画框、不保持宽高比、不保留透明、白底
    pub(crate) fn thumbnail_entity() -> MediaEntity {
        MediaEntity {
            id: "product_thumbnail_image".into(),
            image_type: Some("thumbnail".into()),
            width: Some(100),
            height: Some(50),
            constrain_only: Some(false),
            aspect_ratio: Some(false),
            frame: Some(true),
            transparency: Some(false),
            background: Some(Background(vec![255, 255, 255])),
            angle: None,
        }
    }
}
