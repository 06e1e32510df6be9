use std::collections::HashMap;

use serde::Serialize;

use crate::config::{MediaConfig, WatermarkConfig};

use super::view_config::{MediaEntity, ViewConfig};

/// 默认背景：白色
const DEFAULT_BACKGROUND: [u8; 3] = [255, 255, 255];
/// 主题变量：缺省是否保留白边画框
pub const WHITE_BORDERS_VAR: &str = "product_image_white_borders";

/// 水印参数（随图片类型配置）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatermarkParams {
    pub file: String,
    pub image_opacity: Option<u8>,
    pub position: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// 规范化后的图片变换参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageParams {
    pub image_type: Option<String>,
    pub image_height: Option<u32>,
    pub image_width: Option<u32>,
    pub background: Vec<u8>,
    pub angle: Option<i32>,
    pub quality: u8,
    pub keep_aspect_ratio: bool,
    pub keep_frame: bool,
    pub keep_transparency: bool,
    pub constrain_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watermark: Option<WatermarkParams>,
}

/// 参数构建器：视图配置 → 规范化参数（填充默认值、质量与水印）
#[derive(Debug, Clone)]
pub struct ParamsBuilder {
    quality: u8,
    watermarks: HashMap<String, WatermarkConfig>,
}

impl ParamsBuilder {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
            watermarks: HashMap::new(),
        }
    }

    pub fn from_media_config(media: &MediaConfig) -> Self {
        Self::new(media.jpeg_quality).with_watermarks(media.watermarks.clone())
    }

    pub fn with_watermarks(mut self, watermarks: HashMap<String, WatermarkConfig>) -> Self {
        self.watermarks = watermarks;
        self
    }

    /// 构建规范化参数。`view` 用于读取缺省画框设置（主题变量）。
    pub fn build(&self, entity: &MediaEntity, view: &ViewConfig) -> ImageParams {
        let default_frame = view.var_bool(WHITE_BORDERS_VAR).unwrap_or(false);

        ImageParams {
            image_type: entity.image_type.clone(),
            image_height: entity.height,
            image_width: entity.width,
            background: entity
                .background
                .as_ref()
                .map(|b| b.0.clone())
                .unwrap_or_else(|| DEFAULT_BACKGROUND.to_vec()),
            angle: entity.angle,
            quality: self.quality,
            keep_aspect_ratio: entity.aspect_ratio.unwrap_or(true),
            keep_frame: entity.frame.unwrap_or(default_frame),
            keep_transparency: entity.transparency.unwrap_or(true),
            constrain_only: entity.constrain_only.unwrap_or(true),
            watermark: entity
                .image_type
                .as_deref()
                .and_then(|t| self.watermark_for(t)),
        }
    }

    fn watermark_for(&self, image_type: &str) -> Option<WatermarkParams> {
        let cfg = self.watermarks.get(image_type)?;
        let file = cfg.file.as_deref().map(str::trim).filter(|f| !f.is_empty())?;
        let (width, height) = cfg
            .size
            .as_deref()
            .map(parse_size)
            .unwrap_or((None, None));
        Some(WatermarkParams {
            file: file.to_string(),
            image_opacity: cfg.opacity.map(|o| o.min(100)),
            position: cfg.position.clone(),
            width,
            height,
        })
    }
}

/// 解析 `WxH`；任一侧非法则为 None
fn parse_size(raw: &str) -> (Option<u32>, Option<u32>) {
    let mut parts = raw.split(['x', 'X']);
    let w = parts.next().and_then(|p| p.trim().parse().ok());
    let h = parts.next().and_then(|p| p.trim().parse().ok());
    (w, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::catalog_image::fixtures::thumbnail_entity;

    #[test]
    fn builds_literal_thumbnail_params() {
        let params = ParamsBuilder::new(80).build(&thumbnail_entity(), &ViewConfig::default());
        assert_eq!(
            params,
            ImageParams {
                image_type: Some("thumbnail".into()),
                image_height: Some(50),
                image_width: Some(100),
                background: vec![255, 255, 255],
                angle: None,
                quality: 80,
                keep_aspect_ratio: false,
                keep_frame: true,
                keep_transparency: false,
                constrain_only: false,
                watermark: None,
            }
        );
    }

    #[test]
    fn missing_flags_fall_back_to_defaults() {
        let entity = MediaEntity {
            id: "bare".into(),
            image_type: Some("image".into()),
            ..MediaEntity::default()
        };
        let mut view = ViewConfig::default();
        view.vars.insert(WHITE_BORDERS_VAR.into(), "1".into());

        let params = ParamsBuilder::new(90).build(&entity, &view);
        assert!(params.keep_aspect_ratio);
        assert!(params.keep_transparency);
        assert!(params.constrain_only);
        assert!(params.keep_frame);
        assert_eq!(params.background, vec![255, 255, 255]);
        assert_eq!(params.quality, 90);
        assert_eq!(params.image_width, None);
    }

    #[test]
    fn watermark_attached_only_when_file_configured() {
        let mut marks = HashMap::new();
        marks.insert(
            "thumbnail".to_string(),
            WatermarkConfig {
                file: Some("stores/1/mark.png".into()),
                opacity: Some(150),
                position: Some("center".into()),
                size: Some("40x20".into()),
            },
        );
        marks.insert("image".to_string(), WatermarkConfig::default());

        let builder = ParamsBuilder::new(80).with_watermarks(marks);
        let wm = builder
            .build(&thumbnail_entity(), &ViewConfig::default())
            .watermark
            .expect("thumbnail watermark");
        assert_eq!(wm.file, "stores/1/mark.png");
        assert_eq!(wm.image_opacity, Some(100));
        assert_eq!((wm.width, wm.height), (Some(40), Some(20)));

        let image = MediaEntity {
            image_type: Some("image".into()),
            ..MediaEntity::default()
        };
        assert!(builder.build(&image, &ViewConfig::default()).watermark.is_none());
    }
}
