use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{ColorType, DynamicImage, ImageFormat, Rgba, RgbaImage};
use serde::Serialize;

use crate::error::MediaError;

use super::cache::ProductImageCache;
use super::media::sanitize_relative;
use super::params::{ImageParams, WatermarkParams};
use super::readable;

/// 水印文件目录（位于商品图片基础路径之下）
const WATERMARK_DIR: &str = "watermark";

/// 单个源图片的缓存变体生成结果
#[derive(Debug, Clone, Default, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResizeReport {
    /// 新生成的变体数
    pub generated: usize,
    /// 已存在而跳过的变体数
    pub skipped: usize,
    /// 新生成的变体相对路径
    pub variants: Vec<String>,
}

/// 缓存变体生成器：按每个前台图片视图把源图缩放到 `<base>/cache/<cache_id>/<file>`。
///
/// 全部为同步 CPU/IO 操作，调用方需放到 blocking 线程池执行。
#[derive(Clone)]
pub struct ImageResizer {
    cache: ProductImageCache,
}

impl ImageResizer {
    pub fn new(cache: ProductImageCache) -> Self {
        Self { cache }
    }

    pub fn resize(&self, file: &str) -> Result<ResizeReport, MediaError> {
        let file = sanitize_relative(file)?.to_string_lossy().into_owned();
        let base = self.cache.base_media_path();
        let dir = self.cache.media_directory();

        let raw = dir.read(&format!("{base}/{file}"))?;
        let format = image::guess_format(&raw)?;
        let source = image::load_from_memory_with_format(&raw, format)?;

        let view = self.cache.frontend_view()?;
        let mut report = ResizeReport::default();
        for entity in view.media_entities() {
            let params = self.cache.cache_params(entity, &view);
            let cache_id = self.cache.cache_id(&readable::convert(&params));
            let variant = ProductImageCache::variant_path(&base, &cache_id, &file)?;
            if dir.exists(&variant)? {
                report.skipped += 1;
                continue;
            }

            let watermark = params
                .watermark
                .as_ref()
                .and_then(|wm| self.load_watermark(&base, wm));
            let rendered = render_variant(&source, &params, watermark.as_ref());
            let bytes = encode(&rendered, format, params.quality)?;
            dir.write(&variant, &bytes)?;

            tracing::debug!(
                target: "storefront_backend::catalog_image",
                "生成缓存变体: view={}, path={}, {}x{}",
                entity.id,
                variant,
                rendered.width(),
                rendered.height()
            );
            report.generated += 1;
            report.variants.push(variant);
        }
        Ok(report)
    }

    /// 读取水印图片；缺失或无法解码时跳过水印（仅告警）
    fn load_watermark(
        &self,
        base: &str,
        wm: &WatermarkParams,
    ) -> Option<(DynamicImage, WatermarkParams)> {
        let path = format!("{base}/{WATERMARK_DIR}/{}", wm.file.trim_start_matches('/'));
        let loaded = self
            .cache
            .media_directory()
            .read(&path)
            .and_then(|raw| image::load_from_memory(&raw).map_err(MediaError::from));
        match loaded {
            Ok(img) => Some((img, wm.clone())),
            Err(e) => {
                tracing::warn!("水印加载失败，已跳过: {} ({})", path, e);
                None
            }
        }
    }
}

/// 目标尺寸计算结果：缩放后图片尺寸 + 画布尺寸
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Geometry {
    scaled: (u32, u32),
    canvas: (u32, u32),
}

fn compute_geometry(src: (u32, u32), params: &ImageParams) -> Geometry {
    let (sw, sh) = (src.0.max(1), src.1.max(1));
    let ratio = sw as f64 / sh as f64;

    let (tw, th) = match (params.image_width, params.image_height) {
        (None, None) => (sw, sh),
        (Some(w), None) if params.keep_aspect_ratio => (w, (w as f64 / ratio).round() as u32),
        (None, Some(h)) if params.keep_aspect_ratio => ((h as f64 * ratio).round() as u32, h),
        (Some(w), None) => (w, sh),
        (None, Some(h)) => (sw, h),
        (Some(w), Some(h)) => (w, h),
    };
    let (tw, th) = (tw.max(1), th.max(1));

    let scaled = if params.keep_aspect_ratio {
        let mut scale = (tw as f64 / sw as f64).min(th as f64 / sh as f64);
        if params.constrain_only {
            scale = scale.min(1.0);
        }
        (
            ((sw as f64 * scale).round() as u32).max(1),
            ((sh as f64 * scale).round() as u32).max(1),
        )
    } else if params.constrain_only {
        (tw.min(sw), th.min(sh))
    } else {
        (tw, th)
    };

    let canvas = if params.keep_frame && params.keep_aspect_ratio {
        (tw.max(scaled.0), th.max(scaled.1))
    } else {
        scaled
    };

    Geometry { scaled, canvas }
}

fn rotate(img: &DynamicImage, angle: Option<i32>) -> DynamicImage {
    match angle.map(|a| a.rem_euclid(360)) {
        Some(90) => img.rotate90(),
        Some(180) => img.rotate180(),
        Some(270) => img.rotate270(),
        _ => img.clone(),
    }
}

fn background_pixel(params: &ImageParams, transparent: bool) -> Rgba<u8> {
    if transparent {
        return Rgba([0, 0, 0, 0]);
    }
    match params.background.as_slice() {
        [r, g, b, ..] => Rgba([*r, *g, *b, 255]),
        _ => Rgba([255, 255, 255, 255]),
    }
}

fn render_variant(
    source: &DynamicImage,
    params: &ImageParams,
    watermark: Option<&(DynamicImage, WatermarkParams)>,
) -> DynamicImage {
    let rotated = rotate(source, params.angle);
    let geometry = compute_geometry((rotated.width(), rotated.height()), params);
    let resized = rotated
        .resize_exact(geometry.scaled.0, geometry.scaled.1, FilterType::Lanczos3)
        .to_rgba8();

    let transparent = params.keep_transparency && rotated.color().has_alpha();
    let (cw, ch) = geometry.canvas;
    let mut canvas = RgbaImage::from_pixel(cw, ch, background_pixel(params, transparent));
    let x = (cw - geometry.scaled.0) / 2;
    let y = (ch - geometry.scaled.1) / 2;
    imageops::overlay(&mut canvas, &resized, x as i64, y as i64);

    if let Some((mark, wm)) = watermark {
        apply_watermark(&mut canvas, mark, wm);
    }
    DynamicImage::ImageRgba8(canvas)
}

fn apply_watermark(canvas: &mut RgbaImage, mark: &DynamicImage, wm: &WatermarkParams) {
    let (cw, ch) = canvas.dimensions();
    let position = wm.position.as_deref().unwrap_or("stretch");

    let mut mark = if position == "stretch" {
        mark.resize_exact(cw, ch, FilterType::Triangle).to_rgba8()
    } else {
        match (wm.width, wm.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => {
                mark.resize_exact(w, h, FilterType::Triangle).to_rgba8()
            }
            _ => mark.to_rgba8(),
        }
    };
    if let Some(opacity) = wm.image_opacity {
        for px in mark.pixels_mut() {
            px.0[3] = (px.0[3] as u16 * opacity as u16 / 100) as u8;
        }
    }

    let (mw, mh) = mark.dimensions();
    if mw == 0 || mh == 0 {
        return;
    }
    let right = cw.saturating_sub(mw) as i64;
    let bottom = ch.saturating_sub(mh) as i64;
    match position {
        "tile" => {
            for y in (0..ch).step_by(mh as usize) {
                for x in (0..cw).step_by(mw as usize) {
                    imageops::overlay(canvas, &mark, x as i64, y as i64);
                }
            }
        }
        "top-right" => imageops::overlay(canvas, &mark, right, 0),
        "bottom-left" => imageops::overlay(canvas, &mark, 0, bottom),
        "bottom-right" => imageops::overlay(canvas, &mark, right, bottom),
        "center" => imageops::overlay(canvas, &mark, right / 2, bottom / 2),
        // stretch / top-left / 未知取值
        _ => imageops::overlay(canvas, &mark, 0, 0),
    }
}

fn encode(img: &DynamicImage, format: ImageFormat, quality: u8) -> Result<Vec<u8>, MediaError> {
    let mut out = Vec::new();
    match format {
        ImageFormat::Jpeg => {
            let rgb = img.to_rgb8();
            let mut enc = JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
            enc.encode(&rgb, rgb.width(), rgb.height(), ColorType::Rgb8.into())?;
        }
        other => {
            img.write_to(&mut Cursor::new(&mut out), other)?;
        }
    }
    Ok(out)
}
