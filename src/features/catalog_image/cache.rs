use std::sync::Arc;

use serde::Serialize;

use crate::error::MediaError;

use super::encryptor::{Encryptor, HashVersion};
use super::media::{CatalogMediaConfig, MediaDirectory, sanitize_relative};
use super::params::{ImageParams, ParamsBuilder};
use super::readable::{self, ReadableParams};
use super::view_config::{Area, MediaEntity, PresentationConfig, ViewConfig};

/// 缓存目录名（位于商品图片基础路径之下）
pub const CACHE_DIR: &str = "cache";

/// 单个图片视图的缓存键诊断信息
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CacheKeyInfo {
    /// 视图 ID
    pub id: String,
    /// 图片类型
    pub image_type: Option<String>,
    /// 可读参数（有序键值对）
    #[schema(value_type = Vec<Vec<String>>)]
    pub readable: ReadableParams,
    /// 缓存键（MD5 十六进制）
    #[schema(example = "802af4e5a981e886a93c6cbf0f6d0cdd")]
    pub cache_id: String,
}

/// 删除缓存变体的结果
#[derive(Debug, Clone, Default, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CacheRemovalReport {
    /// 尝试删除的路径数（视图数 × 文件数）
    pub attempted: usize,
    /// 实际删除的路径数
    pub removed: usize,
    /// 参与计算的缓存键
    pub cache_ids: Vec<String>,
    /// 删除失败的变体（不中断其余路径的清理）
    pub failures: Vec<CacheRemovalFailure>,
}

/// 单个缓存变体删除失败的记录
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CacheRemovalFailure {
    pub path: String,
    pub error: String,
}

/// 商品图片缓存：缓存键推导、删除已删除源图的缓存变体、整体清空。
///
/// 协作对象全部通过构造注入，便于替换与计数校验。
#[derive(Clone)]
pub struct ProductImageCache {
    presentation: Arc<dyn PresentationConfig>,
    encryptor: Arc<dyn Encryptor>,
    media_config: Arc<dyn CatalogMediaConfig>,
    media_directory: Arc<dyn MediaDirectory>,
    params_builder: ParamsBuilder,
}

impl ProductImageCache {
    pub fn new(
        presentation: Arc<dyn PresentationConfig>,
        encryptor: Arc<dyn Encryptor>,
        media_config: Arc<dyn CatalogMediaConfig>,
        media_directory: Arc<dyn MediaDirectory>,
        params_builder: ParamsBuilder,
    ) -> Self {
        Self {
            presentation,
            encryptor,
            media_config,
            media_directory,
            params_builder,
        }
    }

    pub fn media_directory(&self) -> &Arc<dyn MediaDirectory> {
        &self.media_directory
    }

    pub fn base_media_path(&self) -> String {
        self.media_config.base_media_path()
    }

    /// 前台图片视图配置
    pub fn frontend_view(&self) -> Result<Arc<ViewConfig>, MediaError> {
        self.presentation.view_config(Area::Frontend)
    }

    /// 构建用于缓存键的参数（去掉 image_type，它不参与缓存键）
    pub fn cache_params(&self, entity: &MediaEntity, view: &ViewConfig) -> ImageParams {
        let mut params = self.params_builder.build(entity, view);
        params.image_type = None;
        params
    }

    /// 由可读参数计算缓存键
    pub fn cache_id(&self, readable: &ReadableParams) -> String {
        self.encryptor.hash(&readable.joined(), HashVersion::Md5)
    }

    /// 单个视图的缓存键与可读参数
    pub fn cache_key(&self, entity: &MediaEntity, view: &ViewConfig) -> CacheKeyInfo {
        let readable = readable::convert(&self.cache_params(entity, view));
        CacheKeyInfo {
            id: entity.id.clone(),
            image_type: entity.image_type.clone(),
            cache_id: self.cache_id(&readable),
            readable,
        }
    }

    /// 全部前台图片视图的缓存键
    pub fn cache_keys(&self) -> Result<Vec<CacheKeyInfo>, MediaError> {
        let view = self.frontend_view()?;
        Ok(view
            .media_entities()
            .iter()
            .map(|entity| self.cache_key(entity, &view))
            .collect())
    }

    /// 缓存变体的相对路径：`<base>/cache/<cache_id>/<file>`
    pub fn variant_path(base: &str, cache_id: &str, file: &str) -> Result<String, MediaError> {
        let file = sanitize_relative(file)?;
        Ok(format!(
            "{}/{}/{}/{}",
            base,
            CACHE_DIR,
            cache_id,
            file.to_string_lossy()
        ))
    }

    /// 源图片被删除后，清理每个前台图片视图下对应的缓存变体。
    ///
    /// 空列表直接返回；所有路径先整体校验，任何非法路径都不会触发删除。
    /// 单个变体删除失败只记入 `failures`，其余变体照常清理。
    pub fn remove_deleted_images_from_cache(
        &self,
        files: &[String],
    ) -> Result<CacheRemovalReport, MediaError> {
        if files.is_empty() {
            return Ok(CacheRemovalReport::default());
        }
        for file in files {
            sanitize_relative(file)?;
        }

        let view = self.frontend_view()?;
        let base = self.media_config.base_media_path();

        let mut report = CacheRemovalReport::default();
        for entity in view.media_entities() {
            let readable = readable::convert(&self.cache_params(entity, &view));
            let cache_id = self.cache_id(&readable);
            for file in files {
                let path = Self::variant_path(&base, &cache_id, file)?;
                report.attempted += 1;
                match self.media_directory.delete(&path) {
                    Ok(true) => report.removed += 1,
                    Ok(false) => {}
                    Err(e) => {
                        tracing::warn!(
                            target: "storefront_backend::catalog_image",
                            "缓存变体删除失败: path={}, error={}",
                            path,
                            e
                        );
                        report.failures.push(CacheRemovalFailure {
                            path,
                            error: e.to_string(),
                        });
                    }
                }
            }
            report.cache_ids.push(cache_id);
        }

        tracing::info!(
            target: "storefront_backend::catalog_image",
            "缓存清理完成: files={}, attempted={}, removed={}, failed={}",
            files.len(),
            report.attempted,
            report.removed,
            report.failures.len()
        );
        Ok(report)
    }

    /// 清空整个商品图片缓存目录
    pub fn flush(&self) -> Result<bool, MediaError> {
        let base = self.media_config.base_media_path();
        let removed = self
            .media_directory
            .delete(&format!("{base}/{CACHE_DIR}"))?;
        tracing::info!(
            target: "storefront_backend::catalog_image",
            "商品图片缓存已清空: removed={}",
            removed
        );
        Ok(removed)
    }
}
