use crate::config::AppConfig;
use crate::error::AppError;
use std::fs;
use std::path::Path;

/// 执行启动检查
///
/// 1. 检查并创建 resources 文件夹
/// 2. 检查并创建媒体根目录与商品图片基础目录
/// 3. 检查展示配置、组件目录与翻译字典（缺失仅告警）
pub async fn run_startup_checks(config: &AppConfig) -> Result<(), AppError> {
    tracing::info!("🔍 开始执行启动检查...");

    ensure_dir(&config.resources_path(), "resources 文件夹")?;

    let product_media = config
        .media_root()
        .join(config.media.base_media_path.trim_matches('/'));
    ensure_dir(&product_media, "商品图片目录")?;

    warn_if_missing(&config.view_file_path(), "展示配置（商品图片视图）");
    warn_if_missing(&config.widgets_file_path(), "组件目录");
    warn_if_missing(&config.i18n_file_path(), "翻译字典");

    if config.admin.tokens.iter().all(|t| t.trim().is_empty()) {
        tracing::warn!("⚠️ 未配置管理员令牌，所有管理端接口将返回 401");
    }

    tracing::info!("✅ 启动检查完成");
    Ok(())
}

fn ensure_dir(path: &Path, what: &str) -> Result<(), AppError> {
    if path.exists() {
        tracing::info!("✅ {}已存在: {:?}", what, path);
        return Ok(());
    }
    tracing::warn!("📁 未找到{}，正在创建: {:?}", what, path);
    fs::create_dir_all(path)
        .map_err(|e| AppError::Internal(format!("创建{what}失败: {e}")))?;
    tracing::info!("✅ {}创建成功", what);
    Ok(())
}

fn warn_if_missing(path: &Path, what: &str) {
    if !path.exists() {
        tracing::warn!("⚠️ 未找到{}: {:?}", what, path);
    }
}
