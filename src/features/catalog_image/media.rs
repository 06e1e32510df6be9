use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::config::MediaConfig;
use crate::error::MediaError;

/// 商品媒体路径配置
pub trait CatalogMediaConfig: Send + Sync {
    /// 商品图片相对媒体根目录的基础路径（例如 `catalog/product`）
    fn base_media_path(&self) -> String;
}

impl CatalogMediaConfig for MediaConfig {
    fn base_media_path(&self) -> String {
        self.base_media_path.trim_matches('/').to_string()
    }
}

/// 可写媒体目录。所有路径均为相对媒体根目录的路径。
pub trait MediaDirectory: Send + Sync {
    /// 删除文件或目录（递归）。返回 true 表示确有内容被删除，路径不存在返回 false。
    fn delete(&self, relative: &str) -> Result<bool, MediaError>;

    fn exists(&self, relative: &str) -> Result<bool, MediaError>;

    fn read(&self, relative: &str) -> Result<Vec<u8>, MediaError>;

    /// 写入文件，自动创建父目录
    fn write(&self, relative: &str, data: &[u8]) -> Result<(), MediaError>;

    /// 解析为绝对路径（已做越界校验）
    fn absolute_path(&self, relative: &str) -> Result<PathBuf, MediaError>;
}

/// 校验并规范化相对路径：去掉前导 `/`，拒绝 `..`、盘符等越界成分。
pub fn sanitize_relative(relative: &str) -> Result<PathBuf, MediaError> {
    let trimmed = relative.trim().trim_start_matches('/');
    if trimmed.is_empty() {
        return Err(MediaError::InvalidPath(relative.to_string()));
    }
    let mut out = PathBuf::new();
    for comp in Path::new(trimmed).components() {
        match comp {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(MediaError::InvalidPath(relative.to_string()));
            }
        }
    }
    if out.as_os_str().is_empty() {
        return Err(MediaError::InvalidPath(relative.to_string()));
    }
    Ok(out)
}

/// 本地文件系统媒体目录
#[derive(Debug, Clone)]
pub struct LocalMediaDirectory {
    root: PathBuf,
}

impl LocalMediaDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl MediaDirectory for LocalMediaDirectory {
    fn delete(&self, relative: &str) -> Result<bool, MediaError> {
        let path = self.absolute_path(relative)?;
        let meta = match std::fs::symlink_metadata(&path) {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        let res = if meta.is_dir() {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        match res {
            Ok(()) => {
                tracing::debug!("已删除媒体路径: {:?}", path);
                Ok(true)
            }
            // 并发删除时可能已被其他请求清理
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, relative: &str) -> Result<bool, MediaError> {
        Ok(self.absolute_path(relative)?.exists())
    }

    fn read(&self, relative: &str) -> Result<Vec<u8>, MediaError> {
        let path = self.absolute_path(relative)?;
        std::fs::read(&path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                MediaError::SourceMissing(relative.to_string())
            } else {
                e.into()
            }
        })
    }

    fn write(&self, relative: &str, data: &[u8]) -> Result<(), MediaError> {
        let path = self.absolute_path(relative)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, data)?;
        Ok(())
    }

    fn absolute_path(&self, relative: &str) -> Result<PathBuf, MediaError> {
        Ok(self.root.join(sanitize_relative(relative)?))
    }
}
