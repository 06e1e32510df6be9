use md5::{Digest, Md5};

/// 摘要算法版本
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashVersion {
    /// 图片缓存键使用 MD5（32 位十六进制，与既有缓存目录命名兼容）
    Md5,
}

/// 摘要服务：对字符串计算小写十六进制摘要
pub trait Encryptor: Send + Sync {
    fn hash(&self, data: &str, version: HashVersion) -> String;
}

/// 基于 RustCrypto `digest` 实现的摘要服务
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestEncryptor;

fn hex_digest<D: Digest>(data: &str) -> String {
    hex::encode(D::digest(data.as_bytes()))
}

impl Encryptor for DigestEncryptor {
    fn hash(&self, data: &str, version: HashVersion) -> String {
        match version {
            HashVersion::Md5 => hex_digest::<Md5>(data),
        }
    }
}
