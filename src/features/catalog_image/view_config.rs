use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::MediaError;

/// 展示配置所属区域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Area {
    /// 前台（商品图片视图在此定义）
    Frontend,
    /// 管理后台
    Adminhtml,
}

/// 背景色（RGB 分量）。
///
/// 配置中既可写成字符串 `"255,255,255"`，也可写成数组 `[255, 255, 255]`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BackgroundRepr", into = "Vec<u8>")]
pub struct Background(pub Vec<u8>);

#[derive(Deserialize)]
#[serde(untagged)]
enum BackgroundRepr {
    Text(String),
    Components(Vec<u8>),
}

impl TryFrom<BackgroundRepr> for Background {
    type Error = String;

    fn try_from(value: BackgroundRepr) -> Result<Self, Self::Error> {
        match value {
            BackgroundRepr::Components(c) => Ok(Background(c)),
            BackgroundRepr::Text(s) => Background::parse(&s),
        }
    }
}

impl From<Background> for Vec<u8> {
    fn from(value: Background) -> Self {
        value.0
    }
}

impl Background {
    /// 解析 `"r,g,b"`；空字符串视为无背景。
    pub fn parse(s: &str) -> Result<Self, String> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Background(Vec::new()));
        }
        trimmed
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<u8>()
                    .map_err(|_| format!("背景色分量无效: {part:?}（取值 0-255）"))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Background)
    }
}

/// 单个商品图片视图配置（一个命名的图片渲染规格）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaEntity {
    /// 视图 ID（例如 product_page_image_small）
    #[serde(default)]
    pub id: String,
    /// 图片类型：thumbnail、small_image、image、swatch_image、swatch_thumb
    #[serde(rename = "type", default)]
    pub image_type: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// 仅缩小不放大
    #[serde(default, alias = "constrain")]
    pub constrain_only: Option<bool>,
    /// 保持宽高比
    #[serde(default)]
    pub aspect_ratio: Option<bool>,
    /// 保持画框（按目标尺寸补边）
    #[serde(default)]
    pub frame: Option<bool>,
    /// 保留透明通道
    #[serde(default)]
    pub transparency: Option<bool>,
    #[serde(default)]
    pub background: Option<Background>,
    /// 旋转角度
    #[serde(default)]
    pub angle: Option<i32>,
}

/// 单个区域的展示配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewConfig {
    /// 主题变量（例如 product_image_white_borders）
    #[serde(default)]
    pub vars: HashMap<String, String>,
    /// 商品图片视图
    #[serde(default)]
    pub images: Vec<MediaEntity>,
}

impl ViewConfig {
    pub fn media_entities(&self) -> &[MediaEntity] {
        &self.images
    }

    /// 读取布尔型主题变量（"1"/"true"/"yes" 为真），缺省为 None
    pub fn var_bool(&self, name: &str) -> Option<bool> {
        self.vars.get(name).map(|v| {
            matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
    }
}

/// 展示配置来源
pub trait PresentationConfig: Send + Sync {
    /// 获取指定区域的展示配置；未配置的区域返回空配置。
    fn view_config(&self, area: Area) -> Result<Arc<ViewConfig>, MediaError>;
}

/// 从 YAML 文件加载的展示配置（启动时解析一次）
#[derive(Debug, Clone, Default)]
pub struct ViewConfigSet {
    areas: HashMap<Area, Arc<ViewConfig>>,
}

impl ViewConfigSet {
    pub fn load(path: &Path) -> Result<Self, MediaError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| MediaError::ViewConfig(format!("读取 {path:?} 失败: {e}")))?;
        let set = Self::from_yaml_str(&raw)?;
        tracing::info!(
            "展示配置加载完成: {:?}（frontend 图片视图 {} 个）",
            path,
            set.areas
                .get(&Area::Frontend)
                .map(|v| v.images.len())
                .unwrap_or(0)
        );
        Ok(set)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, MediaError> {
        let parsed: HashMap<Area, ViewConfig> = serde_yaml::from_str(raw)?;
        Ok(Self {
            areas: parsed.into_iter().map(|(k, v)| (k, Arc::new(v))).collect(),
        })
    }
}

impl PresentationConfig for ViewConfigSet {
    fn view_config(&self, area: Area) -> Result<Arc<ViewConfig>, MediaError> {
        Ok(self.areas.get(&area).cloned().unwrap_or_default())
    }
}
