use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// 可用组件定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct WidgetDefinition {
    /// 组件代码（例如 cms_page_link）
    pub code: String,
    /// 组件类型（块类名）
    #[serde(rename = "type")]
    pub widget_type: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Deserialize)]
struct WidgetsFile {
    #[serde(default)]
    widgets: Vec<WidgetDefinition>,
}

/// 组件目录：代码 → 定义
#[derive(Debug, Clone, Default)]
pub struct WidgetCatalog {
    by_code: HashMap<String, WidgetDefinition>,
}

impl WidgetCatalog {
    pub fn new(definitions: impl IntoIterator<Item = WidgetDefinition>) -> Self {
        Self {
            by_code: definitions
                .into_iter()
                .map(|d| (d.code.clone(), d))
                .collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::Internal(format!("读取组件目录 {path:?} 失败: {e}")))?;
        let catalog = Self::from_yaml_str(&raw)?;
        if catalog.is_empty() {
            tracing::warn!("组件目录为空: {:?}，所有组件代码都会被视为无效", path);
        } else {
            tracing::info!("组件目录加载完成: {:?}（{} 个组件）", path, catalog.len());
        }
        Ok(catalog)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, AppError> {
        let file: WidgetsFile = serde_yaml::from_str(raw)
            .map_err(|e| AppError::Internal(format!("解析组件目录失败: {e}")))?;
        Ok(Self::new(file.widgets))
    }

    /// 由组件代码查找类型；未知代码返回 None
    pub fn type_of(&self, code: &str) -> Option<&str> {
        self.by_code.get(code).map(|d| d.widget_type.as_str())
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::WidgetCatalog;

    #[test]
    fn type_of_resolves_known_codes_only() {
        let catalog = WidgetCatalog::from_yaml_str(
            r#"
widgets:
  - code: cms_page_link
    type: Cms\Block\Widget\Page\Link
    name: CMS Page Link
  - code: catalog_product_link
    type: Catalog\Block\Product\Widget\Link
"#,
        )
        .expect("parse");
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.type_of("cms_page_link"),
            Some(r"Cms\Block\Widget\Page\Link")
        );
        assert_eq!(catalog.type_of("nope"), None);
        assert_eq!(
            catalog.type_of("catalog_product_link"),
            Some(r"Catalog\Block\Product\Widget\Link")
        );
    }
}
