use serde::{Deserialize, Serialize};

use crate::i18n::Phrase;

pub const MISSING_INFORMATION: &str =
    "We cannot create the widget instance because it is missing required information.";
pub const INCORRECT_WIDGET: &str = "Please specify a correct widget.";

/// 组件实例（后台可配置、可放置的内容块）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct WidgetInstance {
    pub instance_id: Option<i64>,
    /// 组件类型（由组件代码解析）
    pub instance_type: Option<String>,
    pub code: Option<String>,
    pub theme_id: Option<i64>,
    pub title: Option<String>,
    #[serde(default)]
    pub store_ids: Vec<i64>,
    #[serde(default)]
    pub sort_order: i64,
    /// 组件参数（JSON 对象）
    #[serde(default = "empty_parameters")]
    #[schema(value_type = Object)]
    pub widget_parameters: serde_json::Value,
}

fn empty_parameters() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

impl WidgetInstance {
    /// 新建（未持久化）实例
    pub fn new(instance_type: Option<String>, code: Option<String>, theme_id: Option<i64>) -> Self {
        Self {
            instance_type,
            code,
            theme_id,
            widget_parameters: empty_parameters(),
            ..Self::default()
        }
    }

    /// 同时具备类型与主题才能创建
    pub fn validate(&self) -> Result<(), Phrase> {
        let has_type = self
            .instance_type
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty());
        if has_type && self.theme_id.is_some() {
            Ok(())
        } else {
            Err(Phrase::new(MISSING_INFORMATION))
        }
    }
}

/// 校验动作的 JSON 响应
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ValidateResponse {
    pub error: bool,
    /// 渲染后的消息 HTML（仅失败时存在）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_message: Option<String>,
}
