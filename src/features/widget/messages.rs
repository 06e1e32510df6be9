use std::sync::OnceLock;

use minijinja::{AutoEscape, Environment};
use serde::Serialize;

use crate::error::AppError;
use crate::i18n::{Phrase, Translator};

const GROUPED_TEMPLATE_NAME: &str = "messages/grouped.html.jinja";
const GROUPED_TEMPLATE: &str =
    include_str!("../../../resources/templates/messages/grouped.html.jinja");

static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

fn get_template_env() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(|| {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        if let Err(e) = env.add_template(GROUPED_TEMPLATE_NAME, GROUPED_TEMPLATE) {
            tracing::error!("消息模板编译失败: {}", e);
        }
        env
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Error,
    Warning,
    Notice,
    Success,
}

impl MessageType {
    /// 分组输出顺序
    pub const ORDERED: [MessageType; 4] = [
        MessageType::Error,
        MessageType::Warning,
        MessageType::Notice,
        MessageType::Success,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::Error => "error",
            MessageType::Warning => "warning",
            MessageType::Notice => "notice",
            MessageType::Success => "success",
        }
    }
}

/// 请求级消息集合
#[derive(Debug, Clone, Default)]
pub struct MessageCollection {
    items: Vec<(MessageType, Phrase)>,
}

impl MessageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: MessageType, message: impl Into<Phrase>) {
        self.items.push((kind, message.into()));
    }

    pub fn add_error(&mut self, message: impl Into<Phrase>) {
        self.add(MessageType::Error, message);
    }

    pub fn add_success(&mut self, message: impl Into<Phrase>) {
        self.add(MessageType::Success, message);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn by_type(&self, kind: MessageType) -> impl Iterator<Item = &Phrase> {
        self.items
            .iter()
            .filter(move |(k, _)| *k == kind)
            .map(|(_, p)| p)
    }
}

#[derive(Serialize)]
struct MessageGroup {
    kind: &'static str,
    messages: Vec<String>,
}

#[derive(Serialize)]
struct GroupedContext {
    groups: Vec<MessageGroup>,
}

/// 消息块渲染
pub struct MessagesBlock<'a> {
    translator: &'a Translator,
}

impl<'a> MessagesBlock<'a> {
    pub fn new(translator: &'a Translator) -> Self {
        Self { translator }
    }

    /// 按类型分组渲染 HTML；空集合返回空字符串
    pub fn grouped_html(&self, messages: &MessageCollection) -> Result<String, AppError> {
        if messages.is_empty() {
            return Ok(String::new());
        }
        let groups = MessageType::ORDERED
            .iter()
            .map(|&kind| MessageGroup {
                kind: kind.as_str(),
                messages: messages
                    .by_type(kind)
                    .map(|p| self.translator.render(p))
                    .collect(),
            })
            .filter(|g| !g.messages.is_empty())
            .collect();

        let tpl = get_template_env()
            .get_template(GROUPED_TEMPLATE_NAME)
            .map_err(|e| AppError::Internal(format!("加载消息模板失败: {e}")))?;
        tpl.render(GroupedContext { groups })
            .map_err(|e| AppError::Internal(format!("渲染消息模板失败: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_collection_renders_nothing() {
        let t = Translator::new("en_US");
        let html = MessagesBlock::new(&t)
            .grouped_html(&MessageCollection::new())
            .unwrap();
        assert_eq!(html, "");
    }

    #[test]
    fn single_error_has_expected_markup() {
        let t = Translator::new("en_US");
        let mut messages = MessageCollection::new();
        messages.add_error("Please specify a correct widget.");
        let html = MessagesBlock::new(&t).grouped_html(&messages).unwrap();
        assert_eq!(
            html,
            "<div class=\"messages\"><div class=\"message message-error error\">\
             <div data-ui-id=\"messages-message-error\">Please specify a correct widget.</div>\
             </div></div>"
        );
    }

    #[test]
    fn groups_follow_severity_order_and_escape_text() {
        let t = Translator::new("en_US");
        let mut messages = MessageCollection::new();
        messages.add_success("Saved");
        messages.add(MessageType::Notice, "Note");
        messages.add_error("<b>bad</b>");
        let html = MessagesBlock::new(&t).grouped_html(&messages).unwrap();

        let err = html.find("message-error").unwrap();
        let notice = html.find("message-notice").unwrap();
        let success = html.find("message-success").unwrap();
        assert!(err < notice && notice < success);
        assert!(html.contains("&lt;b&gt;bad"));
        assert!(!html.contains("<b>"));
        assert!(!html.contains("message-warning"));
    }

    #[test]
    fn inline_marker_keeps_dictionary_text_after_escaping() {
        use crate::i18n::InlineTranslation;

        let mut t = Translator::new("en_US").with_inline(true);
        t.insert("Can't save.", "Can't save.");
        let mut messages = MessageCollection::new();
        messages.add_error("Can't save.");
        let html = MessagesBlock::new(&t).grouped_html(&messages).unwrap();
        let out = InlineTranslation::new(true).process_text(&html);

        assert!(out.contains("&quot;original&quot;:&quot;Can&#x27;t save.&quot;"));
        assert!(out.contains("&quot;translated&quot;:&quot;Can&#x27;t save.&quot;"));
        assert!(!out.contains("&amp;#x27;"));
        assert!(!out.contains("{{{"));
    }
}
