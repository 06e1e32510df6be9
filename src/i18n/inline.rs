use minijinja::HtmlEscape;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::Value;

/// 行内翻译标记：`{{{展示}}{{译文模板}}{{原文}}{{作用域}}}`
static MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\{\{\{(.*?)\}\}\{\{(.*?)\}\}\{\{(.*?)\}\}\{\{(.*?)\}\}\}")
        .expect("inline translation marker regex")
});

#[derive(Serialize)]
struct TranslateData {
    shown: String,
    translated: String,
    original: String,
    location: &'static str,
    scope: String,
}

/// 还原模板 HTML 转义产生的实体，使 `data-translate` 中的原文与字典键一致。
/// `&amp;` 最后处理，避免 `&amp;lt;` 被解成 `<`。
fn unescape_html(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&#x2f;", "/")
        .replace("&#x2F;", "/")
        .replace("&amp;", "&")
}

/// 响应输出前的行内翻译处理。
///
/// - 未启用：标记替换为展示文本（去标记）；
/// - 启用：标记替换为带 `data-translate` 属性的 `<span>`，供前端行内编辑。
///
/// JSON 响应体会被解析后逐个字符串值处理，保证输出仍为合法 JSON。
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineTranslation {
    enabled: bool,
}

impl InlineTranslation {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// 原地处理响应体
    pub fn process_response_body(&self, body: &mut String) {
        if !body.contains("{{{") {
            return;
        }
        match serde_json::from_str::<Value>(body) {
            Ok(mut json) => {
                self.process_json(&mut json);
                *body = json.to_string();
            }
            Err(_) => {
                *body = self.process_text(body);
            }
        }
    }

    fn process_json(&self, value: &mut Value) {
        match value {
            Value::String(s) => {
                if s.contains("{{{") {
                    *s = self.process_text(s);
                }
            }
            Value::Array(items) => items.iter_mut().for_each(|v| self.process_json(v)),
            Value::Object(map) => map.values_mut().for_each(|v| self.process_json(v)),
            _ => {}
        }
    }

    /// 处理一段文本中的全部标记
    pub fn process_text(&self, text: &str) -> String {
        MARKER
            .replace_all(text, |caps: &Captures<'_>| {
                let shown = &caps[1];
                if !self.enabled {
                    return shown.to_string();
                }
                let data = [TranslateData {
                    shown: unescape_html(shown),
                    translated: unescape_html(&caps[2]),
                    original: unescape_html(&caps[3]),
                    location: "Text",
                    scope: unescape_html(&caps[4]),
                }];
                let attr = serde_json::to_string(&data).unwrap_or_else(|_| "[]".to_string());
                format!(
                    "<span data-translate=\"{}\">{}</span>",
                    HtmlEscape(&attr),
                    shown
                )
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::{InlineTranslation, unescape_html};

    const MARKED: &str = "{{{Hallo}}{{Hallo}}{{Hello}}{{admin}}}";

    #[test]
    fn disabled_strips_markers_to_shown_text() {
        let it = InlineTranslation::new(false);
        assert_eq!(it.process_text(&format!("<b>{MARKED}</b>")), "<b>Hallo</b>");
    }

    #[test]
    fn enabled_wraps_in_translate_span() {
        let it = InlineTranslation::new(true);
        let out = it.process_text(MARKED);
        assert!(out.starts_with("<span data-translate=\""));
        assert!(out.ends_with(">Hallo</span>"));
        assert!(out.contains("&quot;original&quot;:&quot;Hello&quot;"));
        assert!(!out.contains("{{{"));
    }

    #[test]
    fn escaped_apostrophe_is_encoded_once_in_attribute() {
        let it = InlineTranslation::new(true);
        let out = it.process_text("{{{Can&#x27;t}}{{Can&#x27;t}}{{Can&#x27;t}}{{admin}}}");
        assert!(out.contains("&quot;original&quot;:&quot;Can&#x27;t&quot;"));
        assert!(!out.contains("&amp;#x27;"));
        assert!(out.ends_with(">Can&#x27;t</span>"));
    }

    #[test]
    fn entities_decode_to_dictionary_text() {
        assert_eq!(unescape_html("Can&#x27;t"), "Can't");
        assert_eq!(unescape_html("&lt;b&gt; &quot;a&quot; &amp; b&#x2f;c"), "<b> \"a\" & b/c");
        assert_eq!(unescape_html("&amp;lt;"), "&lt;");
        assert_eq!(unescape_html("plain"), "plain");
    }

    #[test]
    fn json_body_stays_valid_after_processing() {
        let it = InlineTranslation::new(true);
        let mut body = serde_json::json!({
            "error": true,
            "html_message": format!("<div>{MARKED}</div>"),
        })
        .to_string();
        it.process_response_body(&mut body);
        let parsed: serde_json::Value = serde_json::from_str(&body).expect("valid json");
        let html = parsed["html_message"].as_str().unwrap();
        assert!(html.contains("data-translate"));
        assert_eq!(parsed["error"], serde_json::json!(true));
    }

    #[test]
    fn body_without_markers_is_untouched() {
        let it = InlineTranslation::new(false);
        let mut body = r#"{"error":false}"#.to_string();
        it.process_response_body(&mut body);
        assert_eq!(body, r#"{"error":false}"#);
    }
}
