use std::fmt;

/// 可翻译文案：原文 + 位置参数（`%1`、`%2`...）。
///
/// 渲染时先按字典翻译原文模板，再代入参数；未经翻译器渲染时（`Display`）直接代入原文。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
    text: String,
    args: Vec<String>,
}

impl Phrase {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            args: Vec::new(),
        }
    }

    /// 追加一个位置参数
    pub fn arg(mut self, value: impl ToString) -> Self {
        self.args.push(value.to_string());
        self
    }

    /// 原文模板（字典查找键）
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&substitute_placeholders(&self.text, &self.args))
    }
}

impl From<&str> for Phrase {
    fn from(value: &str) -> Self {
        Phrase::new(value)
    }
}

impl From<String> for Phrase {
    fn from(value: String) -> Self {
        Phrase::new(value)
    }
}

/// 将 `%1`..`%n` 替换为参数；从大序号开始替换，避免 `%1` 吃掉 `%10` 的前缀。
pub(crate) fn substitute_placeholders(template: &str, args: &[String]) -> String {
    let mut out = template.to_string();
    for (idx, value) in args.iter().enumerate().rev() {
        out = out.replace(&format!("%{}", idx + 1), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::Phrase;

    #[test]
    fn display_substitutes_positional_args() {
        let p = Phrase::new("Widget %1 is missing %2.").arg("cms_link").arg("a theme");
        assert_eq!(p.to_string(), "Widget cms_link is missing a theme.");
    }

    #[test]
    fn double_digit_placeholders_are_not_clobbered() {
        let mut p = Phrase::new("%1-%10");
        for i in 1..=10 {
            p = p.arg(format!("v{i}"));
        }
        assert_eq!(p.to_string(), "v1-v10");
    }
}
