use std::collections::HashMap;
use std::path::Path;

use crate::error::AppError;

use super::phrase::{Phrase, substitute_placeholders};

/// 基于 CSV 字典的翻译器。
///
/// 字典格式与常见的电商语言包一致：每行 `"原文","译文"`，无表头。
/// 启用行内翻译时，渲染结果带 `{{{展示}}{{译文模板}}{{原文}}{{作用域}}}` 标记，
/// 由 [`super::InlineTranslation`] 在响应输出前处理。
#[derive(Debug, Clone)]
pub struct Translator {
    locale: String,
    dictionary: HashMap<String, String>,
    inline: bool,
    scope: String,
}

impl Translator {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            dictionary: HashMap::new(),
            inline: false,
            scope: "admin".to_string(),
        }
    }

    /// 从 CSV 字典加载；文件不存在时返回空字典（仅告警）。
    pub fn load_csv(locale: impl Into<String>, path: &Path) -> Result<Self, AppError> {
        let mut translator = Self::new(locale);
        if !path.exists() {
            tracing::warn!("未找到翻译字典 {:?}，将使用原文", path);
            return Ok(translator);
        }

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(|e| AppError::Internal(format!("读取翻译字典失败: {e}")))?;

        for (line, record) in rdr.records().enumerate() {
            let record =
                record.map_err(|e| AppError::Internal(format!("翻译字典第 {} 行: {e}", line + 1)))?;
            let (Some(original), Some(translated)) = (record.get(0), record.get(1)) else {
                continue;
            };
            if original.is_empty() {
                continue;
            }
            translator
                .dictionary
                .insert(original.to_string(), translated.to_string());
        }

        tracing::info!(
            "翻译字典加载完成: locale={}, entries={}",
            translator.locale,
            translator.dictionary.len()
        );
        Ok(translator)
    }

    /// 设置是否输出行内翻译标记
    pub fn with_inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }

    /// 设置行内翻译标记中的作用域
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// 手动加入一条字典项
    pub fn insert(&mut self, original: impl Into<String>, translated: impl Into<String>) {
        self.dictionary.insert(original.into(), translated.into());
    }

    /// 按字典翻译原文模板；无对应项时返回原文。
    pub fn translate<'a>(&'a self, text: &'a str) -> &'a str {
        self.dictionary.get(text).map(String::as_str).unwrap_or(text)
    }

    /// 渲染文案：翻译 + 参数代入，不带行内翻译标记
    pub fn render_plain(&self, phrase: &Phrase) -> String {
        substitute_placeholders(self.translate(phrase.text()), phrase.args())
    }

    /// 渲染文案：翻译 + 参数代入（+ 行内翻译标记）
    pub fn render(&self, phrase: &Phrase) -> String {
        let shown = self.render_plain(phrase);
        if !self.inline {
            return shown;
        }
        let template = self.translate(phrase.text());
        format!(
            "{{{{{{{shown}}}}}{{{{{template}}}}}{{{{{original}}}}}{{{{{scope}}}}}}}",
            original = phrase.text(),
            scope = self.scope
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Translator;
    use crate::i18n::Phrase;
    use std::io::Write;

    #[test]
    fn render_uses_dictionary_and_args() {
        let mut t = Translator::new("de_DE");
        t.insert("Hello %1", "Hallo %1");
        assert_eq!(t.render(&Phrase::new("Hello %1").arg("Welt")), "Hallo Welt");
        assert_eq!(t.render(&Phrase::new("Untranslated")), "Untranslated");
    }

    #[test]
    fn inline_mode_wraps_with_markers() {
        let mut t = Translator::new("de_DE").with_inline(true).with_scope("Widget");
        t.insert("Hello %1", "Hallo %1");
        let rendered = t.render(&Phrase::new("Hello %1").arg("Welt"));
        assert_eq!(rendered, "{{{Hallo Welt}}{{Hallo %1}}{{Hello %1}}{{Widget}}}");
        assert_eq!(t.render_plain(&Phrase::new("Hello %1").arg("Welt")), "Hallo Welt");
    }

    #[test]
    fn load_csv_reads_pairs_and_skips_short_rows() {
        let mut file = tempfile::NamedTempFile::new().expect("temp csv");
        writeln!(file, "\"Hello\",\"Bonjour\"").unwrap();
        writeln!(file, "\"lonely\"").unwrap();
        writeln!(file, "\"Comma, inside\",\"Virgule, dedans\"").unwrap();

        let t = Translator::load_csv("fr_FR", file.path()).expect("load csv");
        assert_eq!(t.translate("Hello"), "Bonjour");
        assert_eq!(t.translate("Comma, inside"), "Virgule, dedans");
        assert_eq!(t.translate("lonely"), "lonely");
    }

    #[test]
    fn load_csv_missing_file_falls_back_to_source_text() {
        let t = Translator::load_csv("xx_XX", std::path::Path::new("/nonexistent/xx.csv"))
            .expect("missing file is not an error");
        assert_eq!(t.translate("Anything"), "Anything");
    }
}
