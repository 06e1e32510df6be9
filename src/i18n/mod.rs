//! 文案翻译：可翻译文案、CSV 字典翻译器与响应体行内翻译处理。

mod inline;
mod phrase;
mod translator;

pub use inline::InlineTranslation;
pub use phrase::Phrase;
pub use translator::Translator;
