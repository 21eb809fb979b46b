pub mod interface;
pub mod prompt;
pub mod translator;

pub use interface::*;
pub use prompt::PromptTemplate;
pub use translator::{TranslateError, Translator, SMOKE_TEST_TEXT};
