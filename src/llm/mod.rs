pub mod completion_interface;
pub mod gemini_llm;
pub mod openai_compatible_llm;
pub mod llm_factory;

pub use completion_interface::*;
pub use llm_factory::LLMFactory;
