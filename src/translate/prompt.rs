use crate::llm::ChatMessage;

const INPUT_LANGUAGE_SLOT: &str = "{input_language}";
const OUTPUT_LANGUAGE_SLOT: &str = "{output_language}";

/// System instruction with language slots, followed by the user's text verbatim.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    system: String,
}

impl PromptTemplate {
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
        }
    }

    /// Always two messages: system, then human.
    pub fn render(&self, input_language: &str, output_language: &str, text: &str) -> Vec<ChatMessage> {
        let system = self
            .system
            .replace(INPUT_LANGUAGE_SLOT, input_language)
            .replace(OUTPUT_LANGUAGE_SLOT, output_language);

        vec![ChatMessage::system(system), ChatMessage::human(text)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SYSTEM_PROMPT;
    use crate::llm::Role;

    #[test]
    fn renders_system_then_human() {
        let messages = PromptTemplate::new(DEFAULT_SYSTEM_PROMPT).render(
            "English",
            "Malay",
            "I like programming.",
        );

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(
            messages[0].content,
            "You are a helpful assistant that translates English to Malay."
        );
        assert_eq!(messages[1].role, Role::Human);
        assert_eq!(messages[1].content, "I like programming.");
    }

    #[test]
    fn human_text_is_not_touched() {
        let text = "  {input_language} stays literal\n";
        let messages = PromptTemplate::new(DEFAULT_SYSTEM_PROMPT).render("French", "German", text);
        assert_eq!(messages[1].content, text);
    }

    #[test]
    fn slots_may_repeat() {
        let messages = PromptTemplate::new("{output_language} only. Source: {input_language}. Reply in {output_language}.")
            .render("Japanese", "Korean", "x");
        assert_eq!(messages[0].content, "Korean only. Source: Japanese. Reply in Korean.");
    }
}
