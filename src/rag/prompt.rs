//! Prompt assembly.

use super::memory::{ChatTurn, MemoryWindow};
use super::retriever::format_context_for_prompt;
use super::ContextChunk;
use crate::config::Prompts;
use std::collections::HashMap;

/// A fully built model input: system message, prior turns, then the question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    pub system: String,
    /// Prior turns, oldest first.
    pub history: Vec<ChatTurn>,
    /// The final user message, if any.
    pub question: Option<String>,
}

impl AssembledPrompt {
    /// Number of messages sent to the model.
    pub fn message_count(&self) -> usize {
        1 + self.history.len() + usize::from(self.question.is_some())
    }
}

/// Renders the tutor's instruction templates into model inputs.
#[derive(Debug, Clone, Default)]
pub struct PromptAssembler {
    prompts: Prompts,
}

impl PromptAssembler {
    pub fn new(prompts: Prompts) -> Self {
        Self { prompts }
    }

    /// Build the answering prompt for `question` grounded in `context`.
    pub fn build(
        &self,
        question: &str,
        context: &[ContextChunk],
        memory: &MemoryWindow,
    ) -> AssembledPrompt {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), format_context_for_prompt(context));
        vars.insert("question".to_string(), question.to_string());

        AssembledPrompt {
            system: self.prompts.render_with_custom(&self.prompts.rag.system, &vars),
            history: memory.turns(),
            question: Some(question.to_string()),
        }
    }

    /// Build the prompt that rewrites a follow-up into a standalone question.
    pub fn build_condense(&self, question: &str, memory: &MemoryWindow) -> AssembledPrompt {
        let mut vars = HashMap::new();
        vars.insert("chat_history".to_string(), memory.as_transcript());
        vars.insert("question".to_string(), question.to_string());

        AssembledPrompt {
            system: self.prompts.render_with_custom(&self.prompts.rag.condense, &vars),
            history: Vec::new(),
            question: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::memory::Exchange;
    use crate::source::SourceKind;

    fn passage(content: &str) -> ContextChunk {
        ContextChunk {
            source_id: "unit1.pptx".to_string(),
            title: "Unit 1".to_string(),
            kind: SourceKind::Slide,
            content: content.to_string(),
            score: 0.9,
            url: None,
        }
    }

    #[test]
    fn test_build_orders_system_history_question() {
        let mut memory = MemoryWindow::new(5);
        memory.push(Exchange::new("What is a bit?", "A binary digit."));

        let prompt = PromptAssembler::default().build(
            "What is a byte?",
            &[passage("A byte is eight bits.")],
            &memory,
        );

        assert!(prompt.system.starts_with("You are a tutor for a high school Computer Science Principles course."));
        assert!(prompt
            .system
            .ends_with("A byte is eight bits.\nQuestion: What is a byte?\nHelpful Answer:"));
        assert!(!prompt.system.contains("{{"));
        assert_eq!(
            prompt.history,
            vec![
                ChatTurn::user("What is a bit?"),
                ChatTurn::assistant("A binary digit.")
            ]
        );
        assert_eq!(prompt.question.as_deref(), Some("What is a byte?"));
        assert_eq!(prompt.message_count(), 4);
    }

    #[test]
    fn test_custom_variables_fill_templates() {
        let mut prompts = Prompts::default();
        prompts.rag.system = "{{course}}: {{context}} / {{question}}".to_string();
        prompts
            .variables
            .insert("course".to_string(), "CSP".to_string());

        let prompt = PromptAssembler::new(prompts).build(
            "q",
            &[passage("c")],
            &MemoryWindow::new(5),
        );
        assert_eq!(prompt.system, "CSP: c / q");
        assert!(prompt.history.is_empty());
    }

    #[test]
    fn test_question_text_is_not_treated_as_a_placeholder() {
        for _ in 0..20 {
            let prompt = PromptAssembler::default().build(
                "what is {{context}}?",
                &[passage("SECRET PASSAGE")],
                &MemoryWindow::new(5),
            );
            assert!(prompt
                .system
                .ends_with("SECRET PASSAGE\nQuestion: what is {{context}}?\nHelpful Answer:"));
        }
    }

    #[test]
    fn test_condense_prompt_carries_history() {
        let mut memory = MemoryWindow::new(5);
        memory.push(Exchange::new("What is a list?", "An ordered collection."));

        let prompt = PromptAssembler::default().build_condense("How do I sort it?", &memory);
        assert!(prompt
            .system
            .contains("Human: What is a list?\nAssistant: An ordered collection."));
        assert!(prompt.system.contains("Follow Up Input: How do I sort it?"));
        assert!(prompt.question.is_none());
        assert_eq!(prompt.message_count(), 1);
    }
}
