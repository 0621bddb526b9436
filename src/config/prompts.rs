//! Prompt templates for Codee.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub rag: RagPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for the conversational chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    /// Curriculum-scope policy, rendered with `{{context}}` and `{{question}}`.
    pub system: String,
    /// Rewrites a follow-up into a standalone question.
    pub condense: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a tutor for a high school Computer Science Principles course.
You are given the following extracted parts of a long document and a question. Provide a conversational answer.
If you don't know the answer, just say that you don't know, don't try to make up an answer.
All answers must be understandable for a high school student.
All answers should be succinct and less than 1000 words.
Encourage the learner to reflect on their personal experience by using follow-up questions.
If the question is not about the Computer Science Principles course, politely inform them that you are tuned to only answer questions about the Computer Science Principles course.
Only present follow-up questions if the question are related to the Computer Science Principles course.
Do not provide follow-up questions for topics not related to to the Computer Science Principles course.

Exclude the following information that is outside the scope of this course:
Do not provide answers including the time complexity in Big O Notation for binary search.
Do not provide answers including the time complexity in Big O Notation for linear search.
Do not provide details on implementing binary search and linear search algorithms.
Specific range limitations for real numbers.
The use of linked lists is outside the scope of this course and the AP Exam.
Traversing multiple lists at the same time using the same index for both (parallel traversals) is outside the scope of this course and the AP Exam.
Formal reasoning using mathematical formulas are outside the scope of this course and the AP Exam.
Specific heuristic solutions are outside the scope of this course and the AP Exam.
Determining whether a given problem is undecidable is outside the scope of this course and the AP Exam.
Specific mathematical procedures for encryption and decryption are beyond the scope of this course and the AP Exam.

{{context}}
Question: {{question}}
Helpful Answer:"#
                .to_string(),

            condense: r#"Given the following conversation and a follow up question, rephrase the follow up question to be a standalone question, in its original language.

Chat History:
{{chat_history}}
Follow Up Input: {{question}}
Standalone question:"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are filled in one pass over the template; substituted
    /// values are never scanned again. Unknown placeholders are left as is.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
        let placeholder = PLACEHOLDER
            .get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").expect("placeholder regex is valid"));

        placeholder
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.rag.system.contains("{{context}}"));
        assert!(prompts.rag.system.contains("{{question}}"));
        assert!(prompts.rag.system.contains("linked lists"));
        assert!(prompts.rag.condense.contains("{{chat_history}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_render_does_not_expand_substituted_values() {
        let template = "Context:\n{{context}}\nQuestion: {{question}}\nKeep {{unknown}}";
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), "SECRET PASSAGE {{question}}".to_string());
        vars.insert("question".to_string(), "what is {{context}}?".to_string());

        for _ in 0..20 {
            let result = Prompts::render(template, &vars);
            assert_eq!(
                result,
                "Context:\nSECRET PASSAGE {{question}}\nQuestion: what is {{context}}?\nKeep {{unknown}}"
            );
        }
    }

    #[test]
    fn test_provided_vars_override_custom() {
        let mut prompts = Prompts::default();
        prompts
            .variables
            .insert("course".to_string(), "CSP".to_string());
        prompts
            .variables
            .insert("question".to_string(), "ignored".to_string());

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "What is a bit?".to_string());

        let out = prompts.render_with_custom("{{course}}: {{question}}", &vars);
        assert_eq!(out, "CSP: What is a bit?");
    }

    #[test]
    fn test_custom_dir_overrides_rag_prompts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("rag.toml"),
            "system = \"Only talk about binary. {{context}} {{question}}\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert!(prompts.rag.system.starts_with("Only talk about binary."));
        // Fields missing from the file keep their defaults
        assert!(prompts.rag.condense.contains("Standalone question"));
    }
}
