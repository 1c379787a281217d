//! Prompt template records.

use serde::{Deserialize, Serialize};

/// Id of the prompt that may never be deleted.
pub const DEFAULT_PROMPT_ID: &str = "default";
/// Prompt used to review an internal answer against a job.
pub const INTERNAL_ANSWER_PROMPT_ID: &str = "internal-answer";
/// Prompt used to draft the fifth screening question.
pub const FIFTH_QUESTION_PROMPT_ID: &str = "fifth-question";

/// A stored prompt template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub id: String,
    pub name: String,
    /// Text containing `{{placeholder}}` tokens.
    pub template: String,
}

impl PromptTemplate {
    pub fn new(id: impl Into<String>, name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            template: template.into(),
        }
    }

    pub fn is_protected(&self) -> bool {
        is_protected(&self.id)
    }
}

pub fn is_protected(id: &str) -> bool {
    id == DEFAULT_PROMPT_ID
}

/// Body of `POST /prompts` and `PUT /prompts/:id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
}
