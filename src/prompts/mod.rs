//! Prompt templates: records, flat-file storage, CRUD rules and placeholder
//! rendering.

pub mod library;
pub mod seed;
pub mod store;
pub mod template;
pub mod types;

pub use library::PromptLibrary;
pub use store::{JsonFileTemplateStore, MemoryTemplateStore, TemplateStore};
pub use template::{render, Placeholder, PromptValues, NOT_PROVIDED};
pub use types::{PromptInput, PromptTemplate, DEFAULT_PROMPT_ID};
