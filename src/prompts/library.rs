//! CRUD over the prompt template collection.

use std::sync::Arc;

use super::store::TemplateStore;
use super::template::placeholders_in;
use super::types::{is_protected, PromptInput, PromptTemplate};
use crate::utilities::errors::{RelayError, RelayResult};
use crate::utilities::string_utils::{non_blank, slugify};

/// Validation and id rules on top of a [`TemplateStore`].
#[derive(Clone)]
pub struct PromptLibrary {
    store: Arc<dyn TemplateStore>,
}

impl PromptLibrary {
    pub fn new(store: Arc<dyn TemplateStore>) -> Self {
        Self { store }
    }

    /// All prompts. A store that cannot be read yields an empty list.
    pub async fn list(&self) -> Vec<PromptTemplate> {
        match self.store.load().await {
            Ok(prompts) => prompts,
            Err(e) => {
                tracing::warn!("Failed to load prompts, serving empty list: {}", e);
                Vec::new()
            }
        }
    }

    /// A single prompt by id.
    pub async fn get(&self, id: &str) -> RelayResult<PromptTemplate> {
        self.store
            .load()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| RelayError::NotFound(format!("Prompt '{}' not found", id)))
    }

    pub async fn create(&self, input: PromptInput) -> RelayResult<PromptTemplate> {
        let (name, template) = validate(&input)?;
        let mut prompts = self.store.load().await?;

        let id = generate_id(&name, chrono::Utc::now().timestamp_millis(), &prompts);
        let prompt = PromptTemplate::new(id, name, template);
        prompts.push(prompt.clone());
        self.store.save(&prompts).await?;

        tracing::info!(
            id = %prompt.id,
            placeholders = ?placeholders_in(&prompt.template),
            "Prompt created"
        );
        Ok(prompt)
    }

    pub async fn update(&self, id: &str, input: PromptInput) -> RelayResult<PromptTemplate> {
        let (name, template) = validate(&input)?;
        let mut prompts = self.store.load().await?;

        let existing = prompts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| RelayError::NotFound(format!("Prompt '{}' not found", id)))?;
        existing.name = name;
        existing.template = template;
        let updated = existing.clone();
        self.store.save(&prompts).await?;

        tracing::info!(
            id,
            placeholders = ?placeholders_in(&updated.template),
            "Prompt updated"
        );
        Ok(updated)
    }

    /// Remove one prompt and return it.
    pub async fn delete(&self, id: &str) -> RelayResult<PromptTemplate> {
        if is_protected(id) {
            return Err(RelayError::ProtectedPrompt(id.to_string()));
        }
        let mut prompts = self.store.load().await?;

        let index = prompts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| RelayError::NotFound(format!("Prompt '{}' not found", id)))?;
        let removed = prompts.remove(index);
        self.store.save(&prompts).await?;

        tracing::info!(id, "Prompt deleted");
        Ok(removed)
    }
}

fn validate(input: &PromptInput) -> RelayResult<(String, String)> {
    let name = non_blank(input.name.as_deref());
    let template = non_blank(input.template.as_deref());
    match (name, template) {
        (Some(name), Some(_)) => Ok((
            name.to_string(),
            // Only the name is trimmed; template whitespace is content.
            input.template.clone().unwrap_or_default(),
        )),
        _ => Err(RelayError::BadRequest(
            "Name and template are required".to_string(),
        )),
    }
}

/// `slug(name)-millis`, with a numeric suffix if that id is taken.
fn generate_id(name: &str, millis: i64, existing: &[PromptTemplate]) -> String {
    let base = format!("{}-{}", slugify(name, None), millis);
    let taken = |candidate: &str| existing.iter().any(|p| p.id == candidate);
    if !taken(base.as_str()) {
        return base;
    }
    (2..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken(candidate.as_str()))
        .unwrap_or(base)
}
