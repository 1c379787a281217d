//! Template storage backends.
//!
//! A store only loads and saves the whole collection. Every mutation is a
//! read-modify-write with no locking across the two calls, so concurrent
//! writers can lose each other's changes.

use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::seed::default_prompts;
use super::types::PromptTemplate;
use crate::utilities::errors::{RelayError, RelayResult};
use crate::utilities::file_handler::JsonFile;

/// Persistence for the prompt template collection.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn load(&self) -> RelayResult<Vec<PromptTemplate>>;
    async fn save(&self, prompts: &[PromptTemplate]) -> RelayResult<()>;
}

/// Collection stored as a pretty-printed JSON array in one file.
#[derive(Debug, Clone)]
pub struct JsonFileTemplateStore {
    file: JsonFile,
}

impl JsonFileTemplateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }
}

#[async_trait]
impl TemplateStore for JsonFileTemplateStore {
    async fn load(&self) -> RelayResult<Vec<PromptTemplate>> {
        let loaded = self.file.load::<Vec<PromptTemplate>>().await.map_err(|e| {
            RelayError::Storage(format!(
                "cannot read {}: {}",
                self.file.path().display(),
                e
            ))
        })?;

        match loaded {
            Some(prompts) => Ok(prompts),
            None => {
                let prompts = default_prompts();
                tracing::info!(
                    path = %self.file.path().display(),
                    count = prompts.len(),
                    "Seeding prompt file"
                );
                if let Err(e) = self.file.save(&prompts).await {
                    tracing::warn!(
                        path = %self.file.path().display(),
                        "Failed to write seeded prompt file: {}",
                        e
                    );
                }
                Ok(prompts)
            }
        }
    }

    async fn save(&self, prompts: &[PromptTemplate]) -> RelayResult<()> {
        self.file.save(prompts).await.map_err(|e| {
            RelayError::Storage(format!(
                "cannot write {}: {}",
                self.file.path().display(),
                e
            ))
        })
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryTemplateStore {
    prompts: Mutex<Vec<PromptTemplate>>,
}

impl MemoryTemplateStore {
    pub fn new(prompts: Vec<PromptTemplate>) -> Self {
        Self {
            prompts: Mutex::new(prompts),
        }
    }

    /// Store pre-filled with the default prompts.
    pub fn seeded() -> Self {
        Self::new(default_prompts())
    }
}

#[async_trait]
impl TemplateStore for MemoryTemplateStore {
    async fn load(&self) -> RelayResult<Vec<PromptTemplate>> {
        Ok(self.prompts.lock().clone())
    }

    async fn save(&self, prompts: &[PromptTemplate]) -> RelayResult<()> {
        *self.prompts.lock() = prompts.to_vec();
        Ok(())
    }
}
