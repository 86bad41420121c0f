use crate::ai::client::CompletionBackend;
use crate::ai::extract::{self, DesignResult};
use crate::ai::prompts;
use crate::error::Result;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

pub const UNAVAILABLE_MESSAGE: &str = "Could not connect to Ollama. Make sure it's running.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ModelAvailability {
    Available { available_models: Vec<String> },
    Unavailable { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Health {
    pub message: &'static str,
    pub status: &'static str,
}

/// Runs the design and review flows against a completion backend.
#[derive(Clone)]
pub struct Architect {
    backend: Arc<dyn CompletionBackend>,
}

impl Architect {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    pub async fn design(&self, description: &str, dialect: &str) -> Result<DesignResult> {
        let request_id = Uuid::new_v4();
        log::info!("[{request_id}] Designing {dialect} schema");

        let prompt = prompts::design_prompt(description, dialect);
        let completion = self.backend.generate(&prompt).await.inspect_err(|e| {
            log::error!("[{request_id}] Backend call failed: {e}");
        })?;

        let result = extract::extract_design(&completion).inspect_err(|e| {
            log::error!("[{request_id}] {e}");
        })?;

        if result.is_degraded(&completion) {
            log::warn!("[{request_id}] Returning degraded design");
        } else {
            log::info!("[{request_id}] Design extracted");
        }
        Ok(result)
    }

    /// Reviews an existing design. The completion is returned untouched.
    pub async fn validate(&self, design: &str, requirements: &str) -> Result<String> {
        log::info!("Reviewing design against requirements");
        let prompt = prompts::validation_prompt(design, requirements);
        self.backend.generate(&prompt).await.inspect_err(|e| {
            log::error!("Review call failed: {e}");
        })
    }

    pub async fn list_models(&self) -> ModelAvailability {
        match self.backend.list_models().await {
            Ok(available_models) => ModelAvailability::Available { available_models },
            Err(e) => {
                log::warn!("Model listing unavailable: {e}");
                ModelAvailability::Unavailable {
                    error: UNAVAILABLE_MESSAGE.to_string(),
                }
            }
        }
    }

    pub fn health() -> Health {
        Health {
            message: "Database Design AI Agent is running!",
            status: "healthy",
        }
    }
}
