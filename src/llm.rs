//! Language-model fallback chain construction.
//!
//! Builds the ordered endpoint list handed to the backend's fallback
//! adapter: the OpenRouter endpoint first (primary model plus in-provider
//! fallback models), then the local OpenAI-compatible endpoint as the last
//! resort. Failover execution, retries, and health checks all live in the
//! backend, not here.

use crate::config::{DEFAULT_LLM_MODEL, LlmConfig};
use crate::protocol::models::{LlmProvider, LlmSpec};

const LOCAL_API_KEY: &str = "no-key-needed";

#[must_use]
pub fn build_chain(config: &LlmConfig) -> Vec<LlmSpec> {
    let mut models = config.models.iter();
    let primary = models
        .next()
        .cloned()
        .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string());
    let fallback_models: Vec<String> = models.cloned().collect();

    let openrouter = LlmSpec {
        provider: LlmProvider::Openrouter,
        base_url: config.openrouter_base_url.clone(),
        model: primary,
        fallback_models,
        api_key: if config.openrouter_api_key.is_empty() {
            None
        } else {
            Some(config.openrouter_api_key.clone())
        },
    };

    let local = LlmSpec {
        provider: LlmProvider::OpenaiCompatible,
        base_url: config.local_base_url.clone(),
        model: config.local_model.clone(),
        fallback_models: Vec::new(),
        api_key: Some(LOCAL_API_KEY.to_string()),
    };

    vec![openrouter, local]
}
