//! Provider and model resolution from environment variables.
//!
//! Every variable has a documented default so the agent starts in a stock
//! docker-compose deployment with no env file at all. Resolution is pure:
//! tests feed [`AgentConfig::from_lookup`] a closure instead of mutating
//! process environment.

use crate::protocol::models::{SttSpec, TtsSpec};
use std::fmt;

pub const DEFAULT_LLM_MODEL: &str = "meta-llama/llama-3.3-70b-instruct:free";
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_LOCAL_LLM_BASE_URL: &str = "http://llama_cpp:11434/v1";
pub const DEFAULT_LOCAL_LLM_MODEL: &str = "qwen3-4b";
pub const DEFAULT_STT_PROVIDER: &str = "deepgram";
pub const DEFAULT_STT_MODEL: &str = "nova-3";
pub const DEFAULT_STT_LANGUAGE: &str = "en";
pub const DEFAULT_STT_BASE_URL: &str = "https://api.deepgram.com";
pub const DEFAULT_TTS_BASE_URL: &str = "http://kokoro:8880/v1";
pub const DEFAULT_TTS_MODEL: &str = "kokoro";
pub const DEFAULT_TTS_VOICE: &str = "af_nova";
pub const DEFAULT_TTS_API_KEY: &str = "no-key-needed";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:7880";

#[derive(Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub url: String,
    pub api_key: String,
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url)
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct SttConfig {
    pub provider: String,
    pub model: String,
    pub language: String,
    pub base_url: String,
    pub api_key: String,
}

impl SttConfig {
    #[must_use]
    pub fn to_spec(&self) -> SttSpec {
        SttSpec {
            provider: self.provider.clone(),
            model: self.model.clone(),
            language: self.language.clone(),
            base_url: self.base_url.clone(),
            api_key: non_empty(&self.api_key),
        }
    }
}

impl fmt::Debug for SttConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SttConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("language", &self.language)
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

/// Language-model chain: OpenRouter models in priority order, plus the local
/// OpenAI-compatible endpoint used as the last resort.
#[derive(Clone, PartialEq, Eq)]
pub struct LlmConfig {
    /// Primary model first, in-provider fallbacks after. Never empty.
    pub models: Vec<String>,
    pub openrouter_base_url: String,
    pub openrouter_api_key: String,
    pub local_base_url: String,
    pub local_model: String,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("models", &self.models)
            .field("openrouter_base_url", &self.openrouter_base_url)
            .field("openrouter_api_key", &redact(&self.openrouter_api_key))
            .field("local_base_url", &self.local_base_url)
            .field("local_model", &self.local_model)
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct TtsConfig {
    pub base_url: String,
    pub model: String,
    pub voice: String,
    pub api_key: String,
}

impl TtsConfig {
    #[must_use]
    pub fn to_spec(&self) -> TtsSpec {
        TtsSpec {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            voice: self.voice.clone(),
            api_key: non_empty(&self.api_key),
        }
    }
}

impl fmt::Debug for TtsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtsConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("voice", &self.voice)
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub backend: BackendConfig,
    pub stt: SttConfig,
    pub llm: LlmConfig,
    pub tts: TtsConfig,
}

impl AgentConfig {
    /// Resolve the full configuration from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Self {
            backend: BackendConfig {
                url: var("AGENT_BACKEND_URL", DEFAULT_BACKEND_URL),
                api_key: var("AGENT_BACKEND_API_KEY", ""),
            },
            stt: SttConfig {
                provider: var("STT_PROVIDER", DEFAULT_STT_PROVIDER),
                model: var("DEEPGRAM_STT_MODEL", DEFAULT_STT_MODEL),
                language: var("DEEPGRAM_LANGUAGE", DEFAULT_STT_LANGUAGE),
                base_url: var("DEEPGRAM_BASE_URL", DEFAULT_STT_BASE_URL),
                api_key: var("DEEPGRAM_API_KEY", ""),
            },
            llm: LlmConfig {
                models: parse_chain(&var("LLM_MODEL", DEFAULT_LLM_MODEL)),
                openrouter_base_url: var("OPENROUTER_BASE_URL", DEFAULT_OPENROUTER_BASE_URL),
                openrouter_api_key: var("OPENROUTER_API_KEY", ""),
                local_base_url: var("LOCAL_LLM_BASE_URL", DEFAULT_LOCAL_LLM_BASE_URL),
                local_model: var("LOCAL_LLM_MODEL", DEFAULT_LOCAL_LLM_MODEL),
            },
            tts: TtsConfig {
                base_url: var("TTS_BASE_URL", DEFAULT_TTS_BASE_URL),
                model: var("TTS_MODEL", DEFAULT_TTS_MODEL),
                voice: var("TTS_VOICE", DEFAULT_TTS_VOICE),
                api_key: var("TTS_API_KEY", DEFAULT_TTS_API_KEY),
            },
        }
    }
}

/// Parse a comma-separated model chain, trimming whitespace and dropping
/// empty segments. Falls back to the default model if nothing is left.
fn parse_chain(raw: &str) -> Vec<String> {
    let models: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect();
    if models.is_empty() {
        vec![DEFAULT_LLM_MODEL.to_string()]
    } else {
        models
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() { "<unset>" } else { "[REDACTED]" }
}
