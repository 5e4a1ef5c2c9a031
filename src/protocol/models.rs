use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline component that originated a session event. Used for logging only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Stt,
    Llm,
    Tts,
    Vad,
    TurnDetection,
    Session,
    #[serde(other)]
    #[default]
    Unknown,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stt => "stt",
            Self::Llm => "llm",
            Self::Tts => "tts",
            Self::Vad => "vad",
            Self::TurnDetection => "turn_detection",
            Self::Session => "session",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Error payload carried by a `session.error` event.
///
/// A payload that omits `recoverable` is treated as recoverable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionErrorInfo {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default = "default_true")]
    pub recoverable: bool,
}

const fn default_true() -> bool {
    true
}

impl SessionErrorInfo {
    #[must_use]
    pub fn recoverable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            recoverable: true,
        }
    }

    #[must_use]
    pub fn terminal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            recoverable: false,
        }
    }
}

impl fmt::Display for SessionErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({code})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Speech-to-text provider selection.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SttSpec {
    pub provider: String,
    pub model: String,
    pub language: String,
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl fmt::Debug for SttSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SttSpec")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("language", &self.language)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    Openrouter,
    OpenaiCompatible,
}

/// One language-model endpoint in the fallback chain.
///
/// `fallback_models` are in-provider alternates tried by the endpoint itself;
/// chain-level failover between endpoints is the backend's fallback adapter.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LlmSpec {
    pub provider: LlmProvider,
    pub base_url: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallback_models: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl fmt::Debug for LlmSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmSpec")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("fallback_models", &self.fallback_models)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Text-to-speech provider selection.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TtsSpec {
    pub base_url: String,
    pub model: String,
    pub voice: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl fmt::Debug for TtsSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtsSpec")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("voice", &self.voice)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VadSpec {
    pub provider: String,
}

impl VadSpec {
    #[must_use]
    pub fn silero() -> Self {
        Self {
            provider: "silero".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnDetectorSpec {
    pub model: String,
}

impl TurnDetectorSpec {
    #[must_use]
    pub fn multilingual() -> Self {
        Self {
            model: "multilingual".to_string(),
        }
    }
}

/// Full pipeline registration payload: which providers the backend should
/// assemble into the session, in what order the LLM endpoints fail over.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineConfig {
    pub stt: SttSpec,
    pub llm: Vec<LlmSpec>,
    pub tts: TtsSpec,
    pub vad: VadSpec,
    pub turn_detection: TurnDetectorSpec,
    pub preemptive_generation: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentDefinition {
    pub instructions: String,
}

/// Room metadata delivered once the backend joins the agent to a room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
}

/// Function-tool definition advertised to the backend at registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: serde_json::Value,
}
