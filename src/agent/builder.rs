use crate::config::AgentConfig;
use crate::error::{Error, Result};
use crate::llm;
use crate::protocol::client_events::ClientEvent;
use crate::protocol::models::{
    AgentDefinition, LlmSpec, PipelineConfig, SttSpec, TtsSpec, TurnDetectorSpec, VadSpec,
};
use crate::transport::rest::BackendRestAdapter;
use crate::transport::ws;

use super::handlers::EventHandlers;
use super::session::Session;
use super::tools::ToolRegistry;
use super::transport::{Transport, WsTransport};

const DEFAULT_IDENTITY: &str = "voice-agent";

pub struct Agent;

impl Agent {
    #[must_use]
    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }
}

/// Composes the session pipeline and connects it to the agent backend.
pub struct AgentBuilder {
    backend_url: Option<String>,
    api_key: Option<String>,
    identity: String,
    instructions: Option<String>,
    stt: Option<SttSpec>,
    llm: Vec<LlmSpec>,
    tts: Option<TtsSpec>,
    vad: VadSpec,
    turn_detection: TurnDetectorSpec,
    preemptive_generation: bool,
    tools: ToolRegistry,
    handlers: EventHandlers,
}

impl AgentBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            backend_url: None,
            api_key: None,
            identity: DEFAULT_IDENTITY.to_string(),
            instructions: None,
            stt: None,
            llm: Vec::new(),
            tts: None,
            vad: VadSpec::silero(),
            turn_detection: TurnDetectorSpec::multilingual(),
            preemptive_generation: true,
            tools: ToolRegistry::new(),
            handlers: EventHandlers::new(),
        }
    }

    /// Pre-populate backend connection and the full provider pipeline from a
    /// resolved configuration.
    #[must_use]
    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new()
            .backend_url(&config.backend.url)
            .api_key(&config.backend.api_key)
            .stt(config.stt.to_spec())
            .llm_chain(llm::build_chain(&config.llm))
            .tts(config.tts.to_spec())
    }

    #[must_use]
    pub fn backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }

    #[must_use]
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    #[must_use]
    pub fn stt(mut self, stt: SttSpec) -> Self {
        self.stt = Some(stt);
        self
    }

    /// Ordered LLM fallback chain: primary endpoint first.
    #[must_use]
    pub fn llm_chain(mut self, chain: Vec<LlmSpec>) -> Self {
        self.llm = chain;
        self
    }

    #[must_use]
    pub fn tts(mut self, tts: TtsSpec) -> Self {
        self.tts = Some(tts);
        self
    }

    #[must_use]
    pub fn vad(mut self, vad: VadSpec) -> Self {
        self.vad = vad;
        self
    }

    #[must_use]
    pub fn turn_detection(mut self, turn_detection: TurnDetectorSpec) -> Self {
        self.turn_detection = turn_detection;
        self
    }

    #[must_use]
    pub const fn preemptive_generation(mut self, enabled: bool) -> Self {
        self.preemptive_generation = enabled;
        self
    }

    #[must_use]
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn handlers(mut self, handlers: EventHandlers) -> Self {
        self.handlers = handlers;
        self
    }

    fn build(self) -> Result<Blueprint> {
        let backend_url = self
            .backend_url
            .ok_or_else(|| Error::InvalidConfig("backend_url required".to_string()))?;
        let api_key = self
            .api_key
            .ok_or_else(|| Error::InvalidConfig("api_key required".to_string()))?;
        let stt = self
            .stt
            .ok_or_else(|| Error::InvalidConfig("stt spec required".to_string()))?;
        if self.llm.is_empty() {
            return Err(Error::InvalidConfig("llm chain must not be empty".to_string()));
        }
        let tts = self
            .tts
            .ok_or_else(|| Error::InvalidConfig("tts spec required".to_string()))?;

        Ok(Blueprint {
            backend_url,
            api_key,
            identity: self.identity,
            pipeline: PipelineConfig {
                stt,
                llm: self.llm,
                tts,
                vad: self.vad,
                turn_detection: self.turn_detection,
                preemptive_generation: self.preemptive_generation,
            },
            agent: AgentDefinition {
                instructions: self.instructions.unwrap_or_default(),
            },
            tools: self.tools,
            handlers: self.handlers,
        })
    }

    /// Connect to the backend, register the pipeline, and return the running
    /// session.
    ///
    /// # Errors
    /// Returns an error if the configuration is incomplete, the token
    /// exchange fails, or the connection or registration fails.
    pub async fn connect_ws(self) -> Result<Session> {
        let blueprint = self.build()?;

        let rest = BackendRestAdapter::new(&blueprint.backend_url, &blueprint.api_key)?;
        let token = rest.create_access_token(&blueprint.identity).await?;
        let stream = ws::connect(&blueprint.backend_url, &token.token).await?;

        let tool_specs = blueprint.tools.try_as_specs()?;
        let mut transport = WsTransport::new(stream);
        transport
            .send(ClientEvent::SessionRegister {
                event_id: None,
                pipeline: Box::new(blueprint.pipeline),
                agent: blueprint.agent,
                tools: tool_specs,
            })
            .await?;

        Ok(Session::from_transport(
            Box::new(transport),
            blueprint.handlers,
            blueprint.tools,
        ))
    }
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

struct Blueprint {
    backend_url: String,
    api_key: String,
    identity: String,
    pipeline: PipelineConfig,
    agent: AgentDefinition,
    tools: ToolRegistry,
    handlers: EventHandlers,
}
