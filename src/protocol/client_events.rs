use super::models::{AgentDefinition, PipelineConfig, ToolSpec};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    #[serde(rename = "session.register")]
    SessionRegister {
        #[serde(skip_serializing_if = "Option::is_none")]
        event_id: Option<String>,
        pipeline: Box<PipelineConfig>,
        agent: AgentDefinition,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tools: Vec<ToolSpec>,
    },
    #[serde(rename = "session.start")]
    SessionStart {
        #[serde(skip_serializing_if = "Option::is_none")]
        event_id: Option<String>,
    },
    #[serde(rename = "speech.say")]
    Say {
        #[serde(skip_serializing_if = "Option::is_none")]
        event_id: Option<String>,
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        allow_interruptions: Option<bool>,
    },
    #[serde(rename = "tool.result")]
    ToolResult {
        #[serde(skip_serializing_if = "Option::is_none")]
        event_id: Option<String>,
        call_id: String,
        output: String,
    },
    #[serde(rename = "session.close")]
    SessionClose {
        #[serde(skip_serializing_if = "Option::is_none")]
        event_id: Option<String>,
    },
}
