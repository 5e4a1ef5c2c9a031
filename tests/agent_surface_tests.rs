use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use voice_agent_rs::agent::{Agent, AgentBuilder, ToolRegistry};
use voice_agent_rs::config::AgentConfig;
use voice_agent_rs::protocol::models::{TurnDetectorSpec, VadSpec};
use voice_agent_rs::recovery::{Announcement, FAILURE_MESSAGE, HOLDING_MESSAGE};
use voice_agent_rs::Error;

#[derive(Debug, Deserialize, JsonSchema)]
struct EchoArgs {
    text: String,
}

#[derive(Debug, Serialize)]
struct EchoResp {
    echoed: String,
}

#[test]
fn builder_chain_compiles() {
    let config = AgentConfig::from_lookup(|_| None);
    let _ = AgentBuilder::from_config(&config)
        .identity("test-agent")
        .instructions("Be brief.")
        .vad(VadSpec::silero())
        .turn_detection(TurnDetectorSpec::multilingual())
        .preemptive_generation(false);
}

#[tokio::test]
async fn incomplete_builder_is_rejected_before_connecting() {
    let result = Agent::builder().connect_ws().await;
    assert!(matches!(result, Err(Error::InvalidConfig(_))));

    let result = Agent::builder()
        .backend_url("http://localhost:7880")
        .connect_ws()
        .await;
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
}

#[test]
fn tool_registry_collects_definitions() {
    let mut registry = ToolRegistry::new();
    registry.tool_with_description("echo", "Echo text back.", |args: EchoArgs| async move {
        Ok(EchoResp { echoed: args.text })
    });

    assert_eq!(registry.definitions().len(), 1);
    assert_eq!(registry.definitions()[0].name, "echo");

    let specs = registry.try_as_specs().expect("specs");
    assert_eq!(specs[0].name, "echo");
    assert_eq!(specs[0].description.as_deref(), Some("Echo text back."));
    assert!(specs[0].parameters.is_object());
}

#[tokio::test]
async fn unknown_tool_dispatch_fails() {
    let registry = ToolRegistry::new();
    let call = voice_agent_rs::ToolCall {
        name: "missing".to_string(),
        call_id: "call_1".to_string(),
        arguments: serde_json::Value::Null,
    };
    assert!(matches!(registry.dispatch(call).await, Err(Error::Tool(_))));
}

#[test]
fn announcements_map_to_the_spoken_messages() {
    assert_eq!(Announcement::Holding.text(), Some(HOLDING_MESSAGE));
    assert_eq!(Announcement::Failure.text(), Some(FAILURE_MESSAGE));
    assert_eq!(Announcement::Silent.text(), None);
}
