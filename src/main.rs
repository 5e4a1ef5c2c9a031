use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use voice_agent_rs::agent::{AgentBuilder, AgentEvent, EventHandlers, ToolRegistry};
use voice_agent_rs::config::AgentConfig;
use voice_agent_rs::recovery::SpokenRecovery;
use voice_agent_rs::{Result, SessionErrorEvent, SessionHandle};

const INSTRUCTIONS: &str = "You are a helpful voice AI assistant. The user is \
interacting with you via voice, even if you perceive the conversation as text. \
You eagerly assist users with their questions by providing information from \
your extensive knowledge. Your responses are concise, to the point, and \
without any complex formatting or punctuation including emojis, asterisks, or \
other symbols. You are curious, friendly, and have a sense of humor.";

#[derive(Debug, Deserialize, JsonSchema)]
struct MultiplyArgs {
    number1: i64,
    number2: i64,
}

#[derive(Debug, Serialize)]
struct MultiplyResp {
    product: i64,
}

fn build_tools() -> ToolRegistry {
    let mut tools = ToolRegistry::new();
    tools.tool_with_description(
        "multiply_numbers",
        "Multiply two numbers.",
        |args: MultiplyArgs| async move {
            Ok(MultiplyResp {
                product: args.number1 * args.number2,
            })
        },
    );
    tools
}

async fn run() -> Result<()> {
    let config = AgentConfig::from_env();

    tracing::info!(
        stt_provider = %config.stt.provider,
        stt_model = %config.stt.model,
        stt_language = %config.stt.language,
        llm_chain = %config.llm.models.join(","),
        "starting agent"
    );

    let recovery = Arc::new(SpokenRecovery::new());
    let handlers = EventHandlers::new().on_error(
        move |session: SessionHandle, event: SessionErrorEvent| {
            let recovery = Arc::clone(&recovery);
            async move { recovery.handle(&session, event).await }
        },
    );

    let mut session = AgentBuilder::from_config(&config)
        .instructions(INSTRUCTIONS)
        .tools(build_tools())
        .handlers(handlers)
        .connect_ws()
        .await?;

    session.start().await?;

    while let Some(event) = session.next_event().await? {
        if let AgentEvent::Closed { reason } = event {
            tracing::info!(
                reason = reason.as_deref().unwrap_or("unspecified"),
                "session ended"
            );
            break;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    // .env.local wins over .env, matching the deployment convention.
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(err) = run().await {
        tracing::error!(%err, "agent exited with error");
        std::process::exit(1);
    }
}
