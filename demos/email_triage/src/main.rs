// Triage the newest Gmail message: summarize it, decide whether it needs an
// answer and, if it does, save a reply in Drafts. Nothing is ever sent.

use inbox_triage::{
    ContextHub, GmailGatewayBuilder, TriageAgents, TriageConfig, TriagePipeline, llm::LLM,
    pipeline::AgentRole,
};
use rig::{client::CompletionClient, prelude::ProviderClient, providers::groq::Client};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const GROQ_KEY_VAR: &str = "GROQ_API_KEY";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match TriageConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return;
        }
    };

    if std::env::var(GROQ_KEY_VAR).is_err() {
        error!("Make sure {} is set in your environment", GROQ_KEY_VAR);
        return;
    }
    let groq = Client::from_env();

    let build_agent = |role: AgentRole| -> Box<dyn LLM> {
        let preamble = role.preamble();
        let mut builder = groq.agent(&config.model).preamble(&preamble);
        if let Some(temperature) = config.temperature {
            builder = builder.temperature(temperature);
        }
        Box::new(builder.build())
    };
    let agents = TriageAgents {
        reader: build_agent(AgentRole::Reader),
        decider: build_agent(AgentRole::Decider),
        drafter: build_agent(AgentRole::Drafter),
    };

    let hub = Arc::new(ContextHub::new(config.gconf()));
    let gateway = match GmailGatewayBuilder::new(hub).build().await {
        Ok(gateway) => gateway,
        Err(e) => {
            error!(error = %e, "Gmail authentication failed");
            return;
        }
    };

    let mut pipeline = match TriagePipeline::new(Box::new(gateway), agents) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!(error = %e, "Failed to build the triage pipeline");
            return;
        }
    };

    match pipeline.run().await {
        Ok(outcome) => info!(?outcome, "Email triage finished"),
        Err(e) => error!(error = %e, "Error during email automation"),
    }
}
