use anyhow::Context;
use clap::Parser;
use kisan_stream::HttpAgentClient;
use kisan_types::{ConversationMessage, OutboundPayload, RequestContext};
use std::process::ExitCode;
use std::time::Duration;

mod cli;
mod commands;
mod config;
mod logging;

use cli::{Cli, Command};
use config::{ChatConfig, Config};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = Config::load().context("Failed to load configuration")?;

    logging::init_logging(&config.logging);

    if let Some(base_url) = cli.base_url {
        config.agent.base_url = base_url;
    }
    tracing::debug!(base_url = %config.agent.base_url, "config loaded");

    let client = HttpAgentClient::from_config(config.agent.clone())
        .context("Failed to create agent client")?;

    let code = match cli.command {
        Command::Ask { question, raw, deadline } => {
            let deadline = deadline
                .or(Some(config.chat.deadline_secs))
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs);
            let payload = build_payload(&question.join(" "), &config.chat);
            commands::ask(&client, payload, deadline, raw).await
        }
        Command::Complete { question } => {
            let payload = build_payload(&question.join(" "), &config.chat);
            commands::complete(&client, payload).await
        }
        Command::Health => commands::health(&client).await,
    };

    Ok(code)
}

fn build_payload(question: &str, chat: &ChatConfig) -> OutboundPayload {
    let session_id = chat
        .session_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let mut context = RequestContext::new().session_id(session_id);
    if let Some(locale) = &chat.locale {
        context = context.locale(locale.clone());
    }

    OutboundPayload::new(vec![ConversationMessage::user(question)]).with_context(context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_payload_single_user_turn() {
        let chat = ChatConfig {
            session_id: Some("fixed".to_string()),
            locale: Some("kn-IN".to_string()),
            deadline_secs: 0,
        };
        let payload = build_payload("ragi sowing time", &chat);

        assert_eq!(payload.messages, vec![ConversationMessage::user("ragi sowing time")]);
        let context = payload.context.unwrap();
        assert_eq!(context.get("session_id"), Some(&serde_json::json!("fixed")));
        assert_eq!(context.get("locale"), Some(&serde_json::json!("kn-IN")));
    }

    #[test]
    fn test_build_payload_generates_session_id() {
        let payload = build_payload("hi", &ChatConfig::default());
        let context = payload.context.unwrap();

        assert!(context.get("session_id").and_then(|v| v.as_str()).is_some());
        assert!(context.get("locale").is_none());
    }
}
