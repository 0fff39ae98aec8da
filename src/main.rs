use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod commands;
mod config;
mod conversation;
mod core;
mod display;
mod input;
mod knowledge;
mod prompt;
mod providers;
mod session;
mod settings;
mod stream;

use crate::app::Application;
use crate::cli::Args;
use crate::commands::create_command_registry;
use crate::config::{ApiKey, Config};
use crate::core::error::ChatError;
use crate::knowledge::load_knowledge;
use crate::providers::openai::OpenAIProvider;
use crate::session::ChatSession;

/// Logs go to stderr, and only when asked for, so they never interleave
/// with the chat transcript.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("kbchat=debug")
    } else {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => return,
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Validates the credential, then loads the knowledge base and settings.
///
/// Nothing else happens when the credential is missing.
fn build_session<F>(args: &Args, lookup: F) -> Result<ChatSession, ChatError>
where
    F: FnOnce(&str) -> Option<String>,
{
    let api_key = ApiKey::from_lookup(lookup)?;
    let config = Config::load()?;

    let knowledge_path = config.knowledge_path(args);
    let knowledge = load_knowledge(&knowledge_path);
    let settings = config.settings(args, &knowledge)?;

    let provider = OpenAIProvider::with_endpoint(&config.base_url(args), api_key.expose())?;
    tracing::info!(
        endpoint = provider.endpoint(),
        knowledge = %knowledge_path.display(),
        model = %settings.model,
        "session ready"
    );

    Ok(ChatSession::new(Box::new(provider), knowledge, settings))
}

async fn run(args: Args) -> Result<(), ChatError> {
    let session = build_session(&args, |name| std::env::var(name).ok())?;
    let mut app = Application::new(session, create_command_registry());
    app.run().await
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args).await {
        eprintln!("{} {}", style("Error:").bold().red(), e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_stops_startup() {
        let args = Args::parse_from(["kbchat"]);
        let mut asked = Vec::new();

        let result = build_session(&args, |name| {
            asked.push(name.to_string());
            None
        });

        assert!(matches!(result, Err(ChatError::Configuration(_))));
        assert_eq!(asked, vec![config::API_KEY_ENV.to_string()]);
    }
}
