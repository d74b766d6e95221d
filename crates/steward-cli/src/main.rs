mod cli;
mod commands;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use steward_core::config::Config;
use steward_core::executors::{K8sClient, KubeClient};
use steward_core::llm::test_utils::NullProvider;
use steward_core::llm::{AnthropicProvider, EchoProvider, Provider};
use steward_core::store::{AuditStore, ConversationStore, InMemoryStore, PendingStore, SqliteStore};
use steward_core::Engine;

use cli::args::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Arc::new(Config::load(Path::new(&cli.config)).await.context("loading config")?);

    let (conversation_store, pending_store, audit_store) = build_stores(&config).await?;
    let k8s: Arc<dyn K8sClient> = Arc::new(KubeClient::try_default().await.context("connecting to Kubernetes cluster")?);

    let model = default_model(&cli.command);
    let provider: Arc<dyn Provider> = build_provider(&config, &model)?;

    let engine = Engine::new(config, conversation_store, pending_store, audit_store, k8s, provider);

    commands::dispatch(&engine, cli.command).await
}

async fn build_stores(
    config: &Config,
) -> Result<(Arc<dyn ConversationStore>, Arc<dyn PendingStore>, Arc<dyn AuditStore>)> {
    let pending_store: Arc<dyn PendingStore> = Arc::new(InMemoryStore::new());

    match &config.storage.sqlite_path {
        Some(path) => {
            let sqlite = Arc::new(SqliteStore::connect(path).await.context("connecting to sqlite store")?);
            Ok((sqlite.clone(), pending_store, sqlite))
        }
        None => {
            let memory = Arc::new(InMemoryStore::new());
            Ok((memory.clone(), pending_store, memory))
        }
    }
}

/// Resolves the provider for a command whose `model` argument is a plain
/// `clap` string: the CLI validates it through `ModelId::parse` again
/// inside `commands::dispatch`, but the provider itself has to be built
/// before we know which subcommand ran, so we peek at the model string
/// every subcommand variant carries.
fn default_model(command: &cli::args::Commands) -> String {
    use cli::args::Commands;
    match command {
        Commands::Chat { model, .. }
        | Commands::Approve { model, .. }
        | Commands::Reject { model, .. } => model.clone(),
        _ => "anthropic/claude-3-5-sonnet".to_string(),
    }
}

fn build_provider(config: &Config, model: &str) -> Result<Arc<dyn Provider>> {
    let provider_name = model.split_once('/').map(|(p, _)| p).unwrap_or("anthropic");
    let provider: Arc<dyn Provider> = match provider_name {
        "anthropic" => {
            let api_key = std::env::var(&config.provider.anthropic_api_key_env)
                .with_context(|| format!("{} not set", config.provider.anthropic_api_key_env))?;
            Arc::new(AnthropicProvider::new(config.provider.anthropic_base_url.clone(), api_key))
        }
        "echo" => Arc::new(EchoProvider::new(vec![])),
        "null" => Arc::new(NullProvider),
        other => anyhow::bail!("unknown model provider: {other}"),
    };
    Ok(provider)
}
