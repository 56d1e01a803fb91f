mod client;
mod config;
mod error;
mod print;
mod server;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use studio_form::{FormState, GenerationSession, build, layout};
use studio_relay::{Relay, replicate};
use tracing_subscriber::EnvFilter;

use client::RelayClient;
use config::{ClientConfig, ServerConfig};
use error::CliError;
use server::AppState;

#[derive(Parser)]
#[command(name = "studio", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the inference relay and model catalog over HTTP.
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// JSON catalog file to use instead of the built-in models
        /// (`STUDIO_CATALOG`).
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// List the models in the catalog.
    Models {
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Also show each model's form fields.
        #[arg(long)]
        fields: bool,
    },
    /// Fill in a model's form and run it through a relay.
    Generate {
        /// Catalog id, e.g. `sdxl`.
        model: String,
        #[arg(long)]
        prompt: Option<String>,
        /// Set a form field, e.g. `--set num_outputs=2`. Repeatable.
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
        /// Relay base URL (`STUDIO_RELAY_URL`).
        #[arg(long)]
        relay: Option<String>,
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve {
            host,
            port,
            catalog,
        } => serve(ServerConfig::load(host, port, catalog)).await?,
        Command::Models { catalog, fields } => {
            let config = ClientConfig::load(None, catalog);
            list_models(&config, fields)?;
        }
        Command::Generate {
            model,
            prompt,
            set,
            relay,
            catalog,
        } => {
            let config = ClientConfig::load(relay, catalog);
            generate(&config, &model, prompt.as_deref(), &set).await?;
        }
    }
    Ok(())
}

async fn serve(config: ServerConfig) -> Result<(), CliError> {
    let registry = config::load_registry(config.catalog.as_deref())?;
    let provider = replicate::provider(config.replicate.clone())?;
    if !config.relay.has_token() {
        tracing::warn!("REPLICATE_API_TOKEN is not set; generation requests will fail");
    }

    let state = Arc::new(AppState {
        registry,
        relay: Relay::new(config.relay.clone(), provider),
    });
    let app = server::router(state);

    let listener = tokio::net::TcpListener::bind(config.addr()).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        provider = %config.replicate.base_url,
        "studio relay listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}

fn list_models(config: &ClientConfig, fields: bool) -> Result<(), CliError> {
    let registry = config::load_registry(config.catalog.as_deref())?;
    if !fields {
        print!("{}", print::model_listing(&registry));
        return Ok(());
    }
    for model in registry.list() {
        let form = FormState::from_descriptor(model);
        println!("{} ({})", model.id, model.name);
        print!("{}", print::form_summary(&layout(model, &form)));
    }
    Ok(())
}

async fn generate(
    config: &ClientConfig,
    model_id: &str,
    prompt: Option<&str>,
    settings: &[String],
) -> Result<(), CliError> {
    let registry = config::load_registry(config.catalog.as_deref())?;
    let model = registry.get(model_id)?;

    let mut form = FormState::from_descriptor(model);
    if let Some(prompt) = prompt {
        form.set_prompt(prompt)?;
    }
    for setting in settings {
        let (key, value) = setting
            .split_once('=')
            .ok_or_else(|| CliError::Setting(setting.clone()))?;
        form.set_raw(key.trim(), value)?;
    }
    let request = build(model, &form)?;

    let client = RelayClient::new(&config.relay_url)?;
    let session = GenerationSession::new();
    let in_flight = session.begin()?;
    eprintln!("Generating with {} ({})...", model.name, request.model);
    let result = client.generate(&request).await?;
    let failure = result.error.clone();
    let timing = print::timing(&result);
    in_flight.finish(result);

    print!("{}", print::view(&session.view(model.output_kind)));
    if let Some(timing) = timing {
        eprintln!("{timing}");
    }
    match failure {
        Some(message) => Err(CliError::Generation(message)),
        None => Ok(()),
    }
}
