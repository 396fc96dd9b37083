use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use edgecert_core::{
    load_config, validate_config, CloudflareClient, EdgeApi, IssuanceRequest, IssuanceWorkflow,
    SanitizedConfig, ValidationMethod,
};

/// Issue TLS certificates for customer hostnames through Cloudflare custom hostnames.
#[derive(Parser)]
#[command(name = "edgecert")]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, env = "EDGECERT_CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Request a certificate for a hostname and wait until it is active
    Issue {
        /// Customer hostname to issue the certificate for
        hostname: String,

        /// Domain control validation method (http, txt or email)
        #[arg(long, default_value = "http")]
        validation_method: ValidationMethod,

        /// Origin server to route the hostname to instead of the zone default
        #[arg(long = "origin")]
        origin: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run(cli: Cli) -> Result<()> {
    info!("Loading configuration from {:?}", cli.config);
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    validate_config(&config).context("Configuration validation failed")?;

    let sanitized = SanitizedConfig::from(&config);
    info!(
        "Configuration loaded: {}",
        serde_json::to_string(&sanitized).unwrap_or_default()
    );

    match cli.command {
        Commands::Issue {
            hostname,
            validation_method,
            origin,
        } => {
            let mut request = IssuanceRequest::new(&hostname)
                .with_context(|| format!("Invalid hostname '{}'", hostname))?
                .with_validation_method(validation_method);
            if let Some(origin) = origin {
                request = request
                    .with_custom_origin_server(origin)
                    .context("Invalid origin server")?;
            }

            let client: Arc<dyn EdgeApi> = Arc::new(
                CloudflareClient::new(&config.cloudflare)
                    .context("Failed to create Cloudflare client")?,
            );
            let workflow = IssuanceWorkflow::new(client, config.cloudflare.zone_name.clone());

            let handle = workflow
                .run(request)
                .await
                .context("Certificate issuance failed")?;
            let cancellation = handle.cancellation();

            tokio::select! {
                _ = handle.wait() => {
                    info!("Certificate is active");
                }
                result = signal::ctrl_c() => {
                    result.context("Failed to listen for Ctrl+C")?;
                    warn!("Interrupted, stopping status polling");
                    cancellation.cancel();
                }
            }
        }
    }

    Ok(())
}
