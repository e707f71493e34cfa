use std::io::Read as _;
use std::path::Path;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use formrelay_server::api::{self, AppState};
use formrelay_server::config::{DeploymentMode, RelayConfig};
use formrelay_server::dispatch::Dispatcher;
use formrelay_server::function::{self, FunctionRequest};
use formrelay_server::telemetry;

/// Contact-form relay HTTP server.
#[derive(Parser, Debug)]
#[command(name = "formrelay-server", about = "Relays contact-form posts to email")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "formrelay.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Handle one function-style request. Reads `{ method, path, headers, body }`
    /// JSON from stdin and prints `{ status, body }` to stdout.
    Invoke,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = RelayConfig::load(Path::new(&cli.config))?;
    config.apply_env(|key| std::env::var(key).ok())?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.smtp.debug);

    let dispatcher = Arc::new(Dispatcher::from_config(&config)?);
    let state = AppState::new(dispatcher, &config);
    let app = api::router(state);

    if let Some(Commands::Invoke) = cli.command {
        let mut input = String::new();
        std::io::stdin().read_to_string(&mut input)?;
        let request: FunctionRequest = serde_json::from_str(&input)?;
        let response = function::invoke(app, request).await?;
        println!("{}", serde_json::to_string(&response)?);
        return Ok(());
    }

    if config.server.mode == DeploymentMode::Function {
        warn!("running the HTTP server in function mode, SMTP delivery is disabled");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "formrelay-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("formrelay-server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
