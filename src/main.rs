//! Dev app server harness CLI.
//!
//! Starts a dev server for an application bundle, prints the discovered
//! endpoints and keeps the server alive until Ctrl-C or SIGTERM, then shuts
//! it down the same way a test fixture would.

use std::path::PathBuf;

use clap::Parser;

use appserver_harness::config::{load_config, validate_config, ConfigError, LaunchConfig};
use appserver_harness::lifecycle::shutdown_signal;
use appserver_harness::observability::logging;
use appserver_harness::DevServer;

#[derive(Parser)]
#[command(name = "appserver-harness")]
#[command(about = "Run an app under the development server until interrupted", long_about = None)]
struct Cli {
    /// TOML file with launch settings; flags override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dev server executable or name searched on PATH.
    #[arg(long)]
    executable: Option<String>,

    /// Host for the module and admin listeners.
    #[arg(long)]
    host: Option<String>,

    /// Module port (0 = ephemeral).
    #[arg(long)]
    port: Option<u16>,

    /// Admin port (0 = ephemeral).
    #[arg(long)]
    admin_port: Option<u16>,

    /// Startup and shutdown timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Mirror the server's output and log more.
    #[arg(short, long)]
    debug: bool,

    /// Print endpoints as JSON.
    #[arg(long)]
    json: bool,

    /// Application bundle directory.
    app_dir: PathBuf,
}

impl Cli {
    fn launch_config(&self) -> Result<LaunchConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => LaunchConfig::default(),
        };

        config.app_dir = self.app_dir.clone();
        if let Some(executable) = &self.executable {
            config.executable = executable.clone();
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(admin_port) = self.admin_port {
            config.admin_port = admin_port;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        config.debug |= self.debug;

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.launch_config()?;
    logging::init(config.debug);

    tracing::info!(
        app_dir = %config.app_dir.display(),
        executable = %config.executable,
        timeout_secs = config.timeout_secs,
        "Configuration loaded"
    );

    let mut server = DevServer::launch(config).await?;

    if let Some(endpoints) = server.endpoints() {
        if cli.json {
            println!("{}", serde_json::to_string_pretty(endpoints)?);
        } else {
            println!("module: {}", endpoints.module_url);
            println!("admin:  {}", endpoints.admin_url);
            println!("api:    {}", endpoints.api_url);
        }
    }

    shutdown_signal().await;

    server.close().await?;
    tracing::info!("Shutdown complete");
    Ok(())
}
