//! ctf-logs - Build Log Viewer CLI
//!
//! Terminal host for the build log viewer:
//! - `ctf-logs watch <challenge> [--job <id>]` follows a build live
//! - `ctf-logs list <challenge>` prints the build attempts of a challenge
//! - `ctf-logs show <job>` prints one finished log
//!
//! Usage:
//!   ctf-logs --api-url https://ctf.example.com watch c1 --job j42
//!   CTF_API_URL=http://localhost:8080 ctf-logs list c1 --json

mod inspect;
mod terminal;
mod watch;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ctf_platform_client::{PlatformClient, PlatformClientConfig};
use std::time::Duration;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "ctf-logs")]
#[command(about = "Follow and inspect CTF challenge build logs")]
#[command(version, author)]
#[command(propagate_version = true)]
struct Cli {
    /// Platform API base URL
    #[arg(
        short,
        long,
        default_value = "http://localhost:8080",
        env = "CTF_API_URL",
        global = true
    )]
    api_url: String,

    /// WebSocket base URL for log streams (derived from the API URL when unset)
    #[arg(long, env = "CTF_WS_URL", global = true)]
    ws_url: Option<String>,

    /// Admin bearer token
    #[arg(short, long, env = "CTF_AUTH_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long, default_value = "30", global = true)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Follow a build log live
    #[command(visible_alias = "w")]
    Watch(watch::WatchArgs),

    /// List the build attempts of a challenge
    #[command(visible_alias = "ls")]
    List(inspect::ListArgs),

    /// Print the log of one job once
    Show(inspect::ShowArgs),

    /// Show version and build info
    Version,
}

impl Cli {
    fn client(&self) -> Result<PlatformClient> {
        let mut config = PlatformClientConfig::new(&self.api_url)?
            .with_timeout(Duration::from_secs(self.timeout));
        if let Some(ws_url) = &self.ws_url {
            config = config.with_ws_url(ws_url);
        }
        if let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) {
            config = config.with_auth_token(token);
        }
        Ok(PlatformClient::new(config)?)
    }
}

/// Logs go to stderr; stdout carries the build log itself.
fn init_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ctf_logs=debug".parse()?)
                .add_directive("ctf_build_logs=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let cli = Cli::parse();

    match &cli.command {
        Commands::Watch(args) => watch::run(cli.client()?, args).await,
        Commands::List(args) => inspect::list(cli.client()?, args).await,
        Commands::Show(args) => inspect::show(cli.client()?, args).await,
        Commands::Version => {
            println!("ctf-logs v{}", VERSION);
            println!("  Build: {}", env!("CARGO_PKG_NAME"));
            println!("  Commit: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
            Ok(())
        }
    }
}
