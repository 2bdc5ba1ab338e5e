//! Watch mode - follow a build live

use crate::terminal::{status_label, TerminalView};
use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use ctf_build_logs::{ViewerConfig, ViewerController};
use ctf_platform_client::PlatformClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Challenge id
    pub challenge: String,

    /// Job to open (defaults to the most recent build)
    #[arg(short, long)]
    pub job: Option<String>,

    /// Poll full snapshots instead of following the push stream
    #[arg(long)]
    pub poll: bool,

    /// Poll interval in milliseconds
    #[arg(long, default_value = "2000", env = "CTF_POLL_INTERVAL_MS")]
    pub poll_interval_ms: u64,
}

impl WatchArgs {
    fn viewer_config(&self) -> ViewerConfig {
        let interval = Duration::from_millis(self.poll_interval_ms);
        if self.poll {
            ViewerConfig::polling(interval)
        } else {
            ViewerConfig {
                poll_interval: interval,
                ..Default::default()
            }
        }
    }
}

pub async fn run(client: PlatformClient, args: &WatchArgs) -> Result<()> {
    let client = Arc::new(client);
    let viewer = ViewerController::new(client.clone(), client, args.viewer_config());
    let view = Arc::new(TerminalView::new(viewer.subscribe()));
    viewer.attach_viewport(view.clone());

    viewer
        .enter(Some(args.challenge.as_str()), args.job.as_deref())
        .await;

    let state = viewer.state();
    let Some(challenge) = &state.challenge else {
        bail!(state.error.unwrap_or_else(|| "failed to load challenge".to_string()));
    };
    eprintln!(
        "{} {} ({} builds)",
        "Challenge:".bright_white(),
        challenge.name.cyan(),
        state.summaries.len()
    );

    if args.job.is_none() {
        let Some(latest) = state.summaries.first() else {
            println!("{}", "No builds for this challenge yet.".yellow());
            return Ok(());
        };
        info!(job_id = %latest.job_id, "Opening most recent build");
        viewer.open(&latest.job_id, Some(latest.status)).await;
    }

    // One-shot loads arrive without a scroll hint.
    view.render()?;

    if viewer.sessions().is_active() {
        tokio::select! {
            outcome = viewer.sessions().wait() => {
                debug!(outcome = ?outcome, "Session ended");
            }
            _ = tokio::signal::ctrl_c() => {
                viewer.teardown();
                eprintln!("{}", "Interrupted".yellow());
            }
        }
    }
    viewer.detach_viewport();
    view.render()?;

    let state = viewer.state();
    if let Some(log) = &state.selected_log {
        eprintln!(
            "{} {} {}",
            "Job".bright_white(),
            log.job_id,
            status_label(log.status)
        );
    }
    if let Some(error) = &state.error {
        eprintln!("{}", error.red());
    }
    Ok(())
}
