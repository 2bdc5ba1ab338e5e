//! One-off commands: job list and single log

use crate::terminal::{status_label, summary_table, TerminalView};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use ctf_build_logs::{ViewerConfig, ViewerController};
use ctf_core::BuildLogSource;
use ctf_platform_client::PlatformClient;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Challenge id
    pub challenge: String,

    /// Print raw JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Job id
    pub job: String,
}

pub async fn list(client: PlatformClient, args: &ListArgs) -> Result<()> {
    let summaries = client.list_summaries(&args.challenge).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }
    if summaries.is_empty() {
        println!("{}", "No builds for this challenge.".yellow());
        return Ok(());
    }

    let table = summary_table(&summaries);
    println!("{table}");
    Ok(())
}

pub async fn show(client: PlatformClient, args: &ShowArgs) -> Result<()> {
    let client = Arc::new(client);
    let viewer = ViewerController::new(client.clone(), client, ViewerConfig::default());
    let view = TerminalView::new(viewer.subscribe());

    // Without a job list the status is unknown, so this is a single read.
    viewer.open(&args.job, None).await;
    view.render()?;

    let state = viewer.state();
    if let Some(error) = &state.error {
        anyhow::bail!(error.clone());
    }
    if let Some(log) = &state.selected_log {
        eprintln!("{} {}", "Status:".bright_white(), status_label(log.status));
    }
    Ok(())
}
