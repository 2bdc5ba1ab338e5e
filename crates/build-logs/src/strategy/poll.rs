//! Snapshot poll retrieval

use super::{SessionContext, SessionOutcome};
use crate::state::ViewEvent;
use std::time::Duration;
use tracing::{debug, info, warn};

pub(super) async fn run(
    ctx: &SessionContext,
    interval: Duration,
    refresh_summaries: bool,
) -> SessionOutcome {
    info!(
        session = ctx.id,
        job_id = %ctx.job_id,
        interval_ms = interval.as_millis() as u64,
        "Polling build log"
    );

    let mut tick: u64 = 0;
    loop {
        if ctx.token.is_cancelled() {
            return SessionOutcome::Cancelled;
        }

        // An in-flight request is allowed to finish; its answer is dropped
        // if the session was stopped meanwhile.
        let fetched = ctx.source.fetch_snapshot(&ctx.job_id).await;
        if ctx.token.is_cancelled() {
            debug!(session = ctx.id, job_id = %ctx.job_id, tick, "Discarding late snapshot");
            return SessionOutcome::Cancelled;
        }

        match fetched {
            Ok(snapshot) => {
                let status = snapshot.status;
                let applied = ctx.apply(ViewEvent::SnapshotReceived {
                    session: ctx.id,
                    job_id: ctx.job_id.clone(),
                    snapshot,
                });
                if !applied {
                    return SessionOutcome::Superseded;
                }
                ctx.scroll_hint();

                if tick > 0 && refresh_summaries {
                    ctx.refresh_summaries().await;
                }

                if status.is_terminal() {
                    info!(session = ctx.id, job_id = %ctx.job_id, status = %status, "Build finished");
                    return SessionOutcome::Completed;
                }
            }
            Err(e) => {
                warn!(
                    session = ctx.id,
                    job_id = %ctx.job_id,
                    tick,
                    error = %e,
                    "Poll tick failed"
                );
            }
        }

        tick += 1;
        tokio::select! {
            biased;
            _ = ctx.token.cancelled() => return SessionOutcome::Cancelled,
            _ = tokio::time::sleep(interval) => {}
        }
    }
}
