//! Push stream retrieval

use super::{SessionContext, SessionOutcome};
use crate::state::ViewEvent;
use futures::StreamExt;
use tracing::{debug, info};

pub(super) async fn run(ctx: &SessionContext) -> SessionOutcome {
    let opened = tokio::select! {
        biased;
        _ = ctx.token.cancelled() => return SessionOutcome::Cancelled,
        opened = ctx.source.open_stream(&ctx.job_id) => opened,
    };
    let mut stream = match opened {
        Ok(stream) => stream,
        Err(e) => return ctx.transport_failure("open", e),
    };

    info!(session = ctx.id, job_id = %ctx.job_id, "Following build log stream");

    loop {
        let next = tokio::select! {
            biased;
            _ = ctx.token.cancelled() => return SessionOutcome::Cancelled,
            next = stream.next() => next,
        };

        let chunk = match next {
            Some(Ok(chunk)) => chunk,
            Some(Err(e)) => return ctx.transport_failure("receive", e),
            None => {
                debug!(session = ctx.id, job_id = %ctx.job_id, "Stream closed before completion");
                return SessionOutcome::Ended;
            }
        };

        // A chunk already in flight when the session was stopped is dropped.
        if ctx.token.is_cancelled() {
            return SessionOutcome::Cancelled;
        }

        let has_text = !chunk.line.is_empty();
        let applied = ctx.apply(ViewEvent::ChunkReceived {
            session: ctx.id,
            text: chunk.line,
            status: chunk.status,
        });
        if !applied {
            return SessionOutcome::Superseded;
        }
        if has_text {
            ctx.scroll_hint();
        }

        if chunk.is_complete {
            info!(
                session = ctx.id,
                job_id = %ctx.job_id,
                status = %chunk.status,
                "Build finished"
            );
            ctx.refresh_summaries().await;
            return SessionOutcome::Completed;
        }
    }
}
