//! Background sentence provider calls.
//!
//! The main loop never awaits the network. Keybindings push `ProviderRequest`s
//! onto an unbounded channel; the dispatcher task spawns one tokio task per
//! request and each task posts its outcome back as `AppEvent::Provider`.
//! Requests are fire-and-forget: there is no cancellation and no
//! de-duplication. Fetches and submits carry a sequence number so `AppState`
//! can discard results that a newer request has superseded.

use std::sync::Arc;

use redline_core::{
    Acknowledgement, ReviewProgress, SentenceProvider, SentenceRecord, Submission,
};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::event::AppEvent;

/// Work requested from the provider by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderRequest {
    /// Fetch the next sentence for review.
    FetchNext { seq: u64, reviewer_id: u32 },
    /// Store a final sentence.
    Submit { seq: u64, submission: Submission },
    /// Refresh the reviewed / total counter.
    Progress,
}

/// Outcome of a `ProviderRequest`, delivered through the event bus.
#[derive(Debug)]
pub enum ProviderResult {
    Fetched {
        seq: u64,
        result: redline_core::Result<SentenceRecord>,
    },
    Submitted {
        seq: u64,
        submission: Submission,
        result: redline_core::Result<Acknowledgement>,
    },
    Progress(redline_core::Result<ReviewProgress>),
}

/// Spawns the dispatcher that turns requests into concurrent provider calls.
///
/// Runs until every request sender is dropped.
pub fn spawn_dispatcher(
    provider: Arc<dyn SentenceProvider>,
    mut rx: UnboundedReceiver<ProviderRequest>,
    event_tx: UnboundedSender<AppEvent>,
) {
    tokio::spawn(async move {
        while let Some(request) = rx.recv().await {
            debug!(?request, "dispatching provider request");
            let provider = Arc::clone(&provider);
            let event_tx = event_tx.clone();
            tokio::spawn(async move {
                let result = handle_request(provider.as_ref(), request).await;
                let _ = event_tx.send(AppEvent::Provider(Box::new(result)));
            });
        }
    });
}

async fn handle_request(provider: &dyn SentenceProvider, request: ProviderRequest) -> ProviderResult {
    match request {
        ProviderRequest::FetchNext { seq, reviewer_id } => ProviderResult::Fetched {
            seq,
            result: provider.fetch_next(reviewer_id).await,
        },
        ProviderRequest::Submit { seq, submission } => {
            let result = provider
                .submit_final(&submission.id, &submission.final_sentence)
                .await;
            ProviderResult::Submitted { seq, submission, result }
        }
        ProviderRequest::Progress => ProviderResult::Progress(
            provider
                .list_sentences()
                .await
                .map(|records| ReviewProgress::from_records(&records)),
        ),
    }
}
