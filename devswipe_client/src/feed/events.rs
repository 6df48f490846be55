use crate::error::ApiError;
use crate::models::InteractionKind;

/// Side-channel notifications from a feed session. Nothing in the session
/// waits on these; they exist for the UI and for operational visibility.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    PageLoaded {
        generation: u64,
        page: u32,
        added: usize,
        has_more: bool,
    },
    PageFailed {
        generation: u64,
        page: u32,
        error: ApiError,
    },
    /// A response arrived after `reset()` and was discarded.
    PageDropped { generation: u64, page: u32 },
    InteractionRecorded {
        item_id: i64,
        kind: InteractionKind,
    },
    InteractionFailed {
        item_id: i64,
        kind: InteractionKind,
        error: ApiError,
    },
    /// The backend rejected the credentials; the application should tear
    /// down the session and show its login surface.
    AuthExpired,
    Reset { generation: u64 },
}

pub(crate) fn emit(tx: &flume::Sender<FeedEvent>, event: FeedEvent) {
    if tx.send(event).is_err() {
        tracing::trace!("feed event receiver dropped");
    }
}
