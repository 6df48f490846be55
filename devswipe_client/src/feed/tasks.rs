use std::sync::Arc;

use flume::Sender;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::api::FeedBackend;
use crate::models::InteractionRequest;

use super::events::{emit, FeedEvent};

/// Submits an interaction record on a detached task.
///
/// The record is sent exactly once. Nobody awaits the task; its outcome only
/// reaches the log and the event channel.
pub(crate) fn submit_interaction(
    runtime: &Handle,
    backend: Arc<dyn FeedBackend>,
    tx: Sender<FeedEvent>,
    request: InteractionRequest,
) {
    runtime.spawn(async move {
        let item_id = request.project_id;
        let kind = request.kind;
        match backend.submit_interaction(&request).await {
            Ok(()) => {
                debug!(item_id, kind = kind.as_str(), "interaction recorded");
                emit(&tx, FeedEvent::InteractionRecorded { item_id, kind });
            }
            Err(error) => {
                warn!(item_id, kind = kind.as_str(), %error, "failed to record interaction");
                if error.is_auth_expired() {
                    emit(&tx, FeedEvent::AuthExpired);
                }
                emit(&tx, FeedEvent::InteractionFailed { item_id, kind, error });
            }
        }
    });
}
