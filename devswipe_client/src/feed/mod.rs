//! Feed session manager: pages project cards in from the backend, tracks the
//! visible card and records swipes.

pub mod cursor;
pub mod events;
pub mod interaction;
pub mod position;
pub mod session;
pub mod store;
mod tasks;

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use flume::{Receiver, Sender};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::api::FeedBackend;
use crate::config::FeedConfig;
use crate::error::{ApiError, FeedError};
use crate::models::{FeedItem, FeedPage, InteractionKind, InteractionRequest, StructuredFeedback};

pub use cursor::{FetchTicket, PaginationCursor};
pub use events::FeedEvent;
pub use interaction::{view_duration_secs, InteractionTally, SwipeGesture, SWIPE_THRESHOLD_PX};
pub use position::Position;
pub use session::SessionIdentity;
pub use store::{AppliedInteraction, FeedPhase, FeedStore, MergeOutcome, Progress};

use events::emit;

/// How a page request ended for the caller that awaited it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded {
        page: u32,
        added: usize,
        updated: usize,
        has_more: bool,
    },
    /// The backend has no more pages; no request was made.
    Exhausted,
    /// Cards were already buffered; no request was made.
    AlreadyBuffered,
    /// The session was reset while the request was in flight.
    Stale,
}

type FetchResult = Result<FetchOutcome, ApiError>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

struct PendingFetch {
    ticket: FetchTicket,
    join: SharedFetch,
}

struct SessionState {
    store: FeedStore,
    pending: Option<PendingFetch>,
}

/// One feed browsing session.
///
/// Store operations are synchronous and run under a mutex that is never held
/// across an await. The two asynchronous pieces are the page fetch, which is
/// single-flight and joined by every concurrent caller, and the interaction
/// submission, which runs as a detached task.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct FeedSession {
    backend: Arc<dyn FeedBackend>,
    config: FeedConfig,
    state: Arc<Mutex<SessionState>>,
    events: Sender<FeedEvent>,
    runtime: Handle,
}

impl FeedSession {
    /// Creates a session bound to the current tokio runtime.
    pub fn new(
        backend: Arc<dyn FeedBackend>,
        config: FeedConfig,
    ) -> Result<(Self, Receiver<FeedEvent>), FeedError> {
        let runtime = Handle::try_current().map_err(|_| FeedError::NoRuntime)?;
        Ok(Self::with_runtime(backend, config, runtime))
    }

    pub fn with_runtime(
        backend: Arc<dyn FeedBackend>,
        config: FeedConfig,
        runtime: Handle,
    ) -> (Self, Receiver<FeedEvent>) {
        let config = config.normalized();
        let (events, rx) = flume::unbounded();
        let state = SessionState {
            store: FeedStore::new(config.page_size),
            pending: None,
        };
        let session = Self {
            backend,
            config,
            state: Arc::new(Mutex::new(state)),
            events,
            runtime,
        };
        (session, rx)
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    // Read model

    /// Cloned copy of the store for rendering.
    pub fn snapshot(&self) -> FeedStore {
        self.lock().store.clone()
    }

    pub fn current_item(&self) -> Option<FeedItem> {
        self.lock().store.current_item().cloned()
    }

    pub fn progress(&self) -> Progress {
        self.lock().store.progress()
    }

    pub fn phase(&self) -> FeedPhase {
        self.lock().store.phase()
    }

    pub fn position(&self) -> usize {
        self.lock().store.position()
    }

    pub fn remaining_buffer(&self) -> usize {
        self.lock().store.remaining_buffer()
    }

    pub fn has_more(&self) -> bool {
        self.lock().store.has_more()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().store.is_loading()
    }

    pub fn last_error(&self) -> Option<ApiError> {
        self.lock().store.last_error().cloned()
    }

    pub fn interaction_stats(&self) -> InteractionTally {
        self.lock().store.interaction_stats()
    }

    pub fn local_like_count(&self, item_id: i64) -> Option<i64> {
        self.lock().store.local_like_count(item_id)
    }

    // Session identity

    pub fn ensure_session_id(&self) -> String {
        self.lock().store.ensure_session_id()
    }

    /// Opens the session and loads the first page unless cards are already
    /// buffered.
    pub async fn start(&self) -> Result<FetchOutcome, FeedError> {
        let buffered = {
            let mut state = self.lock();
            state.store.ensure_session_id();
            !state.store.is_empty()
        };
        if buffered {
            self.maybe_prefetch();
            return Ok(FetchOutcome::AlreadyBuffered);
        }
        self.fetch_next_page().await
    }

    /// Requests the cursor's next page, or joins the request already in
    /// flight. A failed request leaves the buffer untouched and the same
    /// page is requested on the next call.
    pub async fn fetch_next_page(&self) -> Result<FetchOutcome, FeedError> {
        match self.join_or_start_fetch() {
            Some(join) => Ok(join.await?),
            None => Ok(FetchOutcome::Exhausted),
        }
    }

    // Position

    pub fn advance(&self) {
        self.lock().store.advance_position();
        self.maybe_prefetch();
    }

    pub fn go_to(&self, index: usize) -> Result<(), FeedError> {
        self.lock().store.go_to(index)?;
        self.maybe_prefetch();
        Ok(())
    }

    // Interactions

    /// Records a swipe on `item_id`.
    ///
    /// The interaction mapping, optimistic like counter and position are
    /// updated before this returns. The record itself is submitted on a
    /// detached task whose failure never rolls anything back. Unknown items
    /// are ignored with a warning.
    pub fn record_interaction(&self, item_id: i64, kind: InteractionKind, view_started_at: DateTime<Utc>) {
        self.record_interaction_with_feedback(item_id, kind, view_started_at, None);
    }

    pub fn record_interaction_with_feedback(
        &self,
        item_id: i64,
        kind: InteractionKind,
        view_started_at: DateTime<Utc>,
        feedback: Option<StructuredFeedback>,
    ) {
        let view_duration = view_duration_secs(view_started_at, Utc::now());
        let (request, prefetch) = {
            let mut state = self.lock();
            let applied = state
                .store
                .apply_interaction(item_id, kind, self.config.super_like_weight);
            let Some(applied) = applied else {
                drop(state);
                warn!(item_id, kind = kind.as_str(), "interaction for an item not in the feed; ignoring");
                return;
            };
            debug!(
                item_id,
                kind = kind.as_str(),
                like_delta = applied.like_delta,
                position = applied.position,
                view_duration,
                "interaction applied"
            );
            let request = InteractionRequest {
                project_id: item_id,
                kind,
                view_duration,
                session_id: state.store.ensure_session_id(),
                structured_feedback: feedback,
            };
            (request, state.store.should_prefetch(self.config.prefetch_threshold))
        };

        tasks::submit_interaction(&self.runtime, Arc::clone(&self.backend), self.events.clone(), request);
        if prefetch {
            self.start_prefetch();
        }
    }

    /// Records `kind` on the visible card. Returns the card's id, or `None`
    /// when there is no current card.
    pub fn record_current(&self, kind: InteractionKind, view_started_at: DateTime<Utc>) -> Option<i64> {
        let item_id = self.lock().store.current_item().map(|item| item.id)?;
        self.record_interaction(item_id, kind, view_started_at);
        Some(item_id)
    }

    /// Resolves a raw gesture and records it on the visible card.
    pub fn record_gesture(&self, gesture: SwipeGesture, view_started_at: DateTime<Utc>) -> Option<InteractionKind> {
        let kind = gesture.resolve()?;
        self.record_current(kind, view_started_at).map(|_| kind)
    }

    /// Drops every card, the session id and all interactions. A request
    /// still in flight finishes on its own but its result is discarded.
    pub fn reset(&self) {
        let generation = {
            let mut state = self.lock();
            state.store.reset();
            state.pending = None;
            state.store.generation()
        };
        info!(generation, "feed session reset");
        emit(&self.events, FeedEvent::Reset { generation });
    }

    fn maybe_prefetch(&self) {
        let should = self
            .lock()
            .store
            .should_prefetch(self.config.prefetch_threshold);
        if should {
            self.start_prefetch();
        }
    }

    fn start_prefetch(&self) {
        if self.join_or_start_fetch().is_some() {
            debug!("prefetch running");
        }
    }

    fn join_or_start_fetch(&self) -> Option<SharedFetch> {
        let mut state = self.lock();
        if let Some(pending) = &state.pending {
            return Some(pending.join.clone());
        }
        let ticket = state.store.begin_fetch()?;
        let session_id = state.store.ensure_session_id();
        let page_size = state.store.cursor().page_size();
        debug!(page = ticket.page, generation = ticket.generation, "requesting feed page");

        let join = self
            .fetch_page(ticket, page_size, session_id)
            .boxed()
            .shared();
        state.pending = Some(PendingFetch {
            ticket,
            join: join.clone(),
        });
        drop(state);

        // Driven to completion even if every caller stops waiting.
        self.runtime.spawn(join.clone());
        Some(join)
    }

    fn fetch_page(
        &self,
        ticket: FetchTicket,
        page_size: u32,
        session_id: String,
    ) -> impl Future<Output = FetchResult> + Send + 'static {
        let session = self.clone();
        async move {
            let result = session
                .backend
                .fetch_feed(ticket.page, page_size, &session_id)
                .await;
            session.complete_fetch(ticket, result)
        }
    }

    /// Applies a finished request to the store. A merged page that still
    /// leaves the buffer short starts the next request straight away.
    fn complete_fetch(&self, ticket: FetchTicket, result: Result<FeedPage, ApiError>) -> FetchResult {
        let events = &self.events;
        let mut guard = self.lock();
        if guard.pending.as_ref().map(|pending| pending.ticket) == Some(ticket) {
            guard.pending = None;
        }

        match result {
            Ok(page) => {
                let outcome = guard.store.merge_page(ticket, page);
                let prefetch = guard.store.should_prefetch(self.config.prefetch_threshold);
                drop(guard);
                match outcome {
                    MergeOutcome::Merged {
                        page,
                        added,
                        updated,
                        has_more,
                    } => {
                        info!(page, added, updated, has_more, "feed page merged");
                        emit(
                            events,
                            FeedEvent::PageLoaded {
                                generation: ticket.generation,
                                page,
                                added,
                                has_more,
                            },
                        );
                        if prefetch {
                            self.start_prefetch();
                        }
                        Ok(FetchOutcome::Loaded {
                            page,
                            added,
                            updated,
                            has_more,
                        })
                    }
                    MergeOutcome::Stale => {
                        warn!(page = ticket.page, generation = ticket.generation, "dropping page from a reset session");
                        emit(
                            events,
                            FeedEvent::PageDropped {
                                generation: ticket.generation,
                                page: ticket.page,
                            },
                        );
                        Ok(FetchOutcome::Stale)
                    }
                }
            }
            Err(error) => {
                let current = guard.store.fail_page(ticket, error.clone());
                drop(guard);
                if error.is_auth_expired() {
                    emit(events, FeedEvent::AuthExpired);
                }
                if current {
                    warn!(page = ticket.page, %error, "feed page request failed");
                    emit(
                        events,
                        FeedEvent::PageFailed {
                            generation: ticket.generation,
                            page: ticket.page,
                            error: error.clone(),
                        },
                    );
                    Err(error)
                } else if error.is_auth_expired() {
                    Err(error)
                } else {
                    emit(
                        events,
                        FeedEvent::PageDropped {
                            generation: ticket.generation,
                            page: ticket.page,
                        },
                    );
                    Ok(FetchOutcome::Stale)
                }
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        lock_state(&self.state)
    }
}

fn lock_state(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::time::Duration;
    use tokio::sync::Semaphore;

    #[derive(Default)]
    struct FakeBackend {
        pages: Mutex<VecDeque<Result<FeedPage, ApiError>>>,
        requested: Mutex<Vec<(u32, String)>>,
        submitted: Mutex<Vec<InteractionRequest>>,
        interaction_error: Option<ApiError>,
        gate: Option<Arc<Semaphore>>,
    }

    impl FakeBackend {
        fn with_pages(pages: Vec<Result<FeedPage, ApiError>>) -> Self {
            Self {
                pages: Mutex::new(pages.into()),
                ..Self::default()
            }
        }

        fn gated(mut self, gate: Arc<Semaphore>) -> Self {
            self.gate = Some(gate);
            self
        }

        fn requested_pages(&self) -> Vec<u32> {
            self.requested.lock().unwrap().iter().map(|(page, _)| *page).collect()
        }

        fn feed_calls(&self) -> usize {
            self.requested.lock().unwrap().len()
        }

        fn submitted(&self) -> Vec<InteractionRequest> {
            self.submitted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FeedBackend for FakeBackend {
        async fn fetch_feed(&self, page: u32, _limit: u32, session_id: &str) -> Result<FeedPage, ApiError> {
            self.requested.lock().unwrap().push((page, session_id.to_string()));
            if let Some(gate) = &self.gate {
                gate.acquire().await.expect("gate closed").forget();
            }
            let next = self.pages.lock().unwrap().pop_front();
            next.unwrap_or(Ok(FeedPage {
                items: Vec::new(),
                has_more: false,
            }))
        }

        async fn submit_interaction(&self, request: &InteractionRequest) -> Result<(), ApiError> {
            self.submitted.lock().unwrap().push(request.clone());
            match &self.interaction_error {
                Some(error) => Err(error.clone()),
                None => Ok(()),
            }
        }
    }

    fn page(ids: &[i64], has_more: bool) -> Result<FeedPage, ApiError> {
        Ok(FeedPage {
            items: ids.iter().map(|&id| FeedItem::new(id, format!("project {id}"))).collect(),
            has_more,
        })
    }

    fn config(page_size: u32) -> FeedConfig {
        FeedConfig::default().with_page_size(page_size)
    }

    fn ids(session: &FeedSession) -> Vec<i64> {
        session.snapshot().items().iter().map(|item| item.id).collect()
    }

    async fn next_event(rx: &Receiver<FeedEvent>, matches: impl Fn(&FeedEvent) -> bool) -> FeedEvent {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let event = rx.recv_async().await.expect("event channel open");
                if matches(&event) {
                    return event;
                }
            }
        })
        .await
        .expect("timed out waiting for feed event")
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn swipe_through_two_overlapping_pages() {
        let backend = Arc::new(FakeBackend::with_pages(vec![
            page(&[1, 2], true),
            page(&[2, 3], false),
        ]));
        let (session, _rx) = FeedSession::new(backend.clone(), config(2)).unwrap();
        let t0 = Utc::now();

        session.start().await.unwrap();
        assert_eq!(ids(&session), vec![1, 2]);

        session.record_interaction(1, InteractionKind::Like, t0);
        assert_eq!(session.local_like_count(1), Some(1));
        assert_eq!(session.position(), 1);

        session.record_interaction(2, InteractionKind::SuperLike, t0);
        assert_eq!(session.position(), 2);
        assert_eq!(session.local_like_count(2), Some(2));

        // Joins the prefetch started by the swipes, or reports exhaustion if
        // it already landed.
        session.fetch_next_page().await.unwrap();

        assert_eq!(ids(&session), vec![1, 2, 3]);
        assert!(!session.has_more());
        assert_eq!(backend.requested_pages(), vec![1, 2]);
    }

    #[tokio::test]
    async fn concurrent_fetches_share_one_request() {
        let gate = Arc::new(Semaphore::new(0));
        let backend = Arc::new(FakeBackend::with_pages(vec![page(&[1, 2], true)]).gated(gate.clone()));
        let (session, _rx) = FeedSession::new(backend.clone(), config(2)).unwrap();

        let (first, second, _) = tokio::join!(
            session.fetch_next_page(),
            session.fetch_next_page(),
            async {
                settle().await;
                gate.add_permits(1);
            }
        );

        assert_eq!(backend.feed_calls(), 1);
        assert_eq!(first.unwrap(), second.unwrap());
        assert_eq!(ids(&session), vec![1, 2]);
    }

    #[tokio::test]
    async fn exhausted_feed_makes_no_further_requests() {
        let backend = Arc::new(FakeBackend::with_pages(vec![page(&[1], false)]));
        let (session, _rx) = FeedSession::new(backend.clone(), config(2)).unwrap();

        session.start().await.unwrap();
        session.record_interaction(1, InteractionKind::Skip, Utc::now());
        session.advance();
        assert_eq!(session.fetch_next_page().await.unwrap(), FetchOutcome::Exhausted);
        settle().await;

        assert_eq!(backend.feed_calls(), 1);
        assert_eq!(session.phase(), FeedPhase::Exhausted);
    }

    #[tokio::test]
    async fn response_after_reset_is_discarded() {
        let gate = Arc::new(Semaphore::new(0));
        let backend = Arc::new(
            FakeBackend::with_pages(vec![page(&[7, 8], true), page(&[1, 2], true)]).gated(gate.clone()),
        );
        let (session, rx) = FeedSession::new(backend.clone(), config(2)).unwrap();
        let first_session_id = session.ensure_session_id();

        let in_flight = tokio::spawn({
            let session = session.clone();
            async move { session.fetch_next_page().await }
        });
        while backend.feed_calls() == 0 {
            tokio::task::yield_now().await;
        }

        session.reset();
        gate.add_permits(2);
        assert_eq!(in_flight.await.unwrap().unwrap(), FetchOutcome::Stale);
        assert!(session.snapshot().is_empty());
        next_event(&rx, |event| matches!(event, FeedEvent::PageDropped { generation: 0, .. })).await;

        session.start().await.unwrap();
        assert_eq!(ids(&session), vec![1, 2]);
        let second_session_id = session.ensure_session_id();
        assert_ne!(first_session_id, second_session_id);
        assert_eq!(backend.requested.lock().unwrap()[1].1, second_session_id);
    }

    #[tokio::test]
    async fn failed_page_is_retried_with_the_same_number() {
        let backend = Arc::new(FakeBackend::with_pages(vec![
            Err(ApiError::from_status(502, "bad gateway")),
            page(&[1, 2], true),
        ]));
        let (session, rx) = FeedSession::new(backend.clone(), config(2)).unwrap();

        let err = session.start().await.unwrap_err();
        assert!(matches!(err, FeedError::Api(ApiError::Server { status: 502, .. })));
        assert!(session.snapshot().is_empty());
        assert!(session.has_more());
        assert!(session.last_error().is_some());
        next_event(&rx, |event| matches!(event, FeedEvent::PageFailed { page: 1, .. })).await;

        session.fetch_next_page().await.unwrap();
        assert_eq!(backend.requested_pages(), vec![1, 1]);
        assert_eq!(ids(&session), vec![1, 2]);
        assert_eq!(session.last_error(), None);
    }

    #[tokio::test]
    async fn auth_expiry_on_fetch_is_signalled() {
        let backend = Arc::new(FakeBackend::with_pages(vec![Err(ApiError::AuthExpired)]));
        let (session, rx) = FeedSession::new(backend, config(2)).unwrap();

        let err = session.start().await.unwrap_err();
        assert_eq!(err, FeedError::Api(ApiError::AuthExpired));
        next_event(&rx, |event| matches!(event, FeedEvent::AuthExpired)).await;
    }

    #[tokio::test]
    async fn failed_submission_keeps_the_optimistic_update() {
        let backend = Arc::new(FakeBackend {
            interaction_error: Some(ApiError::from_status(503, "analytics down")),
            ..FakeBackend::with_pages(vec![page(&[1, 2, 3], true)])
        });
        let (session, rx) = FeedSession::new(backend.clone(), config(3)).unwrap();
        session.start().await.unwrap();

        session.record_interaction(1, InteractionKind::Like, Utc::now());
        let event = next_event(&rx, |event| matches!(event, FeedEvent::InteractionFailed { .. })).await;

        assert!(matches!(event, FeedEvent::InteractionFailed { item_id: 1, kind: InteractionKind::Like, .. }));
        assert_eq!(session.local_like_count(1), Some(1));
        assert_eq!(session.position(), 1);
        assert_eq!(backend.submitted().len(), 1);
    }

    #[tokio::test]
    async fn expired_credentials_on_submission_are_signalled() {
        let backend = Arc::new(FakeBackend {
            interaction_error: Some(ApiError::AuthExpired),
            ..FakeBackend::with_pages(vec![page(&[1, 2, 3], true)])
        });
        let (session, rx) = FeedSession::new(backend.clone(), config(3)).unwrap();
        session.start().await.unwrap();

        session.record_interaction(1, InteractionKind::SuperLike, Utc::now());
        next_event(&rx, |event| matches!(event, FeedEvent::AuthExpired)).await;
        let failed = next_event(&rx, |event| matches!(event, FeedEvent::InteractionFailed { .. })).await;

        assert_eq!(
            failed,
            FeedEvent::InteractionFailed {
                item_id: 1,
                kind: InteractionKind::SuperLike,
                error: ApiError::AuthExpired,
            }
        );
        assert_eq!(session.local_like_count(1), Some(2));
        assert_eq!(session.position(), 1);
    }

    #[tokio::test]
    async fn submission_carries_session_and_duration() {
        let backend = Arc::new(FakeBackend::with_pages(vec![page(&[1, 2, 3], true)]));
        let (session, rx) = FeedSession::new(backend.clone(), config(3)).unwrap();
        session.start().await.unwrap();

        let started = Utc::now() - chrono::Duration::seconds(4);
        session.record_interaction_with_feedback(
            1,
            InteractionKind::Dislike,
            started,
            Some(StructuredFeedback::PoorDemo),
        );
        next_event(&rx, |event| matches!(event, FeedEvent::InteractionRecorded { item_id: 1, .. })).await;

        let submitted = backend.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].session_id, session.ensure_session_id());
        assert_eq!(submitted[0].structured_feedback, Some(StructuredFeedback::PoorDemo));
        assert!(submitted[0].view_duration >= 4.0);
        assert_eq!(session.local_like_count(1), Some(0));
    }

    #[tokio::test]
    async fn unknown_item_is_ignored() {
        let backend = Arc::new(FakeBackend::with_pages(vec![page(&[1, 2, 3], true)]));
        let (session, _rx) = FeedSession::new(backend.clone(), config(3)).unwrap();
        session.start().await.unwrap();

        session.record_interaction(42, InteractionKind::Like, Utc::now());
        settle().await;

        assert_eq!(session.position(), 0);
        assert!(backend.submitted().is_empty());
        assert_eq!(session.interaction_stats().total, 0);
    }

    #[tokio::test]
    async fn low_buffer_triggers_prefetch() {
        let backend = Arc::new(FakeBackend::with_pages(vec![
            page(&[1, 2, 3], true),
            page(&[4, 5, 6], true),
        ]));
        let (session, _rx) = FeedSession::new(backend.clone(), config(3)).unwrap();
        session.start().await.unwrap();

        session.record_interaction(1, InteractionKind::Skip, Utc::now());
        settle().await;
        assert_eq!(backend.feed_calls(), 1);

        session.record_interaction(2, InteractionKind::Skip, Utc::now());
        settle().await;
        assert_eq!(backend.requested_pages(), vec![1, 2]);
        assert_eq!(ids(&session), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(session.remaining_buffer(), 4);
    }

    #[tokio::test]
    async fn short_page_requests_the_next_one_without_a_swipe() {
        let backend = Arc::new(FakeBackend::with_pages(vec![
            page(&[1], true),
            page(&[2, 3, 4], true),
        ]));
        let (session, _rx) = FeedSession::new(backend.clone(), config(3)).unwrap();

        session.start().await.unwrap();
        settle().await;

        assert_eq!(backend.requested_pages(), vec![1, 2]);
        assert_eq!(ids(&session), vec![1, 2, 3, 4]);
        assert_eq!(session.position(), 0);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn failed_page_is_not_retried_automatically() {
        let backend = Arc::new(FakeBackend::with_pages(vec![
            page(&[1], true),
            Err(ApiError::from_status(503, "busy")),
            page(&[2], true),
        ]));
        let (session, _rx) = FeedSession::new(backend.clone(), config(3)).unwrap();

        session.start().await.unwrap();
        settle().await;

        assert_eq!(backend.requested_pages(), vec![1, 2]);
        assert!(session.last_error().is_some());
        assert_eq!(ids(&session), vec![1]);
    }

    #[tokio::test]
    async fn double_tap_super_likes_the_visible_card() {
        let backend = Arc::new(FakeBackend::with_pages(vec![page(&[1, 2, 3], true)]));
        let (session, _rx) = FeedSession::new(backend, config(3)).unwrap();
        session.start().await.unwrap();

        let kind = session.record_gesture(SwipeGesture::DoubleTap, Utc::now());
        assert_eq!(kind, Some(InteractionKind::SuperLike));
        assert_eq!(session.local_like_count(1), Some(2));
        assert_eq!(session.current_item().map(|item| item.id), Some(2));

        assert_eq!(session.record_gesture(SwipeGesture::Drag { offset_x: 40.0 }, Utc::now()), None);
        assert_eq!(session.position(), 1);
        assert_eq!(session.progress(), Progress { current: 2, total: 3 });
    }

    #[tokio::test]
    async fn go_to_rejects_out_of_range() {
        let backend = Arc::new(FakeBackend::with_pages(vec![page(&[1, 2, 3], true)]));
        let (session, _rx) = FeedSession::new(backend, config(3)).unwrap();
        session.start().await.unwrap();

        assert!(matches!(session.go_to(5), Err(FeedError::OutOfRange(_))));
        session.go_to(1).unwrap();
        assert_eq!(session.current_item().map(|item| item.id), Some(2));
    }

    #[test]
    fn new_requires_a_runtime() {
        let backend = Arc::new(FakeBackend::default());
        assert!(matches!(
            FeedSession::new(backend, FeedConfig::default()),
            Err(FeedError::NoRuntime)
        ));
    }
}
