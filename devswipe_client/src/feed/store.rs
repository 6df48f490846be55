use std::collections::HashMap;

use crate::error::{ApiError, OutOfRange};
use crate::models::{FeedItem, FeedPage, InteractionKind};

use super::cursor::{FetchTicket, PaginationCursor};
use super::interaction::InteractionTally;
use super::position::Position;
use super::session::SessionIdentity;

/// Coarse lifecycle of a feed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    /// No card to show and no request in flight, while the backend may
    /// still have pages. Covers the fresh session and a buffer swiped to the
    /// end after a failed request.
    Empty,
    /// Waiting on a page with no card to show.
    Loading,
    /// A card is visible.
    Ready,
    /// A card is visible while the next page is on its way.
    Prefetching,
    /// The backend has no more pages and every card has been seen.
    Exhausted,
}

/// Result of handing a page response to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged {
        page: u32,
        added: usize,
        updated: usize,
        has_more: bool,
    },
    /// Issued under an earlier generation; nothing was applied.
    Stale,
}

/// What a recorded interaction changed locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedInteraction {
    pub item_id: i64,
    pub kind: InteractionKind,
    pub like_delta: i64,
    pub position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

/// In-memory snapshot of one feed session: buffered cards, paging state,
/// position, session id and the user's interactions.
///
/// Every mutation goes through one of the methods below, and each keeps the
/// invariants: card ids are unique, `position <= items.len()`, and a page
/// result from an older generation is never applied.
#[derive(Debug, Clone)]
pub struct FeedStore {
    items: Vec<FeedItem>,
    index_by_id: HashMap<i64, usize>,
    cursor: PaginationCursor,
    position: Position,
    session: SessionIdentity,
    interactions: HashMap<i64, InteractionKind>,
    optimistic_likes: HashMap<i64, i64>,
    generation: u64,
    last_error: Option<ApiError>,
}

impl FeedStore {
    pub fn new(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            index_by_id: HashMap::new(),
            cursor: PaginationCursor::new(page_size),
            position: Position::default(),
            session: SessionIdentity::new(),
            interactions: HashMap::new(),
            optimistic_likes: HashMap::new(),
            generation: 0,
            last_error: None,
        }
    }

    pub fn items(&self) -> &[FeedItem] {
        &self.items
    }

    pub fn item(&self, item_id: i64) -> Option<&FeedItem> {
        self.index_by_id.get(&item_id).map(|&idx| &self.items[idx])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> &PaginationCursor {
        &self.cursor
    }

    pub fn has_more(&self) -> bool {
        self.cursor.has_more()
    }

    pub fn is_loading(&self) -> bool {
        self.cursor.in_flight().is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_error(&self) -> Option<&ApiError> {
        self.last_error.as_ref()
    }

    pub fn position(&self) -> usize {
        self.position.index()
    }

    pub fn current_item(&self) -> Option<&FeedItem> {
        self.items.get(self.position.index())
    }

    pub fn remaining_buffer(&self) -> usize {
        self.position.remaining(self.items.len())
    }

    pub fn progress(&self) -> Progress {
        let total = self.items.len();
        Progress {
            current: (self.position.index() + 1).min(total),
            total,
        }
    }

    pub fn phase(&self) -> FeedPhase {
        let has_card = self.position.index() < self.items.len();
        if !self.cursor.has_more() && !has_card {
            FeedPhase::Exhausted
        } else if self.is_loading() {
            if has_card {
                FeedPhase::Prefetching
            } else {
                FeedPhase::Loading
            }
        } else if has_card {
            FeedPhase::Ready
        } else {
            FeedPhase::Empty
        }
    }

    // Session identity

    pub fn session_id(&self) -> Option<&str> {
        self.session.current()
    }

    pub fn ensure_session_id(&mut self) -> String {
        self.session.ensure()
    }

    // Pagination

    /// Claims the cursor for the next page under the current generation.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        self.cursor.begin(self.generation)
    }

    /// Whether the buffer has run low enough that the next page should be
    /// requested now.
    pub fn should_prefetch(&self, threshold: usize) -> bool {
        self.cursor.can_fetch() && self.remaining_buffer() < threshold
    }

    /// Folds a fetched page into the buffer. Cards whose id is already
    /// buffered are replaced in place; new ids are appended in page order.
    pub fn merge_page(&mut self, ticket: FetchTicket, page: FeedPage) -> MergeOutcome {
        if ticket.generation != self.generation {
            return MergeOutcome::Stale;
        }

        let item_count = page.items.len();
        let mut added = 0;
        let mut updated = 0;
        for item in page.items {
            match self.index_by_id.get(&item.id) {
                Some(&idx) => {
                    self.items[idx] = item;
                    updated += 1;
                }
                None => {
                    self.index_by_id.insert(item.id, self.items.len());
                    self.items.push(item);
                    added += 1;
                }
            }
        }

        self.cursor.complete(ticket, item_count, page.has_more);
        self.last_error = None;
        MergeOutcome::Merged {
            page: ticket.page,
            added,
            updated,
            has_more: self.cursor.has_more(),
        }
    }

    /// Releases the cursor after a failed request and keeps the error for the
    /// UI. Returns `false` when the ticket belongs to an earlier generation.
    pub fn fail_page(&mut self, ticket: FetchTicket, error: ApiError) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        self.cursor.fail(ticket);
        self.last_error = Some(error);
        true
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    // Position

    pub fn advance_position(&mut self) -> bool {
        self.position.advance(self.items.len())
    }

    pub fn go_to(&mut self, index: usize) -> Result<(), OutOfRange> {
        self.position.go_to(index, self.items.len())
    }

    // Interactions

    pub fn interactions(&self) -> &HashMap<i64, InteractionKind> {
        &self.interactions
    }

    pub fn interaction(&self, item_id: i64) -> Option<InteractionKind> {
        self.interactions.get(&item_id).copied()
    }

    pub fn interaction_stats(&self) -> InteractionTally {
        InteractionTally::from_map(&self.interactions)
    }

    /// Overwrites the latest interaction for a buffered item. Returns `false`
    /// for unknown ids.
    pub fn set_interaction(&mut self, item_id: i64, kind: InteractionKind) -> bool {
        if !self.index_by_id.contains_key(&item_id) {
            return false;
        }
        self.interactions.insert(item_id, kind);
        true
    }

    /// Optimistic like delta layered on top of the server snapshot.
    pub fn optimistic_likes(&self, item_id: i64) -> i64 {
        self.optimistic_likes.get(&item_id).copied().unwrap_or(0)
    }

    /// Server-confirmed likes plus everything recorded locally since.
    pub fn local_like_count(&self, item_id: i64) -> Option<i64> {
        self.item(item_id)
            .map(|item| item.stats.like_count + self.optimistic_likes(item_id))
    }

    /// Applies the synchronous half of a swipe: interaction mapping,
    /// optimistic counter and one step forward.
    pub fn apply_interaction(
        &mut self,
        item_id: i64,
        kind: InteractionKind,
        super_like_weight: i64,
    ) -> Option<AppliedInteraction> {
        if !self.set_interaction(item_id, kind) {
            return None;
        }
        let like_delta = kind.like_delta(super_like_weight);
        if like_delta != 0 {
            *self.optimistic_likes.entry(item_id).or_insert(0) += like_delta;
        }
        self.advance_position();
        Some(AppliedInteraction {
            item_id,
            kind,
            like_delta,
            position: self.position.index(),
        })
    }

    /// Drops everything and starts a new generation. Results of requests
    /// issued before this call are discarded when they arrive.
    pub fn reset(&mut self) {
        let page_size = self.cursor.page_size();
        let generation = self.generation + 1;
        *self = Self::new(page_size);
        self.generation = generation;
    }
}
