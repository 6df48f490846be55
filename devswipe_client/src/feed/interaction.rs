use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::InteractionKind;

/// Horizontal drag distance, in pixels, past which a release counts as a swipe.
pub const SWIPE_THRESHOLD_PX: f32 = 120.0;

impl InteractionKind {
    /// Optimistic change to the local like counter. Depends on nothing but
    /// the kind and the configured super-like weight.
    pub fn like_delta(self, super_like_weight: i64) -> i64 {
        match self {
            InteractionKind::Like => 1,
            InteractionKind::SuperLike => super_like_weight,
            InteractionKind::Dislike | InteractionKind::Skip | InteractionKind::Bookmark => 0,
        }
    }
}

/// Raw input from the card surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SwipeGesture {
    /// Pointer released after a horizontal drag; negative is leftwards.
    Drag { offset_x: f32 },
    DoubleTap,
    /// One of the explicit action buttons under the card.
    Button(InteractionKind),
}

impl SwipeGesture {
    /// Leftward drags like, rightward drags dislike. Short drags snap back
    /// without recording anything.
    pub fn resolve(self) -> Option<InteractionKind> {
        match self {
            SwipeGesture::Drag { offset_x } if offset_x.abs() > SWIPE_THRESHOLD_PX => {
                if offset_x < 0.0 {
                    Some(InteractionKind::Like)
                } else {
                    Some(InteractionKind::Dislike)
                }
            }
            SwipeGesture::Drag { .. } => None,
            SwipeGesture::DoubleTap => Some(InteractionKind::SuperLike),
            SwipeGesture::Button(kind) => Some(kind),
        }
    }
}

/// Seconds between `started_at` and `now`, never negative.
pub fn view_duration_secs(started_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = (now - started_at).num_milliseconds().max(0);
    millis as f64 / 1000.0
}

/// Counts of the latest interaction per item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionTally {
    pub total: usize,
    pub likes: usize,
    pub dislikes: usize,
    pub super_likes: usize,
    pub skips: usize,
    pub bookmarks: usize,
}

impl InteractionTally {
    pub fn from_map(interactions: &HashMap<i64, InteractionKind>) -> Self {
        interactions
            .values()
            .fold(Self::default(), |mut tally, kind| {
                tally.total += 1;
                match kind {
                    InteractionKind::Like => tally.likes += 1,
                    InteractionKind::Dislike => tally.dislikes += 1,
                    InteractionKind::SuperLike => tally.super_likes += 1,
                    InteractionKind::Skip => tally.skips += 1,
                    InteractionKind::Bookmark => tally.bookmarks += 1,
                }
                tally
            })
    }
}
