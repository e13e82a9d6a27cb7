// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::Deserialize;
use serde::Serialize;

use crate::types::timestamp::Timestamp;

/// The easiness factor every item starts with.
pub const INITIAL_EASINESS: f64 = 2.5;

/// The easiness factor never drops below this.
pub const MIN_EASINESS: f64 = 1.3;

/// The longest interval the scheduler hands out, in days (about a century).
pub const MAX_INTERVAL: u32 = 36_500;

/// The scheduling state of a single item.
///
/// Only [`crate::sm2::review`] produces new values of the scheduling fields;
/// everything else reads them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    /// Days until the next review. Zero means never successfully reviewed.
    pub(crate) interval: u32,
    /// Consecutive successful reviews since the last lapse.
    pub(crate) repetition: u32,
    /// The SM-2 easiness factor.
    #[serde(rename = "efactor")]
    pub(crate) easiness: f64,
    /// When the item was last reviewed (creation time for new items).
    #[serde(rename = "lastReviewDate")]
    pub(crate) last_reviewed_at: Timestamp,
    /// When the item next becomes eligible for review.
    #[serde(rename = "dueDate")]
    pub(crate) due_at: Timestamp,
    #[serde(default)]
    pub(crate) total_reviews: u32,
    #[serde(default)]
    pub(crate) correct_count: u32,
    #[serde(default)]
    pub(crate) wrong_count: u32,
}

impl ReviewState {
    /// The state of an item created at `created_at`: never reviewed, and due
    /// immediately.
    pub fn new(created_at: Timestamp) -> Self {
        Self {
            interval: 0,
            repetition: 0,
            easiness: INITIAL_EASINESS,
            last_reviewed_at: created_at,
            due_at: created_at,
            total_reviews: 0,
            correct_count: 0,
            wrong_count: 0,
        }
    }

    /// Rebuild a state from a possibly incomplete stored record.
    ///
    /// A record without a repetition count or due date is treated as a new
    /// item. Out-of-range values are clamped rather than rejected.
    pub fn restore(stored: StoredReview, created_at: Timestamp) -> Self {
        let (total_reviews, correct_count, wrong_count) = restore_counters(
            to_count(stored.total_reviews),
            to_count(stored.correct_count),
            to_count(stored.wrong_count),
        );
        let mut state = Self {
            total_reviews,
            correct_count,
            wrong_count,
            ..Self::new(created_at)
        };
        let (Some(repetition), Some(due_at)) = (stored.repetition, stored.due_at) else {
            return state;
        };
        let interval = to_count(stored.interval);
        if interval == 0 {
            return state;
        }
        let last_reviewed_at = stored.last_reviewed_at.unwrap_or(created_at).min(due_at);
        state.interval = interval.min(MAX_INTERVAL);
        state.repetition = to_count(Some(repetition));
        state.easiness = clamp_easiness(stored.easiness.unwrap_or(INITIAL_EASINESS));
        state.last_reviewed_at = last_reviewed_at;
        state.due_at = due_at;
        state
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn repetition(&self) -> u32 {
        self.repetition
    }

    pub fn easiness(&self) -> f64 {
        self.easiness
    }

    pub fn last_reviewed_at(&self) -> Timestamp {
        self.last_reviewed_at
    }

    pub fn due_at(&self) -> Timestamp {
        self.due_at
    }

    pub fn total_reviews(&self) -> u32 {
        self.total_reviews
    }

    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    pub fn wrong_count(&self) -> u32 {
        self.wrong_count
    }

    /// Whether the item has never been successfully reviewed.
    pub fn is_new(&self) -> bool {
        self.repetition == 0 && self.interval == 0
    }

    /// Whether a previously learned item is due at `now`.
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.repetition > 0 && self.due_at <= now
    }
}

/// A review state as a storage backend hands it over. Any column may be
/// missing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StoredReview {
    pub interval: Option<i64>,
    pub repetition: Option<i64>,
    pub easiness: Option<f64>,
    pub last_reviewed_at: Option<Timestamp>,
    pub due_at: Option<Timestamp>,
    pub total_reviews: Option<i64>,
    pub correct_count: Option<i64>,
    pub wrong_count: Option<i64>,
}

impl From<&ReviewState> for StoredReview {
    fn from(state: &ReviewState) -> Self {
        Self {
            interval: Some(i64::from(state.interval)),
            repetition: Some(i64::from(state.repetition)),
            easiness: Some(state.easiness),
            last_reviewed_at: Some(state.last_reviewed_at),
            due_at: Some(state.due_at),
            total_reviews: Some(i64::from(state.total_reviews)),
            correct_count: Some(i64::from(state.correct_count)),
            wrong_count: Some(i64::from(state.wrong_count)),
        }
    }
}

/// Clamp an easiness factor into the valid domain. Non-finite values fall
/// back to the floor.
pub(crate) fn clamp_easiness(ef: f64) -> f64 {
    if ef.is_finite() {
        ef.max(MIN_EASINESS)
    } else {
        MIN_EASINESS
    }
}

/// Reconcile stored counters so that `correct + wrong == total`.
///
/// Unclassified reviews are booked as wrong. The total saturates at
/// `u32::MAX`; correct answers keep priority when the sum has to shrink.
fn restore_counters(total: u32, correct: u32, wrong: u32) -> (u32, u32, u32) {
    let classified = u64::from(correct) + u64::from(wrong);
    let total = u64::from(total).max(classified).min(u64::from(u32::MAX)) as u32;
    let correct = correct.min(total);
    (total, correct, total - correct)
}

fn to_count(value: Option<i64>) -> u32 {
    value
        .unwrap_or(0)
        .clamp(0, i64::from(u32::MAX))
        .try_into()
        .unwrap_or(0)
}
