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

//! Session queue construction.
//!
//! A session shows every due review first, then as many never-reviewed items
//! as the day's remaining new-item quota allows. Items rated `Again` come back
//! a few cards later; any other rating retires them for the session.

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

use log::debug;

use crate::error::ErrorReport;
use crate::rng::TinyRng;
use crate::sm2::Rating;
use crate::sm2::review;
use crate::store::ItemStore;
use crate::types::date::Date;
use crate::types::item::Item;
use crate::types::item::ItemId;
use crate::types::review_state::ReviewState;
use crate::types::timestamp::Timestamp;

pub const DEFAULT_DAILY_NEW_TARGET: usize = 30;

/// A failed item comes back after this many cards, at the earliest.
const REINSERT_MIN: u32 = 5;

/// A failed item comes back after this many cards, at the latest.
const REINSERT_MAX: u32 = 7;

/// Which items count as mastered, and are therefore never scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MasteryRule {
    /// Only items explicitly marked as mastered.
    #[default]
    Flag,
    /// Marked items, and items whose interval reached this many days.
    IntervalAtLeast(u32),
}

impl MasteryRule {
    pub fn is_mastered(&self, item: &Item) -> bool {
        match self {
            MasteryRule::Flag => item.is_mastered(),
            MasteryRule::IntervalAtLeast(days) => {
                item.is_mastered() || item.review().interval() >= *days
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub daily_new_base_target: usize,
    pub mastery: MasteryRule,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            daily_new_base_target: DEFAULT_DAILY_NEW_TARGET,
            mastery: MasteryRule::default(),
        }
    }
}

/// The ordered items of a session. The head is the item being presented.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionQueue {
    items: Vec<Item>,
}

impl SessionQueue {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn front(&self) -> Option<&Item> {
        self.items.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(Item::id).collect()
    }

    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }
}

/// The numbers behind a queue build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueueSummary {
    pub target: usize,
    pub extra: usize,
    pub learned_today: usize,
    pub remaining_quota: usize,
    pub due: usize,
    pub new: usize,
}

/// Build the queue for `now` from the full collection.
///
/// Due reviews come first and are never capped. Never-reviewed items follow,
/// capped at the target minus the items first reviewed today. Both groups keep
/// collection order.
pub fn build_queue(
    items: &[Item],
    now: Timestamp,
    config: &SessionConfig,
    extra: usize,
) -> (SessionQueue, QueueSummary) {
    let today = now.date();
    let target = config.daily_new_base_target.saturating_add(extra);
    let learned_today = items
        .iter()
        .filter(|item| item.first_reviewed_at().is_some_and(|ts| today.contains(ts)))
        .count();
    let remaining_quota = target.saturating_sub(learned_today);

    let schedulable: Vec<&Item> = items
        .iter()
        .filter(|item| !config.mastery.is_mastered(item))
        .collect();
    let due: Vec<Item> = schedulable
        .iter()
        .filter(|item| item.review().is_due(now))
        .map(|item| (*item).clone())
        .collect();
    let new: Vec<Item> = schedulable
        .iter()
        .filter(|item| item.review().repetition() == 0)
        .take(remaining_quota)
        .map(|item| (*item).clone())
        .collect();

    let summary = QueueSummary {
        target,
        extra,
        learned_today,
        remaining_quota,
        due: due.len(),
        new: new.len(),
    };
    let mut queue = due;
    queue.extend(new);
    debug!(
        "Session generated: queue {} (learned today {}, quota left {}, extra {}, due {})",
        queue.len(),
        learned_today,
        remaining_quota,
        extra,
        summary.due
    );
    (SessionQueue { items: queue }, summary)
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// The rated item is not part of the session.
    NotInQueue(ItemId),
    /// The store rejected the new review state. The session is unchanged.
    Persist(ErrorReport),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::NotInQueue(id) => write!(f, "item {id} is not in the session"),
            SessionError::Persist(report) => {
                write!(f, "failed to save review: {}", report.message())
            }
        }
    }
}

impl Error for SessionError {}

/// Extra new items granted for one calendar day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExtraWords {
    pub count: usize,
    pub day: Option<Date>,
}

/// The owner of a session's queue. Every queue mutation goes through here.
#[derive(Clone, Debug)]
pub struct SessionBuilder {
    config: SessionConfig,
    queue: SessionQueue,
    summary: QueueSummary,
    extra: ExtraWords,
    rng: TinyRng,
}

impl SessionBuilder {
    /// An empty session. Call [`SessionBuilder::rebuild`] to fill it.
    pub fn new(config: SessionConfig, rng: TinyRng) -> Self {
        Self {
            config,
            queue: SessionQueue::default(),
            summary: QueueSummary::default(),
            extra: ExtraWords::default(),
            rng,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn queue(&self) -> &SessionQueue {
        &self.queue
    }

    pub fn summary(&self) -> &QueueSummary {
        &self.summary
    }

    pub fn extra_words(&self) -> ExtraWords {
        self.extra
    }

    /// The item to present next.
    pub fn current(&self) -> Option<&Item> {
        self.queue.front()
    }

    pub fn is_complete(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_session_complete(&self) -> bool {
        self.is_complete()
    }

    /// Rebuild the queue from scratch. Rebuilding twice with the same inputs
    /// yields the same queue.
    pub fn rebuild(&mut self, items: &[Item], now: Timestamp) {
        self.roll_over(now.date());
        let (queue, summary) = build_queue(items, now, &self.config, self.extra.count);
        self.queue = queue;
        self.summary = summary;
    }

    /// Rate an item of the session.
    ///
    /// The new state is persisted before the queue changes. If the store fails,
    /// the queue is left exactly as it was and the call can be retried.
    pub fn submit_rating<S: ItemStore + ?Sized>(
        &mut self,
        store: &mut S,
        id: ItemId,
        rating: Rating,
        now: Timestamp,
    ) -> Result<ReviewState, SessionError> {
        let position = self
            .queue
            .position(id)
            .ok_or(SessionError::NotInQueue(id))?;
        let next = review(self.queue.items[position].review(), rating, now);
        store
            .save_review_state(id, &next, now, rating)
            .map_err(SessionError::Persist)?;

        let mut item = self.queue.items.remove(position);
        item.record_review(next, now);
        if rating.is_lapse() {
            let offset = self.rng.between(REINSERT_MIN, REINSERT_MAX) as usize;
            let at = offset.min(self.queue.len());
            self.queue.items.insert(at, item);
            debug!(
                "Rated {id} {rating}: re-inserted at {at}, queue length {}",
                self.queue.len()
            );
        } else {
            debug!(
                "Rated {id} {rating}: removed, queue length {}",
                self.queue.len()
            );
            if self.queue.is_empty() {
                debug!("Session complete");
            }
        }
        Ok(next)
    }

    /// Allow `count` more new items today, and rebuild.
    pub fn add_extra_words(&mut self, items: &[Item], count: usize, now: Timestamp) {
        let today = now.date();
        self.roll_over(today);
        self.extra = ExtraWords {
            count: self.extra.count.saturating_add(count),
            day: Some(today),
        };
        self.rebuild(items, now);
    }

    /// Replace the daily base target, and rebuild.
    pub fn update_daily_target(&mut self, items: &[Item], n: usize, now: Timestamp) {
        self.config.daily_new_base_target = n;
        self.rebuild(items, now);
    }

    fn roll_over(&mut self, today: Date) {
        if self.extra.day.is_some_and(|day| day != today) {
            debug!("New day: dropping {} extra words", self.extra.count);
            self.extra = ExtraWords::default();
        }
    }
}

/// Start a session with the default mastery rule.
pub fn init_session(
    items: &[Item],
    now: Timestamp,
    daily_new_base_target: usize,
    rng: TinyRng,
) -> SessionBuilder {
    let config = SessionConfig {
        daily_new_base_target,
        ..SessionConfig::default()
    };
    let mut session = SessionBuilder::new(config, rng);
    session.rebuild(items, now);
    session
}
