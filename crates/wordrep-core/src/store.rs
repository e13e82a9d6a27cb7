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

//! The interfaces the session builder needs from its collaborators.

use std::collections::BTreeMap;

use crate::error::Fallible;
use crate::error::fail;
use crate::sm2::Rating;
use crate::types::item::Item;
use crate::types::item::ItemId;
use crate::types::review_record::ReviewRecord;
use crate::types::review_state::ReviewState;
use crate::types::timestamp::Timestamp;

/// Persistent storage for items and their review states.
pub trait ItemStore {
    /// Every item in the collection, in ascending id order.
    fn get_all_items(&self) -> Fallible<Vec<Item>>;

    /// Persist the outcome of a rating.
    ///
    /// `first_reviewed_at` is only written if the item has no first review
    /// yet. Implementations also append `rating` to their review log.
    fn save_review_state(
        &mut self,
        id: ItemId,
        state: &ReviewState,
        first_reviewed_at: Timestamp,
        rating: Rating,
    ) -> Fallible<()>;
}

/// Persistent storage for the daily new-item target. The extra bonus is never
/// persisted.
pub trait SettingsStore {
    fn daily_new_target(&self) -> usize;

    fn set_daily_new_target(&mut self, n: usize) -> Fallible<()>;
}

/// An in-memory item store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: BTreeMap<ItemId, Item>,
    log: Vec<ReviewRecord>,
    fail_next_save: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            items: items.into_iter().map(|item| (item.id(), item)).collect(),
            ..Self::default()
        }
    }

    pub fn insert(&mut self, item: Item) {
        self.items.insert(item.id(), item);
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn review_log(&self) -> &[ReviewRecord] {
        &self.log
    }

    /// Make the next call to `save_review_state` fail without writing.
    pub fn fail_next_save(&mut self) {
        self.fail_next_save = true;
    }
}

impl ItemStore for MemoryStore {
    fn get_all_items(&self) -> Fallible<Vec<Item>> {
        Ok(self.items.values().cloned().collect())
    }

    fn save_review_state(
        &mut self,
        id: ItemId,
        state: &ReviewState,
        first_reviewed_at: Timestamp,
        rating: Rating,
    ) -> Fallible<()> {
        if self.fail_next_save {
            self.fail_next_save = false;
            return fail("simulated storage failure");
        }
        let Some(item) = self.items.get_mut(&id) else {
            return fail(format!("no item with id {id}"));
        };
        item.record_review(*state, first_reviewed_at);
        self.log.push(ReviewRecord {
            item_id: id,
            rating,
            reviewed_at: state.last_reviewed_at(),
        });
        Ok(())
    }
}
