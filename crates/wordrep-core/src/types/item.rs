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

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::fail;
use crate::types::review_state::ReviewState;
use crate::types::timestamp::Timestamp;

/// The identifier a store assigns to an item.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = ErrorReport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u64>() {
            Ok(id) => Ok(Self(id)),
            Err(_) => fail(format!("invalid item id: '{s}'")),
        }
    }
}

/// The display content of a vocabulary item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub translation: String,
    pub level: String,
    #[serde(default)]
    pub sentences: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Learning,
    /// Flagged by the learner as troublesome. Informational only.
    Weak,
    /// Excluded from sessions until reset to `Learning`.
    Mastered,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Learning => "learning",
            ItemStatus::Weak => "weak",
            ItemStatus::Mastered => "mastered",
        }
    }
}

impl Display for ItemStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = ErrorReport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "learning" => Ok(ItemStatus::Learning),
            "weak" => Ok(ItemStatus::Weak),
            "mastered" => Ok(ItemStatus::Mastered),
            _ => fail(format!("invalid status: '{s}'")),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    id: ItemId,
    word: Word,
    status: ItemStatus,
    important: bool,
    review: ReviewState,
    first_reviewed_at: Option<Timestamp>,
}

impl Item {
    /// A brand-new item: never reviewed, due at creation.
    pub fn new(id: ItemId, word: Word, created_at: Timestamp) -> Self {
        Self {
            id,
            word,
            status: ItemStatus::Learning,
            important: false,
            review: ReviewState::new(created_at),
            first_reviewed_at: None,
        }
    }

    /// An item as loaded from storage.
    pub fn from_parts(
        id: ItemId,
        word: Word,
        status: ItemStatus,
        important: bool,
        review: ReviewState,
        first_reviewed_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            word,
            status,
            important,
            review,
            first_reviewed_at,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn word(&self) -> &Word {
        &self.word
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    pub fn is_important(&self) -> bool {
        self.important
    }

    pub fn review(&self) -> &ReviewState {
        &self.review
    }

    pub fn first_reviewed_at(&self) -> Option<Timestamp> {
        self.first_reviewed_at
    }

    pub fn is_mastered(&self) -> bool {
        self.status == ItemStatus::Mastered
    }

    /// Record a rating outcome. The first review timestamp is only set once.
    pub fn record_review(&mut self, review: ReviewState, at: Timestamp) {
        self.review = review;
        self.first_reviewed_at.get_or_insert(at);
    }

    pub fn set_status(&mut self, status: ItemStatus) {
        self.status = status;
    }

    pub fn set_important(&mut self, important: bool) {
        self.important = important;
    }
}
