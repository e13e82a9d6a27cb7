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

//! A modified SM-2 scheduler.
//!
//! Differences from textbook SM-2:
//! - Ratings are four buttons (Again/Hard/Good/Easy) mapped onto qualities
//!   0/3/4/5.
//! - A lapse resets the streak and schedules the item for tomorrow, but does
//!   not touch the easiness factor.
//! - From the third successful review on, the interval is rounded up.

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::types::review_state::MAX_INTERVAL;
use crate::types::review_state::MIN_EASINESS;
use crate::types::review_state::ReviewState;
use crate::types::review_state::clamp_easiness;
use crate::types::timestamp::Timestamp;

/// Interval after the first successful review, in days.
const FIRST_INTERVAL: u32 = 1;

/// Interval after the second successful review, in days.
const SECOND_INTERVAL: u32 = 6;

/// Interval after a lapse, in days.
const LAPSE_INTERVAL: u32 = 1;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Again => "again",
            Rating::Hard => "hard",
            Rating::Good => "good",
            Rating::Easy => "easy",
        }
    }

    /// The 1-based ordinal used by button layouts and the review log.
    pub fn ordinal(&self) -> u8 {
        match self {
            Rating::Again => 1,
            Rating::Hard => 2,
            Rating::Good => 3,
            Rating::Easy => 4,
        }
    }

    pub fn is_lapse(&self) -> bool {
        matches!(self, Rating::Again)
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A rating value outside of the four known ratings.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidRating {
    value: String,
}

impl Display for InvalidRating {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid rating: '{}'", self.value)
    }
}

impl Error for InvalidRating {}

impl TryFrom<u8> for Rating {
    type Error = InvalidRating;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Rating::Again),
            2 => Ok(Rating::Hard),
            3 => Ok(Rating::Good),
            4 => Ok(Rating::Easy),
            _ => Err(InvalidRating {
                value: value.to_string(),
            }),
        }
    }
}

impl FromStr for Rating {
    type Err = InvalidRating;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "again" => Ok(Rating::Again),
            "hard" => Ok(Rating::Hard),
            "good" => Ok(Rating::Good),
            "easy" => Ok(Rating::Easy),
            _ => Err(InvalidRating {
                value: value.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Rating {
    type Error = InvalidRating;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The SM-2 quality of a successful rating. Lapses have no quality: they
/// bypass the easiness update entirely.
pub fn quality(rating: Rating) -> Option<u8> {
    match rating {
        Rating::Again => None,
        Rating::Hard => Some(3),
        Rating::Good => Some(4),
        Rating::Easy => Some(5),
    }
}

/// EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)), floored at 1.3.
pub fn next_easiness(ef: f64, q: u8) -> f64 {
    let d = 5.0 - f64::from(q.min(5));
    (ef + (0.1 - d * (0.08 + d * 0.02))).max(MIN_EASINESS)
}

/// Compute the state that follows `state` when it is rated at `now`.
pub fn review(state: &ReviewState, rating: Rating, now: Timestamp) -> ReviewState {
    let easiness = clamp_easiness(state.easiness);
    let (interval, repetition, easiness) = match quality(rating) {
        None => (LAPSE_INTERVAL, 0, easiness),
        Some(q) => {
            let easiness = next_easiness(easiness, q);
            let repetition = state.repetition.saturating_add(1);
            let interval = match repetition {
                1 => FIRST_INTERVAL,
                2 => SECOND_INTERVAL,
                _ => grow(state.interval, easiness),
            };
            (interval, repetition, easiness)
        }
    };
    // The counters stop together once the total hits u32::MAX.
    let (total_reviews, correct_count, wrong_count) = if state.total_reviews == u32::MAX {
        (state.total_reviews, state.correct_count, state.wrong_count)
    } else if rating.is_lapse() {
        (
            state.total_reviews + 1,
            state.correct_count,
            state.wrong_count.saturating_add(1),
        )
    } else {
        (
            state.total_reviews + 1,
            state.correct_count.saturating_add(1),
            state.wrong_count,
        )
    };
    ReviewState {
        interval,
        repetition,
        easiness,
        last_reviewed_at: now,
        due_at: now.plus_days(interval),
        total_reviews,
        correct_count,
        wrong_count,
    }
}

/// Like [`review`], but for callers holding a raw 1-4 rating value.
pub fn review_value(
    state: &ReviewState,
    value: u8,
    now: Timestamp,
) -> Result<ReviewState, InvalidRating> {
    let rating = Rating::try_from(value)?;
    Ok(review(state, rating, now))
}

/// ceil(previous * EF), between one day and [`MAX_INTERVAL`].
fn grow(previous: u32, easiness: f64) -> u32 {
    let next = (f64::from(previous) * easiness).ceil();
    if next >= f64::from(MAX_INTERVAL) {
        MAX_INTERVAL
    } else {
        (next as u32).max(1)
    }
}
