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

//! Collection statistics.

use std::collections::HashMap;

use serde::Serialize;

use crate::sm2::Rating;
use crate::types::date::Date;
use crate::types::item::Item;
use crate::types::item::ItemStatus;
use crate::types::review_record::ReviewRecord;
use crate::types::timestamp::Timestamp;

/// Items with an interval of at least this many days are mature.
pub const MATURE_INTERVAL: u32 = 21;

/// How many days of history to report.
pub const HISTORY_DAYS: usize = 7;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub new: usize,
    pub learning: usize,
    pub mature: usize,
    pub weak: usize,
    pub important: usize,
    pub due_now: usize,
    pub learned_today: usize,
    pub total_reviews: usize,
    pub correct: usize,
    pub wrong: usize,
    /// Fraction of correct reviews, 0 when there are none.
    pub accuracy: f64,
    pub history: Vec<DayCount>,
    pub streak: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub date: Date,
    pub reviews: usize,
}

pub fn compute_stats(items: &[Item], log: &[ReviewRecord], now: Timestamp) -> Stats {
    let today = now.date();
    let mut stats = Stats {
        total: items.len(),
        ..Stats::default()
    };
    for item in items {
        let interval = item.review().interval();
        if item.status() == ItemStatus::Mastered || interval >= MATURE_INTERVAL {
            stats.mature += 1;
        } else if interval == 0 {
            stats.new += 1;
        } else {
            stats.learning += 1;
        }
        if item.status() == ItemStatus::Weak {
            stats.weak += 1;
        }
        if item.is_important() {
            stats.important += 1;
        }
        if !item.is_mastered() && item.review().is_due(now) {
            stats.due_now += 1;
        }
        if item.first_reviewed_at().is_some_and(|ts| today.contains(ts)) {
            stats.learned_today += 1;
        }
    }

    let mut per_day: HashMap<Date, usize> = HashMap::new();
    for record in log {
        stats.total_reviews += 1;
        if record.rating == Rating::Again {
            stats.wrong += 1;
        } else {
            stats.correct += 1;
        }
        *per_day.entry(record.reviewed_at.date()).or_insert(0) += 1;
    }
    if stats.total_reviews > 0 {
        stats.accuracy = stats.correct as f64 / stats.total_reviews as f64;
    }
    stats.history = today
        .trailing(HISTORY_DAYS)
        .into_iter()
        .map(|date| DayCount {
            date,
            reviews: per_day.get(&date).copied().unwrap_or(0),
        })
        .collect();
    stats.streak = streak(&per_day, today);
    stats
}

/// Consecutive days with reviews, ending today, or yesterday if there are no
/// reviews yet today.
fn streak(per_day: &HashMap<Date, usize>, today: Date) -> usize {
    let mut day = if per_day.contains_key(&today) {
        today
    } else {
        today.pred()
    };
    let mut count = 0;
    while per_day.contains_key(&day) {
        count += 1;
        let prev = day.pred();
        if prev == day {
            break;
        }
        day = prev;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;
    use crate::sm2::review;
    use crate::types::item::ItemId;
    use crate::types::item::Word;
    use crate::types::review_state::ReviewState;
    use crate::types::review_state::StoredReview;

    fn ts(s: &str) -> Timestamp {
        Timestamp::try_from(s.to_string()).unwrap()
    }

    fn now() -> Timestamp {
        ts("2024-03-10T12:00:00.000")
    }

    fn item(id: u64, interval: i64, status: ItemStatus) -> Item {
        let created = ts("2024-01-01T08:00:00.000");
        let last = ts("2024-03-01T08:00:00.000");
        let state = ReviewState::restore(
            StoredReview {
                interval: Some(interval),
                repetition: Some(if interval == 0 { 0 } else { 3 }),
                easiness: Some(2.5),
                last_reviewed_at: Some(last),
                due_at: Some(last.plus_days(interval as u32)),
                ..StoredReview::default()
            },
            created,
        );
        let word = Word {
            text: format!("w{id}"),
            translation: String::new(),
            level: "B".to_string(),
            sentences: Vec::new(),
        };
        Item::from_parts(ItemId::new(id), word, status, id % 2 == 0, state, None)
    }

    fn record(at: &str, rating: Rating) -> ReviewRecord {
        ReviewRecord {
            item_id: ItemId::new(1),
            rating,
            reviewed_at: ts(at),
        }
    }

    #[test]
    fn test_buckets() {
        let items = vec![
            item(1, 0, ItemStatus::Learning),
            item(2, 3, ItemStatus::Weak),
            item(3, 30, ItemStatus::Learning),
            item(4, 0, ItemStatus::Mastered),
            item(5, 21, ItemStatus::Learning),
        ];
        let stats = compute_stats(&items, &[], now());
        assert_eq!(stats.total, 5);
        assert_eq!(stats.new, 1);
        assert_eq!(stats.learning, 1);
        assert_eq!(stats.mature, 3);
        assert_eq!(stats.weak, 1);
        assert_eq!(stats.important, 2);
        // Item 2 fell due on 03-04; 3 and 5 are due later.
        assert_eq!(stats.due_now, 1);
        assert_eq!(stats.accuracy, 0.0);
    }

    #[test]
    fn test_learned_today() {
        let mut first = item(1, 0, ItemStatus::Learning);
        let state = review(first.review(), Rating::Good, now());
        first.record_review(state, now());
        let stats = compute_stats(&[first, item(2, 0, ItemStatus::Learning)], &[], now());
        assert_eq!(stats.learned_today, 1);
    }

    #[test]
    fn test_history_and_accuracy() -> Fallible<()> {
        let log = vec![
            record("2024-03-01T10:00:00.000", Rating::Good),
            record("2024-03-08T10:00:00.000", Rating::Again),
            record("2024-03-09T10:00:00.000", Rating::Good),
            record("2024-03-09T11:00:00.000", Rating::Easy),
        ];
        let stats = compute_stats(&[], &log, now());
        assert_eq!(stats.total_reviews, 4);
        assert_eq!(stats.correct, 3);
        assert_eq!(stats.wrong, 1);
        assert_eq!(stats.accuracy, 0.75);
        let counts: Vec<usize> = stats.history.iter().map(|d| d.reviews).collect();
        assert_eq!(counts, vec![0, 0, 0, 0, 1, 2, 0]);
        assert_eq!(stats.history[6].date, Date::try_from("2024-03-10".to_string())?);
        // No review today yet: the streak counts back from yesterday.
        assert_eq!(stats.streak, 2);
        Ok(())
    }

    #[test]
    fn test_streak_includes_today() {
        let log = vec![
            record("2024-03-08T10:00:00.000", Rating::Good),
            record("2024-03-09T10:00:00.000", Rating::Good),
            record("2024-03-10T09:00:00.000", Rating::Good),
        ];
        assert_eq!(compute_stats(&[], &log, now()).streak, 3);
    }

    #[test]
    fn test_streak_broken() {
        let log = vec![record("2024-03-07T10:00:00.000", Rating::Good)];
        assert_eq!(compute_stats(&[], &log, now()).streak, 0);
    }

    #[test]
    fn test_serializes_to_json() -> Fallible<()> {
        let stats = compute_stats(&[], &[], now());
        let json = serde_json::to_value(&stats)?;
        assert_eq!(json["history"][6]["date"], "2024-03-10");
        assert_eq!(json["streak"], 0);
        Ok(())
    }
}
