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
use std::fmt::Write;

use clap::ValueEnum;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::stats::Stats;
use crate::stats::compute_stats;
use crate::store::ItemStore;
use crate::types::timestamp::Timestamp;

#[derive(ValueEnum, Clone, Copy, PartialEq, Debug)]
pub enum StatsFormat {
    /// Human-readable text.
    Text,
    /// JSON, for scripts.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

pub fn print_stats(directory: Option<String>, format: StatsFormat) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    let items = collection.db.get_all_items()?;
    let log = collection.db.review_log()?;
    let stats = compute_stats(&items, &log, Timestamp::now());
    match format {
        StatsFormat::Text => print!("{}", render_text(&stats)),
        StatsFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
    }
    Ok(())
}

fn render_text(stats: &Stats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Words:          {}", stats.total);
    let _ = writeln!(out, "  new:          {}", stats.new);
    let _ = writeln!(out, "  learning:     {}", stats.learning);
    let _ = writeln!(out, "  mature:       {}", stats.mature);
    let _ = writeln!(out, "  weak:         {}", stats.weak);
    let _ = writeln!(out, "  important:    {}", stats.important);
    let _ = writeln!(out, "Due now:        {}", stats.due_now);
    let _ = writeln!(out, "Learned today:  {}", stats.learned_today);
    let _ = writeln!(
        out,
        "Reviews:        {} ({} correct, {} wrong, {:.0}% accuracy)",
        stats.total_reviews,
        stats.correct,
        stats.wrong,
        stats.accuracy * 100.0
    );
    let _ = writeln!(out, "Streak:         {} days", stats.streak);
    let _ = writeln!(out, "Last 7 days:");
    for day in &stats.history {
        let _ = writeln!(out, "  {}  {}", day.date, day.reviews);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sm2::Rating;
    use crate::types::item::ItemId;
    use crate::types::review_record::ReviewRecord;

    #[test]
    fn test_render_text() -> Fallible<()> {
        let now = Timestamp::try_from("2024-03-10T12:00:00.000".to_string())?;
        let log = vec![
            ReviewRecord {
                item_id: ItemId::new(1),
                rating: Rating::Good,
                reviewed_at: now,
            },
            ReviewRecord {
                item_id: ItemId::new(1),
                rating: Rating::Again,
                reviewed_at: now,
            },
        ];
        let text = render_text(&compute_stats(&[], &log, now));
        assert!(text.contains("Reviews:        2 (1 correct, 1 wrong, 50% accuracy)"));
        assert!(text.contains("Streak:         1 days"));
        assert!(text.contains("  2024-03-10  2"));
        Ok(())
    }
}
