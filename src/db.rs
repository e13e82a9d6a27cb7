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

use std::path::Path;

use log::debug;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::Transaction;
use rusqlite::params;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::sm2::Rating;
use crate::store::ItemStore;
use crate::types::item::Item;
use crate::types::item::ItemId;
use crate::types::item::ItemStatus;
use crate::types::item::Word;
use crate::types::review_record::ReviewRecord;
use crate::types::review_state::ReviewState;
use crate::types::review_state::StoredReview;
use crate::types::timestamp::Timestamp;
use crate::wordlist::merge_word;

const SCHEMA: &str = "
    create table if not exists vocabulary (
        id integer primary key autoincrement,
        word text not null unique,
        level text not null,
        translation text not null default '',
        sentences_json text not null default '[]',
        status text not null default 'learning',
        is_important integer not null default 0,
        created_at text not null
    );
    create table if not exists progress (
        word_id integer primary key references vocabulary(id) on delete cascade,
        interval integer,
        repetition integer,
        efactor real,
        last_review_date text,
        due_date text,
        first_review_date text,
        total_reviews integer default 0,
        correct_count integer default 0,
        wrong_count integer default 0
    );
    create table if not exists reviews (
        id integer primary key autoincrement,
        word_id integer not null references vocabulary(id) on delete cascade,
        rating text not null,
        reviewed_at text not null
    );
";

const SELECT_ITEMS: &str = "
    select v.id, v.word, v.translation, v.level, v.sentences_json, v.status,
           v.is_important, v.created_at,
           p.interval, p.repetition, p.efactor, p.last_review_date, p.due_date,
           p.first_review_date, p.total_reviews, p.correct_count, p.wrong_count
    from vocabulary v
    left join progress p on p.word_id = v.id
";

fn sql(e: rusqlite::Error) -> ErrorReport {
    ErrorReport::new(format!("Database error: {e}"))
}

fn sql_id(id: ItemId) -> Fallible<i64> {
    match i64::try_from(id.get()) {
        Ok(id) => Ok(id),
        Err(_) => fail(format!("item id out of range: {id}")),
    }
}

pub struct Database {
    conn: Connection,
}

/// Criteria for browsing the collection. Empty criteria match everything.
#[derive(Clone, Debug, Default)]
pub struct WordFilter {
    /// Case-insensitive substring of the word or its translation.
    pub search: Option<String>,
    /// One of the item's levels. Merged levels like `B/C` match both.
    pub level: Option<String>,
    pub important_only: bool,
}

impl WordFilter {
    pub fn matches(&self, item: &Item) -> bool {
        let word = item.word();
        if self.important_only && !item.is_important() {
            return false;
        }
        if let Some(level) = &self.level {
            let level = level.trim();
            if !word
                .level
                .split('/')
                .any(|l| l.trim().eq_ignore_ascii_case(level))
            {
                return false;
            }
        }
        match &self.search {
            Some(query) => {
                let query = query.to_lowercase();
                word.text.to_lowercase().contains(&query)
                    || word.translation.to_lowercase().contains(&query)
            }
            None => true,
        }
    }
}

/// What an import did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub merged: usize,
}

impl Database {
    pub fn new(path: &Path) -> Fallible<Self> {
        let conn = Connection::open(path).map_err(sql)?;
        conn.execute_batch("pragma foreign_keys = on;").map_err(sql)?;
        conn.execute_batch(SCHEMA).map_err(sql)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Bring databases written by older versions up to date.
    fn migrate(&self) -> Fallible<()> {
        let mut stmt = self
            .conn
            .prepare("select name from pragma_table_info('progress')")
            .map_err(sql)?;
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .map_err(sql)?
            .collect::<Result<_, _>>()
            .map_err(sql)?;
        for (column, decl) in [
            ("first_review_date", "text"),
            ("total_reviews", "integer default 0"),
            ("correct_count", "integer default 0"),
            ("wrong_count", "integer default 0"),
        ] {
            if !columns.iter().any(|c| c == column) {
                debug!("Migrating: adding progress.{column}");
                self.conn
                    .execute_batch(&format!("alter table progress add column {column} {decl};"))
                    .map_err(sql)?;
            }
        }
        Ok(())
    }

    pub fn item_count(&self) -> Fallible<usize> {
        let count: i64 = self
            .conn
            .query_row("select count(*) from vocabulary", [], |row| row.get(0))
            .map_err(sql)?;
        Ok(count as usize)
    }

    pub fn get_item(&self, id: ItemId) -> Fallible<Option<Item>> {
        let sql_query = format!("{SELECT_ITEMS} where v.id = ?1");
        let row = self
            .conn
            .query_row(&sql_query, [sql_id(id)?], ItemRow::read)
            .optional()
            .map_err(sql)?;
        row.map(ItemRow::into_item).transpose()
    }

    /// Import words, merging into rows with the same word text.
    pub fn import_words(&mut self, words: &[Word], now: Timestamp) -> Fallible<ImportSummary> {
        let tx = self.conn.transaction().map_err(sql)?;
        let mut summary = ImportSummary::default();
        for word in words {
            let existing: Option<(i64, String, String, String)> = tx
                .query_row(
                    "select id, translation, level, sentences_json from vocabulary where word = ?1",
                    [&word.text],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
                )
                .optional()
                .map_err(sql)?;
            match existing {
                Some((id, translation, level, sentences_json)) => {
                    let mut merged = Word {
                        text: word.text.clone(),
                        translation,
                        level,
                        sentences: parse_sentences(&sentences_json),
                    };
                    merge_word(&mut merged, word);
                    tx.execute(
                        "update vocabulary set translation = ?1, level = ?2, sentences_json = ?3 where id = ?4",
                        params![
                            merged.translation,
                            merged.level,
                            serde_json::to_string(&merged.sentences)?,
                            id
                        ],
                    )
                    .map_err(sql)?;
                    summary.merged += 1;
                }
                None => {
                    insert_word(&tx, word, ItemStatus::Learning, false, now, None)?;
                    summary.added += 1;
                }
            }
        }
        tx.commit().map_err(sql)?;
        debug!(
            "Imported {} new words, merged {}",
            summary.added, summary.merged
        );
        Ok(summary)
    }

    /// Add a single word. Fails if the word text is already in the collection.
    pub fn add_word(&mut self, word: &Word, now: Timestamp) -> Fallible<ItemId> {
        let tx = self.conn.transaction().map_err(sql)?;
        let existing: Option<i64> = tx
            .query_row(
                "select id from vocabulary where word = ?1",
                [&word.text],
                |row| row.get(0),
            )
            .optional()
            .map_err(sql)?;
        if let Some(id) = existing {
            return fail(format!(
                "'{}' is already in the collection as item {id}.",
                word.text
            ));
        }
        insert_word(&tx, word, ItemStatus::Learning, false, now, None)?;
        let rowid = tx.last_insert_rowid();
        tx.commit().map_err(sql)?;
        let Ok(id) = u64::try_from(rowid) else {
            return fail(format!("invalid item id in database: {rowid}"));
        };
        debug!("Added '{}' as item {id}", word.text);
        Ok(ItemId::new(id))
    }

    /// The items matching `filter`, in id order.
    pub fn list_items(&self, filter: &WordFilter) -> Fallible<Vec<Item>> {
        let items = self.get_all_items()?;
        Ok(items.into_iter().filter(|item| filter.matches(item)).collect())
    }

    pub fn set_status(&mut self, id: ItemId, status: ItemStatus) -> Fallible<()> {
        let changed = self
            .conn
            .execute(
                "update vocabulary set status = ?1 where id = ?2",
                params![status.as_str(), sql_id(id)?],
            )
            .map_err(sql)?;
        if changed == 0 {
            return fail(format!("no item with id {id}"));
        }
        Ok(())
    }

    /// Flip the important flag. Returns the new value.
    pub fn toggle_important(&mut self, id: ItemId) -> Fallible<bool> {
        let changed = self
            .conn
            .execute(
                "update vocabulary set is_important = 1 - is_important where id = ?1",
                [sql_id(id)?],
            )
            .map_err(sql)?;
        if changed == 0 {
            return fail(format!("no item with id {id}"));
        }
        let important: bool = self
            .conn
            .query_row(
                "select is_important from vocabulary where id = ?1",
                [sql_id(id)?],
                |row| row.get(0),
            )
            .map_err(sql)?;
        Ok(important)
    }

    /// Forget all progress. Every item becomes new again.
    pub fn reset_progress(&mut self) -> Fallible<usize> {
        let tx = self.conn.transaction().map_err(sql)?;
        let count = tx.execute("delete from progress", []).map_err(sql)?;
        tx.execute("delete from reviews", []).map_err(sql)?;
        tx.commit().map_err(sql)?;
        debug!("Reset progress of {count} items");
        Ok(count)
    }

    pub fn review_log(&self) -> Fallible<Vec<ReviewRecord>> {
        let mut stmt = self
            .conn
            .prepare("select word_id, rating, reviewed_at from reviews order by id")
            .map_err(sql)?;
        let rows: Vec<(i64, String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .map_err(sql)?
            .collect::<Result<_, _>>()
            .map_err(sql)?;
        let mut log = Vec::with_capacity(rows.len());
        for (id, rating, reviewed_at) in rows {
            log.push(ReviewRecord {
                item_id: ItemId::new(id as u64),
                rating: rating.parse::<Rating>()?,
                reviewed_at: Timestamp::try_from(reviewed_at)?,
            });
        }
        Ok(log)
    }

    pub fn export_backup(&self, now: Timestamp) -> Fallible<Backup> {
        let items = self.get_all_items()?;
        let mut words = Vec::with_capacity(items.len());
        let mut progress = Vec::new();
        let mut stmt = self
            .conn
            .prepare("select created_at from vocabulary where id = ?1")
            .map_err(sql)?;
        let has_progress = self.progress_ids()?;
        for item in items {
            let created_at: String = stmt
                .query_row([sql_id(item.id())?], |row| row.get(0))
                .map_err(sql)?;
            words.push(BackupWord {
                id: item.id(),
                word: item.word().text.clone(),
                translation: item.word().translation.clone(),
                level: item.word().level.clone(),
                sentences: item.word().sentences.clone(),
                status: item.status(),
                important: item.is_important(),
                created_at: Timestamp::try_from(created_at)?,
            });
            if has_progress.contains(&item.id()) {
                progress.push(BackupProgress::from_item(&item));
            }
        }
        Ok(Backup {
            version: BACKUP_VERSION,
            date: Some(now),
            words: Some(words),
            progress: Some(progress),
        })
    }

    /// Replace the whole collection with the contents of a backup.
    pub fn restore_backup(&mut self, backup: &Backup) -> Fallible<(usize, usize)> {
        let (Some(words), Some(progress)) = (&backup.words, &backup.progress) else {
            return fail("invalid backup: missing words or progress");
        };
        let tx = self.conn.transaction().map_err(sql)?;
        tx.execute("delete from reviews", []).map_err(sql)?;
        tx.execute("delete from progress", []).map_err(sql)?;
        tx.execute("delete from vocabulary", []).map_err(sql)?;
        for word in words {
            let content = Word {
                text: word.word.clone(),
                translation: word.translation.clone(),
                level: word.level.clone(),
                sentences: word.sentences.clone(),
            };
            insert_word(
                &tx,
                &content,
                word.status,
                word.important,
                word.created_at,
                Some(word.id),
            )?;
        }
        for p in progress {
            tx.execute(
                "insert into progress (word_id, interval, repetition, efactor, last_review_date, due_date, first_review_date, total_reviews, correct_count, wrong_count)
                 values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    sql_id(p.word_id)?,
                    p.interval,
                    p.repetition,
                    p.efactor,
                    p.last_review_date.map(String::from),
                    p.due_date.map(String::from),
                    p.first_review_date.map(String::from),
                    p.total_reviews.unwrap_or(0),
                    p.correct_count.unwrap_or(0),
                    p.wrong_count.unwrap_or(0),
                ],
            )
            .map_err(sql)?;
        }
        tx.commit().map_err(sql)?;
        debug!(
            "Restored {} words and {} progress rows",
            words.len(),
            progress.len()
        );
        Ok((words.len(), progress.len()))
    }

    fn progress_ids(&self) -> Fallible<Vec<ItemId>> {
        let mut stmt = self
            .conn
            .prepare("select word_id from progress")
            .map_err(sql)?;
        let ids: Vec<i64> = stmt
            .query_map([], |row| row.get(0))
            .map_err(sql)?
            .collect::<Result<_, _>>()
            .map_err(sql)?;
        Ok(ids.into_iter().map(|id| ItemId::new(id as u64)).collect())
    }
}

impl ItemStore for Database {
    fn get_all_items(&self) -> Fallible<Vec<Item>> {
        let sql_query = format!("{SELECT_ITEMS} order by v.id");
        let mut stmt = self.conn.prepare(&sql_query).map_err(sql)?;
        let rows: Vec<ItemRow> = stmt
            .query_map([], ItemRow::read)
            .map_err(sql)?
            .collect::<Result<_, _>>()
            .map_err(sql)?;
        rows.into_iter().map(ItemRow::into_item).collect()
    }

    fn save_review_state(
        &mut self,
        id: ItemId,
        state: &ReviewState,
        first_reviewed_at: Timestamp,
        rating: Rating,
    ) -> Fallible<()> {
        let id = sql_id(id)?;
        let tx = self.conn.transaction().map_err(sql)?;
        let exists: Option<i64> = tx
            .query_row("select id from vocabulary where id = ?1", [id], |row| {
                row.get(0)
            })
            .optional()
            .map_err(sql)?;
        if exists.is_none() {
            return fail(format!("no item with id {id}"));
        }
        tx.execute(
            "insert into progress (word_id, interval, repetition, efactor, last_review_date, due_date, first_review_date, total_reviews, correct_count, wrong_count)
             values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             on conflict(word_id) do update set
                interval = excluded.interval,
                repetition = excluded.repetition,
                efactor = excluded.efactor,
                last_review_date = excluded.last_review_date,
                due_date = excluded.due_date,
                total_reviews = excluded.total_reviews,
                correct_count = excluded.correct_count,
                wrong_count = excluded.wrong_count,
                first_review_date = coalesce(progress.first_review_date, excluded.first_review_date)",
            params![
                id,
                state.interval(),
                state.repetition(),
                state.easiness(),
                state.last_reviewed_at().to_string(),
                state.due_at().to_string(),
                first_reviewed_at.to_string(),
                state.total_reviews(),
                state.correct_count(),
                state.wrong_count(),
            ],
        )
        .map_err(sql)?;
        tx.execute(
            "insert into reviews (word_id, rating, reviewed_at) values (?1, ?2, ?3)",
            params![id, rating.as_str(), state.last_reviewed_at().to_string()],
        )
        .map_err(sql)?;
        tx.commit().map_err(sql)?;
        Ok(())
    }
}

fn insert_word(
    tx: &Transaction,
    word: &Word,
    status: ItemStatus,
    important: bool,
    created_at: Timestamp,
    id: Option<ItemId>,
) -> Fallible<()> {
    let id = id.map(sql_id).transpose()?;
    tx.execute(
        "insert into vocabulary (id, word, level, translation, sentences_json, status, is_important, created_at)
         values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            id,
            word.text,
            word.level,
            word.translation,
            serde_json::to_string(&word.sentences)?,
            status.as_str(),
            important,
            created_at.to_string(),
        ],
    )
    .map_err(sql)?;
    Ok(())
}

fn parse_sentences(json: &str) -> Vec<String> {
    serde_json::from_str(json).unwrap_or_default()
}

fn parse_timestamp(value: Option<String>) -> Option<Timestamp> {
    value.and_then(|s| Timestamp::try_from(s).ok())
}

/// A raw row of the item query.
struct ItemRow {
    id: i64,
    word: String,
    translation: String,
    level: String,
    sentences_json: String,
    status: String,
    important: bool,
    created_at: String,
    interval: Option<i64>,
    repetition: Option<i64>,
    efactor: Option<f64>,
    last_review_date: Option<String>,
    due_date: Option<String>,
    first_review_date: Option<String>,
    total_reviews: Option<i64>,
    correct_count: Option<i64>,
    wrong_count: Option<i64>,
}

impl ItemRow {
    fn read(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            word: row.get(1)?,
            translation: row.get(2)?,
            level: row.get(3)?,
            sentences_json: row.get(4)?,
            status: row.get(5)?,
            important: row.get(6)?,
            created_at: row.get(7)?,
            interval: row.get(8)?,
            repetition: row.get(9)?,
            efactor: row.get(10)?,
            last_review_date: row.get(11)?,
            due_date: row.get(12)?,
            first_review_date: row.get(13)?,
            total_reviews: row.get(14)?,
            correct_count: row.get(15)?,
            wrong_count: row.get(16)?,
        })
    }

    fn into_item(self) -> Fallible<Item> {
        let Ok(id) = u64::try_from(self.id) else {
            return fail(format!("invalid item id in database: {}", self.id));
        };
        let created_at = Timestamp::try_from(self.created_at)?;
        let review = ReviewState::restore(
            StoredReview {
                interval: self.interval,
                repetition: self.repetition,
                easiness: self.efactor,
                last_reviewed_at: parse_timestamp(self.last_review_date),
                due_at: parse_timestamp(self.due_date),
                total_reviews: self.total_reviews,
                correct_count: self.correct_count,
                wrong_count: self.wrong_count,
            },
            created_at,
        );
        let word = Word {
            text: self.word,
            translation: self.translation,
            level: self.level,
            sentences: parse_sentences(&self.sentences_json),
        };
        let status = self.status.parse().unwrap_or_default();
        Ok(Item::from_parts(
            ItemId::new(id),
            word,
            status,
            self.important,
            review,
            parse_timestamp(self.first_review_date),
        ))
    }
}

pub const BACKUP_VERSION: u32 = 1;

/// A full copy of the collection.
#[derive(Debug, Serialize, Deserialize)]
pub struct Backup {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub date: Option<Timestamp>,
    pub words: Option<Vec<BackupWord>>,
    pub progress: Option<Vec<BackupProgress>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BackupWord {
    pub id: ItemId,
    pub word: String,
    #[serde(default)]
    pub translation: String,
    pub level: String,
    #[serde(default)]
    pub sentences: Vec<String>,
    #[serde(default)]
    pub status: ItemStatus,
    #[serde(default)]
    pub important: bool,
    pub created_at: Timestamp,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BackupProgress {
    pub word_id: ItemId,
    pub interval: Option<u32>,
    pub repetition: Option<u32>,
    pub efactor: Option<f64>,
    pub last_review_date: Option<Timestamp>,
    pub due_date: Option<Timestamp>,
    pub first_review_date: Option<Timestamp>,
    pub total_reviews: Option<u32>,
    pub correct_count: Option<u32>,
    pub wrong_count: Option<u32>,
}

impl BackupProgress {
    fn from_item(item: &Item) -> Self {
        let review = item.review();
        Self {
            word_id: item.id(),
            interval: Some(review.interval()),
            repetition: Some(review.repetition()),
            efactor: Some(review.easiness()),
            last_review_date: Some(review.last_reviewed_at()),
            due_date: Some(review.due_at()),
            first_review_date: item.first_reviewed_at(),
            total_reviews: Some(review.total_reviews()),
            correct_count: Some(review.correct_count()),
            wrong_count: Some(review.wrong_count()),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::sm2::review;

    fn ts(s: &str) -> Timestamp {
        Timestamp::try_from(s.to_string()).unwrap()
    }

    fn word(text: &str) -> Word {
        Word {
            text: text.to_string(),
            translation: format!("{text}-tr"),
            level: "B".to_string(),
            sentences: vec![format!("{text} sentence")],
        }
    }

    fn open() -> Fallible<(tempfile::TempDir, Database)> {
        let dir = tempdir()?;
        let db = Database::new(&dir.path().join("wordrep.db"))?;
        Ok((dir, db))
    }

    #[test]
    fn test_import_and_load() -> Fallible<()> {
        let (_dir, mut db) = open()?;
        let now = ts("2024-03-10T12:00:00.000");
        let summary = db.import_words(&[word("a"), word("b")], now)?;
        assert_eq!(summary, ImportSummary { added: 2, merged: 0 });
        let items = db.get_all_items()?;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].word(), &word("a"));
        assert!(items[0].review().is_new());
        assert_eq!(items[0].review().due_at(), now);
        assert_eq!(items[0].first_reviewed_at(), None);
        Ok(())
    }

    #[test]
    fn test_import_merges_existing() -> Fallible<()> {
        let (_dir, mut db) = open()?;
        let now = ts("2024-03-10T12:00:00.000");
        db.import_words(&[word("a")], now)?;
        let again = Word {
            level: "C".to_string(),
            ..word("a")
        };
        let summary = db.import_words(&[again], now)?;
        assert_eq!(summary, ImportSummary { added: 0, merged: 1 });
        let items = db.get_all_items()?;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].word().level, "B/C");
        Ok(())
    }

    #[test]
    fn test_add_word() -> Fallible<()> {
        let (_dir, mut db) = open()?;
        let now = ts("2024-03-10T12:00:00.000");
        db.import_words(&[word("a")], now)?;
        let id = db.add_word(&word("b"), now)?;
        let item = db.get_item(id)?.unwrap();
        assert_eq!(item.word(), &word("b"));
        assert!(item.review().is_new());

        let err = db.add_word(&word("a"), now).unwrap_err();
        assert!(err.to_string().contains("already in the collection"));
        assert_eq!(db.item_count()?, 2);
        Ok(())
    }

    #[test]
    fn test_list_items_filters() -> Fallible<()> {
        let (_dir, mut db) = open()?;
        let now = ts("2024-03-10T12:00:00.000");
        let words = [
            Word {
                translation: "Price".to_string(),
                ..word("가격")
            },
            Word {
                level: "C".to_string(),
                ..word("가치")
            },
            Word {
                level: "B/C".to_string(),
                ..word("가족")
            },
        ];
        db.import_words(&words, now)?;
        fn texts(db: &Database, filter: &WordFilter) -> Fallible<Vec<String>> {
            Ok(db
                .list_items(filter)?
                .iter()
                .map(|item| item.word().text.clone())
                .collect())
        }

        assert_eq!(texts(&db, &WordFilter::default())?.len(), 3);
        let by_level = WordFilter {
            level: Some("c".to_string()),
            ..WordFilter::default()
        };
        assert_eq!(texts(&db, &by_level)?, vec!["가치", "가족"]);
        let by_search = WordFilter {
            search: Some("PRICE".to_string()),
            ..WordFilter::default()
        };
        assert_eq!(texts(&db, &by_search)?, vec!["가격"]);
        let important = WordFilter {
            important_only: true,
            ..WordFilter::default()
        };
        assert!(texts(&db, &important)?.is_empty());

        let id = db.list_items(&by_search)?[0].id();
        db.toggle_important(id)?;
        assert_eq!(texts(&db, &important)?, vec!["가격"]);
        Ok(())
    }

    #[test]
    fn test_counters_at_the_ceiling_load() -> Fallible<()> {
        let (_dir, mut db) = open()?;
        let now = ts("2024-03-10T12:00:00.000");
        db.import_words(&[word("a")], now)?;
        let id = db.get_all_items()?[0].id();
        db.conn
            .execute(
                "insert into progress (word_id, interval, repetition, efactor, last_review_date, due_date, total_reviews, correct_count, wrong_count)
                 values (?1, 100000000, 5, 2.5, ?2, ?2, 0, 4294967295, 1)",
                params![sql_id(id)?, now.to_string()],
            )
            .map_err(sql)?;
        let item = db.get_item(id)?.unwrap();
        let state = item.review();
        assert_eq!(state.total_reviews(), u32::MAX);
        assert_eq!(
            u64::from(state.correct_count()) + u64::from(state.wrong_count()),
            u64::from(u32::MAX)
        );
        let next = review(state, Rating::Good, now);
        db.save_review_state(id, &next, now, Rating::Good)?;
        assert_eq!(db.get_all_items()?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_save_review_state_keeps_first_review() -> Fallible<()> {
        let (_dir, mut db) = open()?;
        let t1 = ts("2024-03-10T12:00:00.000");
        let t2 = ts("2024-03-11T12:00:00.000");
        db.import_words(&[word("a")], t1)?;
        let id = db.get_all_items()?[0].id();

        let s1 = review(&ReviewState::new(t1), Rating::Good, t1);
        db.save_review_state(id, &s1, t1, Rating::Good)?;
        let s2 = review(&s1, Rating::Again, t2);
        db.save_review_state(id, &s2, t2, Rating::Again)?;

        let item = db.get_item(id)?.unwrap();
        assert_eq!(item.review(), &s2);
        assert_eq!(item.first_reviewed_at(), Some(t1));
        let log = db.review_log()?;
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].rating, Rating::Good);
        assert_eq!(log[1].reviewed_at, t2);
        Ok(())
    }

    #[test]
    fn test_save_unknown_item_fails() -> Fallible<()> {
        let (_dir, mut db) = open()?;
        let now = ts("2024-03-10T12:00:00.000");
        let state = ReviewState::new(now);
        let result = db.save_review_state(ItemId::new(7), &state, now, Rating::Good);
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn test_status_and_star() -> Fallible<()> {
        let (_dir, mut db) = open()?;
        let now = ts("2024-03-10T12:00:00.000");
        db.import_words(&[word("a")], now)?;
        let id = db.get_all_items()?[0].id();
        db.set_status(id, ItemStatus::Mastered)?;
        assert!(db.toggle_important(id)?);
        let item = db.get_item(id)?.unwrap();
        assert_eq!(item.status(), ItemStatus::Mastered);
        assert!(item.is_important());
        assert!(!db.toggle_important(id)?);
        assert!(db.set_status(ItemId::new(99), ItemStatus::Weak).is_err());
        Ok(())
    }

    #[test]
    fn test_reset_progress() -> Fallible<()> {
        let (_dir, mut db) = open()?;
        let now = ts("2024-03-10T12:00:00.000");
        db.import_words(&[word("a")], now)?;
        let id = db.get_all_items()?[0].id();
        let state = review(&ReviewState::new(now), Rating::Easy, now);
        db.save_review_state(id, &state, now, Rating::Easy)?;
        assert_eq!(db.reset_progress()?, 1);
        let item = db.get_item(id)?.unwrap();
        assert!(item.review().is_new());
        assert_eq!(item.first_reviewed_at(), None);
        assert!(db.review_log()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_backup_roundtrip() -> Fallible<()> {
        let (_dir, mut db) = open()?;
        let now = ts("2024-03-10T12:00:00.000");
        db.import_words(&[word("a"), word("b")], now)?;
        let id = db.get_all_items()?[1].id();
        let state = review(&ReviewState::new(now), Rating::Good, now);
        db.save_review_state(id, &state, now, Rating::Good)?;
        let before = db.get_all_items()?;

        let backup = db.export_backup(now)?;
        assert_eq!(backup.progress.as_ref().map(Vec::len), Some(1));
        let json = serde_json::to_string(&backup)?;

        let (_dir2, mut other) = open()?;
        other.import_words(&[word("zzz")], now)?;
        let parsed: Backup = serde_json::from_str(&json)?;
        assert_eq!(other.restore_backup(&parsed)?, (2, 1));
        assert_eq!(other.get_all_items()?, before);
        Ok(())
    }

    #[test]
    fn test_restore_rejects_incomplete_backup() -> Fallible<()> {
        let (_dir, mut db) = open()?;
        let backup: Backup = serde_json::from_str(r#"{"version": 1, "words": []}"#)?;
        let err = db.restore_backup(&backup).unwrap_err();
        assert_eq!(err.to_string(), "error: invalid backup: missing words or progress");
        Ok(())
    }

    #[test]
    fn test_malformed_progress_is_new() -> Fallible<()> {
        let (_dir, mut db) = open()?;
        let now = ts("2024-03-10T12:00:00.000");
        db.import_words(&[word("a")], now)?;
        let id = db.get_all_items()?[0].id();
        db.conn
            .execute(
                "insert into progress (word_id, interval, repetition, due_date) values (?1, 4, null, 'garbage')",
                [sql_id(id)?],
            )
            .map_err(sql)?;
        let item = db.get_item(id)?.unwrap();
        assert!(item.review().is_new());
        Ok(())
    }
}
