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

//! Word list files.
//!
//! Two formats are accepted. JSON is an array of entries:
//!
//! ```json
//! [{"word": "가격", "cn": "价格", "level": "B", "sentences": ["가격이 비싸요."]}]
//! ```
//!
//! TOML has an optional default level and a `[[words]]` table per entry:
//!
//! ```toml
//! level = "A"
//!
//! [[words]]
//! word = "가격"
//! translation = "price"
//! ```

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;
use std::path::Path;

use serde::Deserialize;

use crate::types::item::Word;

/// The level of entries that do not name one.
pub const DEFAULT_LEVEL: &str = "B";

/// Merged entries keep at most this many example sentences.
pub const MAX_SENTENCES: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WordListFormat {
    Json,
    Toml,
}

impl WordListFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(WordListFormat::Json),
            "toml" => Some(WordListFormat::Toml),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WordListError {
    pub message: String,
    pub source_path: String,
    /// The 1-based index of the offending entry, if the error is about one.
    pub index: Option<usize>,
}

impl WordListError {
    fn new(message: impl Into<String>, source_path: &str, index: Option<usize>) -> Self {
        WordListError {
            message: message.into(),
            source_path: source_path.to_string(),
            index,
        }
    }
}

impl Display for WordListError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.index {
            Some(index) => write!(
                f,
                "{} Location: {} entry {}",
                self.message, self.source_path, index
            ),
            None => write!(f, "{} Location: {}", self.message, self.source_path),
        }
    }
}

impl Error for WordListError {}

#[derive(Deserialize)]
struct JsonEntry {
    word: String,
    translation: Option<String>,
    cn: Option<String>,
    level: Option<String>,
    #[serde(default)]
    sentences: Vec<String>,
}

#[derive(Deserialize)]
struct TomlList {
    level: Option<String>,
    #[serde(default)]
    words: Vec<TomlEntry>,
}

#[derive(Deserialize)]
struct TomlEntry {
    word: String,
    translation: Option<String>,
    level: Option<String>,
    #[serde(default)]
    sentences: Vec<String>,
}

/// Parse a word list and merge entries that share the same word.
pub fn parse_word_list(
    source_path: &str,
    text: &str,
    format: WordListFormat,
) -> Result<Vec<Word>, WordListError> {
    let raw: Vec<(String, String, Option<String>, Vec<String>)> = match format {
        WordListFormat::Json => {
            let entries: Vec<JsonEntry> = serde_json::from_str(text).map_err(|e| {
                WordListError::new(format!("Invalid JSON: {e}."), source_path, None)
            })?;
            entries
                .into_iter()
                .map(|e| {
                    let translation = e.translation.or(e.cn).unwrap_or_default();
                    (e.word, translation, e.level, e.sentences)
                })
                .collect()
        }
        WordListFormat::Toml => {
            let list: TomlList = toml::from_str(text).map_err(|e| {
                WordListError::new(format!("Invalid TOML: {e}"), source_path, None)
            })?;
            let default_level = list.level;
            list.words
                .into_iter()
                .map(|e| {
                    let level = e.level.or_else(|| default_level.clone());
                    (e.word, e.translation.unwrap_or_default(), level, e.sentences)
                })
                .collect()
        }
    };

    let mut words = Vec::with_capacity(raw.len());
    for (i, (text, translation, level, sentences)) in raw.into_iter().enumerate() {
        let text = text.trim();
        if text.is_empty() {
            return Err(WordListError::new(
                "Entry has an empty word.",
                source_path,
                Some(i + 1),
            ));
        }
        let level = level
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| DEFAULT_LEVEL.to_string());
        words.push(Word {
            text: text.to_string(),
            translation: translation.trim().to_string(),
            level,
            sentences: sentences
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        });
    }
    Ok(merge_duplicates(words))
}

/// Collapse entries with the same word into the first occurrence.
pub fn merge_duplicates(words: Vec<Word>) -> Vec<Word> {
    let mut merged: Vec<Word> = Vec::with_capacity(words.len());
    for word in words {
        match merged.iter_mut().find(|w| w.text == word.text) {
            Some(existing) => merge_word(existing, &word),
            None => merged.push(word),
        }
    }
    merged
}

/// Fold `other` into `existing`.
///
/// Levels are joined with `/` without repeats, a missing translation is filled
/// in, and sentences are unioned up to [`MAX_SENTENCES`].
pub fn merge_word(existing: &mut Word, other: &Word) {
    let mut levels: Vec<String> = split_levels(&existing.level);
    for level in split_levels(&other.level) {
        if !levels.contains(&level) {
            levels.push(level);
        }
    }
    existing.level = levels.join("/");

    if existing.translation.is_empty() && !other.translation.is_empty() {
        existing.translation = other.translation.clone();
    }

    for sentence in &other.sentences {
        if existing.sentences.len() >= MAX_SENTENCES {
            break;
        }
        if !existing.sentences.contains(sentence) {
            existing.sentences.push(sentence.clone());
        }
    }
}

fn split_levels(level: &str) -> Vec<String> {
    level
        .split('/')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;

    fn word(text: &str, translation: &str, level: &str, sentences: &[&str]) -> Word {
        Word {
            text: text.to_string(),
            translation: translation.to_string(),
            level: level.to_string(),
            sentences: sentences.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_parse_json() -> Fallible<()> {
        let text = r#"[
            {"word": "가격", "cn": "价格", "level": "A"},
            {"word": "가치", "translation": "value", "cn": "价值", "sentences": ["가치가 높아요."]},
            {"word": "경향"}
        ]"#;
        let words = parse_word_list("list.json", text, WordListFormat::Json)?;
        assert_eq!(
            words,
            vec![
                word("가격", "价格", "A", &[]),
                word("가치", "value", "B", &["가치가 높아요."]),
                word("경향", "", "B", &[]),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_parse_toml_default_level() -> Fallible<()> {
        let text = r#"
level = "C"

[[words]]
word = "apple"
translation = "pomme"

[[words]]
word = "pear"
level = "A"
"#;
        let words = parse_word_list("list.toml", text, WordListFormat::Toml)?;
        assert_eq!(
            words,
            vec![word("apple", "pomme", "C", &[]), word("pear", "", "A", &[])]
        );
        Ok(())
    }

    #[test]
    fn test_duplicates_are_merged() -> Fallible<()> {
        let text = r#"[
            {"word": "가격", "level": "A", "sentences": ["one", "two"]},
            {"word": "가치", "cn": "价值"},
            {"word": "가격", "cn": "价格", "level": "B/A", "sentences": ["two", "three", "four"]}
        ]"#;
        let words = parse_word_list("list.json", text, WordListFormat::Json)?;
        assert_eq!(words.len(), 2);
        assert_eq!(words[0], word("가격", "价格", "A/B", &["one", "two", "three"]));
        Ok(())
    }

    #[test]
    fn test_merge_keeps_existing_translation() {
        let mut existing = word("a", "first", "B", &[]);
        merge_word(&mut existing, &word("a", "second", "B", &[]));
        assert_eq!(existing, word("a", "first", "B", &[]));
    }

    #[test]
    fn test_empty_word_is_rejected() {
        let text = r#"[{"word": "ok"}, {"word": "  "}]"#;
        let err = parse_word_list("list.json", text, WordListFormat::Json).unwrap_err();
        assert_eq!(err.index, Some(2));
        assert_eq!(
            err.to_string(),
            "Entry has an empty word. Location: list.json entry 2"
        );
    }

    #[test]
    fn test_malformed_file() {
        let err = parse_word_list("list.json", "{", WordListFormat::Json).unwrap_err();
        assert_eq!(err.index, None);
        assert!(parse_word_list("list.toml", "words = 3", WordListFormat::Toml).is_err());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            WordListFormat::from_path(Path::new("a/b.JSON")),
            Some(WordListFormat::Json)
        );
        assert_eq!(
            WordListFormat::from_path(Path::new("b.toml")),
            Some(WordListFormat::Toml)
        );
        assert_eq!(WordListFormat::from_path(Path::new("b.csv")), None);
        assert_eq!(WordListFormat::from_path(Path::new("b")), None);
    }
}
