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

use std::fmt::Write;

use crate::collection::Collection;
use crate::db::WordFilter;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::item::Item;
use crate::types::item::Word;
use crate::types::timestamp::Timestamp;

pub fn list_words(directory: Option<String>, filter: WordFilter) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    let items = collection.db.list_items(&filter)?;
    if items.is_empty() {
        println!("No matching words.");
    } else {
        print!("{}", render_list(&items));
    }
    Ok(())
}

pub fn add_word(
    directory: Option<String>,
    text: String,
    translation: String,
    level: String,
) -> Fallible<()> {
    let text = text.trim().to_string();
    if text.is_empty() {
        return fail("word must not be empty.");
    }
    let mut collection = Collection::new(directory)?;
    let word = Word {
        text,
        translation: translation.trim().to_string(),
        level: level.trim().to_string(),
        sentences: Vec::new(),
    };
    let id = collection.db.add_word(&word, Timestamp::now())?;
    println!("Added '{}' as item {id}.", word.text);
    Ok(())
}

/// One line per item: id, word, translation, level, status. Starred items
/// are marked with `*`.
fn render_list(items: &[Item]) -> String {
    let mut out = String::new();
    for item in items {
        let word = item.word();
        let star = if item.is_important() { " *" } else { "" };
        let _ = writeln!(
            out,
            "{:>6}  {}\t{}\t[{}] {}{}",
            item.id().get(),
            word.text,
            word.translation,
            word.level,
            item.status(),
            star
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::collection::DB_FILE;
    use crate::db::Database;
    use crate::helper::create_tmp_collection;
    use crate::types::item::ItemId;

    #[test]
    fn test_add_then_list() -> Fallible<()> {
        let directory = create_tmp_collection(&[("apple", "pomme")])?;
        add_word(
            Some(directory.clone()),
            " pear ".to_string(),
            "poire".to_string(),
            "C".to_string(),
        )?;
        let collection = Collection::new(Some(directory.clone()))?;
        let items = collection.db.list_items(&WordFilter {
            level: Some("C".to_string()),
            ..WordFilter::default()
        })?;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].word().text, "pear");
        assert_eq!(items[0].word().translation, "poire");
        list_words(Some(directory), WordFilter::default())?;
        Ok(())
    }

    #[test]
    fn test_add_rejects_duplicates_and_blanks() -> Fallible<()> {
        let directory = create_tmp_collection(&[("apple", "pomme")])?;
        let dup = add_word(
            Some(directory.clone()),
            "apple".to_string(),
            "pomme".to_string(),
            "B".to_string(),
        );
        assert!(dup.is_err());
        let blank = add_word(
            Some(directory),
            "   ".to_string(),
            String::new(),
            "B".to_string(),
        );
        assert_eq!(
            blank.unwrap_err().to_string(),
            "error: word must not be empty."
        );
        Ok(())
    }

    #[test]
    fn test_render_list() -> Fallible<()> {
        let directory = create_tmp_collection(&[("apple", "pomme"), ("pear", "poire")])?;
        let mut db = Database::new(&Path::new(&directory).join(DB_FILE))?;
        db.toggle_important(ItemId::new(2))?;
        let rendered = render_list(&db.list_items(&WordFilter::default())?);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "     1  apple\tpomme\t[B] learning");
        assert_eq!(lines[1], "     2  pear\tpoire\t[B] learning *");
        Ok(())
    }
}
