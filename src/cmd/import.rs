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

use std::fs::read_to_string;
use std::path::Path;

use log::info;

use crate::collection::Collection;
use crate::db::Database;
use crate::db::ImportSummary;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::timestamp::Timestamp;
use crate::wordlist::WordListFormat;
use crate::wordlist::parse_word_list;

pub fn import_words(directory: Option<String>, file: String) -> Fallible<()> {
    let Collection { mut db, .. } = Collection::new(directory)?;
    let summary = import_file(&mut db, Path::new(&file), Timestamp::now())?;
    println!(
        "Imported {} new words, merged {} into existing ones.",
        summary.added, summary.merged
    );
    Ok(())
}

pub fn import_file(db: &mut Database, path: &Path, now: Timestamp) -> Fallible<ImportSummary> {
    let Some(format) = WordListFormat::from_path(path) else {
        return fail(format!(
            "unsupported word list format: {} (expected .json or .toml)",
            path.display()
        ));
    };
    let text = read_to_string(path)?;
    let words = parse_word_list(&path.display().to_string(), &text, format)?;
    info!("Read {} words from {}", words.len(), path.display());
    db.import_words(&words, now)
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;
    use crate::store::ItemStore;

    #[test]
    fn test_import_file() -> Fallible<()> {
        let dir = tempdir()?;
        let mut db = Database::new(&dir.path().join("wordrep.db"))?;
        let list = dir.path().join("list.json");
        write(
            &list,
            r#"[{"word": "가격", "cn": "价格"}, {"word": "가치"}, {"word": "가격", "level": "A"}]"#,
        )?;
        let now = Timestamp::try_from("2024-03-10T12:00:00.000".to_string())?;
        let summary = import_file(&mut db, &list, now)?;
        assert_eq!(summary, ImportSummary { added: 2, merged: 0 });
        let items = db.get_all_items()?;
        assert_eq!(items[0].word().level, "B/A");
        assert_eq!(items[0].word().translation, "价格");

        let summary = import_file(&mut db, &list, now)?;
        assert_eq!(summary, ImportSummary { added: 0, merged: 2 });
        assert_eq!(db.get_all_items()?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_unsupported_extension() -> Fallible<()> {
        let dir = tempdir()?;
        let mut db = Database::new(&dir.path().join("wordrep.db"))?;
        let list = dir.path().join("list.csv");
        write(&list, "a,b")?;
        let now = Timestamp::try_from("2024-03-10T12:00:00.000".to_string())?;
        assert!(import_file(&mut db, &list, now).is_err());
        Ok(())
    }

    #[test]
    fn test_bad_entry_names_location() -> Fallible<()> {
        let dir = tempdir()?;
        let mut db = Database::new(&dir.path().join("wordrep.db"))?;
        let list = dir.path().join("list.toml");
        write(&list, "[[words]]\nword = \"ok\"\n\n[[words]]\nword = \"\"\n")?;
        let now = Timestamp::try_from("2024-03-10T12:00:00.000".to_string())?;
        let err = import_file(&mut db, &list, now).unwrap_err();
        assert!(err.to_string().contains("entry 2"));
        assert!(db.get_all_items()?.is_empty());
        Ok(())
    }
}
