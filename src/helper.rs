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

use tempfile::tempdir;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::types::item::Word;
use crate::types::timestamp::Timestamp;

/// Create a collection in a fresh temporary directory holding the given
/// `(word, translation)` pairs. The directory is not deleted.
pub fn create_tmp_collection(words: &[(&str, &str)]) -> Fallible<String> {
    let dir = tempdir()?.keep();
    let mut collection = Collection::new(Some(dir.display().to_string()))?;
    let words: Vec<Word> = words
        .iter()
        .map(|(text, translation)| Word {
            text: text.to_string(),
            translation: translation.to_string(),
            level: "B".to_string(),
            sentences: Vec::new(),
        })
        .collect();
    collection.db.import_words(&words, Timestamp::now())?;
    Ok(collection.directory.display().to_string())
}
