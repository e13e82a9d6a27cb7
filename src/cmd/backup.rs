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
use std::fs::write;

use crate::collection::Collection;
use crate::db::Backup;
use crate::error::Fallible;
use crate::types::timestamp::Timestamp;

pub fn export_collection(directory: Option<String>, output: Option<String>) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    let backup = collection.db.export_backup(Timestamp::now())?;
    let json = serde_json::to_string_pretty(&backup)?;
    match output {
        Some(path) => write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

pub fn restore_collection(directory: Option<String>, file: String) -> Fallible<()> {
    let mut collection = Collection::new(directory)?;
    let text = read_to_string(&file)?;
    let backup: Backup = serde_json::from_str(&text)?;
    let (words, progress) = collection.db.restore_backup(&backup)?;
    println!("Restored {words} words and {progress} progress records.");
    Ok(())
}
