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

//! Small maintenance commands.

use crate::collection::Collection;
use crate::error::Fallible;
use crate::store::SettingsStore;
use crate::types::item::ItemId;
use crate::types::item::ItemStatus;

pub fn set_target(directory: Option<String>, target: usize) -> Fallible<()> {
    let mut collection = Collection::new(directory)?;
    collection.settings.set_daily_new_target(target)?;
    println!("Daily new word target set to {target}.");
    Ok(())
}

pub fn mark_item(directory: Option<String>, id: ItemId, status: ItemStatus) -> Fallible<()> {
    let mut collection = Collection::new(directory)?;
    collection.db.set_status(id, status)?;
    println!("Item {id} marked as {status}.");
    Ok(())
}

pub fn star_item(directory: Option<String>, id: ItemId) -> Fallible<()> {
    let mut collection = Collection::new(directory)?;
    if collection.db.toggle_important(id)? {
        println!("Item {id} starred.");
    } else {
        println!("Item {id} unstarred.");
    }
    Ok(())
}

pub fn reset_collection(directory: Option<String>) -> Fallible<()> {
    let mut collection = Collection::new(directory)?;
    let count = collection.db.reset_progress()?;
    println!("Progress of {count} words reset.");
    Ok(())
}
