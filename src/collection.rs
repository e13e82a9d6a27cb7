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

use std::env::current_dir;
use std::path::PathBuf;

use log::debug;

use crate::config::Settings;
use crate::db::Database;
use crate::error::Fallible;
use crate::error::fail;

pub const DB_FILE: &str = "wordrep.db";
pub const SETTINGS_FILE: &str = "wordrep.toml";

/// A collection directory: the database and the settings next to it.
pub struct Collection {
    pub directory: PathBuf,
    pub db: Database,
    pub settings: Settings,
}

impl Collection {
    pub fn new(directory: Option<String>) -> Fallible<Self> {
        let directory: PathBuf = match directory {
            Some(dir) => PathBuf::from(dir),
            None => current_dir()?,
        };
        if !directory.exists() {
            return fail("directory does not exist.");
        }
        let directory = directory.canonicalize()?;
        debug!("Opening collection in {}", directory.display());
        let db = Database::new(&directory.join(DB_FILE))?;
        let settings = Settings::load(&directory.join(SETTINGS_FILE))?;
        Ok(Self {
            directory,
            db,
            settings,
        })
    }
}
