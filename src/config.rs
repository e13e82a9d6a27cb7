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
use std::path::Path;
use std::path::PathBuf;

use log::debug;
use serde::Deserialize;
use serde::Serialize;

use crate::error::Fallible;
use crate::session::DEFAULT_DAILY_NEW_TARGET;
use crate::session::MasteryRule;
use crate::session::SessionConfig;
use crate::store::SettingsStore;

/// The contents of `wordrep.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsFile {
    pub daily_new_target: usize,
    /// Items whose interval reaches this many days are treated as mastered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mastery_interval: Option<u32>,
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self {
            daily_new_target: DEFAULT_DAILY_NEW_TARGET,
            mastery_interval: None,
        }
    }
}

/// Settings backed by a TOML file. A missing file means defaults.
#[derive(Debug)]
pub struct Settings {
    path: PathBuf,
    file: SettingsFile,
}

impl Settings {
    pub fn load(path: &Path) -> Fallible<Self> {
        let file = if path.exists() {
            let text = read_to_string(path)?;
            toml::from_str(&text)?
        } else {
            debug!("No settings file at {}, using defaults", path.display());
            SettingsFile::default()
        };
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            daily_new_base_target: self.file.daily_new_target,
            mastery: match self.file.mastery_interval {
                Some(days) => MasteryRule::IntervalAtLeast(days),
                None => MasteryRule::Flag,
            },
        }
    }

    fn save(&self) -> Fallible<()> {
        let text = toml::to_string(&self.file)?;
        write(&self.path, text)?;
        Ok(())
    }
}

impl SettingsStore for Settings {
    fn daily_new_target(&self) -> usize {
        self.file.daily_new_target
    }

    fn set_daily_new_target(&mut self, n: usize) -> Fallible<()> {
        self.file.daily_new_target = n;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() -> Fallible<()> {
        let dir = tempdir()?;
        let settings = Settings::load(&dir.path().join("wordrep.toml"))?;
        assert_eq!(settings.daily_new_target(), 30);
        assert_eq!(settings.session_config(), SessionConfig::default());
        Ok(())
    }

    #[test]
    fn test_target_is_persisted() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("wordrep.toml");
        let mut settings = Settings::load(&path)?;
        settings.set_daily_new_target(12)?;
        let reloaded = Settings::load(&path)?;
        assert_eq!(reloaded.daily_new_target(), 12);
        Ok(())
    }

    #[test]
    fn test_mastery_interval() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("wordrep.toml");
        write(&path, "mastery_interval = 90\n")?;
        let settings = Settings::load(&path)?;
        assert_eq!(settings.daily_new_target(), 30);
        assert_eq!(
            settings.session_config().mastery,
            MasteryRule::IntervalAtLeast(90)
        );
        Ok(())
    }

    #[test]
    fn test_invalid_file() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("wordrep.toml");
        write(&path, "daily_new_target = \"many\"\n")?;
        assert!(Settings::load(&path).is_err());
        Ok(())
    }
}
