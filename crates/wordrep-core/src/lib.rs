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

//! wordrep-core: the scheduling core of the wordrep vocabulary trainer.
//!
//! This library provides:
//! - A modified SM-2 review scheduler
//! - Session queues with a daily new-item quota and re-insertion of lapses
//! - The storage interfaces the session needs
//! - Word list parsing and collection statistics

pub mod error;
pub mod rng;
pub mod session;
pub mod sm2;
pub mod stats;
pub mod store;
pub mod types;
pub mod wordlist;

// Re-exports for convenience
pub use error::{ErrorReport, Fallible, fail};
pub use session::{SessionBuilder, SessionConfig, SessionError, init_session};
pub use sm2::Rating;
pub use store::{ItemStore, SettingsStore};
pub use types::date::Date;
pub use types::item::{Item, ItemId, ItemStatus, Word};
pub use types::review_state::ReviewState;
pub use types::timestamp::Timestamp;
