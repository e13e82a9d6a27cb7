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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use tokio::sync::oneshot::Sender;

use crate::db::Database;
use crate::session::SessionBuilder;
use crate::types::timestamp::Timestamp;

#[derive(Clone)]
pub struct ServerState {
    pub mutable: Arc<Mutex<MutableState>>,
    pub shutdown_tx: Arc<Mutex<Option<Sender<()>>>>,
}

impl ServerState {
    /// Lock the mutable state, recovering from poisoning.
    pub fn lock(&self) -> MutexGuard<'_, MutableState> {
        self.mutable
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn shutdown(&self) {
        let mut tx = self
            .shutdown_tx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(tx) = tx.take() {
            let _ = tx.send(());
        }
    }
}

pub struct MutableState {
    pub reveal: bool,
    pub db: Database,
    pub session: SessionBuilder,
    /// Ratings submitted in this session.
    pub reviews: usize,
    /// The last persistence failure, shown above the card.
    pub error: Option<String>,
    /// Whether the learner pressed the end button.
    pub ended: bool,
    pub finished_at: Option<Timestamp>,
}
