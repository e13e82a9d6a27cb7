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

use serde::Deserialize;
use serde::Serialize;

use crate::sm2::Rating;
use crate::types::item::ItemId;
use crate::types::timestamp::Timestamp;

/// One logged rating event.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub item_id: ItemId,
    pub rating: Rating,
    pub reviewed_at: Timestamp,
}
