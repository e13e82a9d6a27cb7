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

use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use log::warn;
use serde::Deserialize;

use crate::cmd::drill::get::render_page;
use crate::cmd::drill::state::MutableState;
use crate::cmd::drill::state::ServerState;
use crate::sm2::Rating;
use crate::store::ItemStore;
use crate::types::item::Item;
use crate::types::timestamp::Timestamp;

#[derive(Deserialize)]
pub struct FormData {
    action: Action,
}

#[derive(Deserialize, Clone, Copy, PartialEq)]
enum Action {
    Reveal,
    Again,
    Hard,
    Good,
    Easy,
    More10,
    More20,
    End,
}

pub async fn post_handler(
    State(state): State<ServerState>,
    Form(form): Form<FormData>,
) -> (StatusCode, Html<String>) {
    let html = {
        let mut mutable = state.lock();
        action_handler(&mut mutable, form.action, Timestamp::now());
        render_page(&mutable)
    };
    if form.action == Action::End {
        state.shutdown();
    }
    (StatusCode::OK, Html(html.into_string()))
}

fn action_handler(state: &mut MutableState, action: Action, now: Timestamp) {
    if state.ended {
        return;
    }
    match action {
        Action::Reveal => {
            if state.session.current().is_some() {
                state.reveal = true;
            }
        }
        Action::Again => rate(state, Rating::Again, now),
        Action::Hard => rate(state, Rating::Hard, now),
        Action::Good => rate(state, Rating::Good, now),
        Action::Easy => rate(state, Rating::Easy, now),
        Action::More10 => more(state, 10, now),
        Action::More20 => more(state, 20, now),
        Action::End => {
            state.ended = true;
            state.finished_at.get_or_insert(now);
        }
    }
}

fn rate(state: &mut MutableState, rating: Rating, now: Timestamp) {
    let Some(id) = state.session.current().map(Item::id) else {
        return;
    };
    let MutableState { db, session, .. } = &mut *state;
    match session.submit_rating(db, id, rating, now) {
        Ok(_) => {
            state.reviews += 1;
            state.reveal = false;
            state.error = None;
            if state.session.is_complete() {
                state.finished_at = Some(now);
            }
        }
        Err(e) => {
            warn!("Rating of {id} not saved: {e}");
            state.error = Some(e.to_string());
        }
    }
}

fn more(state: &mut MutableState, count: usize, now: Timestamp) {
    match state.db.get_all_items() {
        Ok(items) => {
            state.session.add_extra_words(&items, count, now);
            state.reveal = false;
            state.error = None;
            if !state.session.is_complete() {
                state.finished_at = None;
            }
        }
        Err(e) => state.error = Some(e.to_string()),
    }
}
