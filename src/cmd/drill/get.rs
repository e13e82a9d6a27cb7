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

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use maud::Markup;
use maud::html;

use crate::cmd::drill::state::MutableState;
use crate::cmd::drill::state::ServerState;
use crate::cmd::drill::template::page_template;
use crate::types::item::Item;

pub async fn get_handler(State(state): State<ServerState>) -> (StatusCode, Html<String>) {
    let mutable = state.lock();
    let html = render_page(&mutable);
    (StatusCode::OK, Html(html.into_string()))
}

pub fn render_page(state: &MutableState) -> Markup {
    let body = match state.session.current() {
        Some(item) if !state.ended => render_card(state, item),
        _ => render_completion(state),
    };
    page_template(body)
}

fn render_card(state: &MutableState, item: &Item) -> Markup {
    let word = item.word();
    let remaining = state.session.queue().len();
    html! {
        div.root {
            div.header {
                div.progress {
                    (state.reviews) " reviewed, " (remaining) " left"
                }
            }
            @if let Some(error) = &state.error {
                div.error { (error) }
            }
            div.card {
                div.word { (word.text) }
                @if state.reveal {
                    div.level { (word.level) }
                    div.translation { (word.translation) }
                    @if !word.sentences.is_empty() {
                        ul.sentences {
                            @for sentence in &word.sentences {
                                li { (sentence) }
                            }
                        }
                    }
                }
            }
            form.controls action="/" method="post" {
                @if state.reveal {
                    input id="again" type="submit" name="action" value="Again";
                    input id="hard" type="submit" name="action" value="Hard";
                    input id="good" type="submit" name="action" value="Good";
                    input id="easy" type="submit" name="action" value="Easy";
                } @else {
                    input id="reveal" type="submit" name="action" value="Reveal";
                }
                input id="end" type="submit" name="action" value="End";
            }
        }
    }
}

fn render_completion(state: &MutableState) -> Markup {
    html! {
        div.finished {
            h1 { "Session Completed" }
            p { "Words reviewed: " (state.reviews) }
            @if let Some(error) = &state.error {
                div.error { (error) }
            }
            @if !state.ended {
                form.controls action="/" method="post" {
                    button type="submit" name="action" value="More10" { "Learn 10 more" }
                    button type="submit" name="action" value="More20" { "Learn 20 more" }
                    input id="end" type="submit" name="action" value="End";
                }
            }
        }
    }
}
