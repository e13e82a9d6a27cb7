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

use std::process::exit;

use clap::Parser;
use tokio::spawn;

use crate::cmd::backup::export_collection;
use crate::cmd::backup::restore_collection;
use crate::cmd::drill::server::ServerConfig;
use crate::cmd::drill::server::start_server;
use crate::cmd::import::import_words;
use crate::cmd::manage::mark_item;
use crate::cmd::manage::reset_collection;
use crate::cmd::manage::set_target;
use crate::cmd::manage::star_item;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;
use crate::cmd::words::add_word;
use crate::cmd::words::list_words;
use crate::db::WordFilter;
use crate::error::Fallible;
use crate::types::item::ItemId;
use crate::types::item::ItemStatus;
use crate::types::timestamp::Timestamp;
use crate::utils::server_url;
use crate::utils::wait_for_server;
use crate::wordlist::DEFAULT_LEVEL;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Drill due and new words through a web interface.
    Drill {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// The host address to bind to. Default is 127.0.0.1.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// The port to use for the web server. Default is 8000.
        #[arg(long, default_value_t = 8000)]
        port: u16,
        /// Whether to open the browser automatically. Default is true.
        #[arg(long)]
        open_browser: Option<bool>,
        /// Extra new words to learn today, on top of the daily target.
        #[arg(long, default_value_t = 0)]
        extra: usize,
    },
    /// Import a JSON or TOML word list.
    Import {
        /// Path to the word list.
        file: String,
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
    /// List the words of a collection with their ids.
    List {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Only show words whose text or translation contains this.
        #[arg(long)]
        search: Option<String>,
        /// Only show words of this level.
        #[arg(long)]
        level: Option<String>,
        /// Only show starred words.
        #[arg(long)]
        important: bool,
    },
    /// Add a single word.
    Add {
        word: String,
        translation: String,
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        #[arg(long, default_value = DEFAULT_LEVEL)]
        level: String,
    },
    /// Print collection statistics.
    Stats {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Which output format to use.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
    /// Set the number of new words to learn per day.
    Target {
        target: usize,
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
    /// Set the status of a word.
    Mark {
        id: ItemId,
        #[arg(value_parser = parse_status)]
        status: ItemStatus,
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
    /// Star or unstar a word.
    Star {
        id: ItemId,
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
    /// Forget all review progress.
    Reset {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
    /// Export a collection as a JSON backup.
    Export {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Optional path to the output file. By default, the output is printed to stdout.
        #[arg(long)]
        output: Option<String>,
    },
    /// Replace a collection with the contents of a backup.
    Restore {
        /// Path to the backup file.
        file: String,
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
}

fn parse_status(s: &str) -> Result<ItemStatus, String> {
    s.parse().map_err(|_| {
        format!("invalid status '{s}', expected one of: learning, weak, mastered")
    })
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Drill {
            directory,
            host,
            port,
            open_browser,
            extra,
        } => {
            if open_browser.unwrap_or(true) {
                // Start a separate task to open the browser once the server is up.
                let browser_host = host.clone();
                spawn(async move {
                    match wait_for_server(&browser_host, port).await {
                        Ok(_) => {
                            let _ = open::that(server_url(&browser_host, port));
                        }
                        Err(e) => {
                            eprintln!("Failed to connect to server: {e}");
                            exit(-1)
                        }
                    }
                });
            }
            let config = ServerConfig {
                directory,
                host,
                port,
                session_started_at: Timestamp::now(),
                extra,
                seed: None,
            };
            start_server(config).await
        }
        Command::Import { file, directory } => import_words(directory, file),
        Command::List {
            directory,
            search,
            level,
            important,
        } => {
            let filter = WordFilter {
                search,
                level,
                important_only: important,
            };
            list_words(directory, filter)
        }
        Command::Add {
            word,
            translation,
            directory,
            level,
        } => add_word(directory, word, translation, level),
        Command::Stats { directory, format } => print_stats(directory, format),
        Command::Target { target, directory } => set_target(directory, target),
        Command::Mark {
            id,
            status,
            directory,
        } => mark_item(directory, id, status),
        Command::Star { id, directory } => star_item(directory, id),
        Command::Reset { directory } => reset_collection(directory),
        Command::Export { directory, output } => export_collection(directory, output),
        Command::Restore { file, directory } => restore_collection(directory, file),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Command::command().debug_assert();
    }

    #[test]
    fn test_parse_mark() {
        let cli = Command::try_parse_from(["wordrep", "mark", "12", "mastered", "/tmp/words"]);
        match cli {
            Ok(Command::Mark {
                id,
                status,
                directory,
            }) => {
                assert_eq!(id, ItemId::new(12));
                assert_eq!(status, ItemStatus::Mastered);
                assert_eq!(directory.as_deref(), Some("/tmp/words"));
            }
            _ => panic!("expected mark command"),
        }
        assert!(Command::try_parse_from(["wordrep", "mark", "12", "forgotten"]).is_err());
    }

    #[test]
    fn test_parse_list_and_add() {
        match Command::try_parse_from(["wordrep", "list", "--level", "C", "--important"]) {
            Ok(Command::List {
                directory,
                search,
                level,
                important,
            }) => {
                assert_eq!(directory, None);
                assert_eq!(search, None);
                assert_eq!(level.as_deref(), Some("C"));
                assert!(important);
            }
            _ => panic!("expected list command"),
        }
        match Command::try_parse_from(["wordrep", "add", "가격", "price"]) {
            Ok(Command::Add {
                word,
                translation,
                level,
                ..
            }) => {
                assert_eq!(word, "가격");
                assert_eq!(translation, "price");
                assert_eq!(level, DEFAULT_LEVEL);
            }
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn test_drill_defaults() {
        match Command::try_parse_from(["wordrep", "drill"]) {
            Ok(Command::Drill {
                host, port, extra, ..
            }) => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, 8000);
                assert_eq!(extra, 0);
            }
            _ => panic!("expected drill command"),
        }
    }
}
