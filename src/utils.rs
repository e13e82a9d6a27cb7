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

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::Instant;
use tokio::time::sleep;

use crate::error::Fallible;
use crate::error::fail;

// max-age is one week in seconds.
pub const CACHE_CONTROL_IMMUTABLE: &str = "public, max-age=604800, immutable";

/// How long to wait for the drill server to accept connections.
const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

pub fn server_url(host: &str, port: u16) -> String {
    format!("http://{host}:{port}/")
}

/// Poll until something accepts connections on `host:port`.
pub async fn wait_for_server(host: &str, port: u16) -> Fallible<()> {
    let deadline = Instant::now() + STARTUP_TIMEOUT;
    loop {
        if let Ok(stream) = TcpStream::connect(format!("{host}:{port}")).await {
            drop(stream);
            return Ok(());
        }
        if Instant::now() >= deadline {
            return fail(format!("server on {host}:{port} did not start"));
        }
        sleep(Duration::from_millis(1)).await;
    }
}

#[cfg(test)]
mod tests {
    use portpicker::pick_unused_port;
    use tokio::net::TcpListener;

    use super::*;

    #[test]
    fn test_server_url() {
        assert_eq!(server_url("127.0.0.1", 8000), "http://127.0.0.1:8000/");
    }

    #[tokio::test]
    async fn test_wait_for_listener() -> Fallible<()> {
        let port = pick_unused_port().unwrap();
        let _listener = TcpListener::bind(("127.0.0.1", port)).await?;
        wait_for_server("127.0.0.1", port).await
    }
}
