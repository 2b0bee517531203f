use std::time::Duration;

use serde_json::Value;
use tracing::debug;

const ATTEMPTS: u32 = 10;
const RETRY_DELAY: Duration = Duration::from_millis(300);

/// Find the WebSocket URL of the first page target on a Chrome debugging
/// endpoint (`/json/list`). Retries briefly while the browser starts up.
pub async fn discover_page_ws_url(host: &str, port: u16) -> Result<String, String> {
    let url = format!("http://{}:{}/json/list", host, port);

    for attempt in 0..ATTEMPTS {
        if attempt > 0 {
            tokio::time::sleep(RETRY_DELAY).await;
        }

        let resp = match reqwest::get(&url).await {
            Ok(r) => r,
            Err(e) => {
                debug!(attempt = attempt, error = %e, "CDP endpoint not reachable yet");
                continue;
            }
        };
        let targets: Vec<Value> = match resp.json().await {
            Ok(t) => t,
            Err(_) => continue,
        };

        if let Some(ws_url) = first_page_target(&targets) {
            return Ok(ws_url);
        }
    }

    Err(format!("No page target found at {} after {} attempts", url, ATTEMPTS))
}

fn first_page_target(targets: &[Value]) -> Option<String> {
    targets
        .iter()
        .filter(|t| t.get("type").and_then(|v| v.as_str()) == Some("page"))
        .find_map(|t| t.get("webSocketDebuggerUrl").and_then(|v| v.as_str()))
        .map(|s| s.to_string())
}
