//! Dynamic backend: nodes backed by a live browser page, driven over the
//! Chrome DevTools Protocol.

mod client;
mod discovery;
mod node;
mod scripts;
mod session;
#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

pub use client::CdpClient;
pub use discovery::discover_page_ws_url;
pub use node::DynamicNode;
pub use session::DomSession;

/// Anything that can carry a CDP command to a page and bring back its result.
///
/// Errors are plain strings as reported by the browser or the socket.
#[async_trait]
pub trait CdpTransport: Send + Sync {
    async fn send_command(&self, method: &str, params: JsonValue) -> Result<JsonValue, String>;
}
