pub mod cdp;
pub mod common;
pub mod html;
pub mod wait;

pub use cdp::{discover_page_ws_url, CdpClient, CdpTransport, DomSession, DynamicNode};
pub use html::StaticNode;
pub use wait::{Clock, TokioClock, WaitState, Waiter};
