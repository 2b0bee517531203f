//! Static backend over an already parsed document; no script runs here.

mod node;

pub use node::{SharedHtml, StaticNode};
