pub mod config;
pub mod error;
pub mod logging;
pub mod node;
pub mod path;
pub mod paths;
pub mod values;

pub use config::{CdpConfig, Config, LoggingConfig, WaitConfig};
pub use error::{Error, Result};
pub use node::{has_class, Backend, HtmlNode, NodeKind};
pub use path::{get_in, path_from_values, set_in, PathSegment};
pub use paths::Paths;
pub use values::{Array, Object, Value, ValueType};
