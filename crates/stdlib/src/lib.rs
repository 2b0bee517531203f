pub mod html;
pub mod math;
pub mod registry;
pub mod validation;

use async_trait::async_trait;
use harvest_core::{Result, Value, WaitConfig};
use tokio_util::sync::CancellationToken;

pub use registry::FunctionRegistry;

/// Per-invocation state handed to every function.
#[derive(Debug, Clone, Default)]
pub struct FunctionContext {
    /// Fires when the surrounding query is aborted; waits stop on it.
    pub cancel: CancellationToken,
    pub wait: WaitConfig,
}

impl FunctionContext {
    pub fn new(cancel: CancellationToken, wait: WaitConfig) -> Self {
        Self { cancel, wait }
    }
}

pub struct FunctionSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub min_args: usize,
    pub max_args: usize,
}

/// A named, fixed-arity query-language function.
///
/// Implementations validate their own arguments (count, then kinds) before
/// touching a node, and return the node operation's result or failure as-is.
#[async_trait]
pub trait Function: Send + Sync {
    fn schema(&self) -> FunctionSchema;
    async fn call(&self, ctx: &FunctionContext, args: &[Value]) -> Result<Value>;
}
