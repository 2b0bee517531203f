use std::sync::Arc;

use harvest_core::{has_class, Error, Result, WaitConfig};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::debug;

use super::CdpTransport;
use crate::wait::{Clock, TokioClock, Waiter};

/// Handle to one live page plus the wait settings used by its nodes.
/// Cheap to clone; every node produced from a page holds one.
#[derive(Clone)]
pub struct DomSession {
    transport: Arc<dyn CdpTransport>,
    wait: WaitConfig,
    clock: Arc<dyn Clock>,
}

/// Subset of `DOM.describeNode` we rely on.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NodeDescription {
    pub node_type: i64,
    pub node_name: String,
    #[serde(rename = "documentURL")]
    pub document_url: Option<String>,
}

impl DomSession {
    pub fn new(transport: Arc<dyn CdpTransport>, wait: WaitConfig) -> Self {
        Self {
            transport,
            wait,
            clock: Arc::new(TokioClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn wait_config(&self) -> &WaitConfig {
        &self.wait
    }

    pub(crate) fn waiter(&self) -> Waiter {
        Waiter::new(self.clock.clone(), self.wait.poll_interval())
    }

    async fn command(&self, method: &str, params: JsonValue) -> Result<JsonValue> {
        self.transport
            .send_command(method, params)
            .await
            .map_err(|e| Error::Driver(format!("{}: {}", method, e)))
    }

    pub(crate) async fn document_node_id(&self) -> Result<i64> {
        let result = self
            .command("DOM.getDocument", json!({ "depth": 0 }))
            .await?;
        result
            .pointer("/root/nodeId")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| Error::Driver("DOM.getDocument returned no root".to_string()))
    }

    pub(crate) async fn describe(&self, node_id: i64) -> Result<NodeDescription> {
        let result = self
            .command("DOM.describeNode", json!({ "nodeId": node_id }))
            .await?;
        let node = result
            .get("node")
            .cloned()
            .ok_or_else(|| Error::Driver(format!("node {} could not be described", node_id)))?;
        Ok(serde_json::from_value(node)?)
    }

    /// Live attribute list in document order.
    pub(crate) async fn attributes(&self, node_id: i64) -> Result<Vec<(String, String)>> {
        let result = self
            .command("DOM.getAttributes", json!({ "nodeId": node_id }))
            .await?;
        let flat: Vec<String> = result
            .get("attributes")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(flat
            .chunks_exact(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect())
    }

    pub(crate) async fn has_class(&self, node_id: i64, class: &str) -> Result<bool> {
        let attrs = self.attributes(node_id).await?;
        Ok(attrs
            .iter()
            .any(|(name, value)| name == "class" && has_class(value, class)))
    }

    pub(crate) async fn query_selector(&self, node_id: i64, selector: &str) -> Result<Option<i64>> {
        let result = self
            .command(
                "DOM.querySelector",
                json!({ "nodeId": node_id, "selector": selector }),
            )
            .await?;
        Ok(result
            .get("nodeId")
            .and_then(|v| v.as_i64())
            .filter(|id| *id != 0))
    }

    pub(crate) async fn query_selector_all(&self, node_id: i64, selector: &str) -> Result<Vec<i64>> {
        let result = self
            .command(
                "DOM.querySelectorAll",
                json!({ "nodeId": node_id, "selector": selector }),
            )
            .await?;
        Ok(result
            .get("nodeIds")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_i64()).collect())
            .unwrap_or_default())
    }

    /// Run `declaration` with the node bound to `this` and return its value.
    pub(crate) async fn call_function(
        &self,
        node_id: i64,
        declaration: &str,
        args: &[JsonValue],
    ) -> Result<JsonValue> {
        let resolved = self
            .command("DOM.resolveNode", json!({ "nodeId": node_id }))
            .await?;
        let object_id = resolved
            .pointer("/object/objectId")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::Driver(format!("node {} could not be resolved", node_id)))?;

        let arguments: Vec<JsonValue> = args.iter().map(|v| json!({ "value": v })).collect();
        let result = self
            .command(
                "Runtime.callFunctionOn",
                json!({
                    "objectId": object_id,
                    "functionDeclaration": declaration,
                    "arguments": arguments,
                    "returnByValue": true,
                }),
            )
            .await;
        self.release(object_id).await;
        let result = result?;

        if let Some(details) = result.get("exceptionDetails") {
            let text = details
                .get("text")
                .and_then(|v| v.as_str())
                .unwrap_or("script error");
            return Err(Error::Driver(format!("Script failed on node {}: {}", node_id, text)));
        }
        Ok(result
            .pointer("/result/value")
            .cloned()
            .unwrap_or(JsonValue::Null))
    }

    /// Drop the page-side handle created by `DOM.resolveNode`.
    async fn release(&self, object_id: &str) {
        if let Err(e) = self
            .command("Runtime.releaseObject", json!({ "objectId": object_id }))
            .await
        {
            debug!(object_id = object_id, error = %e, "Release failed");
        }
    }
}
