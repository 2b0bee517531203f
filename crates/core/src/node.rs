//! Document/Element capability set shared by every backend.
//!
//! A node is created by parsing or by a query against another node and never
//! changes identity afterwards. Its canonical HTML, attribute map and child
//! list are snapshots: once computed they are not refreshed, even when the
//! live page behind a dynamic node mutates. Operations that read the page
//! directly (`inner_text`, `inner_html`, the `*_by_selector` family and the
//! wait operations) always see the current state.

use std::any::Any;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::{Error, Result};
use crate::path::PathSegment;
use crate::values::{Array, Object, Value};

/// DOM node type numbers.
pub mod node_type {
    pub const ELEMENT: i64 = 1;
    pub const TEXT: i64 = 3;
    pub const PROCESSING_INSTRUCTION: i64 = 7;
    pub const COMMENT: i64 = 8;
    pub const DOCUMENT: i64 = 9;
    pub const DOCTYPE: i64 = 10;
    pub const FRAGMENT: i64 = 11;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Parsed markup, no script execution.
    Static,
    /// Live browser session.
    Dynamic,
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Static => "static",
            Backend::Dynamic => "dynamic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Element,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Document => "document",
            NodeKind::Element => "element",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[async_trait]
pub trait HtmlNode: Send + Sync + fmt::Debug {
    fn backend(&self) -> Backend;

    fn kind(&self) -> NodeKind;

    fn node_type(&self) -> i64;

    fn node_name(&self) -> String;

    /// Serialized markup captured when the node was created. Identity,
    /// ordering and hashing of the node are defined on this string.
    fn canonical_html(&self) -> &str;

    /// Address the document was loaded from, when known.
    fn url(&self) -> Option<&str> {
        None
    }

    /// Escape hatch to the backend type for glue code.
    fn as_any(&self) -> &dyn Any;

    async fn length(&self) -> Result<i64> {
        Ok(self.get_child_nodes().await?.len() as i64)
    }

    /// The `value` attribute, or an empty string.
    async fn value(&self) -> Result<Value> {
        match self.get_attribute("value").await? {
            Value::None => Ok(Value::from("")),
            v => Ok(v),
        }
    }

    async fn inner_text(&self) -> Result<String>;

    async fn inner_html(&self) -> Result<String>;

    /// Recognized attributes, computed once and cached.
    async fn get_attributes(&self) -> Result<Object>;

    /// Single attribute lookup; `Value::None` when absent.
    async fn get_attribute(&self, name: &str) -> Result<Value>;

    /// Element children, computed once and cached.
    async fn get_child_nodes(&self) -> Result<Array>;

    async fn get_child_node(&self, index: i64) -> Result<Value> {
        let children = self.get_child_nodes().await?;
        Ok(children.get(index).cloned().unwrap_or(Value::None))
    }

    /// First matching descendant, or `Value::None`.
    async fn query_selector(&self, selector: &str) -> Result<Value>;

    /// All matching descendants; empty when nothing matches.
    async fn query_selector_all(&self, selector: &str) -> Result<Array>;

    async fn inner_html_by_selector(&self, selector: &str) -> Result<String> {
        match self.query_selector(selector).await? {
            Value::Node(found) => Ok(degrade(selector, found.inner_html().await)),
            _ => Ok(String::new()),
        }
    }

    async fn inner_html_by_selector_all(&self, selector: &str) -> Result<Array> {
        let found = self.query_selector_all(selector).await?;
        let mut out = Array::with_capacity(found.len());
        for node in found.iter().filter_map(Value::as_node) {
            out.push(degrade(selector, node.inner_html().await));
        }
        Ok(out)
    }

    async fn inner_text_by_selector(&self, selector: &str) -> Result<String> {
        match self.query_selector(selector).await? {
            Value::Node(found) => Ok(degrade(selector, found.inner_text().await)),
            _ => Ok(String::new()),
        }
    }

    async fn inner_text_by_selector_all(&self, selector: &str) -> Result<Array> {
        let found = self.query_selector_all(selector).await?;
        let mut out = Array::with_capacity(found.len());
        for node in found.iter().filter_map(Value::as_node) {
            out.push(degrade(selector, node.inner_text().await));
        }
        Ok(out)
    }

    async fn count_by_selector(&self, selector: &str) -> Result<i64> {
        Ok(self.query_selector_all(selector).await?.len() as i64)
    }

    /// Closest-match existence: true when this node or one of its ancestors
    /// matches. Documents have no ancestors and fall back to a descendant match.
    async fn exists_by_selector(&self, selector: &str) -> Result<bool>;

    /// Block until the element's class list contains `class`.
    async fn wait_for_class(
        &self,
        _class: &str,
        _timeout: Option<Duration>,
        _cancel: &CancellationToken,
    ) -> Result<()> {
        Err(Error::CapabilityNotSupported(format!(
            "wait_for_class on {} {}",
            self.backend().name(),
            self.kind()
        )))
    }

    /// Block until the element matching `selector` has `class`. The element
    /// is looked up again on every tick and may not exist yet.
    async fn wait_for_class_by_selector(
        &self,
        _selector: &str,
        _class: &str,
        _timeout: Option<Duration>,
        _cancel: &CancellationToken,
    ) -> Result<()> {
        Err(Error::CapabilityNotSupported(format!(
            "wait_for_class_by_selector on {} {}",
            self.backend().name(),
            self.kind()
        )))
    }

    /// Resolve one path segment. Keys name a node property or else an
    /// attribute; indices select a child element.
    async fn resolve(&self, segment: &PathSegment) -> Result<Value> {
        match segment {
            PathSegment::Index(i) => self.get_child_node(*i).await,
            PathSegment::Key(key) => match key.as_str() {
                "nodeType" => Ok(Value::Int(self.node_type())),
                "nodeName" => Ok(Value::String(self.node_name())),
                "length" => Ok(Value::Int(self.length().await?)),
                "value" => self.value().await,
                "innerText" => Ok(Value::String(self.inner_text().await?)),
                "innerHTML" => Ok(Value::String(self.inner_html().await?)),
                "attributes" => Ok(Value::Object(self.get_attributes().await?)),
                "children" => Ok(Value::Array(self.get_child_nodes().await?)),
                name => self.get_attribute(name).await,
            },
        }
    }
}

/// Extraction failures on a found node become an empty string.
fn degrade(selector: &str, extracted: Result<String>) -> String {
    match extracted {
        Ok(s) => s,
        Err(e) => {
            warn!(selector = selector, error = %e, "Extraction failed, using empty string");
            String::new()
        }
    }
}

/// True when `class_attr` (a space separated class list) contains `class`.
pub fn has_class(class_attr: &str, class: &str) -> bool {
    class_attr.split_ascii_whitespace().any(|c| c == class)
}
