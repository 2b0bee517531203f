use std::any::Any;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use harvest_core::node::node_type;
use harvest_core::{Array, Backend, Error, HtmlNode, NodeKind, Object, Result, Value};
use serde_json::json;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::scripts;
use super::session::DomSession;
use crate::common::{element_node_name, is_recognized_attribute, parse_selector};

/// A document or element on a live page, addressed by its CDP node id.
///
/// Attribute map and child list are fetched on first use and then kept,
/// even if the page changes afterwards.
pub struct DynamicNode {
    session: DomSession,
    node_id: i64,
    node_type: i64,
    node_name: String,
    url: Option<String>,
    canonical: String,
    attributes: OnceCell<Object>,
    children: OnceCell<Array>,
}

impl DynamicNode {
    /// The page's document node.
    pub async fn document(session: DomSession) -> Result<Self> {
        let node_id = session.document_node_id().await?;
        Self::load(session, node_id).await
    }

    pub async fn load(session: DomSession, node_id: i64) -> Result<Self> {
        if node_id == 0 {
            return Err(Error::MissingArgument(
                "dynamic node requires a node id".to_string(),
            ));
        }

        let description = session.describe(node_id).await?;
        let node_name = if description.node_type == node_type::ELEMENT {
            element_node_name(&description.node_name)
        } else {
            description.node_name
        };
        // A found node stays usable even when its markup cannot be read.
        let canonical = match session.call_function(node_id, scripts::INNER_HTML, &[]).await {
            Ok(value) => value.as_str().unwrap_or_default().to_string(),
            Err(e) => {
                warn!(node_id = node_id, error = %e, "Snapshot failed, using empty markup");
                String::new()
            }
        };

        Ok(Self {
            session,
            node_id,
            node_type: description.node_type,
            node_name,
            url: description.document_url,
            canonical,
            attributes: OnceCell::new(),
            children: OnceCell::new(),
        })
    }

    pub fn node_id(&self) -> i64 {
        self.node_id
    }

    pub fn session(&self) -> &DomSession {
        &self.session
    }

    fn is_document(&self) -> bool {
        self.node_type == node_type::DOCUMENT
    }

    async fn load_all(&self, ids: Vec<i64>) -> Result<Array> {
        let mut out = Array::with_capacity(ids.len());
        for id in ids {
            out.push(Value::node(Self::load(self.session.clone(), id).await?));
        }
        Ok(out)
    }

    async fn script_string(&self, declaration: &str) -> Result<String> {
        let value = self
            .session
            .call_function(self.node_id, declaration, &[])
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    fn default_timeout(&self, timeout: Option<Duration>) -> Duration {
        timeout.unwrap_or_else(|| self.session.wait_config().default_timeout())
    }
}

impl fmt::Debug for DynamicNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicNode")
            .field("node_id", &self.node_id)
            .field("name", &self.node_name)
            .finish()
    }
}

#[async_trait]
impl HtmlNode for DynamicNode {
    fn backend(&self) -> Backend {
        Backend::Dynamic
    }

    fn kind(&self) -> NodeKind {
        if self.is_document() {
            NodeKind::Document
        } else {
            NodeKind::Element
        }
    }

    fn node_type(&self) -> i64 {
        self.node_type
    }

    fn node_name(&self) -> String {
        self.node_name.clone()
    }

    fn canonical_html(&self) -> &str {
        &self.canonical
    }

    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    async fn inner_text(&self) -> Result<String> {
        self.script_string(scripts::INNER_TEXT).await
    }

    async fn inner_html(&self) -> Result<String> {
        self.script_string(scripts::INNER_HTML).await
    }

    async fn get_attributes(&self) -> Result<Object> {
        let attrs = self
            .attributes
            .get_or_try_init(|| async {
                let mut obj = Object::new();
                for (name, value) in self.session.attributes(self.node_id).await? {
                    if is_recognized_attribute(&name) {
                        obj.set(name, value);
                    }
                }
                Ok::<_, Error>(obj)
            })
            .await?;
        Ok(attrs.clone())
    }

    async fn get_attribute(&self, name: &str) -> Result<Value> {
        let attrs = self.session.attributes(self.node_id).await?;
        Ok(attrs
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| Value::from(v))
            .unwrap_or(Value::None))
    }

    async fn get_child_nodes(&self) -> Result<Array> {
        let children = self
            .children
            .get_or_try_init(|| async {
                let scope = if self.is_document() { ":root" } else { ":scope > *" };
                let ids = self.session.query_selector_all(self.node_id, scope).await?;
                self.load_all(ids).await
            })
            .await?;
        Ok(children.clone())
    }

    async fn query_selector(&self, selector: &str) -> Result<Value> {
        if parse_selector(selector).is_none() {
            return Ok(Value::None);
        }
        match self.session.query_selector(self.node_id, selector).await? {
            Some(id) => Ok(Value::node(Self::load(self.session.clone(), id).await?)),
            None => Ok(Value::None),
        }
    }

    async fn query_selector_all(&self, selector: &str) -> Result<Array> {
        if parse_selector(selector).is_none() {
            return Ok(Array::new());
        }
        let ids = self.session.query_selector_all(self.node_id, selector).await?;
        self.load_all(ids).await
    }

    async fn count_by_selector(&self, selector: &str) -> Result<i64> {
        if parse_selector(selector).is_none() {
            return Ok(0);
        }
        let ids = self.session.query_selector_all(self.node_id, selector).await?;
        Ok(ids.len() as i64)
    }

    async fn exists_by_selector(&self, selector: &str) -> Result<bool> {
        if parse_selector(selector).is_none() {
            return Ok(false);
        }
        if self.is_document() {
            let found = self.session.query_selector(self.node_id, selector).await?;
            return Ok(found.is_some());
        }
        let matched = self
            .session
            .call_function(self.node_id, scripts::CLOSEST, &[json!(selector)])
            .await?;
        Ok(matched.as_bool().unwrap_or(false))
    }

    async fn wait_for_class(
        &self,
        class: &str,
        timeout: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let what = format!("class '{}' on {}", class, self.node_name);
        debug!(node_id = self.node_id, class = class, "Waiting for class");
        self.session
            .waiter()
            .wait(&what, self.default_timeout(timeout), cancel, move || {
                self.session.has_class(self.node_id, class)
            })
            .await
    }

    async fn wait_for_class_by_selector(
        &self,
        selector: &str,
        class: &str,
        timeout: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let what = format!("class '{}' on '{}'", class, selector);
        let valid = parse_selector(selector).is_some();
        debug!(node_id = self.node_id, selector = selector, class = class, "Waiting for class");
        self.session
            .waiter()
            .wait(&what, self.default_timeout(timeout), cancel, move || async move {
                if !valid {
                    return Ok(false);
                }
                match self.session.query_selector(self.node_id, selector).await? {
                    Some(id) => self.session.has_class(id, class).await,
                    None => Ok(false),
                }
            })
            .await
    }
}
