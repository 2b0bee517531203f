use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use ego_tree::{NodeId, NodeRef};
use harvest_core::node::node_type;
use harvest_core::{Array, Backend, Error, HtmlNode, NodeKind, Object, Result, Value};
use once_cell::sync::OnceCell;
use scraper::{ElementRef, Html, Node, Selector};

use crate::common::{element_node_name, is_recognized_attribute, parse_selector};

/// Parsed tree shared by every node produced from one document.
pub type SharedHtml = Arc<Mutex<Html>>;

/// A document or element inside a parsed `Html` tree.
///
/// A node is a position in the shared tree plus what was read from it at
/// construction and its lazily computed snapshots. The tree lock is only
/// held for synchronous reads and never while building another node.
pub struct StaticNode {
    html: SharedHtml,
    id: NodeId,
    url: Option<String>,
    node_type: i64,
    node_name: String,
    canonical: OnceCell<String>,
    attributes: OnceCell<Object>,
    children: OnceCell<Array>,
}

impl StaticNode {
    pub fn parse_document(markup: &str) -> Self {
        Self::from_html(Html::parse_document(markup), None)
    }

    pub fn parse_document_with_url(markup: &str, url: impl Into<String>) -> Self {
        Self::from_html(Html::parse_document(markup), Some(url.into()))
    }

    fn from_html(html: Html, url: Option<String>) -> Self {
        let id = html.tree.root().id();
        let mut node = Self::build(Arc::new(Mutex::new(html)), id);
        node.url = url;
        node
    }

    /// Wrap an existing tree position. Fails when `id` does not belong to `html`.
    pub fn new(html: SharedHtml, id: NodeId) -> Result<Self> {
        let known = lock(&html).tree.get(id).is_some();
        if !known {
            return Err(Error::MissingArgument(format!(
                "node {:?} is not part of the document",
                id
            )));
        }
        Ok(Self::build(html, id))
    }

    fn build(html: SharedHtml, id: NodeId) -> Self {
        let (node_type, node_name) = {
            let tree = lock(&html);
            match tree.tree.get(id) {
                Some(node) => (type_of(node.value()), name_of(node.value())),
                None => (node_type::DOCUMENT, "#document".to_string()),
            }
        };
        Self {
            html,
            id,
            url: None,
            node_type,
            node_name,
            canonical: OnceCell::new(),
            attributes: OnceCell::new(),
            children: OnceCell::new(),
        }
    }

    /// The tree this node lives in.
    pub fn html(&self) -> &SharedHtml {
        &self.html
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    fn child(&self, id: NodeId) -> Value {
        Value::node(StaticNode::build(self.html.clone(), id))
    }

    fn children_of(&self, ids: Vec<NodeId>) -> Array {
        ids.into_iter().map(|id| self.child(id)).collect()
    }

    /// Run `f` against this node with the tree locked.
    fn read<R>(&self, f: impl FnOnce(&Html, NodeRef<'_, Node>) -> R) -> R {
        let html = lock(&self.html);
        // `new` and `build` only ever see ids taken from this tree.
        let node = html.tree.get(self.id).unwrap_or_else(|| html.tree.root());
        f(&*html, node)
    }

    fn is_document(&self) -> bool {
        self.node_type == node_type::DOCUMENT || self.node_type == node_type::FRAGMENT
    }

    /// Descendant matches in document order. A document searches its whole
    /// tree, an element never matches itself.
    fn select(&self, selector: &Selector) -> Vec<NodeId> {
        let is_document = self.is_document();
        self.read(|html, node| {
            if is_document {
                return html.select(selector).map(|el| el.id()).collect();
            }
            match ElementRef::wrap(node) {
                Some(el) => el
                    .select(selector)
                    .map(|found| found.id())
                    .filter(|found| *found != node.id())
                    .collect(),
                None => Vec::new(),
            }
        })
    }
}

fn lock(html: &SharedHtml) -> MutexGuard<'_, Html> {
    html.lock().unwrap_or_else(PoisonError::into_inner)
}

fn type_of(node: &Node) -> i64 {
    match node {
        Node::Document => node_type::DOCUMENT,
        Node::Fragment => node_type::FRAGMENT,
        Node::Doctype(_) => node_type::DOCTYPE,
        Node::Comment(_) => node_type::COMMENT,
        Node::Text(_) => node_type::TEXT,
        Node::Element(_) => node_type::ELEMENT,
        Node::ProcessingInstruction(_) => node_type::PROCESSING_INSTRUCTION,
    }
}

fn name_of(node: &Node) -> String {
    match node {
        Node::Document => "#document".to_string(),
        Node::Fragment => "#document-fragment".to_string(),
        Node::Doctype(doctype) => doctype.name().to_string(),
        Node::Comment(_) => "#comment".to_string(),
        Node::Text(_) => "#text".to_string(),
        Node::Element(el) => element_node_name(el.name()),
        Node::ProcessingInstruction(pi) => pi.target.to_string(),
    }
}

/// Inner markup of `node`. A document renders its root element in full.
fn serialize_inner(html: &Html, node: NodeRef<'_, Node>) -> String {
    match node.value() {
        Node::Document | Node::Fragment => html.root_element().html(),
        Node::Text(text) => String::from(&**text),
        Node::Comment(comment) => String::from(&**comment),
        _ => match ElementRef::wrap(node) {
            Some(el) => el.inner_html(),
            None => String::new(),
        },
    }
}

fn text_of(html: &Html, node: NodeRef<'_, Node>) -> String {
    match node.value() {
        Node::Text(text) => String::from(&**text),
        Node::Comment(comment) => String::from(&**comment),
        Node::Document | Node::Fragment => html.root_element().text().collect(),
        _ => match ElementRef::wrap(node) {
            Some(el) => el.text().collect(),
            None => String::new(),
        },
    }
}

impl fmt::Debug for StaticNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticNode")
            .field("id", &self.id)
            .field("name", &self.node_name)
            .finish()
    }
}

#[async_trait]
impl HtmlNode for StaticNode {
    fn backend(&self) -> Backend {
        Backend::Static
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
        // Computed on first use; the parsed tree is immutable.
        self.canonical.get_or_init(|| self.read(serialize_inner))
    }

    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    async fn inner_text(&self) -> Result<String> {
        Ok(self.read(text_of))
    }

    async fn inner_html(&self) -> Result<String> {
        Ok(self.read(serialize_inner))
    }

    async fn get_attributes(&self) -> Result<Object> {
        let attrs = self.attributes.get_or_init(|| {
            self.read(|_, node| {
                let mut obj = Object::new();
                if let Some(el) = ElementRef::wrap(node) {
                    for (name, value) in el.value().attrs() {
                        if is_recognized_attribute(name) {
                            obj.set(name, value);
                        }
                    }
                }
                obj
            })
        });
        Ok(attrs.clone())
    }

    async fn get_attribute(&self, name: &str) -> Result<Value> {
        Ok(self.read(|_, node| {
            ElementRef::wrap(node)
                .and_then(|el| el.value().attr(name))
                .map(Value::from)
                .unwrap_or(Value::None)
        }))
    }

    async fn get_child_nodes(&self) -> Result<Array> {
        let children = self.children.get_or_init(|| {
            let ids: Vec<NodeId> = self.read(|_, node| {
                node.children()
                    .filter_map(ElementRef::wrap)
                    .map(|el| el.id())
                    .collect()
            });
            self.children_of(ids)
        });
        Ok(children.clone())
    }

    async fn query_selector(&self, selector: &str) -> Result<Value> {
        let Some(parsed) = parse_selector(selector) else {
            return Ok(Value::None);
        };
        Ok(self
            .select(&parsed)
            .into_iter()
            .next()
            .map(|id| self.child(id))
            .unwrap_or(Value::None))
    }

    async fn query_selector_all(&self, selector: &str) -> Result<Array> {
        let Some(parsed) = parse_selector(selector) else {
            return Ok(Array::new());
        };
        Ok(self.children_of(self.select(&parsed)))
    }

    async fn count_by_selector(&self, selector: &str) -> Result<i64> {
        let Some(parsed) = parse_selector(selector) else {
            return Ok(0);
        };
        Ok(self.select(&parsed).len() as i64)
    }

    async fn exists_by_selector(&self, selector: &str) -> Result<bool> {
        let Some(parsed) = parse_selector(selector) else {
            return Ok(false);
        };
        if self.is_document() {
            return Ok(!self.select(&parsed).is_empty());
        }

        Ok(self.read(|_, node| {
            std::iter::once(node)
                .chain(node.ancestors())
                .filter_map(ElementRef::wrap)
                .any(|el| parsed.matches(&el))
        }))
    }
}
