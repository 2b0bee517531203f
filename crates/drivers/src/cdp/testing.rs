//! In-memory page that answers the CDP commands the dynamic backend sends.
//!
//! Selectors are limited to `tag`, `.class`, `#id`, `tag.class`, `tag#id`,
//! plus the internal `:root` and `:scope > *` forms.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use harvest_core::has_class;
use harvest_core::node::node_type;
use serde_json::{json, Value as JsonValue};

use super::{scripts, CdpTransport};

#[derive(Debug, Clone)]
struct FakeNode {
    node_type: i64,
    name: String,
    attrs: Vec<(String, String)>,
    inner_html: String,
    inner_text: String,
    children: Vec<i64>,
    parent: Option<i64>,
}

impl FakeNode {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
struct State {
    nodes: HashMap<i64, FakeNode>,
    next_id: i64,
    calls: Vec<String>,
    failing: HashSet<String>,
}

pub struct FakeDom {
    state: Mutex<State>,
}

impl FakeDom {
    pub const URL: &'static str = "https://example.com/page";
    pub const DOCUMENT: i64 = 1;
    pub const ROOT_DIV: i64 = 4;
    pub const P_A: i64 = 5;
    pub const P_B: i64 = 6;
    pub const SAMPLE_HTML: &'static str = r#"<html><head></head><body><div id="root"><p class="a">Hi</p><p class="b">Yo</p></div></body></html>"#;

    pub fn new() -> Self {
        let mut state = State {
            next_id: 2,
            ..State::default()
        };
        state.nodes.insert(
            Self::DOCUMENT,
            FakeNode {
                node_type: node_type::DOCUMENT,
                name: "#document".to_string(),
                attrs: Vec::new(),
                inner_html: String::new(),
                inner_text: String::new(),
                children: Vec::new(),
                parent: None,
            },
        );
        Self {
            state: Mutex::new(state),
        }
    }

    /// `SAMPLE_HTML` laid out with fixed ids: html 2, body 3, div 4, p.a 5, p.b 6.
    pub fn sample() -> Self {
        let dom = Self::new();
        let div_inner = r#"<p class="a">Hi</p><p class="b">Yo</p>"#;
        let html = dom.add_element(Self::DOCUMENT, "html", &[], "", "Hi\nYo");
        let body = dom.add_element(html, "body", &[], "", "Hi\nYo");
        let div = dom.add_element(body, "div", &[("id", "root")], div_inner, "Hi\nYo");
        dom.add_element(div, "p", &[("class", "a")], "Hi", "Hi");
        dom.add_element(div, "p", &[("class", "b")], "Yo", "Yo");
        {
            let mut state = dom.state.lock().unwrap();
            if let Some(doc) = state.nodes.get_mut(&Self::DOCUMENT) {
                doc.inner_html = Self::SAMPLE_HTML.to_string();
            }
        }
        dom
    }

    pub fn add_element(
        &self,
        parent: i64,
        tag: &str,
        attrs: &[(&str, &str)],
        inner_html: &str,
        inner_text: &str,
    ) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        state.nodes.insert(
            id,
            FakeNode {
                node_type: node_type::ELEMENT,
                name: tag.to_string(),
                attrs: attrs
                    .iter()
                    .map(|(n, v)| (n.to_string(), v.to_string()))
                    .collect(),
                inner_html: inner_html.to_string(),
                inner_text: inner_text.to_string(),
                children: Vec::new(),
                parent: Some(parent),
            },
        );
        if let Some(p) = state.nodes.get_mut(&parent) {
            p.children.push(id);
        }
        id
    }

    pub fn set_attribute(&self, id: i64, name: &str, value: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(node) = state.nodes.get_mut(&id) {
            match node.attrs.iter_mut().find(|(n, _)| n == name) {
                Some(slot) => slot.1 = value.to_string(),
                None => node.attrs.push((name.to_string(), value.to_string())),
            }
        }
    }

    /// Make every later call to `method` fail.
    pub fn fail(&self, method: &str) {
        self.state.lock().unwrap().failing.insert(method.to_string());
    }

    pub fn calls_to(&self, method: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|m| *m == method)
            .count()
    }
}

fn matches(node: &FakeNode, selector: &str) -> bool {
    if node.node_type != node_type::ELEMENT {
        return false;
    }
    let (tag, rest) = match selector.find(|c| c == '.' || c == '#') {
        Some(pos) => selector.split_at(pos),
        None => (selector, ""),
    };
    if !tag.is_empty() && !tag.eq_ignore_ascii_case(&node.name) {
        return false;
    }
    if let Some(class) = rest.strip_prefix('.') {
        return node.attr("class").map_or(false, |c| has_class(c, class));
    }
    if let Some(id) = rest.strip_prefix('#') {
        return node.attr("id") == Some(id);
    }
    true
}

fn descendants(state: &State, id: i64, out: &mut Vec<i64>) {
    if let Some(node) = state.nodes.get(&id) {
        for child in &node.children {
            out.push(*child);
            descendants(state, *child, out);
        }
    }
}

fn select(state: &State, scope: i64, selector: &str) -> Vec<i64> {
    let direct = || {
        state
            .nodes
            .get(&scope)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    };
    match selector {
        ":scope > *" => direct(),
        ":root" => direct(),
        _ => {
            let mut all = Vec::new();
            descendants(state, scope, &mut all);
            all.into_iter()
                .filter(|id| state.nodes.get(id).map_or(false, |n| matches(n, selector)))
                .collect()
        }
    }
}

fn closest(state: &State, mut id: i64, selector: &str) -> bool {
    loop {
        let Some(node) = state.nodes.get(&id) else {
            return false;
        };
        if matches(node, selector) {
            return true;
        }
        match node.parent {
            Some(parent) => id = parent,
            None => return false,
        }
    }
}

fn node_id_param(params: &JsonValue) -> i64 {
    params.get("nodeId").and_then(|v| v.as_i64()).unwrap_or(0)
}

fn selector_param(params: &JsonValue) -> &str {
    params.get("selector").and_then(|v| v.as_str()).unwrap_or("")
}

#[async_trait]
impl CdpTransport for FakeDom {
    async fn send_command(&self, method: &str, params: JsonValue) -> Result<JsonValue, String> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(method.to_string());
        if state.failing.contains(method) {
            return Err(format!("{} failed", method));
        }

        match method {
            "DOM.getDocument" => Ok(json!({ "root": { "nodeId": Self::DOCUMENT } })),
            "DOM.describeNode" => {
                let id = node_id_param(&params);
                let node = state
                    .nodes
                    .get(&id)
                    .ok_or_else(|| "Could not find node with given id".to_string())?;
                let name = if node.node_type == node_type::ELEMENT {
                    node.name.to_ascii_uppercase()
                } else {
                    node.name.clone()
                };
                let mut described = json!({
                    "nodeId": id,
                    "nodeType": node.node_type,
                    "nodeName": name,
                    "localName": node.name,
                });
                if node.node_type == node_type::DOCUMENT {
                    described["documentURL"] = json!(Self::URL);
                }
                Ok(json!({ "node": described }))
            }
            "DOM.getAttributes" => {
                let id = node_id_param(&params);
                let node = state
                    .nodes
                    .get(&id)
                    .ok_or_else(|| "Could not find node with given id".to_string())?;
                let flat: Vec<&str> = node
                    .attrs
                    .iter()
                    .flat_map(|(n, v)| [n.as_str(), v.as_str()])
                    .collect();
                Ok(json!({ "attributes": flat }))
            }
            "DOM.querySelector" => {
                let found = select(&state, node_id_param(&params), selector_param(&params));
                Ok(json!({ "nodeId": found.first().copied().unwrap_or(0) }))
            }
            "DOM.querySelectorAll" => {
                let found = select(&state, node_id_param(&params), selector_param(&params));
                Ok(json!({ "nodeIds": found }))
            }
            "DOM.resolveNode" => {
                let id = node_id_param(&params);
                if !state.nodes.contains_key(&id) {
                    return Err("No node with given id found".to_string());
                }
                Ok(json!({ "object": { "objectId": format!("node:{}", id) } }))
            }
            "Runtime.callFunctionOn" => {
                let id = params
                    .get("objectId")
                    .and_then(|v| v.as_str())
                    .and_then(|s| s.strip_prefix("node:"))
                    .and_then(|s| s.parse::<i64>().ok())
                    .ok_or_else(|| "Invalid remote object id".to_string())?;
                let node = state
                    .nodes
                    .get(&id)
                    .ok_or_else(|| "Could not find object with given id".to_string())?;
                let declaration = params
                    .get("functionDeclaration")
                    .and_then(|v| v.as_str())
                    .unwrap_or("");

                let value = if declaration == scripts::INNER_HTML {
                    json!(node.inner_html)
                } else if declaration == scripts::INNER_TEXT {
                    json!(node.inner_text)
                } else if declaration == scripts::CLOSEST {
                    let selector = params
                        .pointer("/arguments/0/value")
                        .and_then(|v| v.as_str())
                        .unwrap_or("");
                    json!(closest(&state, id, selector))
                } else {
                    return Err(format!("Unexpected function: {}", declaration));
                };
                Ok(json!({ "result": { "value": value } }))
            }
            "Runtime.releaseObject" => Ok(json!({})),
            other => Err(format!("'{}' wasn't found", other)),
        }
    }
}
