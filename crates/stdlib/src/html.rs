//! Functions over documents and elements.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use harvest_core::{Error, HtmlNode, NodeKind, Result, Value};

use crate::validation::{int_arg, string_arg, validate_args, validate_node};
use crate::{Function, FunctionContext, FunctionSchema};

const ANY_NODE: &[NodeKind] = &[NodeKind::Document, NodeKind::Element];

/// Validated `(node, selector)` pair.
fn node_and_selector(args: &[Value]) -> Result<(&Arc<dyn HtmlNode>, &str)> {
    validate_args(args, 2, 2)?;
    let node = validate_node(&args[0], ANY_NODE)?;
    let selector = string_arg(args, 1)?;
    Ok((node, selector))
}

pub struct ElementFunction;

#[async_trait]
impl Function for ElementFunction {
    fn schema(&self) -> FunctionSchema {
        FunctionSchema {
            name: "ELEMENT",
            description: "First element matching a CSS selector, or none.",
            min_args: 2,
            max_args: 2,
        }
    }

    async fn call(&self, _ctx: &FunctionContext, args: &[Value]) -> Result<Value> {
        let (node, selector) = node_and_selector(args)?;
        node.query_selector(selector).await
    }
}

pub struct ElementsFunction;

#[async_trait]
impl Function for ElementsFunction {
    fn schema(&self) -> FunctionSchema {
        FunctionSchema {
            name: "ELEMENTS",
            description: "All elements matching a CSS selector.",
            min_args: 2,
            max_args: 2,
        }
    }

    async fn call(&self, _ctx: &FunctionContext, args: &[Value]) -> Result<Value> {
        let (node, selector) = node_and_selector(args)?;
        Ok(Value::Array(node.query_selector_all(selector).await?))
    }
}

pub struct ElementExistsFunction;

#[async_trait]
impl Function for ElementExistsFunction {
    fn schema(&self) -> FunctionSchema {
        FunctionSchema {
            name: "ELEMENT_EXISTS",
            description: "Whether the node (or, for an element, an ancestor) matches a selector.",
            min_args: 2,
            max_args: 2,
        }
    }

    async fn call(&self, _ctx: &FunctionContext, args: &[Value]) -> Result<Value> {
        let (node, selector) = node_and_selector(args)?;
        Ok(Value::Boolean(node.exists_by_selector(selector).await?))
    }
}

pub struct ElementsCountFunction;

#[async_trait]
impl Function for ElementsCountFunction {
    fn schema(&self) -> FunctionSchema {
        FunctionSchema {
            name: "ELEMENTS_COUNT",
            description: "Number of elements matching a CSS selector.",
            min_args: 2,
            max_args: 2,
        }
    }

    async fn call(&self, _ctx: &FunctionContext, args: &[Value]) -> Result<Value> {
        let (node, selector) = node_and_selector(args)?;
        Ok(Value::Int(node.count_by_selector(selector).await?))
    }
}

pub struct InnerHtmlFunction;

#[async_trait]
impl Function for InnerHtmlFunction {
    fn schema(&self) -> FunctionSchema {
        FunctionSchema {
            name: "INNER_HTML",
            description: "Inner HTML of the node, or of the first element matching a selector.",
            min_args: 1,
            max_args: 2,
        }
    }

    async fn call(&self, _ctx: &FunctionContext, args: &[Value]) -> Result<Value> {
        validate_args(args, 1, 2)?;
        let node = validate_node(&args[0], ANY_NODE)?;
        if args.len() == 1 {
            return Ok(Value::String(node.inner_html().await?));
        }
        let selector = string_arg(args, 1)?;
        Ok(Value::String(node.inner_html_by_selector(selector).await?))
    }
}

pub struct InnerHtmlAllFunction;

#[async_trait]
impl Function for InnerHtmlAllFunction {
    fn schema(&self) -> FunctionSchema {
        FunctionSchema {
            name: "INNER_HTML_ALL",
            description: "Inner HTML of every element matching a selector.",
            min_args: 2,
            max_args: 2,
        }
    }

    async fn call(&self, _ctx: &FunctionContext, args: &[Value]) -> Result<Value> {
        let (node, selector) = node_and_selector(args)?;
        Ok(Value::Array(node.inner_html_by_selector_all(selector).await?))
    }
}

pub struct InnerTextFunction;

#[async_trait]
impl Function for InnerTextFunction {
    fn schema(&self) -> FunctionSchema {
        FunctionSchema {
            name: "INNER_TEXT",
            description: "Inner text of the node, or of the first element matching a selector.",
            min_args: 1,
            max_args: 2,
        }
    }

    async fn call(&self, _ctx: &FunctionContext, args: &[Value]) -> Result<Value> {
        validate_args(args, 1, 2)?;
        let node = validate_node(&args[0], ANY_NODE)?;
        if args.len() == 1 {
            return Ok(Value::String(node.inner_text().await?));
        }
        let selector = string_arg(args, 1)?;
        Ok(Value::String(node.inner_text_by_selector(selector).await?))
    }
}

pub struct InnerTextAllFunction;

#[async_trait]
impl Function for InnerTextAllFunction {
    fn schema(&self) -> FunctionSchema {
        FunctionSchema {
            name: "INNER_TEXT_ALL",
            description: "Inner text of every element matching a selector.",
            min_args: 2,
            max_args: 2,
        }
    }

    async fn call(&self, _ctx: &FunctionContext, args: &[Value]) -> Result<Value> {
        let (node, selector) = node_and_selector(args)?;
        Ok(Value::Array(node.inner_text_by_selector_all(selector).await?))
    }
}

pub struct AttrGetFunction;

#[async_trait]
impl Function for AttrGetFunction {
    fn schema(&self) -> FunctionSchema {
        FunctionSchema {
            name: "ATTR_GET",
            description: "Value of a named attribute on an element, or none.",
            min_args: 2,
            max_args: 2,
        }
    }

    async fn call(&self, _ctx: &FunctionContext, args: &[Value]) -> Result<Value> {
        validate_args(args, 2, 2)?;
        let node = validate_node(&args[0], &[NodeKind::Element])?;
        let name = string_arg(args, 1)?;
        node.get_attribute(name).await
    }
}

/// Blocks until a class shows up on an element of a live page.
///
/// Document form: `WAIT_CLASS(doc, selector, class[, timeoutMs])`.
/// Element form: `WAIT_CLASS(el, class[, timeoutMs])`.
pub struct WaitClassFunction;

impl WaitClassFunction {
    fn timeout(ctx: &FunctionContext, args: &[Value], index: usize) -> Result<Duration> {
        if args.len() <= index {
            return Ok(ctx.wait.default_timeout());
        }
        let ms = int_arg(args, index)?;
        if ms < 0 {
            return Err(Error::InvalidType(format!(
                "timeout must not be negative, got {}",
                ms
            )));
        }
        Ok(Duration::from_millis(ms as u64))
    }
}

#[async_trait]
impl Function for WaitClassFunction {
    fn schema(&self) -> FunctionSchema {
        FunctionSchema {
            name: "WAIT_CLASS",
            description: "Wait for a class to appear on an element.",
            min_args: 2,
            max_args: 4,
        }
    }

    async fn call(&self, ctx: &FunctionContext, args: &[Value]) -> Result<Value> {
        validate_args(args, 2, 4)?;
        let node = validate_node(&args[0], ANY_NODE)?;
        string_arg(args, 1)?;

        match node.kind() {
            NodeKind::Document => {
                validate_args(args, 3, 4)?;
                let selector = string_arg(args, 1)?;
                let class = string_arg(args, 2)?;
                let timeout = Self::timeout(ctx, args, 3)?;
                node.wait_for_class_by_selector(selector, class, Some(timeout), &ctx.cancel)
                    .await?;
            }
            NodeKind::Element => {
                validate_args(args, 2, 3)?;
                let class = string_arg(args, 1)?;
                let timeout = Self::timeout(ctx, args, 2)?;
                node.wait_for_class(class, Some(timeout), &ctx.cancel).await?;
            }
        }
        Ok(Value::None)
    }
}
