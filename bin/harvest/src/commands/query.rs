use std::path::Path;

use anyhow::Context;
use harvest_core::{Config, Value};
use harvest_drivers::StaticNode;
use harvest_stdlib::{FunctionContext, FunctionRegistry};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Text { all: bool },
    Html { all: bool },
    Count,
    Exists,
}

impl Mode {
    pub fn from_flags(html: bool, all: bool, count: bool, exists: bool) -> Self {
        if count {
            Mode::Count
        } else if exists {
            Mode::Exists
        } else if html {
            Mode::Html { all }
        } else {
            Mode::Text { all }
        }
    }

    fn function(&self) -> &'static str {
        match self {
            Mode::Text { all: false } => "INNER_TEXT",
            Mode::Text { all: true } => "INNER_TEXT_ALL",
            Mode::Html { all: false } => "INNER_HTML",
            Mode::Html { all: true } => "INNER_HTML_ALL",
            Mode::Count => "ELEMENTS_COUNT",
            Mode::Exists => "ELEMENT_EXISTS",
        }
    }
}

pub async fn run(config: &Config, file: &Path, selector: &str, mode: Mode) -> anyhow::Result<()> {
    let markup = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let doc = StaticNode::parse_document_with_url(&markup, file.display().to_string());
    debug!(file = %file.display(), bytes = markup.len(), "Parsed document");

    let result = extract(config, Value::node(doc), selector, mode).await?;
    super::print_value(&result)
}

async fn extract(config: &Config, doc: Value, selector: &str, mode: Mode) -> anyhow::Result<Value> {
    let registry = FunctionRegistry::with_defaults();
    let ctx = FunctionContext {
        wait: config.wait.clone(),
        ..FunctionContext::default()
    };
    let value = registry
        .call(mode.function(), &ctx, &[doc, Value::from(selector)])
        .await?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKUP: &str = "<ul><li class=\"x\">one</li><li><b>two</b></li></ul>";

    async fn run_mode(mode: Mode) -> Value {
        let doc = Value::node(StaticNode::parse_document(MARKUP));
        extract(&Config::default(), doc, "li", mode).await.unwrap()
    }

    #[test]
    fn test_mode_from_flags() {
        assert_eq!(Mode::from_flags(false, false, false, false), Mode::Text { all: false });
        assert_eq!(Mode::from_flags(true, true, false, false), Mode::Html { all: true });
        assert_eq!(Mode::from_flags(true, false, true, false), Mode::Count);
        assert_eq!(Mode::from_flags(false, false, false, true), Mode::Exists);
    }

    #[tokio::test]
    async fn test_extract_modes() {
        assert_eq!(run_mode(Mode::Text { all: false }).await, Value::from("one"));
        assert_eq!(
            run_mode(Mode::Html { all: true }).await.to_json(),
            serde_json::json!(["one", "<b>two</b>"])
        );
        assert_eq!(run_mode(Mode::Count).await, Value::Int(2));
        assert_eq!(run_mode(Mode::Exists).await, Value::Boolean(true));
    }
}
