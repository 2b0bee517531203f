use std::sync::Arc;

use anyhow::Context;
use harvest_core::{Config, HtmlNode, Value};
use harvest_drivers::{discover_page_ws_url, CdpClient, DomSession, DynamicNode};
use harvest_stdlib::{FunctionContext, FunctionRegistry};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub async fn run(
    config: &Config,
    selector: &str,
    port: Option<u16>,
    wait_class: Option<String>,
    timeout_ms: Option<u64>,
) -> anyhow::Result<()> {
    let port = port.unwrap_or(config.cdp.debug_port);
    let ws_url = discover_page_ws_url(&config.cdp.host, port)
        .await
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("no debuggable page on {}:{}", config.cdp.host, port))?;
    info!(url = %ws_url, "Attaching to page");

    let client = CdpClient::connect(&ws_url, config.cdp.command_timeout())
        .await
        .map_err(anyhow::Error::msg)?;
    let session = DomSession::new(Arc::new(client), config.wait.clone());
    let doc = DynamicNode::document(session).await?;
    if let Some(url) = doc.url() {
        info!(page = url, "Document loaded");
    }
    let doc = Value::node(doc);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    let registry = FunctionRegistry::with_defaults();
    let ctx = FunctionContext::new(cancel, config.wait.clone());

    if let Some(class) = wait_class {
        let mut args = vec![doc.clone(), Value::from(selector), Value::from(class)];
        if let Some(ms) = timeout_ms {
            args.push(Value::Int(i64::try_from(ms).unwrap_or(i64::MAX)));
        }
        registry.call("WAIT_CLASS", &ctx, &args).await?;
    }

    let text = registry
        .call("INNER_TEXT", &ctx, &[doc, Value::from(selector)])
        .await?;
    super::print_value(&text)
}
