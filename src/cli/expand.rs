//! One-shot dispatch of a request file

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use super::app::build_handler;
use super::output::Output;
use crate::config::Config;
use crate::protocol::{HostCapability, HostToPluginMessage};

pub fn run(
    config: &Config,
    request: &Path,
    protocol_version: Option<u32>,
    output: &Output,
) -> Result<()> {
    let content = fs::read_to_string(request)
        .with_context(|| format!("Failed to read request: {}", request.display()))?;
    let message: HostToPluginMessage = serde_json::from_str(&content)
        .with_context(|| format!("Failed to decode request: {}", request.display()))?;

    let mut handler = build_handler(config)?;

    if let Some(version) = protocol_version {
        handler.handle(&HostToPluginMessage::GetCapability {
            capability: Some(HostCapability::new(version)),
        });
        debug!(
            negotiated = handler.negotiated().protocol_version(),
            "pre-negotiated capability"
        );
    }

    let reply = handler.handle(&message);
    output.data(&reply);

    Ok(())
}
