//! Commands that describe the plugin without serving it

use anyhow::{Context, Result};

use super::output::Output;
use crate::config::Config;
use crate::macros::builtin;

pub fn capability(config: &Config, output: &Output) {
    let capability = config.plugin_capability();

    if output.is_json() {
        output.data(&capability);
        return;
    }

    println!("Protocol version: {}", capability.protocol_version);
    match &capability.features {
        Some(features) if !features.is_empty() => {
            println!("Features:");
            for feature in features {
                println!("  {}", feature);
            }
        }
        _ => println!("Features: none"),
    }
}

pub fn macros(output: &Output) -> Result<()> {
    let registry = builtin::registry().context("Failed to register built-in macros")?;

    if output.is_json() {
        let items: Vec<_> = registry
            .entries()
            .map(|entry| {
                serde_json::json!({
                    "module": entry.module_name,
                    "type": entry.type_name,
                    "shape": entry.shape.as_str(),
                })
            })
            .collect();
        output.data(&items);
        return Ok(());
    }

    if registry.is_empty() {
        println!("No macros registered.");
        return Ok(());
    }

    println!("{:<20} {:<24} {}", "MODULE", "TYPE", "SHAPE");
    println!("{}", "-".repeat(58));
    for entry in registry.entries() {
        println!(
            "{:<20} {:<24} {}",
            entry.module_name, entry.type_name, entry.shape
        );
    }

    Ok(())
}
