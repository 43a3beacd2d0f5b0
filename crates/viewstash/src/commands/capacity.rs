//! Capacity command - shows the resolved scope capacity.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use console::Style;
use serde::Serialize;
use viewstash_config::{CapacityCell, CapacitySource, EnvSource, Layered, PARAM_NAMES, TomlSource};

use super::Context;

/// Arguments for the capacity command.
#[derive(Args, Debug)]
pub struct CapacityArgs {
    /// TOML file consulted after the environment
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Capacity response for JSON output.
#[derive(Debug, Serialize)]
struct CapacityOutput {
    capacity: usize,
    unbounded: bool,
    source: Option<String>,
}

/// Run the capacity command.
pub fn run(args: CapacityArgs, ctx: &Context) -> Result<()> {
    let mut sources = Layered::new().then(EnvSource);
    if let Some(path) = &args.config {
        let file = TomlSource::load(path)
            .with_context(|| format!("loading capacity parameters from {}", path.display()))?;
        sources = sources.then(file);
    }

    let resolved = CapacityCell::global().get_or_resolve(&sources)?;
    let param = match &resolved.source {
        CapacitySource::Param(name) => Some(name.clone()),
        CapacitySource::Default => None,
    };

    if ctx.json_output {
        let output = CapacityOutput {
            capacity: resolved.value,
            unbounded: resolved.value == 0,
            source: param,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    let value = if resolved.value == 0 {
        "unbounded".to_string()
    } else {
        resolved.value.to_string()
    };
    println!("  {} {}", dim.apply_to("Capacity:"), value);
    println!("  {} {}", dim.apply_to("Source:  "), resolved.source);

    if ctx.verbose {
        println!();
        println!("  {}", dim.apply_to("Parameters, first match wins:"));
        for name in PARAM_NAMES {
            println!("    {}", name);
        }
    }

    Ok(())
}
