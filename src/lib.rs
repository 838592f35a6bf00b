// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod model;
pub mod mux;
pub mod process;
pub mod render;
pub mod signals;
pub mod types;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{default_config_path, load_and_validate, parse_format, ConfigFile, LayoutSlot};
use crate::engine::{ProcessRunner, Scheduler};
use crate::model::renderer_args;
use crate::signals::SignalFlags;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and the block layout
/// - the renderer, blocks and sparks
/// - signal handling
/// - the tick loop, until a shutdown signal or the renderer going away
pub fn run(args: CliArgs) -> Result<()> {
    let config_path = args
        .config
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);
    let cfg = load_and_validate(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    let layout = parse_format(&cfg.bar.format);

    if args.dry_run {
        print_dry_run(&cfg, &layout);
        return Ok(());
    }

    if layout.is_empty() && !args.empty {
        bail!("[bar].format names no blocks (use --empty to run the bar anyway)");
    }
    info!(blocks = layout.len(), config = %config_path.display(), "configuration loaded");

    let signals = SignalFlags::install().context("installing signal handlers")?;
    let runner = ProcessRunner::new(cfg.config.line_limit, cfg.config.block_timeout_duration());

    let mut scheduler = Scheduler::from_config(&cfg, layout, runner, signals)?;
    scheduler.run()?;
    Ok(())
}

/// Print the renderer command line and the blocks it would show.
fn print_dry_run(cfg: &ConfigFile, layout: &[LayoutSlot]) {
    println!("lemonfeed dry-run");
    println!("  config.tolerance = {}", cfg.config.tolerance);
    println!("  config.line_limit = {}", cfg.config.line_limit);
    println!("  config.retry_delay = {}", cfg.config.retry_delay);
    if let Some(timeout) = cfg.config.block_timeout {
        println!("  config.block_timeout = {timeout}");
    }
    println!();

    let args = cfg
        .bar
        .args
        .clone()
        .unwrap_or_else(|| renderer_args(&cfg.bar));
    println!("bar: {} {}", cfg.bar.bin, args.join(" "));
    println!();

    println!("blocks ({}):", layout.len());
    for slot in layout {
        let block = cfg.block_or_default(&slot.sid);
        let align = block.align.unwrap_or(slot.align);
        println!("  - {} [{}, {:?}]", slot.sid, block.kind(), align);
        println!("      command: {}", block.effective_command(&slot.sid));
        if let Some(reload) = block.reload {
            println!("      reload: {reload}");
        }
        if let Some(ref trigger) = block.trigger {
            println!("      trigger: {trigger}");
            println!("      consume: {}", block.effective_consume());
        }
        for action in types::ClickAction::ALL {
            if let Some(cmd) = block.click(action) {
                println!("      {}: {cmd}", action.token(&slot.sid));
            }
        }
    }

    debug!("dry-run complete (nothing started)");
}
