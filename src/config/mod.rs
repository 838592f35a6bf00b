// src/config/mod.rs

//! Configuration loading and validation for lemonfeed.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate colors, ranges and block type conflicts (`validate.rs`).
//! - Split the bar's format string into an ordered layout (`format.rs`).

pub mod escapes;
pub mod format;
pub mod loader;
pub mod model;
pub mod validate;

pub use format::{parse_format, LayoutSlot};
pub use loader::{default_config_path, load_and_validate, load_from_path, load_from_str};
pub use model::{
    BarSection, BlockConfig, ConfigFile, Dock, RawConfigFile, SchedulerSection, StyleConfig,
};
pub use validate::validate_config;
