// src/config/validate.rs

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::config::escapes::decode_in_place;
use crate::config::format::parse_format;
use crate::config::model::{BlockConfig, ConfigFile, MAX_SECONDS, RawConfigFile, StyleConfig};
use crate::errors::{LemonfeedError, Result};

static COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$").expect("color regex is valid")
});

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::LemonfeedError;

    fn try_from(mut raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        decode_text(&mut raw);
        warn_unused_blocks(&raw);
        Ok(ConfigFile::new_unchecked(
            raw.config, raw.bar, raw.default, raw.block,
        ))
    }
}

/// Run every check on a raw config without consuming it.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    validate_scheduler_section(cfg)?;
    validate_bar_section(cfg)?;
    validate_style("[default]", &cfg.default)?;
    for (sid, block) in cfg.block.iter() {
        validate_block(sid, block)?;
    }
    Ok(())
}

fn validate_scheduler_section(cfg: &RawConfigFile) -> Result<()> {
    let sched = &cfg.config;

    if !sched.tolerance.is_finite() || sched.tolerance < 0.0 {
        return Err(LemonfeedError::ConfigError(format!(
            "[config].tolerance must be a finite number >= 0 (got {})",
            sched.tolerance
        )));
    }
    check_upper_bound("[config].tolerance", sched.tolerance)?;

    if sched.line_limit == 0 {
        return Err(LemonfeedError::ConfigError(
            "[config].line_limit must be >= 1 (got 0)".to_string(),
        ));
    }

    if let Some(timeout) = sched.block_timeout {
        if !timeout.is_finite() || timeout <= 0.0 {
            return Err(LemonfeedError::ConfigError(format!(
                "[config].block_timeout must be a finite number > 0 (got {timeout})"
            )));
        }
        check_upper_bound("[config].block_timeout", timeout)?;
    }

    if !sched.retry_delay.is_finite() || sched.retry_delay <= 0.0 {
        return Err(LemonfeedError::ConfigError(format!(
            "[config].retry_delay must be a finite number > 0 (got {})",
            sched.retry_delay
        )));
    }
    check_upper_bound("[config].retry_delay", sched.retry_delay)?;

    Ok(())
}

fn validate_bar_section(cfg: &RawConfigFile) -> Result<()> {
    let bar = &cfg.bar;

    if bar.bin.trim().is_empty() {
        return Err(LemonfeedError::ConfigError(
            "[bar].bin must not be empty".to_string(),
        ));
    }

    for (key, value) in [
        ("fg", bar.fg.as_deref()),
        ("bg", bar.bg.as_deref()),
        ("lc", bar.lc.as_deref()),
    ] {
        check_color("[bar]", key, value)?;
    }

    Ok(())
}

fn validate_style(section: &str, style: &StyleConfig) -> Result<()> {
    for (key, value) in style.colors() {
        check_color(section, key, value)?;
    }
    Ok(())
}

fn validate_block(sid: &str, block: &BlockConfig) -> Result<()> {
    let section = format!("[block.{sid}]");

    if sid.chars().any(|c| c.is_whitespace() || c == '|' || c == ':') {
        return Err(LemonfeedError::ConfigError(format!(
            "block name '{sid}' must not contain whitespace, '|' or ':'"
        )));
    }

    if let Some(cmd) = &block.command {
        if cmd.trim().is_empty() {
            return Err(LemonfeedError::ConfigError(format!(
                "{section}.command must not be empty"
            )));
        }
    }

    if let Some(trigger) = &block.trigger {
        if trigger.trim().is_empty() {
            return Err(LemonfeedError::ConfigError(format!(
                "{section}.trigger must not be empty"
            )));
        }
    }

    if let Some(reload) = block.reload {
        if !reload.is_finite() {
            return Err(LemonfeedError::ConfigError(format!(
                "{section}.reload must be a finite number (got {reload})"
            )));
        }
        check_upper_bound(&format!("{section}.reload"), reload)?;
    }

    if block.live && block.trigger.is_some() {
        return Err(LemonfeedError::ConfigError(format!(
            "{section}: `live` cannot be combined with `trigger`"
        )));
    }

    if block.live && block.reload.is_some() {
        return Err(LemonfeedError::ConfigError(format!(
            "{section}: `live` cannot be combined with `reload`"
        )));
    }

    if block.trigger.is_some() && block.reload.is_some() {
        warn!(block = %sid, "both `trigger` and `reload` set; `reload` is ignored");
    }

    validate_style(&section, &block.style)
}

/// Durations are added to `Instant`s at runtime; keep them in a range that
/// cannot overflow.
fn check_upper_bound(key: &str, secs: f64) -> Result<()> {
    if secs > MAX_SECONDS {
        return Err(LemonfeedError::ConfigError(format!(
            "{key} must be at most {MAX_SECONDS} seconds (got {secs})"
        )));
    }
    Ok(())
}

fn check_color(section: &str, key: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(color) if !COLOR.is_match(color) => Err(LemonfeedError::ConfigError(format!(
            "{section}.{key}: invalid color '{color}' (expected #RGB, #RRGGBB or #AARRGGBB)"
        ))),
        _ => Ok(()),
    }
}

fn decode_text(cfg: &mut RawConfigFile) {
    decode_style_text(&mut cfg.default);
    for block in cfg.block.values_mut() {
        decode_in_place(&mut block.label);
        decode_style_text(&mut block.style);
    }
}

fn decode_style_text(style: &mut StyleConfig) {
    decode_in_place(&mut style.prefix);
    decode_in_place(&mut style.suffix);
}

fn warn_unused_blocks(cfg: &RawConfigFile) {
    let layout = parse_format(&cfg.bar.format);
    for sid in cfg.block.keys() {
        if !layout.iter().any(|slot| &slot.sid == sid) {
            warn!(block = %sid, "block is configured but not listed in [bar].format; ignoring");
        }
    }
}
