// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::types::{Align, BlockKind, ClickAction};

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// tolerance = 0.1
///
/// [bar]
/// format = "cpu | clock battery"
/// height = 20
///
/// [default]
/// affix_fg = "#888888"
///
/// [block.cpu]
/// command = "~/.config/lemonfeed/blocks/cpu"
/// reload = 2.0
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    /// Scheduler behaviour from `[config]`.
    #[serde(default)]
    pub config: SchedulerSection,

    /// Renderer geometry and defaults from `[bar]`.
    #[serde(default)]
    pub bar: BarSection,

    /// Bar-level block style from `[default]`.
    #[serde(default)]
    pub default: StyleConfig,

    /// All blocks from `[block.<sid>]`, keyed by sid.
    #[serde(default)]
    pub block: BTreeMap<String, BlockConfig>,
}

/// Validated configuration. Only obtainable via `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: SchedulerSection,
    pub bar: BarSection,
    pub default: StyleConfig,
    pub block: BTreeMap<String, BlockConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: SchedulerSection,
        bar: BarSection,
        default: StyleConfig,
        block: BTreeMap<String, BlockConfig>,
    ) -> Self {
        Self {
            config,
            bar,
            default,
            block,
        }
    }

    /// Config for `sid`, or an all-defaults block config if the section is
    /// missing (the block then runs a command named like its sid).
    pub fn block_or_default(&self, sid: &str) -> BlockConfig {
        self.block.get(sid).cloned().unwrap_or_default()
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSection {
    /// Seconds a timed block may be run early.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Maximum number of bytes read for one block line.
    #[serde(default = "default_line_limit")]
    pub line_limit: usize,

    /// Seconds to wait for a block's output line. Absent means wait
    /// indefinitely.
    #[serde(default)]
    pub block_timeout: Option<f64>,

    /// Seconds before a failed block without a reload interval is tried
    /// again.
    #[serde(default = "default_retry_delay")]
    pub retry_delay: f64,
}

/// Upper bound for every duration in the config (one year).
pub const MAX_SECONDS: f64 = 365.0 * 24.0 * 3600.0;

/// Seconds from the config as a `Duration`, clamped to `0..=MAX_SECONDS`.
/// NaN maps to zero.
pub fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.clamp(0.0, MAX_SECONDS)).unwrap_or(Duration::ZERO)
}

fn default_tolerance() -> f64 {
    0.1
}

fn default_line_limit() -> usize {
    2048
}

fn default_retry_delay() -> f64 {
    5.0
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            line_limit: default_line_limit(),
            block_timeout: None,
            retry_delay: default_retry_delay(),
        }
    }
}

impl SchedulerSection {
    pub fn tolerance_duration(&self) -> Duration {
        seconds(self.tolerance)
    }

    pub fn block_timeout_duration(&self) -> Option<Duration> {
        self.block_timeout.map(seconds)
    }

    pub fn retry_delay_duration(&self) -> Duration {
        seconds(self.retry_delay)
    }
}

/// Where the renderer docks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dock {
    #[default]
    Top,
    Bottom,
}

/// `[bar]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BarSection {
    /// Renderer binary.
    #[serde(default = "default_bar_bin")]
    pub bin: String,

    /// Explicit renderer arguments; replaces the generated ones.
    #[serde(default)]
    pub args: Option<Vec<String>>,

    /// Window name handed to the renderer.
    #[serde(default = "default_bar_name")]
    pub name: String,

    #[serde(default)]
    pub width: u32,

    #[serde(default)]
    pub height: u32,

    #[serde(default)]
    pub x: i32,

    #[serde(default)]
    pub y: i32,

    #[serde(default)]
    pub dock: Dock,

    /// Force docking even if the WM doesn't support it.
    #[serde(default)]
    pub force: bool,

    /// Block sids in display order, with up to two `|` zone separators.
    #[serde(default)]
    pub format: String,

    #[serde(default)]
    pub fg: Option<String>,

    #[serde(default)]
    pub bg: Option<String>,

    /// Default underline/overline color.
    #[serde(default)]
    pub lc: Option<String>,

    /// Underline/overline width in pixels.
    #[serde(default)]
    pub lw: Option<u32>,

    #[serde(default)]
    pub block_font: Option<String>,

    #[serde(default)]
    pub label_font: Option<String>,

    #[serde(default)]
    pub affix_font: Option<String>,
}

fn default_bar_bin() -> String {
    "lemonbar".to_string()
}

fn default_bar_name() -> String {
    "lemonfeed".to_string()
}

impl Default for BarSection {
    fn default() -> Self {
        Self {
            bin: default_bar_bin(),
            args: None,
            name: default_bar_name(),
            width: 0,
            height: 0,
            x: 0,
            y: 0,
            dock: Dock::Top,
            force: false,
            format: String::new(),
            fg: None,
            bg: None,
            lc: None,
            lw: None,
            block_font: None,
            label_font: None,
            affix_font: None,
        }
    }
}

/// Style keys shared by `[default]` and `[block.<sid>]`.
///
/// Every key is optional so that block values can fall back to the
/// bar-level defaults.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct StyleConfig {
    #[serde(default)]
    pub fg: Option<String>,
    #[serde(default)]
    pub bg: Option<String>,
    /// Overline/underline color.
    #[serde(default)]
    pub lc: Option<String>,
    #[serde(default)]
    pub label_fg: Option<String>,
    #[serde(default)]
    pub label_bg: Option<String>,
    #[serde(default)]
    pub affix_fg: Option<String>,
    #[serde(default)]
    pub affix_bg: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub suffix: Option<String>,
    /// Horizontal offset in pixels before the block.
    #[serde(default)]
    pub offset: Option<i32>,
    #[serde(default)]
    pub overline: Option<bool>,
    #[serde(default)]
    pub underline: Option<bool>,
}

impl StyleConfig {
    /// All color values with their key names, for validation.
    pub fn colors(&self) -> [(&'static str, Option<&str>); 7] {
        [
            ("fg", self.fg.as_deref()),
            ("bg", self.bg.as_deref()),
            ("lc", self.lc.as_deref()),
            ("label_fg", self.label_fg.as_deref()),
            ("label_bg", self.label_bg.as_deref()),
            ("affix_fg", self.affix_fg.as_deref()),
            ("affix_bg", self.affix_bg.as_deref()),
        ]
    }
}

/// `[block.<sid>]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BlockConfig {
    /// Command to run. Defaults to the block's sid.
    #[serde(default, alias = "bin")]
    pub command: Option<String>,

    /// Seconds between runs; makes the block timed.
    #[serde(default)]
    pub reload: Option<f64>,

    /// Spark command whose output lines trigger a run.
    #[serde(default)]
    pub trigger: Option<String>,

    /// Run the command continuously and show each line it prints.
    #[serde(default)]
    pub live: bool,

    /// Pass the spark's line to the command as its argument.
    #[serde(default)]
    pub consume: Option<bool>,

    /// Overrides the zone implied by the position in the format string.
    #[serde(default)]
    pub align: Option<Align>,

    /// Minimum display width; shorter results are right-aligned.
    #[serde(default)]
    pub width: usize,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(flatten)]
    pub style: StyleConfig,

    #[serde(default)]
    pub mouse_left: Option<String>,
    #[serde(default)]
    pub mouse_middle: Option<String>,
    #[serde(default)]
    pub mouse_right: Option<String>,
    #[serde(default)]
    pub scroll_up: Option<String>,
    #[serde(default)]
    pub scroll_down: Option<String>,
}

impl BlockConfig {
    /// Scheduling type: `live` wins over `trigger`, which wins over `reload`.
    pub fn kind(&self) -> BlockKind {
        if self.live {
            BlockKind::Live
        } else if self.trigger.is_some() {
            BlockKind::Sparked
        } else if self.reload.is_some() {
            BlockKind::Timed
        } else {
            BlockKind::Once
        }
    }

    pub fn effective_command<'a>(&'a self, sid: &'a str) -> &'a str {
        self.command.as_deref().unwrap_or(sid)
    }

    /// Defaults to `true`.
    pub fn effective_consume(&self) -> bool {
        self.consume.unwrap_or(true)
    }

    /// Reload interval, or `None` for blocks that never re-run on a timer.
    pub fn reload_interval(&self) -> Option<Duration> {
        match self.reload {
            Some(secs) if secs > 0.0 && secs.is_finite() => Some(seconds(secs)),
            _ => None,
        }
    }

    pub fn click(&self, action: ClickAction) -> Option<&str> {
        let cmd = match action {
            ClickAction::Left => &self.mouse_left,
            ClickAction::Middle => &self.mouse_middle,
            ClickAction::Right => &self.mouse_right,
            ClickAction::ScrollUp => &self.scroll_up,
            ClickAction::ScrollDown => &self.scroll_down,
        };
        cmd.as_deref().filter(|c| !c.trim().is_empty())
    }
}
