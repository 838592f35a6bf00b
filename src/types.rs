// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Horizontal zone of the bar a block is drawn in.
///
/// The renderer switches zones with `%{l}`, `%{c}` and `%{r}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    /// Directive character used by the renderer.
    pub fn directive(self) -> char {
        match self {
            Align::Left => 'l',
            Align::Center => 'c',
            Align::Right => 'r',
        }
    }

    /// The zone after this one; `Right` stays `Right`.
    pub fn next(self) -> Self {
        match self {
            Align::Left => Align::Center,
            Align::Center | Align::Right => Align::Right,
        }
    }
}

impl Default for Align {
    fn default() -> Self {
        Align::Left
    }
}

impl FromStr for Align {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "left" | "l" => Ok(Align::Left),
            "center" | "middle" | "c" => Ok(Align::Center),
            "right" | "r" => Ok(Align::Right),
            other => Err(format!(
                "invalid align: {other} (expected \"left\", \"center\" or \"right\")"
            )),
        }
    }
}

/// When a block gets (re)run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Runs once at startup.
    Once,
    /// Runs at startup and then every `reload` seconds.
    Timed,
    /// Runs whenever its spark produces a line.
    Sparked,
    /// Never runs itself; its spark's output *is* the result.
    Live,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BlockKind::Once => "once",
            BlockKind::Timed => "timed",
            BlockKind::Sparked => "sparked",
            BlockKind::Live => "live",
        };
        f.write_str(s)
    }
}

/// Mouse actions a block can react to.
///
/// The discriminant order matches the renderer's button numbering
/// (`A1` = left click, ..., `A5` = scroll down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickAction {
    Left,
    Middle,
    Right,
    ScrollUp,
    ScrollDown,
}

impl ClickAction {
    pub const ALL: [ClickAction; 5] = [
        ClickAction::Left,
        ClickAction::Middle,
        ClickAction::Right,
        ClickAction::ScrollUp,
        ClickAction::ScrollDown,
    ];

    /// Renderer button index used in `%{A<n>:...:}`.
    pub fn button(self) -> u8 {
        match self {
            ClickAction::Left => 1,
            ClickAction::Middle => 2,
            ClickAction::Right => 3,
            ClickAction::ScrollUp => 4,
            ClickAction::ScrollDown => 5,
        }
    }

    /// Token suffix appended to the block sid, without the underscore.
    pub fn suffix(self) -> &'static str {
        match self {
            ClickAction::Left => "lmb",
            ClickAction::Middle => "mmb",
            ClickAction::Right => "rmb",
            ClickAction::ScrollUp => "sup",
            ClickAction::ScrollDown => "sdn",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.suffix() == suffix)
    }

    /// Token the renderer echoes back when this region is clicked.
    pub fn token(self, sid: &str) -> String {
        format!("{sid}_{}", self.suffix())
    }
}

/// Direction of one of a child's standard streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamDir {
    In,
    Out,
    Err,
}
