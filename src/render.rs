// src/render.rs

//! Bar protocol encoder.
//!
//! Produces the renderer's `%{...}` markup. One block becomes:
//!
//! ```text
//! [%{A<n>:<sid>_<suffix>:}...]%{O<offset>}%{F<fg>}%{B<bg>}%{U<lc>}%{+o+u}
//! %{T3}%{F..}%{B..}<prefix> %{T2}%{F..}%{B..}<label> %{T1}%{F..}%{B..}<result>
//! %{T3}%{F..}%{B..}<suffix> %{T-}%{F-}%{B-}%{U-}%{-o-u}[%{A}...]
//! ```
//!
//! (without the line breaks and spaces). Unset colors are written as `-`,
//! which makes the renderer fall back to its own defaults.

use crate::config::StyleConfig;
use crate::model::Block;
use crate::types::{Align, ClickAction};

/// Effective style of one block after cascading block → `[default]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedStyle<'a> {
    pub fg: Option<&'a str>,
    pub bg: Option<&'a str>,
    pub lc: Option<&'a str>,
    pub label_fg: Option<&'a str>,
    pub label_bg: Option<&'a str>,
    pub affix_fg: Option<&'a str>,
    pub affix_bg: Option<&'a str>,
    pub prefix: &'a str,
    pub suffix: &'a str,
    pub offset: i32,
    pub overline: bool,
    pub underline: bool,
}

/// Cascade each key independently: block, then bar-level default.
///
/// Label and affix colors additionally fall back to the resolved block
/// colors before ending up unset.
pub fn resolve_style<'a>(block: &'a StyleConfig, defaults: &'a StyleConfig) -> ResolvedStyle<'a> {
    fn pick<'s>(own: &'s Option<String>, fallback: &'s Option<String>) -> Option<&'s str> {
        own.as_deref().or(fallback.as_deref())
    }

    let fg = pick(&block.fg, &defaults.fg);
    let bg = pick(&block.bg, &defaults.bg);

    ResolvedStyle {
        fg,
        bg,
        lc: pick(&block.lc, &defaults.lc),
        label_fg: pick(&block.label_fg, &defaults.label_fg).or(fg),
        label_bg: pick(&block.label_bg, &defaults.label_bg).or(bg),
        affix_fg: pick(&block.affix_fg, &defaults.affix_fg).or(fg),
        affix_bg: pick(&block.affix_bg, &defaults.affix_bg).or(bg),
        prefix: pick(&block.prefix, &defaults.prefix).unwrap_or(""),
        suffix: pick(&block.suffix, &defaults.suffix).unwrap_or(""),
        offset: block.offset.or(defaults.offset).unwrap_or(0),
        overline: block.overline.or(defaults.overline).unwrap_or(false),
        underline: block.underline.or(defaults.underline).unwrap_or(false),
    }
}

/// Escape `%` so block output is never read as markup.
///
/// Returns the escaped text and the number of bytes the escaping added,
/// which the caller adds to the padding width.
pub fn escape_markup(text: &str) -> (String, usize) {
    let extra = text.matches('%').count();
    if extra == 0 {
        return (text.to_string(), 0);
    }
    (text.replace('%', "%%"), extra)
}

fn color(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

fn flag(on: bool) -> char {
    if on { '+' } else { '-' }
}

/// Markup for one block, or `None` if it has nothing to show yet.
pub fn block_fragment(block: &Block, defaults: &StyleConfig) -> Option<String> {
    let result = block.result()?;
    let config = block.config();
    let style = resolve_style(&config.style, defaults);
    let label = config.label.as_deref().unwrap_or("");

    let (escaped, extra) = escape_markup(result);
    let width = config.width + extra;

    let mut out = String::with_capacity(128 + escaped.len());

    let mut regions = 0;
    for action in ClickAction::ALL {
        if block.click_command(action).is_some() {
            out.push_str(&format!(
                "%{{A{}:{}:}}",
                action.button(),
                action.token(block.sid())
            ));
            regions += 1;
        }
    }

    out.push_str(&format!(
        "%{{O{}}}%{{F{}}}%{{B{}}}%{{U{}}}%{{{}o{}u}}",
        style.offset,
        color(style.fg),
        color(style.bg),
        color(style.lc),
        flag(style.overline),
        flag(style.underline),
    ));
    out.push_str(&format!(
        "%{{T3}}%{{F{}}}%{{B{}}}{}",
        color(style.affix_fg),
        color(style.affix_bg),
        style.prefix
    ));
    out.push_str(&format!(
        "%{{T2}}%{{F{}}}%{{B{}}}{}",
        color(style.label_fg),
        color(style.label_bg),
        label
    ));
    out.push_str(&format!(
        "%{{T1}}%{{F{}}}%{{B{}}}{:>width$}",
        color(style.fg),
        color(style.bg),
        escaped,
    ));
    out.push_str(&format!(
        "%{{T3}}%{{F{}}}%{{B{}}}{}",
        color(style.affix_fg),
        color(style.affix_bg),
        style.suffix
    ));
    out.push_str("%{T-}%{F-}%{B-}%{U-}%{-o-u}");
    for _ in 0..regions {
        out.push_str("%{A}");
    }

    Some(out)
}

/// The full bar line (without the trailing newline).
///
/// Blocks without a result are skipped. An alignment directive is written
/// only when the zone differs from the previously written block's.
pub fn bar_text(blocks: &[Block], defaults: &StyleConfig) -> String {
    let mut out = String::new();
    let mut zone: Option<Align> = None;

    for block in blocks {
        let Some(fragment) = block_fragment(block, defaults) else {
            continue;
        };
        if zone != Some(block.align()) {
            out.push_str("%{");
            out.push(block.align().directive());
            out.push('}');
            zone = Some(block.align());
        }
        out.push_str(&fragment);
    }

    out
}
