// src/config/format.rs

//! Parsing of the bar's `format` string.
//!
//! ```text
//! "cpu memory | clock | volume battery"
//!  \_ left _/   \cntr/   \__ right ___/
//! ```
//!
//! Names are separated by whitespace or `|`. Each `|` moves to the next
//! zone (left, center, right); further separators keep the right zone.

use crate::types::Align;

/// One block's position on the bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSlot {
    pub sid: String,
    pub align: Align,
}

/// Split a format string into layout slots, in display order.
///
/// A name that appears more than once keeps its first slot; later
/// occurrences are ignored.
pub fn parse_format(format: &str) -> Vec<LayoutSlot> {
    let mut slots: Vec<LayoutSlot> = Vec::new();
    let mut align = Align::Left;
    let mut name = String::new();

    for c in format.chars() {
        match c {
            '|' => {
                flush(&mut name, align, &mut slots);
                align = align.next();
            }
            c if c.is_whitespace() => flush(&mut name, align, &mut slots),
            c => name.push(c),
        }
    }
    flush(&mut name, align, &mut slots);

    slots
}

fn flush(name: &mut String, align: Align, slots: &mut Vec<LayoutSlot>) {
    if name.is_empty() {
        return;
    }
    let sid = std::mem::take(name);
    if !slots.iter().any(|s| s.sid == sid) {
        slots.push(LayoutSlot { sid, align });
    }
}
