use std::collections::HashSet;
use std::io::{self, Read};
use std::time::Duration;

use proptest::prelude::*;

use lemonfeed::config::parse_format;
use lemonfeed::engine::core::reload_elapsed;
use lemonfeed::process::drain_lines;
use lemonfeed::render::escape_markup;

/// Hands out `data` in the given chunk sizes, then reports EOF.
struct Chunked {
    data: Vec<u8>,
    sizes: Vec<usize>,
}

impl Read for Chunked {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.data.is_empty() {
            return Ok(0);
        }
        let want = self.sizes.pop().unwrap_or(self.data.len()).max(1);
        let n = want.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data.drain(..n);
        Ok(n)
    }
}

proptest! {
    #[test]
    fn escaping_adds_one_byte_per_percent(text in ".{0,40}") {
        let (escaped, added) = escape_markup(&text);
        let percents = text.matches('%').count();
        prop_assert_eq!(added, percents);
        prop_assert_eq!(escaped.len(), text.len() + percents);
        prop_assert_eq!(escaped.replace("%%", "%"), text);
    }

    #[test]
    fn drained_lines_do_not_depend_on_chunking(
        lines in prop::collection::vec("[a-z0-9 ]{0,12}", 1..8),
        sizes in prop::collection::vec(1usize..9, 0..20),
    ) {
        let mut data = lines.join("\n");
        data.push('\n');

        let mut reader = Chunked { data: data.into_bytes(), sizes };
        let mut carry = Vec::new();
        let drained = drain_lines(&mut reader, &mut carry, 64).unwrap();

        prop_assert!(drained.eof);
        prop_assert_eq!(drained.last_line(), lines.last().map(String::as_str));
        prop_assert_eq!(&drained.lines, &lines);
    }

    #[test]
    fn reload_elapsed_is_monotonic(
        reload_ms in 0u64..10_000,
        tol_ms in 0u64..500,
        a in 0u64..20_000,
        b in 0u64..20_000,
    ) {
        let (early, late) = if a <= b { (a, b) } else { (b, a) };
        let reload = Duration::from_millis(reload_ms);
        let tol = Duration::from_millis(tol_ms);
        if reload_elapsed(Duration::from_millis(early), reload, tol) {
            prop_assert!(reload_elapsed(Duration::from_millis(late), reload, tol));
        }
    }

    #[test]
    fn format_slots_are_unique_and_ordered(
        words in prop::collection::vec(prop_oneof!["[a-c]{1,2}", Just("|".to_string())], 0..16),
    ) {
        let format = words.join(" ");
        let slots = parse_format(&format);

        let mut seen = HashSet::new();
        for slot in &slots {
            prop_assert!(seen.insert(slot.sid.clone()), "duplicate {}", slot.sid);
        }
        for pair in slots.windows(2) {
            prop_assert!(pair[0].align <= pair[1].align);
        }
    }
}
