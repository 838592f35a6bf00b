mod common;
use crate::common::{BlockConfigBuilder, ConfigFileBuilder};

use lemonfeed::config::parse_format;
use lemonfeed::engine::{parse_action, resolve_action};
use lemonfeed::model::{build_blocks, Block};
use lemonfeed::types::ClickAction;

fn blocks() -> Vec<Block> {
    let cfg = ConfigFileBuilder::new()
        .format("cpu vol_x")
        .with_block("cpu", BlockConfigBuilder::new("cpu").mouse_left("htop").build())
        .with_block("vol_x", BlockConfigBuilder::new("vol").scroll_up("pamixer -i 5").build())
        .build();
    let layout = parse_format(&cfg.bar.format);
    build_blocks(&cfg, &layout)
}

#[test]
fn token_is_split_at_last_underscore_suffix() {
    assert_eq!(parse_action("cpu_lmb"), Some(("cpu", ClickAction::Left)));
    assert_eq!(parse_action("cpu_lmb\n"), Some(("cpu", ClickAction::Left)));
    assert_eq!(parse_action("vol_x_sup"), Some(("vol_x", ClickAction::ScrollUp)));
    assert_eq!(parse_action("a_sdn"), Some(("a", ClickAction::ScrollDown)));
}

#[test]
fn malformed_tokens_are_rejected() {
    assert_eq!(parse_action("cpuxlmb"), None);
    assert_eq!(parse_action("_lmb"), None);
    assert_eq!(parse_action("cpu_xyz"), None);
    assert_eq!(parse_action(""), None);
    assert_eq!(parse_action("warning: could not load font"), None);
    assert_eq!(parse_action("\u{e9}\u{e9}lmb"), None);
}

#[test]
fn configured_action_resolves_to_command() {
    let blocks = blocks();
    let found = resolve_action(&blocks, "cpu_lmb").expect("cpu_lmb should resolve");
    assert_eq!(found.sid, "cpu");
    assert_eq!(found.action, ClickAction::Left);
    assert_eq!(found.command, "htop");

    let found = resolve_action(&blocks, "vol_x_sup").expect("vol_x_sup should resolve");
    assert_eq!(found.command, "pamixer -i 5");
}

#[test]
fn unknown_sid_or_unconfigured_action_resolves_to_nothing() {
    let blocks = blocks();
    assert!(resolve_action(&blocks, "gpu_lmb").is_none());
    assert!(resolve_action(&blocks, "cpuxlmb").is_none());
    assert!(resolve_action(&blocks, "cpu_rmb").is_none());
}
