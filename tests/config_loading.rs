use std::io::Write;
use std::time::{Duration, Instant};

use tempfile::NamedTempFile;

use lemonfeed::config::escapes::decode_unicode_escapes;
use lemonfeed::config::model::{seconds, MAX_SECONDS};
use lemonfeed::config::{
    load_and_validate, load_from_str, parse_format, ConfigFile, Dock, LayoutSlot,
};
use lemonfeed::model::{build_blocks, Block};
use lemonfeed::errors::LemonfeedError;
use lemonfeed::types::{Align, BlockKind, ClickAction};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

fn expect_config_error(contents: &str) -> String {
    let file = write_config(contents);
    match load_and_validate(file.path()) {
        Err(LemonfeedError::ConfigError(msg)) => msg,
        Err(e) => panic!("Expected ConfigError, got: {e:?}"),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn empty_file_yields_defaults() {
    let file = write_config("");
    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.config.tolerance, 0.1);
    assert_eq!(cfg.config.line_limit, 2048);
    assert_eq!(cfg.config.block_timeout, None);
    assert_eq!(cfg.config.retry_delay, 5.0);
    assert_eq!(cfg.bar.bin, "lemonbar");
    assert_eq!(cfg.bar.name, "lemonfeed");
    assert_eq!(cfg.bar.dock, Dock::Top);
    assert!(cfg.bar.args.is_none());
    assert!(cfg.block.is_empty());
}

#[test]
fn full_config_is_parsed() {
    let file = write_config(
        r##"
[config]
tolerance = 0.25
block_timeout = 3.0

[bar]
format = "cpu | clock battery"
height = 20
dock = "bottom"
fg = "#FFFFFF"
block_font = "Terminus:size=10"

[default]
affix_fg = "#888"
prefix = " "

[block.cpu]
command = "~/bin/cpu --short"
reload = 2.0
label = "CPU "
mouse_left = "htop"

[block.clock]
bin = "date +%H:%M"
reload = 0
align = "right"

[block.battery]
trigger = "acpi_listen"
consume = false
align = "right"
underline = true
"##,
    );

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.config.tolerance_duration(), Duration::from_millis(250));
    assert_eq!(cfg.config.block_timeout_duration(), Some(Duration::from_secs(3)));
    assert_eq!(cfg.bar.height, 20);
    assert_eq!(cfg.bar.dock, Dock::Bottom);
    assert_eq!(cfg.default.affix_fg.as_deref(), Some("#888"));

    let cpu = &cfg.block["cpu"];
    assert_eq!(cpu.kind(), BlockKind::Timed);
    assert_eq!(cpu.effective_command("cpu"), "~/bin/cpu --short");
    assert_eq!(cpu.reload_interval(), Some(Duration::from_secs(2)));
    assert_eq!(cpu.click(ClickAction::Left), Some("htop"));
    assert_eq!(cpu.click(ClickAction::Right), None);

    let clock = &cfg.block["clock"];
    assert_eq!(clock.kind(), BlockKind::Timed);
    assert_eq!(clock.effective_command("clock"), "date +%H:%M");
    assert_eq!(clock.reload_interval(), None, "reload 0 means static");
    assert_eq!(clock.align, Some(Align::Right));

    let battery = &cfg.block["battery"];
    assert_eq!(battery.kind(), BlockKind::Sparked);
    assert!(!battery.effective_consume());
    assert_eq!(battery.style.underline, Some(true));
}

#[test]
fn kind_inference_precedence() {
    let raw = load_from_str(
        r#"
[block.a]
[block.b]
reload = 5
[block.c]
trigger = "spark"
reload = 5
[block.d]
live = true
"#,
    )
    .unwrap();
    let cfg = ConfigFile::try_from(raw).unwrap();

    assert_eq!(cfg.block["a"].kind(), BlockKind::Once);
    assert_eq!(cfg.block["b"].kind(), BlockKind::Timed);
    assert_eq!(cfg.block["c"].kind(), BlockKind::Sparked);
    assert_eq!(cfg.block["d"].kind(), BlockKind::Live);
    assert_eq!(cfg.block["a"].effective_command("a"), "a");
}

#[test]
fn invalid_color_is_rejected() {
    let msg = expect_config_error(
        r#"
[block.cpu]
fg = "red"
"#,
    );
    assert!(msg.contains("[block.cpu].fg"), "{msg}");
    assert!(msg.contains("invalid color 'red'"), "{msg}");
}

#[test]
fn invalid_bar_color_is_rejected() {
    let msg = expect_config_error(
        r##"
[bar]
bg = "#12345"
"##,
    );
    assert!(msg.contains("[bar].bg"), "{msg}");
}

#[test]
fn live_with_trigger_is_rejected() {
    let msg = expect_config_error(
        r#"
[block.vol]
live = true
trigger = "pactl subscribe"
"#,
    );
    assert!(msg.contains("`live` cannot be combined with `trigger`"), "{msg}");
}

#[test]
fn live_with_reload_is_rejected() {
    let msg = expect_config_error(
        r#"
[block.vol]
live = true
reload = 1
"#,
    );
    assert!(msg.contains("`live` cannot be combined with `reload`"), "{msg}");
}

#[test]
fn scheduler_ranges_are_checked() {
    let msg = expect_config_error("[config]\nline_limit = 0\n");
    assert!(msg.contains("[config].line_limit must be >= 1"), "{msg}");

    let msg = expect_config_error("[config]\ntolerance = -1.0\n");
    assert!(msg.contains("[config].tolerance"), "{msg}");

    let msg = expect_config_error("[config]\nblock_timeout = 0.0\n");
    assert!(msg.contains("[config].block_timeout"), "{msg}");

    let msg = expect_config_error("[config]\nretry_delay = 0.0\n");
    assert!(msg.contains("[config].retry_delay"), "{msg}");
}

#[test]
fn durations_beyond_a_year_are_rejected() {
    let msg = expect_config_error("[block.cpu]\nreload = 1e20\n");
    assert!(msg.contains("[block.cpu].reload must be at most"), "{msg}");

    let msg = expect_config_error("[block.cpu]\nreload = 1e19\n");
    assert!(msg.contains("[block.cpu].reload"), "{msg}");

    for key in ["tolerance", "block_timeout", "retry_delay"] {
        let msg = expect_config_error(&format!("[config]\n{key} = 1e19\n"));
        assert!(msg.contains(&format!("[config].{key} must be at most")), "{msg}");
    }
}

#[test]
fn longest_accepted_reload_survives_a_failed_run() {
    let file = write_config(&format!(
        "[bar]\nformat = \"cpu\"\n[block.cpu]\nreload = {MAX_SECONDS:.1}\n"
    ));
    let cfg = load_and_validate(file.path()).unwrap();
    let layout = parse_format(&cfg.bar.format);
    let mut blocks = build_blocks(&cfg, &layout);

    let now = Instant::now();
    blocks[0].record_failure(now, cfg.config.retry_delay_duration());
    assert!(blocks[0].retry_blocked(now + Duration::from_secs(3600)));
}

#[test]
fn unrepresentable_retry_time_falls_back_to_now() {
    let slot = LayoutSlot {
        sid: "host".to_string(),
        align: Align::Left,
    };
    let mut block = Block::new(&slot, Default::default());
    let now = Instant::now();
    block.record_failure(now, Duration::MAX);

    assert_eq!(block.retry_at(), Some(now));
    assert!(!block.retry_blocked(now));
}

#[test]
fn seconds_are_clamped() {
    assert_eq!(seconds(-3.0), Duration::ZERO);
    assert_eq!(seconds(f64::NAN), Duration::ZERO);
    assert_eq!(seconds(1e30), Duration::from_secs_f64(MAX_SECONDS));
    assert_eq!(seconds(1.5), Duration::from_millis(1500));
}

#[test]
fn empty_commands_are_rejected() {
    let msg = expect_config_error("[block.cpu]\ncommand = \"  \"\n");
    assert!(msg.contains("[block.cpu].command must not be empty"), "{msg}");

    let msg = expect_config_error("[block.cpu]\ntrigger = \"\"\n");
    assert!(msg.contains("[block.cpu].trigger must not be empty"), "{msg}");

    let msg = expect_config_error("[bar]\nbin = \"\"\n");
    assert!(msg.contains("[bar].bin"), "{msg}");
}

#[test]
fn block_names_with_separators_are_rejected() {
    let msg = expect_config_error("[block.\"a:b\"]\ncommand = \"x\"\n");
    assert!(msg.contains("must not contain"), "{msg}");
}

#[test]
fn toml_syntax_error_is_reported_as_toml_error() {
    let file = write_config("[bar\nformat = 1");
    match load_and_validate(file.path()) {
        Err(LemonfeedError::TomlError(_)) => {}
        other => panic!("Expected TomlError, got: {other:?}"),
    }
}

#[test]
fn missing_file_is_an_io_error() {
    match load_and_validate("/nonexistent/lemonfeed/lemonfeed.toml") {
        Err(LemonfeedError::IoError(_)) => {}
        other => panic!("Expected IoError, got: {other:?}"),
    }
}

#[test]
fn unicode_escapes_are_decoded_in_text_values() {
    let file = write_config(
        r#"
[default]
prefix = '▐'

[block.cpu]
label = '\U0001F4BB '
suffix = 'a\\u0041'
"#,
    );
    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.default.prefix.as_deref(), Some("\u{2590}"));
    assert_eq!(cfg.block["cpu"].label.as_deref(), Some("\u{1F4BB} "));
    assert_eq!(cfg.block["cpu"].style.suffix.as_deref(), Some("a\\u0041"));
}

#[test]
fn invalid_code_points_are_left_alone() {
    assert_eq!(decode_unicode_escapes(r"\uD800"), r"\uD800");
    assert_eq!(decode_unicode_escapes("plain"), "plain");
    assert_eq!(decode_unicode_escapes(r"\u0041\u00e9"), "A\u{e9}");
}
