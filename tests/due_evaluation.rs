mod common;
use crate::common::BlockConfigBuilder;

use std::time::{Duration, Instant};

use lemonfeed::config::{BlockConfig, LayoutSlot};
use lemonfeed::engine::core::{due_blocks, is_due, next_wakeup, reload_elapsed};
use lemonfeed::model::{Block, BlockState};
use lemonfeed::types::Align;

const TOLERANCE: Duration = Duration::from_millis(100);
const RETRY: Duration = Duration::from_secs(5);

fn block(sid: &str, cfg: BlockConfig) -> Block {
    let slot = LayoutSlot {
        sid: sid.to_string(),
        align: Align::Left,
    };
    Block::new(&slot, cfg)
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn timed_block_due_exactly_at_reload_minus_tolerance() {
    let t0 = Instant::now();
    let mut cpu = block("cpu", BlockConfigBuilder::new("cpu").reload(5.0).build());
    cpu.record_success("x".to_string(), t0);

    assert!(is_due(&cpu, t0 + ms(4900), TOLERANCE));
    assert!(!is_due(&cpu, t0 + ms(4899), TOLERANCE));
    assert!(is_due(&cpu, t0 + ms(7000), TOLERANCE));
}

#[test]
fn reload_elapsed_saturates_when_tolerance_exceeds_reload() {
    assert!(reload_elapsed(Duration::ZERO, ms(50), ms(100)));
    assert!(!reload_elapsed(ms(10), ms(1000), Duration::ZERO));
}

#[test]
fn once_block_runs_only_once() {
    let t0 = Instant::now();
    let mut b = block("host", BlockConfig::default());
    assert!(is_due(&b, t0, TOLERANCE));

    b.record_success("box".to_string(), t0);
    assert!(!is_due(&b, t0 + Duration::from_secs(3600), TOLERANCE));
}

#[test]
fn static_timed_block_is_never_due_again() {
    let t0 = Instant::now();
    let mut b = block("clock", BlockConfigBuilder::new("date").reload(0.0).build());
    assert!(is_due(&b, t0, TOLERANCE));

    b.record_success("12:00".to_string(), t0);
    assert!(!is_due(&b, t0 + Duration::from_secs(3600), TOLERANCE));
    assert_eq!(next_wakeup(&[b], t0), None);
}

#[test]
fn pending_input_makes_timed_block_due_early() {
    let t0 = Instant::now();
    let mut b = block("cpu", BlockConfigBuilder::new("cpu").reload(60.0).build());
    b.record_success("x".to_string(), t0);
    assert!(!is_due(&b, t0 + ms(10), TOLERANCE));

    b.set_pending_input("now");
    assert!(is_due(&b, t0 + ms(10), TOLERANCE));
}

#[test]
fn sparked_block_due_only_with_pending_input() {
    let t0 = Instant::now();
    let mut b = block("vol", BlockConfigBuilder::new("vol").trigger("spark").build());
    assert!(!is_due(&b, t0, TOLERANCE));

    b.set_pending_input("");
    assert!(is_due(&b, t0, TOLERANCE), "an empty line is still a delivered line");

    assert_eq!(b.take_pending_input().as_deref(), Some(""));
    assert!(!is_due(&b, t0, TOLERANCE));
}

#[test]
fn live_block_is_never_due() {
    let t0 = Instant::now();
    let mut b = block("tail", BlockConfigBuilder::new("tail -f log").live().build());
    assert!(!is_due(&b, t0, TOLERANCE));
    b.set_pending_input("ignored");
    assert!(!is_due(&b, t0, TOLERANCE));
}

#[test]
fn failed_block_waits_for_retry_delay() {
    let t0 = Instant::now();
    let mut b = block("host", BlockConfig::default());
    b.record_failure(t0, RETRY);

    assert_eq!(b.state(), BlockState::Dead);
    assert!(!is_due(&b, t0 + ms(10), TOLERANCE));
    assert!(is_due(&b, t0 + RETRY, TOLERANCE));
    assert_eq!(next_wakeup(&[b], t0 + Duration::from_secs(1)), Some(Duration::from_secs(4)));
}

#[test]
fn failed_timed_block_retries_after_its_reload() {
    let t0 = Instant::now();
    let mut b = block("cpu", BlockConfigBuilder::new("cpu").reload(2.0).build());
    b.record_success("x".to_string(), t0);

    let failed_at = t0 + Duration::from_secs(2);
    b.record_failure(failed_at, RETRY);
    assert_eq!(b.result(), Some("x"), "previous result is kept");

    assert!(!is_due(&b, failed_at + ms(500), TOLERANCE));
    assert!(is_due(&b, failed_at + Duration::from_secs(2), TOLERANCE));
    assert_eq!(next_wakeup(&[b], failed_at), Some(Duration::from_secs(2)));
}

#[test]
fn next_wakeup_is_min_over_timed_blocks() {
    let t0 = Instant::now();
    let mut a = block("a", BlockConfigBuilder::new("a").reload(2.0).build());
    let mut b = block("b", BlockConfigBuilder::new("b").reload(5.0).build());
    let mut c = block("c", BlockConfigBuilder::new("c").trigger("spark").build());
    a.record_success("a".to_string(), t0);
    b.record_success("b".to_string(), t0);
    c.record_success("c".to_string(), t0);

    let blocks = vec![a, b, c];
    assert_eq!(next_wakeup(&blocks, t0 + ms(500)), Some(ms(1500)));
    assert_eq!(next_wakeup(&blocks, t0 + Duration::from_secs(3)), Some(Duration::ZERO));
}

#[test]
fn next_wakeup_ignores_blocks_with_pending_input() {
    let t0 = Instant::now();
    let mut a = block("a", BlockConfigBuilder::new("a").reload(2.0).build());
    a.record_success("a".to_string(), t0);
    a.set_pending_input("go");

    assert_eq!(next_wakeup(&[a], t0), None);
}

#[test]
fn next_wakeup_is_zero_for_blocks_that_never_ran() {
    let t0 = Instant::now();
    let blocks = vec![
        block("a", BlockConfig::default()),
        block("b", BlockConfigBuilder::new("b").reload(10.0).build()),
    ];
    assert_eq!(next_wakeup(&blocks, t0), Some(Duration::ZERO));
}

#[test]
fn due_blocks_keep_display_order() {
    let t0 = Instant::now();
    let mut blocks = vec![
        block("a", BlockConfig::default()),
        block("b", BlockConfigBuilder::new("b").trigger("spark").build()),
        block("c", BlockConfigBuilder::new("c").reload(1.0).build()),
    ];
    blocks[0].record_success("done".to_string(), t0);
    blocks[1].set_pending_input("x");

    assert_eq!(due_blocks(&blocks, t0, TOLERANCE), vec![1, 2]);
}
