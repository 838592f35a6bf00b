#![allow(dead_code)]

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

pub use lemonfeed_test_utils::builders::{BlockConfigBuilder, ConfigFileBuilder};
pub use lemonfeed_test_utils::fake_runner::FakeRunner;
pub use lemonfeed_test_utils::init_tracing;

use lemonfeed::engine::{BlockRunner, Scheduler, TickReport};

/// Tests that spawn a renderer or reap children must not overlap: the
/// shutdown path collects *any* exited child of the test process.
static PROCESS_LOCK: Mutex<()> = Mutex::new(());

pub fn process_lock() -> MutexGuard<'static, ()> {
    PROCESS_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

/// `[bar]` arguments for a `sh` renderer that appends every bar line to
/// `capture` and stays alive until killed.
pub fn capture_bar_args(capture: &Path) -> Vec<String> {
    vec![
        "-c".to_string(),
        "cat >> \"$0\"; :".to_string(),
        capture.display().to_string(),
    ]
}

/// Config builder with a `sh` renderer writing to `capture`.
pub fn with_capture_bar(builder: ConfigFileBuilder, capture: &Path) -> ConfigFileBuilder {
    let args = capture_bar_args(capture);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    builder.bar_command("sh", &args)
}

/// Tick until `done` holds for the accumulated reports, or give up after
/// `max_ticks` ticks of at most `step` each.
pub fn tick_until<R: BlockRunner>(
    scheduler: &mut Scheduler<R>,
    step: Duration,
    max_ticks: usize,
    mut done: impl FnMut(&[TickReport]) -> bool,
) -> Vec<TickReport> {
    let mut reports = Vec::new();
    for _ in 0..max_ticks {
        let wait = scheduler.next_wait().map_or(step, |w| w.min(step));
        scheduler.set_next_wait(Some(wait));
        let report = scheduler.tick().expect("tick failed");
        reports.push(report);
        if done(&reports) {
            break;
        }
    }
    reports
}

/// Position of `needle` in `haystack`, panicking with context if missing.
pub fn pos(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("{needle:?} not found in {haystack:?}"))
}
