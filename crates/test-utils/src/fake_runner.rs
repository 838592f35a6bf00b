use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use lemonfeed::engine::BlockRunner;
use lemonfeed::errors::RunError;
use lemonfeed::model::Block;

/// One recorded invocation: block sid and the argument it got.
pub type Invocation = (String, Option<String>);

/// A runner that never spawns anything:
/// - records which blocks were "run" and with which argument
/// - answers with scripted lines per sid, or `<sid>:<n>` by default.
///
/// A sid scripted with [`FakeRunner::fail`] reports `NoOutput` instead.
#[derive(Clone, Default)]
pub struct FakeRunner {
    invocations: Arc<Mutex<Vec<Invocation>>>,
    scripted: HashMap<String, VecDeque<String>>,
    failing: Vec<String>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the invocation log; stays valid after the runner
    /// moved into a scheduler.
    pub fn log(&self) -> Arc<Mutex<Vec<Invocation>>> {
        Arc::clone(&self.invocations)
    }

    pub fn respond(mut self, sid: &str, lines: &[&str]) -> Self {
        self.scripted
            .entry(sid.to_string())
            .or_default()
            .extend(lines.iter().map(|l| l.to_string()));
        self
    }

    pub fn fail(mut self, sid: &str) -> Self {
        self.failing.push(sid.to_string());
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn runs_of(&self, sid: &str) -> usize {
        self.invocations
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| s == sid)
            .count()
    }
}

impl BlockRunner for FakeRunner {
    fn run_block(&mut self, block: &mut Block, argument: Option<String>) -> Result<String, RunError> {
        let sid = block.sid().to_string();
        let count = {
            let mut guard = self.invocations.lock().unwrap();
            guard.push((sid.clone(), argument));
            guard.iter().filter(|(s, _)| *s == sid).count()
        };

        if self.failing.contains(&sid) {
            return Err(RunError::NoOutput);
        }

        let scripted = self.scripted.get_mut(&sid).and_then(|q| q.pop_front());
        Ok(scripted.unwrap_or_else(|| format!("{sid}:{count}")))
    }
}
