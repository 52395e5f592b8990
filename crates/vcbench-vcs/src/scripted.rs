//! Scripted in-memory adapter. Lets verifier and controller tests dictate
//! exactly what the backend reports at each observation point, including
//! mid-step head changes and induced failures, without any external tool.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

use crate::types::{CommitId, VcsKind, VcsRepo};

/// One scripted answer: a value, or a simulated backend failure.
#[derive(Clone, Debug)]
pub enum Script<T> {
    Value(T),
    Fail,
}

impl<T: Clone> Script<T> {
    fn resolve(&self, what: &str) -> Result<T> {
        match self {
            Script::Value(v) => Ok(v.clone()),
            Script::Fail => Err(anyhow!("scripted {} failure", what)),
        }
    }
}

pub struct ScriptedRepo {
    workdir: PathBuf,
    heads: RefCell<VecDeque<Script<Option<CommitId>>>>,
    file_present: Script<bool>,
    integrity: Script<bool>,
    commit_outcome: Script<()>,
    calls: RefCell<Vec<&'static str>>,
}

impl ScriptedRepo {
    pub fn new() -> Self {
        Self {
            workdir: PathBuf::from("."),
            heads: RefCell::new(VecDeque::new()),
            file_present: Script::Value(true),
            integrity: Script::Value(true),
            commit_outcome: Script::Value(()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Answers for successive `last_commit_id` queries. The final entry
    /// repeats once the script runs out; an empty script answers `None`.
    pub fn heads(mut self, heads: Vec<Script<Option<CommitId>>>) -> Self {
        self.heads = RefCell::new(heads.into());
        self
    }

    pub fn file_present(mut self, s: Script<bool>) -> Self {
        self.file_present = s;
        self
    }

    pub fn integrity(mut self, s: Script<bool>) -> Self {
        self.integrity = s;
        self
    }

    pub fn commit_outcome(mut self, s: Script<()>) -> Self {
        self.commit_outcome = s;
        self
    }

    /// Names of the mutating operations invoked so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.borrow_mut().push(call);
    }

    fn next_head(&self) -> Script<Option<CommitId>> {
        let mut q = self.heads.borrow_mut();
        if q.len() > 1 {
            q.pop_front().unwrap_or(Script::Value(None))
        } else {
            q.front().cloned().unwrap_or(Script::Value(None))
        }
    }
}

impl Default for ScriptedRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl VcsRepo for ScriptedRepo {
    fn kind(&self) -> VcsKind {
        VcsKind::Git
    }

    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn tool_version(&self) -> Result<String> {
        Ok("scripted".to_string())
    }

    fn init(&self) -> Result<()> {
        self.record("init");
        Ok(())
    }

    fn start_tracking(&self, _path: &str) -> Result<()> {
        self.record("start_tracking");
        Ok(())
    }

    fn commit(&self, _path: &str) -> Result<()> {
        self.record("commit");
        self.commit_outcome.resolve("commit")
    }

    fn status(&self, _path: &str) -> Result<()> {
        self.record("status");
        Ok(())
    }

    fn garbage_collect(&self) -> Result<()> {
        self.record("garbage_collect");
        Ok(())
    }

    fn total_size_bytes(&self) -> Result<u64> {
        Ok(0)
    }

    fn last_commit_id(&self) -> Result<Option<CommitId>> {
        self.next_head().resolve("last_commit_id")
    }

    fn is_file_in_commit(&self, _commit_id: &str, _name: &str) -> Result<bool> {
        self.file_present.resolve("is_file_in_commit")
    }

    fn check_integrity(&self) -> Result<bool> {
        self.integrity.resolve("check_integrity")
    }

    fn corrupt(&self) -> Result<()> {
        Ok(())
    }
}
