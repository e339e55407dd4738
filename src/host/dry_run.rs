//! Decision replay without side effects
//!
//! [`DryRunHost`] forwards read-only operations to the wrapped host so every
//! probe sees the real machine, and records every mutation instead of
//! performing it. Mutating commands report success, which lets the stages
//! take the same branches a real run takes when nothing fails.

use std::cell::RefCell;
use std::io;
use std::path::Path;
use std::time::Duration;

use super::{BoundedOutcome, CommandOutput, CommandSpec, Host, PlannedAction};

pub struct DryRunHost<H> {
    inner: H,
    planned: RefCell<Vec<PlannedAction>>,
}

impl<H: Host> DryRunHost<H> {
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            planned: RefCell::new(Vec::new()),
        }
    }

    /// Mutations recorded so far, in order
    pub fn planned(&self) -> Vec<PlannedAction> {
        self.planned.borrow().clone()
    }

    fn record(&self, action: PlannedAction) {
        self.planned.borrow_mut().push(action);
    }
}

impl<H: Host> Host for DryRunHost<H> {
    fn probe(&self, command: &CommandSpec) -> io::Result<CommandOutput> {
        self.inner.probe(command)
    }

    fn execute(&self, command: &CommandSpec) -> io::Result<CommandOutput> {
        self.record(PlannedAction::Execute(command.to_string()));
        Ok(CommandOutput::ok(""))
    }

    fn run_bounded(
        &self,
        command: &CommandSpec,
        _timeout: Duration,
    ) -> io::Result<BoundedOutcome> {
        self.record(PlannedAction::RunBounded(command.to_string()));
        Ok(BoundedOutcome::Completed(CommandOutput::ok("")))
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn env_var(&self, key: &str) -> Option<String> {
        self.inner.env_var(key)
    }

    fn write_file(&self, path: &Path, _contents: &str) -> io::Result<()> {
        self.record(PlannedAction::WriteFile(path.to_path_buf()));
        Ok(())
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.record(PlannedAction::CopyFile {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        });
        Ok(())
    }

    fn make_executable(&self, path: &Path) -> io::Result<()> {
        self.record(PlannedAction::MakeExecutable(path.to_path_buf()));
        Ok(())
    }

    fn download(&self, url: &str, dest: &Path) -> io::Result<()> {
        self.record(PlannedAction::Download {
            url: url.to_string(),
            dest: dest.to_path_buf(),
        });
        Ok(())
    }
}
