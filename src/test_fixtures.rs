//! Test fixtures and utilities for reducing test setup duplication.
//!
//! This module provides a scripted [`FakeHost`] that answers probes from a
//! table of canned responses and observes every write, plus helpers for temp
//! directories and host layouts rooted in them.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_fixtures::{FakeHost, create_temp_dir};
//!
//! #[test]
//! fn my_test() {
//!     let host = FakeHost::new()
//!         .respond("nvidia-smi", CommandOutput::ok("CUDA Version: 12.4"))
//!         .with_path("/usr/bin/python3.12");
//!
//!     // ... run a stage against &host ...
//!
//!     assert!(host.writes().is_empty());
//! }
//! ```

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;

use crate::host::{BoundedOutcome, CommandOutput, CommandSpec, Host};
use crate::platform::{Layout, Platform};

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new_in(temp_dir_base()).expect("Failed to create temp directory")
}

/// System temp location, never relative to the working directory
fn temp_dir_base() -> PathBuf {
    let dir = std::env::temp_dir();
    if dir.is_absolute() {
        dir
    } else if cfg!(windows) {
        PathBuf::from("C:\\Windows\\Temp")
    } else {
        PathBuf::from("/tmp")
    }
}

/// Layout of a fake Linux home under `/home/tester`
#[must_use]
pub fn linux_layout() -> Layout {
    Layout::rooted(Platform::Linux, Path::new("/home/tester"))
}

/// Layout of a fake Windows profile under `C:\Users\tester`
#[must_use]
pub fn windows_layout() -> Layout {
    Layout::rooted(Platform::Windows, Path::new("C:\\Users\\tester"))
}

/// Canned answer for a command
#[derive(Debug, Clone)]
pub enum Response {
    Output(CommandOutput),
    /// The program does not exist
    Missing,
    /// The command never finishes within any deadline
    Hangs,
}

/// A scripted host that records what it was asked to do.
///
/// Commands are matched by prefix against their display form; the most
/// recently registered matching prefix wins. Unmatched commands behave as
/// missing programs. A prefix registered with several responses answers with
/// them in order and then keeps repeating the last one.
#[derive(Default)]
pub struct FakeHost {
    responses: RefCell<Vec<(String, VecDeque<Response>)>>,
    paths: RefCell<HashSet<PathBuf>>,
    env: HashMap<String, String>,
    failing_writes: Vec<PathBuf>,
    probes: RefCell<Vec<String>>,
    executed: RefCell<Vec<String>>,
    writes: RefCell<Vec<(PathBuf, String)>>,
    downloads: RefCell<Vec<String>>,
}

impl FakeHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn respond(self, prefix: &str, output: CommandOutput) -> Self {
        self.respond_seq(prefix, vec![Response::Output(output)])
    }

    #[must_use]
    pub fn hangs(self, prefix: &str) -> Self {
        self.respond_seq(prefix, vec![Response::Hangs])
    }

    #[must_use]
    pub fn respond_seq(self, prefix: &str, responses: Vec<Response>) -> Self {
        self.responses
            .borrow_mut()
            .push((prefix.to_string(), responses.into()));
        self
    }

    #[must_use]
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        self.paths.borrow_mut().insert(path.into());
        self
    }

    #[must_use]
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Make writes under `prefix` fail
    #[must_use]
    pub fn fail_writes_under(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.failing_writes.push(prefix.into());
        self
    }

    /// Every read-only command run so far
    pub fn probes(&self) -> Vec<String> {
        self.probes.borrow().clone()
    }

    /// Every mutating command run so far
    pub fn executed(&self) -> Vec<String> {
        self.executed.borrow().clone()
    }

    /// Every file written or copied so far, with its contents
    pub fn writes(&self) -> Vec<(PathBuf, String)> {
        self.writes.borrow().clone()
    }

    pub fn downloads(&self) -> Vec<String> {
        self.downloads.borrow().clone()
    }

    /// Contents last written to `path`
    pub fn written(&self, path: &Path) -> Option<String> {
        self.writes
            .borrow()
            .iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, c)| c.clone())
    }

    fn answer(&self, command: &CommandSpec) -> Response {
        let rendered = command.to_string();
        let mut responses = self.responses.borrow_mut();
        let Some((_, queue)) = responses
            .iter_mut()
            .rev()
            .find(|(prefix, _)| rendered.starts_with(prefix.as_str()))
        else {
            return Response::Missing;
        };

        if queue.len() > 1 {
            queue.pop_front().unwrap_or(Response::Missing)
        } else {
            queue.front().cloned().unwrap_or(Response::Missing)
        }
    }

    fn respond_to(&self, command: &CommandSpec) -> io::Result<CommandOutput> {
        match self.answer(command) {
            Response::Output(output) => Ok(output),
            Response::Missing | Response::Hangs => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{}: not found", command.program),
            )),
        }
    }

    fn record_write(&self, path: &Path, contents: &str) -> io::Result<()> {
        if self.failing_writes.iter().any(|p| path.starts_with(p)) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "permission denied",
            ));
        }
        self.writes
            .borrow_mut()
            .push((path.to_path_buf(), contents.to_string()));
        self.paths.borrow_mut().insert(path.to_path_buf());
        Ok(())
    }
}

impl Host for FakeHost {
    fn probe(&self, command: &CommandSpec) -> io::Result<CommandOutput> {
        self.probes.borrow_mut().push(command.to_string());
        self.respond_to(command)
    }

    fn execute(&self, command: &CommandSpec) -> io::Result<CommandOutput> {
        self.executed.borrow_mut().push(command.to_string());
        self.respond_to(command)
    }

    fn run_bounded(
        &self,
        command: &CommandSpec,
        _timeout: Duration,
    ) -> io::Result<BoundedOutcome> {
        self.executed.borrow_mut().push(command.to_string());
        match self.answer(command) {
            Response::Output(output) => Ok(BoundedOutcome::Completed(output)),
            Response::Hangs => Ok(BoundedOutcome::TimedOut),
            Response::Missing => Err(io::Error::new(io::ErrorKind::NotFound, "not found")),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.paths.borrow().contains(path)
    }

    fn env_var(&self, key: &str) -> Option<String> {
        self.env.get(key).cloned()
    }

    fn write_file(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.record_write(path, contents)
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.record_write(to, &format!("copy of {}", from.display()))
    }

    fn make_executable(&self, path: &Path) -> io::Result<()> {
        if self.paths.borrow().contains(path) {
            Ok(())
        } else {
            Err(io::Error::new(io::ErrorKind::NotFound, "no such file"))
        }
    }

    fn download(&self, url: &str, dest: &Path) -> io::Result<()> {
        self.downloads.borrow_mut().push(url.to_string());
        self.record_write(dest, "installer")
    }
}
