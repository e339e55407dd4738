//! Host abstraction
//!
//! Every interaction the provisioner has with the machine goes through the
//! [`Host`] trait. Read-only operations (`probe`, `exists`, `env_var`) are
//! safe to replay; everything else mutates the machine and is recorded
//! instead of performed by [`DryRunHost`].

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::Duration;

pub mod dry_run;
pub mod system;

pub use dry_run::DryRunHost;
pub use system::SystemHost;

/// An external command: program plus arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Command whose program is a filesystem path (e.g. a resolved interpreter)
    pub fn from_path(program: &Path) -> Self {
        Self::new(program.display().to_string())
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Build the `std::process::Command` for this spec
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

/// Quote a token for display when it would not survive a shell split
fn quote(token: &str) -> String {
    if token.is_empty() || token.contains(char::is_whitespace) {
        format!("\"{}\"", token.replace('"', "\\\""))
    } else {
        token.to_string()
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn from_status(status: ExitStatus, stdout: &[u8], stderr: &[u8]) -> Self {
        Self {
            code: status.code(),
            success: status.success(),
            stdout: String::from_utf8_lossy(stdout).into_owned(),
            stderr: String::from_utf8_lossy(stderr).into_owned(),
        }
    }

    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given exit code
    pub fn failed(code: i32) -> Self {
        Self {
            code: Some(code),
            success: false,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// Stdout followed by stderr
    pub fn combined(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// First non-empty stdout line, trimmed
    pub fn first_line(&self) -> Option<&str> {
        self.stdout.lines().map(str::trim).find(|l| !l.is_empty())
    }

    /// Last non-empty stderr line, used to explain failures in one line
    pub fn stderr_tail(&self) -> Option<&str> {
        self.stderr.lines().map(str::trim).rfind(|l| !l.is_empty())
    }
}

/// Treat a command that ran but exited non-zero as a failure
pub fn require_success(result: io::Result<CommandOutput>) -> Result<CommandOutput, String> {
    match result {
        Ok(output) if output.success => Ok(output),
        Ok(output) => Err(match (output.code, output.stderr_tail()) {
            (Some(code), Some(tail)) => format!("exit code {code}: {tail}"),
            (Some(code), None) => format!("exit code {code}"),
            (None, Some(tail)) => format!("terminated by signal: {tail}"),
            (None, None) => "terminated by signal".to_string(),
        }),
        Err(e) => Err(e.to_string()),
    }
}

/// Outcome of a command run under a deadline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundedOutcome {
    Completed(CommandOutput),
    /// The deadline passed and the command was killed
    TimedOut,
}

/// A mutation the host was asked to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedAction {
    Execute(String),
    RunBounded(String),
    WriteFile(PathBuf),
    CopyFile { from: PathBuf, to: PathBuf },
    MakeExecutable(PathBuf),
    Download { url: String, dest: PathBuf },
}

impl fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannedAction::Execute(command) | PlannedAction::RunBounded(command) => {
                write!(f, "run: {command}")
            }
            PlannedAction::WriteFile(path) => write!(f, "write: {}", path.display()),
            PlannedAction::CopyFile { from, to } => {
                write!(f, "copy: {} -> {}", from.display(), to.display())
            }
            PlannedAction::MakeExecutable(path) => write!(f, "chmod +x: {}", path.display()),
            PlannedAction::Download { url, dest } => {
                write!(f, "download: {url} -> {}", dest.display())
            }
        }
    }
}

/// Access to the machine being provisioned
pub trait Host {
    /// Run a read-only command and capture its output
    fn probe(&self, command: &CommandSpec) -> io::Result<CommandOutput>;

    /// Run a command that changes the machine
    fn execute(&self, command: &CommandSpec) -> io::Result<CommandOutput>;

    /// Run a command, killing it once `timeout` has elapsed
    fn run_bounded(&self, command: &CommandSpec, timeout: Duration)
    -> io::Result<BoundedOutcome>;

    fn exists(&self, path: &Path) -> bool;

    fn env_var(&self, key: &str) -> Option<String>;

    /// Write a file, creating parent directories as needed
    fn write_file(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Copy a file, creating parent directories of `to` as needed
    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn make_executable(&self, path: &Path) -> io::Result<()>;

    /// Fetch `url` into `dest`
    fn download(&self, url: &str, dest: &Path) -> io::Result<()>;
}

impl<H: Host + ?Sized> Host for &H {
    fn probe(&self, command: &CommandSpec) -> io::Result<CommandOutput> {
        (**self).probe(command)
    }

    fn execute(&self, command: &CommandSpec) -> io::Result<CommandOutput> {
        (**self).execute(command)
    }

    fn run_bounded(
        &self,
        command: &CommandSpec,
        timeout: Duration,
    ) -> io::Result<BoundedOutcome> {
        (**self).run_bounded(command, timeout)
    }

    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn env_var(&self, key: &str) -> Option<String> {
        (**self).env_var(key)
    }

    fn write_file(&self, path: &Path, contents: &str) -> io::Result<()> {
        (**self).write_file(path, contents)
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        (**self).copy_file(from, to)
    }

    fn make_executable(&self, path: &Path) -> io::Result<()> {
        (**self).make_executable(path)
    }

    fn download(&self, url: &str, dest: &Path) -> io::Result<()> {
        (**self).download(url, dest)
    }
}
