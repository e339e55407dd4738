//! The real host: processes, files and network of the current machine

use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process::Stdio;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::debug;

use super::{BoundedOutcome, CommandOutput, CommandSpec, Host};

/// How often a bounded command is polled for completion
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHost;

impl SystemHost {
    pub fn new() -> Self {
        Self
    }

    fn run(command: &CommandSpec) -> io::Result<CommandOutput> {
        debug!(command = %command, "running");
        let output = command.to_command().stdin(Stdio::null()).output()?;
        let output = CommandOutput::from_status(output.status, &output.stdout, &output.stderr);
        debug!(command = %command, code = ?output.code, "finished");
        Ok(output)
    }
}

/// Drain a pipe on its own thread so the child never blocks on a full buffer
fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn join_reader(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

impl Host for SystemHost {
    fn probe(&self, command: &CommandSpec) -> io::Result<CommandOutput> {
        Self::run(command)
    }

    fn execute(&self, command: &CommandSpec) -> io::Result<CommandOutput> {
        Self::run(command)
    }

    fn run_bounded(
        &self,
        command: &CommandSpec,
        timeout: Duration,
    ) -> io::Result<BoundedOutcome> {
        debug!(command = %command, timeout_secs = timeout.as_secs(), "running with deadline");
        let mut child = command
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child.stdout.take().map(spawn_reader);
        let stderr = child.stderr.take().map(spawn_reader);
        // A timeout too large to represent means no deadline
        let deadline = Instant::now().checked_add(timeout);

        loop {
            if let Some(status) = child.try_wait()? {
                let stdout = join_reader(stdout);
                let stderr = join_reader(stderr);
                return Ok(BoundedOutcome::Completed(CommandOutput::from_status(
                    status, &stdout, &stderr,
                )));
            }

            if deadline.is_some_and(|d| Instant::now() >= d) {
                // Reader threads are left to finish on their own; a grandchild
                // may still hold the pipes open.
                let _ = child.kill();
                let _ = child.wait();
                debug!(command = %command, "deadline passed, child killed");
                return Ok(BoundedOutcome::TimedOut);
            }

            thread::sleep(POLL_INTERVAL);
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn env_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }

    fn write_file(&self, path: &Path, contents: &str) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(from, to).map(|_| ())
    }

    #[cfg(unix)]
    fn make_executable(&self, path: &Path) -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let mut permissions = fs::metadata(path)?.permissions();
        permissions.set_mode(permissions.mode() | 0o755);
        fs::set_permissions(path, permissions)
    }

    #[cfg(not(unix))]
    fn make_executable(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }

    fn download(&self, url: &str, dest: &Path) -> io::Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        debug!(url, dest = %dest.display(), "downloading");
        let mut response = reqwest::blocking::get(url)
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(io::Error::other)?;
        // A partial download never lands at `dest`
        let dir = dest.parent().unwrap_or_else(|| Path::new("."));
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        response.copy_to(&mut file).map_err(io::Error::other)?;
        file.persist(dest).map_err(|e| e.error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::create_temp_dir;

    #[test]
    fn test_write_file_creates_parent_dirs() {
        let temp = create_temp_dir();
        let path = temp.path().join("share/applications/witticism.desktop");

        SystemHost::new()
            .write_file(&path, "[Desktop Entry]\n")
            .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[Desktop Entry]\n");
    }

    #[test]
    fn test_copy_file_creates_parent_dirs() {
        let temp = create_temp_dir();
        let from = temp.path().join("icon.png");
        fs::write(&from, b"png").unwrap();
        let to = temp.path().join("icons/hicolor/48x48/apps/witticism.png");

        SystemHost::new().copy_file(&from, &to).unwrap();

        assert!(to.exists());
    }

    #[test]
    fn test_probe_missing_program_is_an_error() {
        let result = SystemHost::new().probe(&CommandSpec::new("definitely-not-a-real-binary-4711"));
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_make_executable_sets_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = create_temp_dir();
        let path = temp.path().join("witticism.desktop");
        fs::write(&path, "").unwrap();

        SystemHost::new().make_executable(&path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_bounded_completes() {
        let command = CommandSpec::new("sh").args(["-c", "echo witticism 1.2.0"]);
        let outcome = SystemHost::new()
            .run_bounded(&command, Duration::from_secs(10))
            .unwrap();

        match outcome {
            BoundedOutcome::Completed(output) => {
                assert!(output.success);
                assert_eq!(output.first_line(), Some("witticism 1.2.0"));
            }
            BoundedOutcome::TimedOut => panic!("Expected completion"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_run_bounded_kills_on_timeout() {
        let command = CommandSpec::new("sleep").arg("5");
        let started = Instant::now();
        let outcome = SystemHost::new()
            .run_bounded(&command, Duration::from_millis(200))
            .unwrap();

        assert_eq!(outcome, BoundedOutcome::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_bounded_with_unrepresentable_timeout() {
        let command = CommandSpec::new("true");
        let outcome = SystemHost::new()
            .run_bounded(&command, Duration::from_secs(u64::MAX))
            .unwrap();

        assert!(matches!(outcome, BoundedOutcome::Completed(output) if output.success));
    }
}
