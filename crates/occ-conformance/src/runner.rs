//! External loopback invocation.

use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use crate::vector::{TestVector, VectorKind};

/// Default target device path.
pub const DEFAULT_DEVICE: &str = "/dev/snsocc0";

/// How often a deadline-limited child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Classification of one loopback invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum Outcome {
    /// Exit status 0, stderr content notwithstanding.
    Pass,
    /// Non-zero exit; `code` is -1 when the tool died on a signal or could
    /// not be spawned at all.
    Fail { code: i32 },
    /// Killed at the configured deadline.
    Timeout,
}

impl Outcome {
    /// True only for [`Outcome::Pass`].
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// Captured result of one loopback invocation.
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub outcome: Outcome,
    /// Full standard output, captured after the tool exits.
    pub stdout: String,
    /// Full standard error.
    pub stderr: String,
}

/// Process-execution capability, injected so the harness core is testable
/// without spawning real processes.
pub trait CommandRunner {
    /// Run the loopback tool once against `vector`.
    ///
    /// Invocation failures are data, not errors: a tool that cannot be
    /// spawned yields a failing [`RunRecord`], never an `Err`.
    fn run(&mut self, vector: &TestVector) -> RunRecord;
}

/// Runs the real loopback executable, one child process at a time.
#[derive(Debug, Clone)]
pub struct LoopbackRunner {
    executable: PathBuf,
    device: String,
    timeout: Option<Duration>,
}

impl LoopbackRunner {
    pub fn new(executable: PathBuf, device: String) -> Self {
        Self {
            executable,
            device,
            timeout: None,
        }
    }

    /// Kill an invocation that outlives `timeout`; `None` blocks forever.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Argument vector for one invocation; raw vectors get the extra `-r`.
    fn args(vector: &TestVector, device: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-d".into(),
            device.into(),
            "-i".into(),
            vector.path.clone().into_os_string(),
            "-n".into(),
        ];
        if vector.kind == VectorKind::Raw {
            args.push("-r".into());
        }
        args
    }

    fn run_with_deadline(&self, mut command: Command, limit: Duration) -> RunRecord {
        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(err) => return spawn_failure(&self.executable, &err),
        };

        // Drain both pipes off-thread so a chatty child cannot block on a
        // full pipe while we poll for exit.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let deadline = Instant::now() + limit;
        let outcome = loop {
            match child.try_wait() {
                Ok(Some(status)) => break classify(status),
                Ok(None) => {}
                Err(_) => break reap(&mut child),
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                break Outcome::Timeout;
            }
            thread::sleep(POLL_INTERVAL);
        };

        RunRecord {
            outcome,
            stdout: join_drain(stdout),
            stderr: join_drain(stderr),
        }
    }
}

impl CommandRunner for LoopbackRunner {
    fn run(&mut self, vector: &TestVector) -> RunRecord {
        debug!(
            executable = %self.executable.display(),
            vector = %vector.name,
            "invoking loopback"
        );

        let mut command = Command::new(&self.executable);
        command
            .args(Self::args(vector, &self.device))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        match self.timeout {
            Some(limit) => self.run_with_deadline(command, limit),
            None => match command.output() {
                Ok(output) => RunRecord {
                    outcome: classify(output.status),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                },
                Err(err) => spawn_failure(&self.executable, &err),
            },
        }
    }
}

fn classify(status: ExitStatus) -> Outcome {
    if status.success() {
        Outcome::Pass
    } else {
        Outcome::Fail {
            code: status.code().unwrap_or(-1),
        }
    }
}

fn spawn_failure(executable: &Path, err: &std::io::Error) -> RunRecord {
    RunRecord {
        outcome: Outcome::Fail { code: -1 },
        stdout: String::new(),
        stderr: format!("failed to spawn {}: {err}", executable.display()),
    }
}

fn reap(child: &mut Child) -> Outcome {
    let _ = child.kill();
    match child.wait() {
        Ok(status) => classify(status),
        Err(_) => Outcome::Fail { code: -1 },
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<thread::JoinHandle<Vec<u8>>> {
    pipe.map(|mut stream| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stream.read_to_end(&mut buf);
            buf
        })
    })
}

fn join_drain(handle: Option<thread::JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|handle| handle.join().ok())
        .map(|buf| String::from_utf8_lossy(&buf).into_owned())
        .unwrap_or_default()
}
