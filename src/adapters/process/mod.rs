//! Subprocess command runner
//!
//! Runs a deploy command with piped stdout/stderr and a hard deadline. Output
//! is drained on helper threads so a chatty child cannot block on a full
//! pipe while we poll for its exit. The same deadline bounds the drains, since
//! a backgrounded grandchild can hold the pipes open after the child exits.

use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use crate::core::models::DeployCommand;
use crate::core::ports::{CommandError, CommandOutput, CommandRunner};

/// How often the child is polled for exit
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs commands as real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Create a runner
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn drain<R: Read + Send + 'static>(stream: Option<R>) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_end(&mut buf);
        }
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });
    rx
}

/// Drained output, or `None` if the pipe is still open at `deadline`
fn collect(rx: &Receiver<String>, deadline: Instant) -> Option<String> {
    rx.recv_timeout(deadline.saturating_duration_since(Instant::now())).ok()
}

/// The parts of a child process the deadline loop drives
trait ChildProcess {
    fn try_wait(&mut self) -> io::Result<Option<ExitStatus>>;
    fn kill(&mut self) -> io::Result<()>;
    fn wait(&mut self) -> io::Result<ExitStatus>;
}

impl ChildProcess for Child {
    fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        Self::try_wait(self)
    }

    fn kill(&mut self) -> io::Result<()> {
        Self::kill(self)
    }

    fn wait(&mut self) -> io::Result<ExitStatus> {
        Self::wait(self)
    }
}

fn kill<P: ChildProcess>(child: &mut P) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Exit code once the child exits, `None` if `deadline` passes first
fn wait_until<P: ChildProcess>(
    child: &mut P,
    deadline: Instant,
) -> Result<Option<Option<i32>>, CommandError> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status.code())),
            Ok(None) => {},
            Err(e) => {
                kill(child);
                return Err(CommandError::Wait(e));
            },
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

impl CommandRunner for ProcessRunner {
    fn run(
        &self,
        command: &DeployCommand,
        work_dir: &Path,
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError> {
        let deadline = Instant::now() + timeout;
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .current_dir(work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CommandError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let Some(exit_code) = wait_until(&mut child, deadline)? else {
            log::debug!("Killing `{}` after {:?}", command.program, timeout);
            kill(&mut child);
            return Err(CommandError::Timeout(timeout));
        };

        // Drains blocked on a pipe a grandchild still holds are left detached.
        match (collect(&stdout, deadline), collect(&stderr, deadline)) {
            (Some(stdout), Some(stderr)) => Ok(CommandOutput {
                exit_code,
                stdout,
                stderr,
            }),
            _ => {
                log::debug!("`{}` exited but its output is still open", command.program);
                Err(CommandError::Timeout(timeout))
            },
        }
    }
}
