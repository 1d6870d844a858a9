//! Running version-probe commands

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use wait_timeout::ChildExt;

/// Why a probe command produced no usable output
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` exited with {}{}", exit_description(.code), stderr_suffix(.stderr))]
    NonZeroExit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("`{command}` timed out after {timeout:?}")]
    TimedOut { command: String, timeout: Duration },

    #[error("failed waiting for `{command}`: {source}")]
    Wait {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("failed reading output of `{command}`: {source}")]
    Read {
        command: String,
        #[source]
        source: io::Error,
    },
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "a signal".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// Executes a probe command and returns its standard output
pub trait ProbeRunner: Send + Sync {
    fn run(&self, command: &str) -> Result<String, ProbeError>;
}

/// Runs probes through the platform shell, inheriting the environment and
/// working directory of the current process.
///
/// The timeout covers the whole probe: waiting for the shell to exit and
/// reading its output. A background process that keeps the output pipes open
/// after the shell exits therefore still times the probe out.
#[derive(Debug, Clone, Default)]
pub struct ShellProbeRunner {
    timeout: Option<Duration>,
}

impl ShellProbeRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    fn shell_command(command: &str) -> Command {
        if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", command]);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.args(["-c", command]);
            cmd
        }
    }

    fn timed_out(&self, command: &str) -> ProbeError {
        ProbeError::TimedOut {
            command: command.to_string(),
            timeout: self.timeout.unwrap_or_default(),
        }
    }

    fn wait(
        &self,
        child: &mut Child,
        command: &str,
        deadline: Option<Instant>,
    ) -> Result<ExitStatus, ProbeError> {
        let wait_error = |source: io::Error| ProbeError::Wait {
            command: command.to_string(),
            source,
        };

        let Some(deadline) = deadline else {
            return child.wait().map_err(wait_error);
        };

        let remaining = deadline.saturating_duration_since(Instant::now());
        match child.wait_timeout(remaining).map_err(wait_error)? {
            Some(status) => Ok(status),
            None => {
                warn!("Probe `{}` timed out after {:?}, killing", command, self.timeout);
                // The child may have exited between the timeout and the kill
                let _ = child.kill();
                let _ = child.wait();
                Err(self.timed_out(command))
            }
        }
    }

    /// Output of one drain thread, bounded by the same deadline as the wait
    fn collect(
        &self,
        output: Option<Receiver<io::Result<String>>>,
        command: &str,
        deadline: Option<Instant>,
    ) -> Result<String, ProbeError> {
        let Some(output) = output else {
            return Ok(String::new());
        };

        let received = match deadline {
            Some(deadline) => {
                output.recv_timeout(deadline.saturating_duration_since(Instant::now()))
            }
            None => output.recv().map_err(RecvTimeoutError::from),
        };

        match received {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(source)) => {
                warn!("Reading output of `{}` failed: {}", command, source);
                Err(ProbeError::Read {
                    command: command.to_string(),
                    source,
                })
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "Probe `{}` exited but its output stayed open past {:?}",
                    command, self.timeout
                );
                Err(self.timed_out(command))
            }
            // The drain thread died without sending
            Err(RecvTimeoutError::Disconnected) => Ok(String::new()),
        }
    }
}

impl ProbeRunner for ShellProbeRunner {
    fn run(&self, command: &str) -> Result<String, ProbeError> {
        debug!("Spawning probe: {}", command);
        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);

        let mut child = Self::shell_command(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ProbeError::Spawn {
                command: command.to_string(),
                source,
            })?;

        // Drain both pipes while waiting so a chatty probe cannot block on a full pipe
        let stdout = child.stdout.take().map(spawn_drain);
        let stderr = child.stderr.take().map(spawn_drain);

        let status = self.wait(&mut child, command, deadline)?;

        let stdout = self.collect(stdout, command, deadline)?;
        let stderr = self.collect(stderr, command, deadline)?;

        debug!("Probe `{}` finished with {:?}", command, status.code());
        if !status.success() {
            return Err(ProbeError::NonZeroExit {
                command: command.to_string(),
                code: status.code(),
                stderr,
            });
        }

        Ok(stdout)
    }
}

fn spawn_drain(pipe: impl Read + Send + 'static) -> Receiver<io::Result<String>> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        // Nobody is listening any more once the probe has timed out
        let _ = sender.send(drain(pipe));
    });
    receiver
}

fn drain(mut pipe: impl Read) -> io::Result<String> {
    let mut buf = Vec::new();
    pipe.read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
