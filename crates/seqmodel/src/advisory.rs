//! Property suggestions from an external advisor.
//!
//! After a model has been compiled, an advisor can be asked to propose
//! safety or liveness properties for it. The advisor only ever sees the
//! system name and the participant and message lists; the compiled text is
//! never modified.
//!
//! Advisory failures are isolated: [`advise`] turns every error into an
//! [`AdvisoryNote::Unavailable`] instead of propagating it.

use std::{
    fmt,
    io::{self, Read, Write},
    process::{Child, Command, ExitStatus, Stdio},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use log::{debug, warn};
use thiserror::Error;

use crate::{config::AdvisoryConfig, formal::FormalModel};

/// The information handed to an advisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryRequest {
    base_name: String,
    participants: Vec<String>,
    messages: Vec<String>,
}

impl AdvisoryRequest {
    pub fn new(base_name: impl Into<String>, participants: Vec<String>, messages: Vec<String>) -> Self {
        Self {
            base_name: base_name.into(),
            participants,
            messages,
        }
    }

    /// Build a request from a synthesized model.
    pub fn from_formal(base_name: impl Into<String>, model: &FormalModel) -> Self {
        Self::new(
            base_name,
            model.participants().to_vec(),
            model.messages().to_vec(),
        )
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// The plain-text prompt sent to command advisors.
    pub fn prompt(&self) -> String {
        format!(
            "Propose Event-B invariants describing safety and liveness properties \
             for the interaction `{}`.\n\
             Participants: {}\n\
             Messages in order: {}\n\
             The machine tracks sentMessages, receivedMessages, currentMessage, \
             sender and receiver.\n",
            self.base_name,
            self.participants.join(", "),
            self.messages.join(", "),
        )
    }
}

/// Errors raised by an advisor.
#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("no advisory command is configured")]
    NotConfigured,

    #[error("failed to start advisory command `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("advisory command exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("advisory command produced no output")]
    Empty,

    #[error("advisory command timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("I/O error while talking to the advisory command: {0}")]
    Io(#[from] io::Error),
}

/// Something that can propose properties for an interaction.
pub trait PropertyAdvisor {
    /// Propose property text for `request`.
    ///
    /// # Errors
    ///
    /// Returns an [`AdvisoryError`] when no proposal could be obtained.
    fn propose(&self, request: &AdvisoryRequest) -> Result<String, AdvisoryError>;
}

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// An advisor backed by an external command.
///
/// The request prompt is written to the command's stdin and its stdout,
/// trimmed, is the proposal. A command still running when the timeout
/// expires is killed.
#[derive(Debug, Clone)]
pub struct CommandAdvisor {
    command: Option<String>,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandAdvisor {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: Some(command.into()),
            args,
            timeout: AdvisoryConfig::default().timeout(),
        }
    }

    pub fn from_config(config: &AdvisoryConfig) -> Self {
        Self {
            command: config.command().map(str::to_owned),
            args: config.args().to_vec(),
            timeout: config.timeout(),
        }
    }
}

impl PropertyAdvisor for CommandAdvisor {
    fn propose(&self, request: &AdvisoryRequest) -> Result<String, AdvisoryError> {
        let command = self.command.as_deref().ok_or(AdvisoryError::NotConfigured)?;
        debug!(command, args:? = self.args, timeout:? = self.timeout; "Running advisory command");

        let mut child = Command::new(command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| AdvisoryError::Spawn {
                command: command.to_owned(),
                source,
            })?;

        // Both pipes are read while waiting; a full pipe would stall the command.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(err) = stdin.write_all(request.prompt().as_bytes()) {
                // Reap the child before reporting.
                let _ = child.kill();
                let _ = child.wait();
                return Err(err.into());
            }
        }

        let status = wait_with_deadline(&mut child, self.timeout)?;
        let stdout = join(stdout)?;
        let stderr = join(stderr)?;

        if !status.success() {
            return Err(AdvisoryError::Failed {
                status,
                stderr: String::from_utf8_lossy(&stderr).trim().to_owned(),
            });
        }

        let text = String::from_utf8_lossy(&stdout).trim().to_owned();
        if text.is_empty() {
            return Err(AdvisoryError::Empty);
        }
        Ok(text)
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        pipe.read_to_end(&mut buffer)?;
        Ok(buffer)
    })
}

fn join(reader: Option<JoinHandle<io::Result<Vec<u8>>>>) -> io::Result<Vec<u8>> {
    match reader {
        Some(handle) => handle
            .join()
            .unwrap_or_else(|_| Err(io::Error::other("pipe reader panicked"))),
        None => Ok(Vec::new()),
    }
}

/// Wait for `child` to exit, killing it once `timeout` has passed.
fn wait_with_deadline(child: &mut Child, timeout: Duration) -> Result<ExitStatus, AdvisoryError> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            warn!(pid = child.id(), timeout:? = timeout; "Killing advisory command");
            child.kill()?;
            child.wait()?;
            return Err(AdvisoryError::Timeout { timeout });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// The outcome of an advisory request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvisoryNote {
    Proposed(String),
    Unavailable(String),
}

impl AdvisoryNote {
    pub fn is_proposed(&self) -> bool {
        matches!(self, AdvisoryNote::Proposed(_))
    }
}

impl fmt::Display for AdvisoryNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvisoryNote::Proposed(text) => writeln!(f, "{text}"),
            AdvisoryNote::Unavailable(reason) => {
                writeln!(f, "Property advice unavailable: {reason}")
            }
        }
    }
}

/// Ask `advisor` for a proposal; never fails.
pub fn advise(advisor: &dyn PropertyAdvisor, request: &AdvisoryRequest) -> AdvisoryNote {
    match advisor.propose(request) {
        Ok(text) => AdvisoryNote::Proposed(text),
        Err(err) => {
            warn!(base_name = request.base_name(), err:% = err; "Property advice unavailable");
            AdvisoryNote::Unavailable(err.to_string())
        }
    }
}
