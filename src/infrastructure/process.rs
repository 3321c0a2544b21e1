//! A guided program running as a child process.
//!
//! The child's stdout is read by a dedicated thread and forwarded line by line
//! over a channel, so every read can be bounded by a timeout.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, instrument, trace, warn};

use crate::application::protocol::Message;
use crate::application::reward::reward_rendered;
use crate::application::ApplicationError;
use crate::infrastructure::state_dict::StateDict;
use crate::infrastructure::traits::{GuidedEnv, Step};
use crate::infrastructure::{InfraError, InfraResult};

/// How a guided program is started.
#[derive(Debug, Clone)]
pub struct ProgramSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Pass the child's stderr through instead of discarding it.
    pub inherit_stderr: bool,
    /// Extra environment variables for the child.
    pub env: Vec<(String, String)>,
}

impl ProgramSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            inherit_stderr: false,
            env: Vec::new(),
        }
    }
}

struct Running {
    child: Child,
    stdin: Option<ChildStdin>,
    lines: Receiver<std::io::Result<String>>,
    reader: Option<JoinHandle<()>>,
}

enum Observation {
    State(u32),
    Done(String),
}

/// [`GuidedEnv`] backed by a real child process.
pub struct GuidedProcess {
    spec: ProgramSpec,
    timeout: Duration,
    states: StateDict,
    running: Option<Running>,
    last_action: Option<i64>,
}

impl GuidedProcess {
    pub fn new(spec: ProgramSpec, states: StateDict, timeout: Duration) -> Self {
        Self {
            spec,
            timeout,
            states,
            running: None,
            last_action: None,
        }
    }

    pub fn states(&self) -> &StateDict {
        &self.states
    }

    fn spawn(&self) -> InfraResult<Running> {
        let stderr = if self.spec.inherit_stderr {
            Stdio::inherit()
        } else {
            Stdio::null()
        };
        let mut child = Command::new(&self.spec.program)
            .args(&self.spec.args)
            .envs(self.spec.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(stderr)
            .spawn()
            .map_err(|source| InfraError::Spawn {
                program: self.spec.program.clone(),
                source,
            })?;
        debug!(pid = child.id(), program = %self.spec.program, "guided program started");

        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ApplicationError::protocol("child stdout not captured"))?;

        let (tx, rx) = mpsc::channel();
        let reader = thread::Builder::new()
            .name("guided-stdout".into())
            .spawn(move || {
                for line in BufReader::new(stdout).lines() {
                    let failed = line.is_err();
                    if tx.send(line).is_err() || failed {
                        break;
                    }
                }
            })
            .map_err(|e| InfraError::io("start reader thread", e))?;

        Ok(Running {
            child,
            stdin,
            lines: rx,
            reader: Some(reader),
        })
    }

    fn read_line(&mut self, expected: &'static str) -> InfraResult<String> {
        let running = self
            .running
            .as_mut()
            .ok_or_else(|| ApplicationError::protocol("no guided program running"))?;
        match running.lines.recv_timeout(self.timeout) {
            Ok(Ok(line)) => Ok(line),
            Ok(Err(e)) => Err(InfraError::io("read guided program output", e)),
            Err(RecvTimeoutError::Timeout) => Err(ApplicationError::Timeout {
                seconds: self.timeout.as_secs(),
            }
            .into()),
            Err(RecvTimeoutError::Disconnected) => {
                Err(ApplicationError::ProgramExited { expected }.into())
            }
        }
    }

    /// Read until the program requests a value or finishes.
    fn observe(&mut self, transcript: &mut Vec<String>) -> InfraResult<Observation> {
        loop {
            let line = self.read_line("STATE or DONE")?;
            let message = Message::parse(&line);
            if message.is_tagged() {
                transcript.push(line.trim_end().to_string());
            }
            match message {
                Message::State(state) => return Ok(Observation::State(self.states.index(&state)?)),
                Message::Done(result) => return Ok(Observation::Done(result)),
                Message::Action(echoed) => self.check_echo(&echoed)?,
                Message::Other(text) => trace!(%text, "ignoring untagged output"),
            }
        }
    }

    fn check_echo(&self, echoed: &str) -> InfraResult<()> {
        let Some(sent) = self.last_action else {
            return Err(ApplicationError::protocol(format!("ACTION {echoed} before any action")).into());
        };
        let sent = sent as f64;
        let close = echoed
            .trim()
            .parse::<f64>()
            .map(|v| (v - sent).abs() <= 1e-8 + 1e-5 * sent.abs())
            .unwrap_or(false);
        if close {
            Ok(())
        } else {
            Err(ApplicationError::ActionMismatch {
                sent,
                echoed: echoed.to_string(),
            }
            .into())
        }
    }
}

impl GuidedEnv for GuidedProcess {
    #[instrument(level = "debug", skip(self), fields(program = %self.spec.program))]
    fn reset(&mut self) -> InfraResult<u32> {
        self.close()?;
        self.running = Some(self.spawn()?);
        self.last_action = None;

        let mut transcript = Vec::new();
        match self.observe(&mut transcript)? {
            Observation::State(id) => Ok(id),
            Observation::Done(result) => Err(ApplicationError::protocol(format!(
                "program finished before requesting a value: {result}"
            ))
            .into()),
        }
    }

    fn step(&mut self, action: i64) -> InfraResult<Step> {
        let running = self
            .running
            .as_mut()
            .ok_or_else(|| ApplicationError::protocol("step without reset"))?;
        let stdin = running
            .stdin
            .as_mut()
            .ok_or_else(|| ApplicationError::protocol("guided program stdin closed"))?;
        writeln!(stdin, "{action}").map_err(|e| InfraError::io("send action", e))?;
        stdin.flush().map_err(|e| InfraError::io("flush action", e))?;
        self.last_action = Some(action);

        let mut transcript = Vec::new();
        match self.observe(&mut transcript)? {
            Observation::State(id) => Ok(Step::next(id, transcript)),
            Observation::Done(result) => {
                let reward = reward_rendered(&result).map_err(ApplicationError::from)?;
                debug!(%result, reward, "episode finished");
                Ok(Step::finished(result, reward, transcript))
            }
        }
    }

    fn close(&mut self) -> InfraResult<()> {
        let Some(mut running) = self.running.take() else {
            return Ok(());
        };
        // closing stdin lets a program blocked on a read fail and exit
        drop(running.stdin.take());
        match running.child.try_wait() {
            Ok(Some(_)) => {}
            Ok(None) | Err(_) => {
                if let Err(e) = running.child.kill() {
                    warn!("cannot kill guided program: {e}");
                }
            }
        }
        let status = running
            .child
            .wait()
            .map_err(|e| InfraError::io("wait for guided program", e))?;
        if let Some(reader) = running.reader.take() {
            if reader.join().is_err() {
                warn!("reader thread panicked");
            }
        }
        debug!(%status, "guided program stopped");
        Ok(())
    }

    fn states_seen(&self) -> usize {
        self.states.len()
    }
}

impl Drop for GuidedProcess {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("closing guided program: {e}");
        }
    }
}
