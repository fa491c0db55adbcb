//! Test doubles for the executor and the transport
//!
//! Built for unit tests and, behind the `test-utils` feature, for the
//! integration tests, so the engine runs without processes or a broker.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use halux_exec::{CommandExecutor, CommandResult, ExecError};

use crate::error::CoreError;
use crate::transport::Transport;

#[derive(Debug, Clone)]
enum Scripted {
    Exit(CommandResult),
    SpawnFailure,
}

#[derive(Debug, Default)]
struct ExecutorInner {
    queued: HashMap<String, VecDeque<Scripted>>,
    defaults: HashMap<String, Scripted>,
    effects: HashMap<String, Vec<(String, Scripted)>>,
    calls: Vec<String>,
    timeouts: Vec<Duration>,
}

/// Executor answering from a script instead of running processes.
///
/// Each command returns its queued results first, then its default. An
/// effect lets one command change another command's default, which is how
/// tests model a transition flipping what a probe reports afterwards.
/// Commands with nothing scripted fail to spawn.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    inner: Mutex<ExecutorInner>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `cmd` with this result whenever nothing is queued
    #[must_use]
    pub fn with_default(self, cmd: &str, status: i32, stdout: &str) -> Self {
        self.set_default(cmd, status, stdout);
        self
    }

    /// Answer the next runs of `cmd` with these results, in order
    #[must_use]
    pub fn with_sequence(self, cmd: &str, results: &[(i32, &str)]) -> Self {
        for (status, stdout) in results {
            self.push(cmd, *status, stdout);
        }
        self
    }

    /// Make `cmd` fail to start
    #[must_use]
    pub fn with_spawn_failure(self, cmd: &str) -> Self {
        self.lock()
            .defaults
            .insert(cmd.to_string(), Scripted::SpawnFailure);
        self
    }

    /// After `trigger` runs, answer `target` with this result by default
    #[must_use]
    pub fn with_effect(self, trigger: &str, target: &str, status: i32, stdout: &str) -> Self {
        self.lock()
            .effects
            .entry(trigger.to_string())
            .or_default()
            .push((
                target.to_string(),
                Scripted::Exit(CommandResult::new(status, stdout)),
            ));
        self
    }

    pub fn set_default(&self, cmd: &str, status: i32, stdout: &str) {
        self.lock().defaults.insert(
            cmd.to_string(),
            Scripted::Exit(CommandResult::new(status, stdout)),
        );
    }

    pub fn push(&self, cmd: &str, status: i32, stdout: &str) {
        self.lock()
            .queued
            .entry(cmd.to_string())
            .or_default()
            .push_back(Scripted::Exit(CommandResult::new(status, stdout)));
    }

    /// Every command run so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// How often `cmd` has run
    pub fn call_count(&self, cmd: &str) -> usize {
        self.lock().calls.iter().filter(|c| *c == cmd).count()
    }

    /// Timeouts passed to `run_with_timeout`, in order
    pub fn timeouts(&self) -> Vec<Duration> {
        self.lock().timeouts.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ExecutorInner> {
        self.inner.lock().unwrap()
    }

    fn answer(&self, cmd: &str) -> Result<CommandResult, ExecError> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        inner.calls.push(cmd.to_string());

        let scripted = match inner.queued.get_mut(cmd).and_then(VecDeque::pop_front) {
            Some(next) => Some(next),
            None => inner.defaults.get(cmd).cloned(),
        };

        if let Some(effects) = inner.effects.get(cmd).cloned() {
            for (target, result) in effects {
                inner.defaults.insert(target, result);
            }
        }

        match scripted {
            Some(Scripted::Exit(result)) => Ok(result),
            Some(Scripted::SpawnFailure) => Err(ExecError::SpawnError(format!(
                "{cmd}: No such file or directory"
            ))),
            None => Err(ExecError::SpawnError(format!("nothing scripted for {cmd}"))),
        }
    }
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn run(&self, cmd: &str) -> Result<CommandResult, ExecError> {
        self.answer(cmd)
    }

    async fn run_with_timeout(
        &self,
        cmd: &str,
        timeout: Duration,
    ) -> Result<CommandResult, ExecError> {
        self.lock().timeouts.push(timeout);
        self.answer(cmd)
    }

    fn executor_type(&self) -> &'static str {
        "scripted"
    }
}

/// One message handed to [`RecordingTransport::publish`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub topic: String,
    pub payload: String,
    pub retain: bool,
}

/// Transport that records instead of sending
#[derive(Debug, Default)]
pub struct RecordingTransport {
    published: Mutex<Vec<Published>>,
    subscriptions: Mutex<Vec<String>>,
    fail_publish: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport whose publishes all fail
    pub fn failing() -> Self {
        Self {
            fail_publish: true,
            ..Self::default()
        }
    }

    pub fn published(&self) -> Vec<Published> {
        self.published.lock().unwrap().clone()
    }

    /// Payloads sent to `topic`, oldest first
    pub fn payloads(&self, topic: &str) -> Vec<String> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.topic == topic)
            .map(|p| p.payload.clone())
            .collect()
    }

    pub fn last_payload(&self, topic: &str) -> Option<String> {
        self.payloads(topic).pop()
    }

    pub fn subscriptions(&self) -> Vec<String> {
        self.subscriptions.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.published.lock().unwrap().clear();
        self.subscriptions.lock().unwrap().clear();
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn publish(&self, topic: &str, payload: Vec<u8>, retain: bool) -> Result<(), CoreError> {
        if self.fail_publish {
            return Err(CoreError::Transport("publish refused".to_string()));
        }
        self.published.lock().unwrap().push(Published {
            topic: topic.to_string(),
            payload: String::from_utf8_lossy(&payload).to_string(),
            retain,
        });
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<(), CoreError> {
        self.subscriptions.lock().unwrap().push(topic.to_string());
        Ok(())
    }
}
