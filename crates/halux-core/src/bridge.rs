//! `Bridge`: drives the registry against the pub/sub bus
//!
//! The bridge is the only component talking to the transport. It announces
//! every state and script to Home Assistant, republishes current options and
//! turns inbound commands into actor requests, one message at a time.

use std::collections::HashMap;
use std::sync::Arc;

use halux_api::{
    BinarySensorDiscovery, BROKEN, ButtonDiscovery, IDLE, ProblemStatus, SelectDiscovery, Topics,
};
use halux_exec::CommandExecutor;
use kameo::actor::ActorRef;
use kameo::prelude::*;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::actor::{ScriptActor, ScriptActorArgs, StateActor, StateActorArgs};
use crate::error::CoreError;
use crate::message::{ActivateOption, DetermineCurrentOption, RunScript, ScriptOutcome};
use crate::registry::Registry;
use crate::state::CurrentOption;
use crate::transport::{InboundMessage, Transport, TransportEvent};

/// A state actor plus what the bridge needs to announce it
struct StateHandle {
    name: String,
    options: Vec<String>,
    actor: ActorRef<StateActor>,
}

/// The script actor plus the names it serves
struct ScriptsHandle {
    names: Vec<String>,
    actor: ActorRef<ScriptActor>,
}

/// Where an inbound topic leads
#[derive(Debug, Clone, PartialEq, Eq)]
enum Route {
    State(usize),
    Script(String),
}

/// Bridge between the registry and the bus
pub struct Bridge {
    topics: Topics,
    transport: Arc<dyn Transport>,
    states: Vec<StateHandle>,
    scripts: Option<ScriptsHandle>,
    routes: HashMap<String, Route>,
}

impl Bridge {
    /// Spawn one actor per state and one for all scripts.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        registry: &Registry,
        topics: Topics,
        transport: Arc<dyn Transport>,
        executor: Arc<dyn CommandExecutor>,
    ) -> Self {
        let mut routes = HashMap::new();

        let states: Vec<StateHandle> = registry
            .states()
            .iter()
            .enumerate()
            .map(|(index, state)| {
                routes.insert(topics.state_activate(state.name()), Route::State(index));

                let actor = StateActor::spawn(StateActorArgs {
                    state: state.clone(),
                    executor: executor.clone(),
                });

                StateHandle {
                    name: state.name().to_string(),
                    options: state.option_names().map(str::to_string).collect(),
                    actor,
                }
            })
            .collect();

        let scripts = if registry.scripts().is_empty() {
            None
        } else {
            let names: Vec<String> = registry.script_names().map(str::to_string).collect();
            for name in &names {
                routes.insert(topics.script_activate(name), Route::Script(name.clone()));
            }

            let actor = ScriptActor::spawn(ScriptActorArgs {
                scripts: registry.scripts().to_vec(),
                executor,
            });

            Some(ScriptsHandle { names, actor })
        };

        info!(
            states = states.len(),
            scripts = scripts.as_ref().map_or(0, |s| s.names.len()),
            "bridge ready"
        );

        Self {
            topics,
            transport,
            states,
            scripts,
            routes,
        }
    }

    /// Process transport events until the stream ends.
    ///
    /// Each event is handled to completion before the next is taken.
    ///
    /// # Errors
    /// Returns the first transport or actor failure
    pub async fn run(&self, mut events: mpsc::Receiver<TransportEvent>) -> Result<(), CoreError> {
        while let Some(event) = events.recv().await {
            self.handle_event(event).await?;
        }

        info!("transport event stream closed");
        Ok(())
    }

    /// Handle a single transport event
    ///
    /// # Errors
    /// Returns transport or actor failures
    pub async fn handle_event(&self, event: TransportEvent) -> Result<(), CoreError> {
        match event {
            TransportEvent::Connected => self.announce().await,
            TransportEvent::Message(msg) => self.dispatch(&msg).await,
        }
    }

    /// Announce every entity, publish current status and subscribe.
    ///
    /// Runs on every (re)connection since the broker may have lost retained
    /// messages and subscriptions.
    ///
    /// # Errors
    /// Returns transport or actor failures
    pub async fn announce(&self) -> Result<(), CoreError> {
        info!("announcing states and scripts");

        if let Some(scripts) = &self.scripts {
            for name in &scripts.names {
                let button = ButtonDiscovery::for_script(&self.topics, name);
                self.publish_json(&self.topics.script_button_config(name), &button)
                    .await?;
            }
            let sensor = BinarySensorDiscovery::for_scripts(&self.topics);
            self.publish_json(&self.topics.scripts_problem_config(), &sensor)
                .await?;

            self.publish_scripts_status(IDLE, ProblemStatus::Off).await?;
        }

        for state in &self.states {
            let select = SelectDiscovery::for_state(
                &self.topics,
                &state.name,
                state.options.iter().map(String::as_str),
            );
            self.publish_json(&self.topics.state_select_config(&state.name), &select)
                .await?;

            let sensor = BinarySensorDiscovery::for_state(&self.topics, &state.name);
            self.publish_json(&self.topics.state_problem_config(&state.name), &sensor)
                .await?;
        }

        for state in &self.states {
            let current = state
                .actor
                .ask(DetermineCurrentOption)
                .await
                .map_err(|e| CoreError::ActorError(e.to_string()))?;
            self.publish_option(&state.name, &current).await?;
        }

        if let Some(scripts) = &self.scripts {
            for name in &scripts.names {
                self.subscribe(&self.topics.script_activate(name)).await?;
            }
        }
        for state in &self.states {
            self.subscribe(&self.topics.state_activate(&state.name))
                .await?;
        }

        Ok(())
    }

    /// Route one inbound message to its state or script
    ///
    /// # Errors
    /// Returns transport or actor failures
    pub async fn dispatch(&self, msg: &InboundMessage) -> Result<(), CoreError> {
        match self.routes.get(&msg.topic) {
            Some(Route::State(index)) => self.activate_option(&self.states[*index], &msg.text()).await,
            Some(Route::Script(name)) => self.run_script(name).await,
            None => {
                warn!(
                    topic = %msg.topic,
                    payload = %msg.text(),
                    "message received but not recognized"
                );
                Ok(())
            }
        }
    }

    /// Stop every actor
    pub async fn shutdown(&self) {
        for state in &self.states {
            state.actor.stop_gracefully().await.ok();
        }
        if let Some(scripts) = &self.scripts {
            scripts.actor.stop_gracefully().await.ok();
        }
    }

    async fn activate_option(&self, state: &StateHandle, target: &str) -> Result<(), CoreError> {
        let activation = state
            .actor
            .ask(ActivateOption {
                target: target.to_string(),
            })
            .await
            .map_err(|e| CoreError::ActorError(e.to_string()))?;

        info!(
            state = %state.name,
            target = %target,
            outcome = ?activation.outcome,
            current = %activation.current,
            "activation finished"
        );

        self.publish_option(&state.name, &activation.current).await
    }

    async fn run_script(&self, name: &str) -> Result<(), CoreError> {
        let Some(scripts) = &self.scripts else {
            return Ok(());
        };

        self.publish(&self.topics.scripts_value(), name.as_bytes().to_vec())
            .await?;

        let outcome = scripts
            .actor
            .ask(RunScript {
                name: name.to_string(),
            })
            .await
            .map_err(|e| CoreError::ActorError(e.to_string()))?;

        match outcome {
            ScriptOutcome::Succeeded => self.publish_scripts_status(IDLE, ProblemStatus::Off).await,
            ScriptOutcome::Failed => self.publish_scripts_status(BROKEN, ProblemStatus::On).await,
            ScriptOutcome::NotFound => {
                self.publish(&self.topics.scripts_value(), IDLE.as_bytes().to_vec())
                    .await
            }
        }
    }

    async fn publish_option(&self, state: &str, current: &CurrentOption) -> Result<(), CoreError> {
        info!(state = %state, option = %current, "publishing current option");

        self.publish(
            &self.topics.state_value(state),
            current.name().as_bytes().to_vec(),
        )
        .await?;

        let problem = ProblemStatus::from_broken(current.is_broken());
        self.publish(
            &self.topics.state_problem(state),
            problem.as_str().as_bytes().to_vec(),
        )
        .await
    }

    async fn publish_scripts_status(
        &self,
        value: &str,
        problem: ProblemStatus,
    ) -> Result<(), CoreError> {
        info!(status = %value, problem = %problem, "publishing scripts status");

        self.publish(&self.topics.scripts_value(), value.as_bytes().to_vec())
            .await?;
        self.publish(
            &self.topics.scripts_problem(),
            problem.as_str().as_bytes().to_vec(),
        )
        .await
    }

    async fn subscribe(&self, topic: &str) -> Result<(), CoreError> {
        info!(topic = %topic, "subscribing");
        self.transport.subscribe(topic).await
    }

    async fn publish_json<T: Serialize + Sync>(&self, topic: &str, value: &T) -> Result<(), CoreError> {
        let payload =
            serde_json::to_vec(value).map_err(|e| CoreError::Transport(e.to_string()))?;
        self.publish(topic, payload).await
    }

    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), CoreError> {
        self.transport.publish(topic, payload, true).await
    }
}
