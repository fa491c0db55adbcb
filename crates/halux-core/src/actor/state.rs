//! `StateActor`: single owner of one state

use std::sync::Arc;

use halux_exec::CommandExecutor;
use kameo::actor::{ActorRef, WeakActorRef};
use kameo::error::ActorStopReason;
use kameo::message::{Context, Message};
use kameo::prelude::*;
use tracing::info;

use crate::error::CoreError;
use crate::message::{ActivateOption, DetermineCurrentOption};
use crate::state::{Activation, CurrentOption, State};

/// Arguments for spawning a `StateActor`
pub struct StateActorArgs {
    /// State to own
    pub state: State,
    /// Executor for probes and transitions
    pub executor: Arc<dyn CommandExecutor>,
}

/// Actor serializing every probe and transition of one state
pub struct StateActor {
    state: State,
    executor: Arc<dyn CommandExecutor>,
}

impl Actor for StateActor {
    type Args = StateActorArgs;
    type Error = CoreError;

    async fn on_start(args: Self::Args, actor_ref: ActorRef<Self>) -> Result<Self, Self::Error> {
        info!(
            state = %args.state.name(),
            id = %actor_ref.id(),
            executor = args.executor.executor_type(),
            "StateActor starting"
        );

        Ok(Self {
            state: args.state,
            executor: args.executor,
        })
    }

    async fn on_stop(
        &mut self,
        _actor_ref: WeakActorRef<Self>,
        reason: ActorStopReason,
    ) -> Result<(), Self::Error> {
        info!(state = %self.state.name(), reason = ?reason, "StateActor stopping");
        Ok(())
    }
}

// ============================================================================
// Message Handlers
// ============================================================================

impl Message<DetermineCurrentOption> for StateActor {
    type Reply = CurrentOption;

    async fn handle(
        &mut self,
        _msg: DetermineCurrentOption,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        self.state
            .determine_current_option(self.executor.as_ref())
            .await
    }
}

impl Message<ActivateOption> for StateActor {
    type Reply = Activation;

    async fn handle(
        &mut self,
        msg: ActivateOption,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        info!(state = %self.state.name(), target = %msg.target, "activation requested");

        self.state
            .activate_option(self.executor.as_ref(), &msg.target)
            .await
    }
}
