//! `ScriptActor`: runs scripts one at a time

use std::sync::Arc;

use halux_exec::CommandExecutor;
use kameo::actor::{ActorRef, WeakActorRef};
use kameo::error::ActorStopReason;
use kameo::message::{Context, Message};
use kameo::prelude::*;
use tracing::{info, warn};

use crate::error::CoreError;
use crate::message::{RunScript, ScriptOutcome};
use crate::script::Script;

/// Arguments for spawning a `ScriptActor`
pub struct ScriptActorArgs {
    /// Scripts the actor may run
    pub scripts: Vec<Script>,
    /// Executor for the script transitions
    pub executor: Arc<dyn CommandExecutor>,
}

/// Actor owning every configured script
pub struct ScriptActor {
    scripts: Vec<Script>,
    executor: Arc<dyn CommandExecutor>,
}

impl Actor for ScriptActor {
    type Args = ScriptActorArgs;
    type Error = CoreError;

    async fn on_start(args: Self::Args, actor_ref: ActorRef<Self>) -> Result<Self, Self::Error> {
        info!(
            id = %actor_ref.id(),
            scripts = args.scripts.len(),
            "ScriptActor starting"
        );

        Ok(Self {
            scripts: args.scripts,
            executor: args.executor,
        })
    }

    async fn on_stop(
        &mut self,
        _actor_ref: WeakActorRef<Self>,
        reason: ActorStopReason,
    ) -> Result<(), Self::Error> {
        info!(reason = ?reason, "ScriptActor stopping");
        Ok(())
    }
}

impl Message<RunScript> for ScriptActor {
    type Reply = ScriptOutcome;

    async fn handle(
        &mut self,
        msg: RunScript,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        let Some(script) = self.scripts.iter().find(|s| s.name() == msg.name) else {
            warn!(script = %msg.name, "tried to run unknown script");
            return ScriptOutcome::NotFound;
        };

        if script.run(self.executor.as_ref()).await {
            info!(script = %msg.name, "script succeeded");
            ScriptOutcome::Succeeded
        } else {
            warn!(script = %msg.name, "script failed");
            ScriptOutcome::Failed
        }
    }
}
