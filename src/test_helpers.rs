//! Resolver doubles for exercising a [`crate::Session`] without a network.

use crate::{
    bet::StagedBet,
    money::Chips,
    resolver::{
        Outcome,
        Resolution,
        Resolver,
        SpinFailure,
    },
    wheel::Pocket,
};
use std::{
    collections::VecDeque,
    sync::{
        Arc,
        Mutex,
    },
    time::Duration,
};

#[derive(Default)]
struct Script {
    replies: VecDeque<Resolution>,
    submissions: Vec<Vec<StagedBet>>,
}

/// Answers spins from a queue of canned resolutions and records what it was
/// asked. An exhausted queue answers with a transport failure.
#[derive(Clone, Default)]
pub struct ScriptedResolver {
    script: Arc<Mutex<Script>>,
    delay: Option<Duration>,
}

impl ScriptedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits `delay` before answering each spin.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push(&self, resolution: Resolution) -> &Self {
        self.script
            .lock()
            .expect("script lock")
            .replies
            .push_back(resolution);
        self
    }

    pub fn push_settled(&self, pocket: Pocket, bankroll: Chips) -> &Self {
        self.push(Resolution::Settled(Outcome {
            pocket,
            color: pocket.color(),
            bankroll,
            winnings: None,
        }))
    }

    pub fn push_resolver_error(&self, message: &str) -> &Self {
        self.push(Resolution::Failed(SpinFailure::Resolver(message.to_string())))
    }

    pub fn push_transport_failure(&self, message: &str) -> &Self {
        self.push(Resolution::Failed(SpinFailure::Transport(message.to_string())))
    }

    pub fn submissions(&self) -> Vec<Vec<StagedBet>> {
        self.script.lock().expect("script lock").submissions.clone()
    }
}

impl Resolver for ScriptedResolver {
    async fn resolve(&self, bets: &[StagedBet]) -> Resolution {
        let reply = {
            let mut script = self.script.lock().expect("script lock");
            script.submissions.push(bets.to_vec());
            script.replies.pop_front()
        };
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        reply.unwrap_or_else(|| {
            Resolution::Failed(SpinFailure::Transport("no scripted reply".into()))
        })
    }
}
