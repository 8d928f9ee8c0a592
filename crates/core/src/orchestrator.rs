//! Turn-Taking Orchestrator
//!
//! Drives a [`SessionMachine`] against the external services. Exactly one
//! effect is in flight at any time: the orchestrator awaits each call, applies
//! the post-speech settle delay, and feeds the outcome back into the machine.
//! Every call runs under an optional timeout; a timeout is reported as an
//! ordinary service failure so the machine takes its usual recovery path.

use crate::{
    context::SessionContext,
    error::{MachineError, ServiceFailure, ServiceKind},
    machine::{Effect, Outcome, SessionMachine},
    manipulation::{Condition, UniformSource},
    observer::SessionObserver,
    services::{AttentionService, CompletionService, ListenService, VoiceService},
};
use anyhow::anyhow;
use std::{future::Future, sync::Arc, time::Duration};
use tracing::{debug, info, instrument};

/// The collaborators a session talks to.
#[derive(Clone)]
pub struct Services {
    pub voice: Arc<dyn VoiceService>,
    pub attention: Arc<dyn AttentionService>,
    pub listen: Arc<dyn ListenService>,
    pub completion: Arc<dyn CompletionService>,
}

/// Timing policy for external calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnTiming {
    /// Pause after the very first speech turn, while the robot settles.
    pub first_turn_settle: Duration,
    /// Pause after every later speech turn.
    pub turn_settle: Duration,
    /// Upper bound on any single external call. `None` waits indefinitely.
    pub call_timeout: Option<Duration>,
}

impl Default for TurnTiming {
    fn default() -> Self {
        Self {
            first_turn_settle: Duration::from_secs(15),
            turn_settle: Duration::from_secs(1),
            call_timeout: Some(Duration::from_secs(120)),
        }
    }
}

impl TurnTiming {
    /// No settle delays and no timeout.
    pub fn immediate() -> Self {
        Self {
            first_turn_settle: Duration::ZERO,
            turn_settle: Duration::ZERO,
            call_timeout: None,
        }
    }

    fn settle_for(&self, first_turn: bool) -> Duration {
        if first_turn {
            self.first_turn_settle
        } else {
            self.turn_settle
        }
    }
}

/// What a finished session leaves behind.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub context: SessionContext,
    /// The condition presented last, if the manipulation phase was reached.
    pub condition: Option<Condition>,
}

/// Runs a single session from setup to done.
pub struct Orchestrator<S, O> {
    machine: SessionMachine<S>,
    services: Services,
    timing: TurnTiming,
    observer: O,
}

impl<S: UniformSource, O: SessionObserver> Orchestrator<S, O> {
    pub fn new(
        context: SessionContext,
        source: S,
        services: Services,
        timing: TurnTiming,
        observer: O,
    ) -> Self {
        Self {
            machine: SessionMachine::new(context, source),
            services,
            timing,
            observer,
        }
    }

    /// Runs the session until the participant confirms their decision.
    ///
    /// Service failures never end the session; only a machine driven out of
    /// order returns an error.
    #[instrument(name = "dilemma_session", skip_all)]
    pub async fn run(mut self) -> Result<SessionReport, MachineError> {
        info!("Session started.");
        self.observer.on_transition(&self.machine.record());

        while let Some(effect) = self.machine.pending_effect() {
            let outcome = self.perform(effect).await;
            if let Some(failure) = outcome.failure() {
                self.observer
                    .on_service_failure(&self.machine.state().to_string(), failure);
            }
            self.machine.advance(outcome)?;
            self.observer.on_transition(&self.machine.record());
        }

        info!(
            messages = self.machine.context().messages().len(),
            "Session finished."
        );
        Ok(SessionReport {
            condition: self.machine.condition(),
            context: self.machine.into_context(),
        })
    }

    async fn perform(&self, effect: Effect) -> Outcome {
        match effect {
            Effect::SetVoice => {
                let voice = &self.services.voice;
                Outcome::VoiceSet(self.call(ServiceKind::Voice, voice.set_voice()).await)
            }
            Effect::AttendNearest => {
                let attention = &self.services.attention;
                Outcome::Attended(
                    self.call(ServiceKind::Attention, attention.attend_nearest())
                        .await,
                )
            }
            Effect::Speak { text, first_turn } => {
                debug!(%text, first_turn, "Speaking");
                let voice = &self.services.voice;
                let result = self
                    .call(ServiceKind::Voice, voice.speak(&text, first_turn))
                    .await;
                if result.is_ok() {
                    let settle = self.timing.settle_for(first_turn);
                    if !settle.is_zero() {
                        tokio::time::sleep(settle).await;
                    }
                }
                Outcome::Spoke(result)
            }
            Effect::Listen => {
                let listen = &self.services.listen;
                Outcome::Heard(self.call(ServiceKind::Listen, listen.listen()).await)
            }
            Effect::Complete { history } => {
                let completion = &self.services.completion;
                Outcome::Completed(
                    self.call(ServiceKind::Completion, completion.complete(&history))
                        .await,
                )
            }
        }
    }

    async fn call<T>(
        &self,
        service: ServiceKind,
        fut: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<T, ServiceFailure> {
        let result = match self.timing.call_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .unwrap_or_else(|_| Err(anyhow!("timed out after {:?}", limit))),
            None => fut.await,
        };
        result.map_err(|e| ServiceFailure::new(service, format!("{e:#}")))
    }
}
