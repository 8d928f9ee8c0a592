//! External Service Contracts
//!
//! The session core never talks to hardware or the network directly. These
//! traits describe the collaborators it drives; adapters for the robot's REST
//! API, a console stand-in and an OpenAI-compatible completion endpoint live
//! elsewhere and are injected at startup.

use crate::message::Message;
use anyhow::Result;
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

/// Audible output on the robot.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VoiceService: Send + Sync {
    /// Selects the configured voice. Called once during setup.
    async fn set_voice(&self) -> Result<()>;

    /// Speaks `text`, returning once the speech has been delivered.
    ///
    /// `first_turn` is true only for the opening greeting of the session.
    async fn speak(&self, text: &str, first_turn: bool) -> Result<()>;
}

/// Directs the robot's sensory focus.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AttentionService: Send + Sync {
    /// Turns attention to the nearest person.
    async fn attend_nearest(&self) -> Result<()>;
}

/// Speech recognition.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ListenService: Send + Sync {
    /// Blocks until one utterance has been recognized.
    ///
    /// Returns an error when nothing was captured under the recognizer's own
    /// policy.
    async fn listen(&self) -> Result<String>;
}

/// Language-model completion over the full transcript.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Produces the next assistant utterance. The whole `history` is sent on
    /// every call; no server-side session state is assumed.
    async fn complete(&self, history: &[Message]) -> Result<String>;
}
