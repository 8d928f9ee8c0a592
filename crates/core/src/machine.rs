//! Session State Machine
//!
//! The turn-taking logic as a pure transition core: the machine names the
//! effect its current state needs performed, and [`SessionMachine::advance`]
//! folds the outcome of that effect into the [`SessionContext`] and picks the
//! next state. No I/O happens here; the async orchestrator performs effects
//! and feeds outcomes back, which keeps every branch testable in isolation.

use crate::{
    confirmation::{Confirmation, classify},
    context::SessionContext,
    error::{MachineError, ServiceFailure},
    extractor::extract_decision,
    manipulation::{Condition, UniformSource, select_condition},
    message::Message,
};
use serde::Serialize;
use std::fmt;

/// Appended when the completion service cannot produce a reply.
pub const FALLBACK_REPLY: &str = "I couldn't process that. Please say it again.";
/// Appended on the participant's behalf after a negative confirmation.
pub const NOT_SURE_REPLY: &str = "I am not sure.";
/// Spoken when a confirmation answer is neither yes nor no.
pub const CLARIFY_PROMPT: &str = "I didn't catch that. Did you say yes or no?";
/// Spoken once the participant confirms their decision.
pub const CLOSING_LINE: &str =
    "Thank you for sharing your decision with me. This is the end of our conversation. Goodbye!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SetupStep {
    SetVoice,
    AttendUser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConversationStep {
    Speaking,
    Listening,
    ProcessingResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ManipulationStep {
    /// Speaking the question in the selected condition's phrasing.
    Asking(Condition),
    Listening,
    Clarify,
}

/// The composite state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum State {
    Setup(SetupStep),
    Conversation(ConversationStep),
    Manipulation(ManipulationStep),
    End,
    Done,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Setup(SetupStep::SetVoice) => write!(f, "Setup.SetVoice"),
            State::Setup(SetupStep::AttendUser) => write!(f, "Setup.AttendUser"),
            State::Conversation(ConversationStep::Speaking) => {
                write!(f, "ConversationLoop.Speaking")
            }
            State::Conversation(ConversationStep::Listening) => {
                write!(f, "ConversationLoop.Listening")
            }
            State::Conversation(ConversationStep::ProcessingResponse) => {
                write!(f, "ConversationLoop.ProcessingResponse")
            }
            State::Manipulation(ManipulationStep::Asking(condition)) => {
                write!(f, "Manipulation.{condition}")
            }
            State::Manipulation(ManipulationStep::Listening) => write!(f, "Manipulation.Listening"),
            State::Manipulation(ManipulationStep::Clarify) => write!(f, "Manipulation.Clarify"),
            State::End => write!(f, "End"),
            State::Done => write!(f, "Done"),
        }
    }
}

/// Work the orchestrator must perform for the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SetVoice,
    AttendNearest,
    Speak { text: String, first_turn: bool },
    Listen,
    Complete { history: Vec<Message> },
}

/// The result of performing an [`Effect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    VoiceSet(Result<(), ServiceFailure>),
    Attended(Result<(), ServiceFailure>),
    Spoke(Result<(), ServiceFailure>),
    Heard(Result<String, ServiceFailure>),
    Completed(Result<String, ServiceFailure>),
}

impl Outcome {
    /// The failure carried by this outcome, if any.
    pub fn failure(&self) -> Option<&ServiceFailure> {
        match self {
            Outcome::VoiceSet(r) | Outcome::Attended(r) | Outcome::Spoke(r) => r.as_ref().err(),
            Outcome::Heard(r) | Outcome::Completed(r) => r.as_ref().err(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Outcome::VoiceSet(_) => "VoiceSet",
            Outcome::Attended(_) => "Attended",
            Outcome::Spoke(_) => "Spoke",
            Outcome::Heard(_) => "Heard",
            Outcome::Completed(_) => "Completed",
        }
    }
}

/// The diagnostic trace entry emitted after every transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionRecord {
    pub state: String,
    pub extracted_person: Option<String>,
    pub last_utterance: String,
}

/// Owns the session state and context for one participant.
pub struct SessionMachine<S> {
    state: State,
    context: SessionContext,
    source: S,
    condition: Option<Condition>,
}

impl<S: UniformSource> SessionMachine<S> {
    /// Starts a session in `Setup.SetVoice`.
    pub fn new(context: SessionContext, source: S) -> Self {
        Self {
            state: State::Setup(SetupStep::SetVoice),
            context,
            source,
            condition: None,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn into_context(self) -> SessionContext {
        self.context
    }

    /// The most recently selected manipulation condition.
    pub fn condition(&self) -> Option<Condition> {
        self.condition
    }

    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    pub fn record(&self) -> TransitionRecord {
        TransitionRecord {
            state: self.state.to_string(),
            extracted_person: self.context.extracted_person().map(str::to_string),
            last_utterance: self.context.last_result().to_string(),
        }
    }

    /// The effect the current state is waiting on, or `None` once done.
    pub fn pending_effect(&self) -> Option<Effect> {
        let effect = match self.state {
            State::Setup(SetupStep::SetVoice) => Effect::SetVoice,
            State::Setup(SetupStep::AttendUser) => Effect::AttendNearest,
            State::Conversation(ConversationStep::Speaking) => {
                self.speak(self.context.latest().content.clone())
            }
            State::Conversation(ConversationStep::Listening)
            | State::Manipulation(ManipulationStep::Listening) => Effect::Listen,
            State::Conversation(ConversationStep::ProcessingResponse) => Effect::Complete {
                history: self.context.messages().to_vec(),
            },
            State::Manipulation(ManipulationStep::Asking(condition)) => {
                let subject = self.context.extracted_person().unwrap_or_default();
                self.speak(condition.render(subject))
            }
            State::Manipulation(ManipulationStep::Clarify) => self.speak(CLARIFY_PROMPT.into()),
            State::End => self.speak(CLOSING_LINE.into()),
            State::Done => return None,
        };
        Some(effect)
    }

    /// Applies the outcome of the pending effect and moves to the next state.
    pub fn advance(&mut self, outcome: Outcome) -> Result<State, MachineError> {
        let next = match (self.state, outcome) {
            (State::Done, _) => return Err(MachineError::Finished),

            (State::Setup(SetupStep::SetVoice), Outcome::VoiceSet(_)) => {
                State::Setup(SetupStep::AttendUser)
            }
            (State::Setup(SetupStep::AttendUser), Outcome::Attended(_)) => {
                State::Conversation(ConversationStep::Speaking)
            }

            (State::Conversation(ConversationStep::Speaking), Outcome::Spoke(result)) => {
                if result.is_ok() {
                    self.context.mark_first_turn_spoken();
                }
                State::Conversation(ConversationStep::Listening)
            }
            (State::Conversation(ConversationStep::Listening), Outcome::Heard(Ok(utterance))) => {
                let decision = extract_decision(&utterance);
                self.context.push_user(utterance.clone());
                self.context.set_last_result(utterance);
                match decision {
                    Some(person) => {
                        self.context.set_extracted_person(person);
                        self.enter_manipulation()
                    }
                    None => State::Conversation(ConversationStep::ProcessingResponse),
                }
            }
            (State::Conversation(ConversationStep::Listening), Outcome::Heard(Err(_))) => {
                State::Conversation(ConversationStep::Speaking)
            }
            (
                State::Conversation(ConversationStep::ProcessingResponse),
                Outcome::Completed(result),
            ) => {
                let reply = result.unwrap_or_else(|_| FALLBACK_REPLY.to_string());
                self.context.push_assistant(reply);
                State::Conversation(ConversationStep::Speaking)
            }

            (State::Manipulation(ManipulationStep::Asking(_)), Outcome::Spoke(_))
            | (State::Manipulation(ManipulationStep::Clarify), Outcome::Spoke(_)) => {
                State::Manipulation(ManipulationStep::Listening)
            }
            (State::Manipulation(ManipulationStep::Listening), Outcome::Heard(Ok(utterance))) => {
                if let Some(person) = extract_decision(&utterance) {
                    self.context.set_extracted_person(person);
                }
                let answer = classify(&utterance);
                self.context.set_last_result(utterance);
                match answer {
                    Confirmation::Affirmative => State::End,
                    Confirmation::Negative => {
                        self.context.push_user(NOT_SURE_REPLY);
                        State::Conversation(ConversationStep::ProcessingResponse)
                    }
                    Confirmation::Ambiguous => State::Manipulation(ManipulationStep::Clarify),
                }
            }
            (State::Manipulation(ManipulationStep::Listening), Outcome::Heard(Err(_))) => {
                self.enter_manipulation()
            }

            (State::End, Outcome::Spoke(_)) => {
                self.context.push_assistant(CLOSING_LINE);
                State::Done
            }

            (state, outcome) => {
                return Err(MachineError::UnexpectedOutcome {
                    state: state.to_string(),
                    outcome: outcome.name().to_string(),
                });
            }
        };
        self.state = next;
        Ok(next)
    }

    // Selection happens inside the transition so no intermediate state is observable.
    fn enter_manipulation(&mut self) -> State {
        let condition = select_condition(&mut self.source);
        self.condition = Some(condition);
        State::Manipulation(ManipulationStep::Asking(condition))
    }

    fn speak(&self, text: String) -> Effect {
        Effect::Speak {
            text,
            first_turn: self.context.is_first_message(),
        }
    }
}
