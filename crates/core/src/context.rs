//! Session Context
//!
//! The single mutable aggregate for a dialogue session. The transcript is
//! append-only: entries are never removed, reordered or edited once pushed,
//! because the whole sequence is replayed to the completion service on every
//! request.

use crate::message::Message;
use serde::Serialize;

/// Conversational state carried from the first greeting to the closing line.
#[derive(Debug, Clone, Serialize)]
pub struct SessionContext {
    messages: Vec<Message>,
    last_result: String,
    extracted_person: String,
    is_first_message: bool,
}

impl SessionContext {
    /// Seeds a new session with the fixed system instruction and greeting.
    pub fn new(system_prompt: impl Into<String>, greeting: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt), Message::assistant(greeting)],
            last_result: String::new(),
            extracted_person: String::new(),
            is_first_message: true,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recent transcript entry. Never absent: the seed messages are
    /// pushed in `new` and nothing is ever removed.
    pub fn latest(&self) -> &Message {
        self.messages
            .last()
            .expect("seeded transcript is never empty")
    }

    pub fn last_result(&self) -> &str {
        &self.last_result
    }

    /// The most recent decision subject, if one has been extracted yet.
    pub fn extracted_person(&self) -> Option<&str> {
        if self.extracted_person.is_empty() {
            None
        } else {
            Some(&self.extracted_person)
        }
    }

    pub fn is_first_message(&self) -> bool {
        self.is_first_message
    }

    pub(crate) fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub(crate) fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    pub(crate) fn set_last_result(&mut self, utterance: impl Into<String>) {
        self.last_result = utterance.into();
    }

    pub(crate) fn set_extracted_person(&mut self, person: impl Into<String>) {
        self.extracted_person = person.into();
    }

    /// Called once the first speech turn has been delivered; the flag never
    /// comes back.
    pub(crate) fn mark_first_turn_spoken(&mut self) {
        self.is_first_message = false;
    }
}
