//! Manipulation Condition Selector
//!
//! Picks the phrasing used to read the participant's decision back to them.
//! The selection is a two-stage guard chain, not a single three-way draw:
//! the number of draws consumed is part of the experimental protocol.

use rand::Rng;
use serde::Serialize;
use std::fmt;

const HESITATION_THRESHOLD: f64 = 1.0 / 3.0;
const LAUGHTER_THRESHOLD: f64 = 2.0 / 3.0;

/// A source of uniform values in `[0, 1)`.
///
/// Injected into the session so tests can force each condition.
pub trait UniformSource: Send {
    fn next_unit(&mut self) -> f64;
}

/// Adapts any `rand` generator into a [`UniformSource`].
pub struct RngSource<R>(pub R);

impl<R: Rng + Send> UniformSource for RngSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}

/// The three experimental phrasings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Condition {
    /// Condition 1: a long pause before the question.
    Pause,
    /// Condition 2: laughter before the question.
    Laughter,
    /// Condition 3: a hesitant, buffered question.
    Hesitation,
}

impl Condition {
    /// The experiment's numbering, 1 to 3.
    pub fn number(self) -> u8 {
        match self {
            Condition::Pause => 1,
            Condition::Laughter => 2,
            Condition::Hesitation => 3,
        }
    }

    /// Renders the question spoken back to the participant.
    pub fn render(self, subject: &str) -> String {
        match self {
            Condition::Pause => format!("........   The {subject}?"),
            Condition::Laughter => format!("Hahahaha! The {subject}?"),
            Condition::Hesitation => format!("Hmmmmm, the {subject}?"),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Condition{}", self.number())
    }
}

/// Selects a condition: P(3) = 1/3, P(2) = 4/9, P(1) = 2/9.
pub fn select_condition(source: &mut dyn UniformSource) -> Condition {
    if source.next_unit() < HESITATION_THRESHOLD {
        return Condition::Hesitation;
    }
    if source.next_unit() < LAUGHTER_THRESHOLD {
        Condition::Laughter
    } else {
        Condition::Pause
    }
}
