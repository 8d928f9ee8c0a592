//! Dilemma Session Core
//!
//! Turn-taking logic for a spoken moral-dilemma research session: decision
//! extraction, the randomized manipulation, the yes/no confirmation loop and
//! the state machine sequencing them against the robot and completion
//! services.

pub mod confirmation;
pub mod context;
pub mod error;
pub mod extractor;
pub mod llm_client;
pub mod machine;
pub mod manipulation;
pub mod message;
pub mod observer;
pub mod orchestrator;
pub mod services;

pub use context::SessionContext;
pub use machine::{Effect, Outcome, SessionMachine, State};
pub use orchestrator::{Orchestrator, Services, SessionReport, TurnTiming};
