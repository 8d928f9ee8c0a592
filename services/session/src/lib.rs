//! Dilemma Session Service
//!
//! Configuration, prompt loading and the concrete service adapters the
//! `session` binary wires into the core orchestrator. The binary itself is a
//! thin wrapper around this library.

pub mod config;
pub mod console;
pub mod prompts;
pub mod robot;
