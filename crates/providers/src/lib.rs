//! Model backend implementations for Pitcrew.
//!
//! All providers implement the `pitcrew_core::Provider` trait.
//! [`candidates::build_chain`] wires the configured endpoints into an
//! ordered [`FailoverChain`].

pub mod candidates;
pub mod failover;
pub mod ollama;

pub use candidates::{Candidate, build_chain, candidates};
pub use failover::FailoverChain;
pub use ollama::OllamaProvider;
