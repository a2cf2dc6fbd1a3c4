//! # Pitcrew Core
//!
//! Domain types, traits, and error definitions for the Pitcrew support
//! backend. This crate has **no framework dependencies**: it defines the
//! domain model that the other crates implement against.
//!
//! Every collaborator the request pipeline talks to is a trait here
//! ([`Provider`], [`KnowledgeSource`], [`OrderLookup`]). Implementations live
//! in their respective crates, so tests can substitute in-memory stubs.

pub mod error;
pub mod intent;
pub mod knowledge;
pub mod message;
pub mod order;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{Error, KnowledgeError, ProviderError};
pub use intent::{IntentCategory, IntentSet, IntentTag};
pub use knowledge::{KnowledgeSource, KnowledgeStore};
pub use message::{Message, Role};
pub use order::{OrderLookup, OrderRecord, OrderStatus};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
