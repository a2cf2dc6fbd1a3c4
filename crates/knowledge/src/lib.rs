//! Knowledge base loading for Pitcrew.
//!
//! The knowledge base is five static JSON documents on disk. They are
//! re-read for every request; see [`FsKnowledgeSource`].

pub mod loader;

pub use loader::{DocumentPaths, FsKnowledgeSource, InMemoryKnowledge};
