//! Concurrent, all-or-nothing loading of the five knowledge documents.
//!
//! The five reads are issued together and joined. If any single read or
//! parse fails, the whole load collapses to [`KnowledgeStore::empty`]: there
//! is no partial-success path.

use async_trait::async_trait;
use pitcrew_core::error::KnowledgeError;
use pitcrew_core::knowledge::{KnowledgeSource, KnowledgeStore};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Locations of the five documents relative to the knowledge root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPaths {
    pub products: PathBuf,
    pub wheelbases: PathBuf,
    pub pedals: PathBuf,
    pub parts: PathBuf,
    pub faq_issues: PathBuf,
}

impl DocumentPaths {
    /// The standard layout under `root`.
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            products: root.join("products").join("catalog.json"),
            wheelbases: root.join("compatibility").join("wheelbases.json"),
            pedals: root.join("compatibility").join("pedals.json"),
            parts: root.join("parts").join("database.json"),
            faq_issues: root.join("support").join("faq-issues.json"),
        }
    }

    /// All five paths in load order.
    pub fn all(&self) -> [&Path; 5] {
        [
            &self.products,
            &self.wheelbases,
            &self.pedals,
            &self.parts,
            &self.faq_issues,
        ]
    }
}

/// Reads the knowledge documents from the filesystem on every call.
#[derive(Debug, Clone)]
pub struct FsKnowledgeSource {
    paths: DocumentPaths,
}

impl FsKnowledgeSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            paths: DocumentPaths::under(root),
        }
    }

    pub fn from_config(config: &pitcrew_config::AppConfig) -> Self {
        Self::new(&config.knowledge.root)
    }

    pub fn paths(&self) -> &DocumentPaths {
        &self.paths
    }

    /// Load all five documents, failing if any one of them fails.
    pub async fn try_load(&self) -> Result<KnowledgeStore, KnowledgeError> {
        let (products, wheelbases, pedals, parts, faq_issues) = tokio::try_join!(
            read_document(&self.paths.products),
            read_document(&self.paths.wheelbases),
            read_document(&self.paths.pedals),
            read_document(&self.paths.parts),
            read_document(&self.paths.faq_issues),
        )?;

        Ok(KnowledgeStore {
            products,
            wheelbases,
            pedals,
            parts,
            faq_issues,
        })
    }
}

#[async_trait]
impl KnowledgeSource for FsKnowledgeSource {
    async fn load(&self) -> KnowledgeStore {
        match self.try_load().await {
            Ok(store) => store,
            Err(e) => {
                warn!(error = %e, "Error loading knowledge base, continuing with empty knowledge");
                KnowledgeStore::empty()
            }
        }
    }
}

async fn read_document(path: &Path) -> Result<Value, KnowledgeError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| KnowledgeError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let value = serde_json::from_str(&raw).map_err(|e| KnowledgeError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    debug!(path = %path.display(), bytes = raw.len(), "Loaded knowledge document");
    Ok(value)
}

/// A fixed store handed out on every load. Used by tests and tooling.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKnowledge {
    store: KnowledgeStore,
}

impl InMemoryKnowledge {
    pub fn new(store: KnowledgeStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl KnowledgeSource for InMemoryKnowledge {
    async fn load(&self) -> KnowledgeStore {
        self.store.clone()
    }
}
