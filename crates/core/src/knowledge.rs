//! The five reference documents the support pipeline retrieves from.
//!
//! Documents are opaque JSON. Only a handful of top-level keys are looked at
//! by name (`commonIssues`, `frequentQuestions`, `proTips`, per-brand maps).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One snapshot of the knowledge base, loaded fresh for every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeStore {
    /// Product catalog
    pub products: Value,
    /// Wheelbase compatibility, keyed by brand
    pub wheelbases: Value,
    /// Pedal compatibility, keyed by brand
    pub pedals: Value,
    /// Parts database
    pub parts: Value,
    /// Known issues, FAQ, and pro tips
    pub faq_issues: Value,
}

impl KnowledgeStore {
    /// All five documents as empty JSON objects.
    pub fn empty() -> Self {
        Self {
            products: empty_object(),
            wheelbases: empty_object(),
            pedals: empty_object(),
            parts: empty_object(),
            faq_issues: empty_object(),
        }
    }

    /// True when every document is an empty object.
    pub fn is_empty(&self) -> bool {
        [
            &self.products,
            &self.wheelbases,
            &self.pedals,
            &self.parts,
            &self.faq_issues,
        ]
        .iter()
        .all(|v| v.as_object().is_some_and(|m| m.is_empty()))
    }
}

impl Default for KnowledgeStore {
    fn default() -> Self {
        Self::empty()
    }
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Where the pipeline gets its knowledge from.
///
/// Implementations must not fail: on any problem they hand back
/// [`KnowledgeStore::empty`].
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    async fn load(&self) -> KnowledgeStore;
}
