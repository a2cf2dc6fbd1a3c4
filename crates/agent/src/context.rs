//! Intent-driven knowledge retrieval.
//!
//! Each rule below looks at the intent set and, when it fires, copies a slice
//! of the knowledge store into a titled section. Sections are appended in a
//! fixed order, so the same inputs always render the same context.

use pitcrew_core::intent::{IntentSet, IntentTag};
use pitcrew_core::knowledge::KnowledgeStore;
use serde::Serialize;
use serde_json::{Map, Value};

/// Intents that pull in the product catalog.
const SALES_INTENTS: [IntentTag; 5] = [
    IntentTag::Recommendation,
    IntentTag::Requirements,
    IntentTag::Pricing,
    IntentTag::Bundles,
    IntentTag::Compatibility,
];

/// Brands keyed in both compatibility documents.
const WHEELBASE_BRANDS: [IntentTag; 5] = [
    IntentTag::Fanatec,
    IntentTag::Moza,
    IntentTag::Simagic,
    IntentTag::Thrustmaster,
    IntentTag::Logitech,
];

const PARTS_INTENTS: [IntentTag; 3] = [
    IntentTag::MissingPart,
    IntentTag::DamagedPart,
    IntentTag::PartsLookup,
];

const ISSUE_INTENTS: [IntentTag; 11] = [
    IntentTag::Troubleshooting,
    IntentTag::HardwareIssue,
    IntentTag::StabilityIssue,
    IntentTag::AlignmentIssue,
    IntentTag::AssemblyHelp,
    IntentTag::SeatIssue,
    IntentTag::MonitorIssue,
    IntentTag::SupportIssue,
    IntentTag::ReturnInquiry,
    IntentTag::MissingPart,
    IntentTag::DamagedPart,
];

/// Cap on matched common issues.
pub const MAX_COMMON_ISSUES: usize = 5;

/// A titled block of JSON reference data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSection {
    pub title: String,
    pub body: String,
}

impl ContextSection {
    /// A section whose body is `value` as pretty-printed JSON.
    pub fn json<T: Serialize + ?Sized>(
        title: impl Into<String>,
        value: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            title: title.into(),
            body: serde_json::to_string_pretty(value)?,
        })
    }

    pub fn render(&self) -> String {
        format!("## {}\n{}", self.title, self.body)
    }
}

/// The ordered sections chosen for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledContext {
    sections: Vec<ContextSection>,
}

impl AssembledContext {
    pub fn push(&mut self, section: ContextSection) {
        self.sections.push(section);
    }

    pub fn sections(&self) -> &[ContextSection] {
        &self.sections
    }

    pub fn titles(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.title.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// All sections joined by a blank line. Empty when nothing fired.
    pub fn render(&self) -> String {
        self.sections
            .iter()
            .map(ContextSection::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Selects knowledge for a classified utterance.
#[derive(Debug, Clone, Default)]
pub struct ContextAssembler;

impl ContextAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assemble(
        &self,
        intents: &IntentSet,
        knowledge: &KnowledgeStore,
        utterance: &str,
    ) -> Result<AssembledContext, serde_json::Error> {
        let mut context = AssembledContext::default();

        if intents.contains_any(&SALES_INTENTS) {
            context.push(ContextSection::json(
                "Track Racer Product Catalog",
                &knowledge.products,
            )?);
        }

        let mentioned: Vec<IntentTag> = WHEELBASE_BRANDS
            .into_iter()
            .filter(|b| intents.contains(*b))
            .collect();
        // only wheelbase brands open the compatibility sections
        if !mentioned.is_empty() || intents.contains(IntentTag::Compatibility) {
            let brands: &[IntentTag] = if mentioned.is_empty() {
                &WHEELBASE_BRANDS
            } else {
                &mentioned
            };

            let wheelbases = pick_brands(&knowledge.wheelbases, brands);
            context.push(ContextSection::json("Wheelbase Compatibility", &wheelbases)?);

            let mut pedals = pick_brands(&knowledge.pedals, brands);
            if intents.contains(IntentTag::Heusinkveld) {
                let key = IntentTag::Heusinkveld.as_str();
                if let Some(entry) = present(&knowledge.pedals, key) {
                    pedals.insert(key.to_string(), entry.clone());
                }
            }
            context.push(ContextSection::json("Pedal Compatibility", &pedals)?);
        }

        if intents.contains_any(&PARTS_INTENTS) {
            context.push(ContextSection::json("Parts Database", &knowledge.parts)?);
        }

        if intents.contains_any(&ISSUE_INTENTS) && truthy(&knowledge.faq_issues) {
            let faq = &knowledge.faq_issues;

            let issues = matching_issues(faq, utterance);
            if !issues.is_empty() {
                context.push(ContextSection::json(
                    "Relevant Known Issues & Solutions",
                    &issues,
                )?);
            }

            if let Some(questions) = present(faq, "frequentQuestions") {
                context.push(ContextSection::json("Frequently Asked Questions", questions)?);
            }

            if intents.contains(IntentTag::AssemblyHelp)
                && let Some(tips) = present(faq, "proTips")
            {
                context.push(ContextSection::json("Pro Tips", tips)?);
            }
        }

        Ok(context)
    }
}

/// Common issues whose serialized text mentions any utterance word of
/// four or more characters.
fn matching_issues<'a>(faq: &'a Value, utterance: &str) -> Vec<&'a Value> {
    let Some(issues) = faq.get("commonIssues").and_then(Value::as_array) else {
        return Vec::new();
    };

    let lowered = utterance.to_lowercase();
    let words: Vec<&str> = lowered
        .split_whitespace()
        .filter(|w| w.chars().count() > 3)
        .collect();
    if words.is_empty() {
        return Vec::new();
    }

    issues
        .iter()
        .filter(|issue| {
            let text = serde_json::to_string(issue)
                .unwrap_or_default()
                .to_lowercase();
            words.iter().any(|w| text.contains(w))
        })
        .take(MAX_COMMON_ISSUES)
        .collect()
}

/// Entries of `doc` for the given brands, skipping absent ones.
fn pick_brands(doc: &Value, brands: &[IntentTag]) -> Map<String, Value> {
    brands
        .iter()
        .filter_map(|b| present(doc, b.as_str()).map(|v| (b.as_str().to_string(), v.clone())))
        .collect()
}

/// `doc[key]` when it exists and is not null, false, zero, or "".
fn present<'a>(doc: &'a Value, key: &str) -> Option<&'a Value> {
    doc.get(key).filter(|v| truthy(v))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
