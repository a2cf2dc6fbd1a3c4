//! Intent tags: the fixed vocabulary a customer utterance is classified into.

use serde::{Deserialize, Serialize};

/// Broad grouping of intent tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentCategory {
    Sales,
    Support,
    Issue,
    Brand,
    General,
}

/// One label from the fixed intent vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentTag {
    // Sales
    Recommendation,
    Compatibility,
    Requirements,
    Pricing,
    Bundles,
    // Support
    Tracking,
    OrderStatus,
    MissingPart,
    DamagedPart,
    PartsLookup,
    // Issues
    Troubleshooting,
    HardwareIssue,
    StabilityIssue,
    AlignmentIssue,
    AssemblyHelp,
    SeatIssue,
    MonitorIssue,
    SupportIssue,
    ReturnInquiry,
    // Equipment brands
    Fanatec,
    Moza,
    Simagic,
    Thrustmaster,
    Logitech,
    Heusinkveld,
    /// Nothing else matched.
    General,
}

impl IntentTag {
    /// Every tag, in classification order.
    pub const ALL: [IntentTag; 26] = [
        IntentTag::Recommendation,
        IntentTag::Compatibility,
        IntentTag::Requirements,
        IntentTag::Pricing,
        IntentTag::Bundles,
        IntentTag::Tracking,
        IntentTag::OrderStatus,
        IntentTag::MissingPart,
        IntentTag::DamagedPart,
        IntentTag::PartsLookup,
        IntentTag::Troubleshooting,
        IntentTag::HardwareIssue,
        IntentTag::StabilityIssue,
        IntentTag::AlignmentIssue,
        IntentTag::AssemblyHelp,
        IntentTag::SeatIssue,
        IntentTag::MonitorIssue,
        IntentTag::SupportIssue,
        IntentTag::ReturnInquiry,
        IntentTag::Fanatec,
        IntentTag::Moza,
        IntentTag::Simagic,
        IntentTag::Thrustmaster,
        IntentTag::Logitech,
        IntentTag::Heusinkveld,
        IntentTag::General,
    ];

    /// Wire name, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentTag::Recommendation => "recommendation",
            IntentTag::Compatibility => "compatibility",
            IntentTag::Requirements => "requirements",
            IntentTag::Pricing => "pricing",
            IntentTag::Bundles => "bundles",
            IntentTag::Tracking => "tracking",
            IntentTag::OrderStatus => "order_status",
            IntentTag::MissingPart => "missing_part",
            IntentTag::DamagedPart => "damaged_part",
            IntentTag::PartsLookup => "parts_lookup",
            IntentTag::Troubleshooting => "troubleshooting",
            IntentTag::HardwareIssue => "hardware_issue",
            IntentTag::StabilityIssue => "stability_issue",
            IntentTag::AlignmentIssue => "alignment_issue",
            IntentTag::AssemblyHelp => "assembly_help",
            IntentTag::SeatIssue => "seat_issue",
            IntentTag::MonitorIssue => "monitor_issue",
            IntentTag::SupportIssue => "support_issue",
            IntentTag::ReturnInquiry => "return_inquiry",
            IntentTag::Fanatec => "fanatec",
            IntentTag::Moza => "moza",
            IntentTag::Simagic => "simagic",
            IntentTag::Thrustmaster => "thrustmaster",
            IntentTag::Logitech => "logitech",
            IntentTag::Heusinkveld => "heusinkveld",
            IntentTag::General => "general",
        }
    }

    pub fn category(&self) -> IntentCategory {
        use IntentTag::*;
        match self {
            Recommendation | Compatibility | Requirements | Pricing | Bundles => {
                IntentCategory::Sales
            }
            Tracking | OrderStatus | MissingPart | DamagedPart | PartsLookup => {
                IntentCategory::Support
            }
            Troubleshooting | HardwareIssue | StabilityIssue | AlignmentIssue | AssemblyHelp
            | SeatIssue | MonitorIssue | SupportIssue | ReturnInquiry => IntentCategory::Issue,
            Fanatec | Moza | Simagic | Thrustmaster | Logitech | Heusinkveld => {
                IntentCategory::Brand
            }
            General => IntentCategory::General,
        }
    }

    pub fn is_brand(&self) -> bool {
        self.category() == IntentCategory::Brand
    }
}

impl std::fmt::Display for IntentTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered, duplicate-free set of intent tags.
///
/// Discovery order is preserved. Serializes as a plain JSON list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentSet(Vec<IntentTag>);

impl IntentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag. Returns `false` if it was already present.
    pub fn insert(&mut self, tag: IntentTag) -> bool {
        if self.0.contains(&tag) {
            return false;
        }
        self.0.push(tag);
        true
    }

    pub fn contains(&self, tag: IntentTag) -> bool {
        self.0.contains(&tag)
    }

    pub fn contains_any(&self, tags: &[IntentTag]) -> bool {
        tags.iter().any(|t| self.contains(*t))
    }

    pub fn iter(&self) -> impl Iterator<Item = &IntentTag> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[IntentTag] {
        &self.0
    }

    /// Wire names in discovery order.
    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(IntentTag::as_str).collect()
    }
}

impl FromIterator<IntentTag> for IntentSet {
    fn from_iter<I: IntoIterator<Item = IntentTag>>(iter: I) -> Self {
        let mut set = IntentSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}
