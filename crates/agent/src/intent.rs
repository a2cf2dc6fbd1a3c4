//! Keyword intent classification.
//!
//! The classifier lowercases the utterance once and runs an ordered table of
//! [`IntentRule`]s over it. Rules are independent: every rule that matches
//! contributes its tag, in table order. An utterance that matches nothing is
//! classified as [`IntentTag::General`].

use pitcrew_core::intent::{IntentSet, IntentTag};

/// One `(predicate, tag)` entry of the classifier table.
///
/// The predicate receives the already-lowercased utterance.
#[derive(Clone, Copy)]
pub struct IntentRule {
    pub tag: IntentTag,
    pub predicate: fn(&str) -> bool,
}

impl IntentRule {
    pub fn matches(&self, lowered: &str) -> bool {
        (self.predicate)(lowered)
    }
}

impl std::fmt::Debug for IntentRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentRule").field("tag", &self.tag).finish()
    }
}

fn any_of(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

/// The built-in rule table, in evaluation order.
pub fn default_rules() -> Vec<IntentRule> {
    use IntentTag::*;

    vec![
        // Sales
        IntentRule {
            tag: Recommendation,
            predicate: |t| any_of(t, &["recommend", "suggest", "which rig", "what rig"]),
        },
        IntentRule {
            tag: Compatibility,
            predicate: |t| any_of(t, &["compatible", "work with", "fit"]),
        },
        IntentRule {
            tag: Requirements,
            predicate: |t| any_of(t, &["what do i need", "setup", "getting started"]),
        },
        IntentRule {
            tag: Pricing,
            predicate: |t| any_of(t, &["price", "cost", "how much"]),
        },
        IntentRule {
            tag: Bundles,
            predicate: |t| any_of(t, &["bundle", "package", "deal"]),
        },
        // Orders and parts
        IntentRule {
            tag: Tracking,
            predicate: |t| any_of(t, &["tracking", "where is my", "shipment"]),
        },
        IntentRule {
            tag: OrderStatus,
            predicate: |t| t.contains("order") && any_of(t, &["status", "when"]),
        },
        IntentRule {
            tag: MissingPart,
            predicate: |t| any_of(t, &["missing", "not included", "forgot"]),
        },
        IntentRule {
            tag: DamagedPart,
            predicate: |t| any_of(t, &["damaged", "broken", "bent", "scratched"]),
        },
        IntentRule {
            tag: PartsLookup,
            predicate: |t| any_of(t, &["part number", "replacement"]),
        },
        // Issues
        IntentRule {
            tag: Troubleshooting,
            predicate: |t| any_of(t, &["problem", "issue", "trouble", "help"]),
        },
        IntentRule {
            tag: HardwareIssue,
            predicate: |t| any_of(t, &["bolt", "screw", "t-nut", "thread"]),
        },
        IntentRule {
            tag: StabilityIssue,
            predicate: |t| any_of(t, &["flex", "wobble", "loose", "noise", "creak"]),
        },
        IntentRule {
            tag: AlignmentIssue,
            predicate: |t| any_of(t, &["align", "hole", "fit", "tolerance"]),
        },
        IntentRule {
            tag: AssemblyHelp,
            predicate: |t| any_of(t, &["instruction", "manual", "assemble", "assembly", "build"]),
        },
        IntentRule {
            tag: SeatIssue,
            predicate: |t| {
                t.contains("slider") || (t.contains("seat") && any_of(t, &["move", "noise"]))
            },
        },
        IntentRule {
            tag: MonitorIssue,
            predicate: |t| t.contains("monitor") && any_of(t, &["stand", "mount", "gap"]),
        },
        IntentRule {
            tag: SupportIssue,
            predicate: |t| any_of(t, &["customer service", "support", "response", "ticket"]),
        },
        IntentRule {
            tag: ReturnInquiry,
            predicate: |t| any_of(t, &["return", "refund", "exchange"]),
        },
        // Equipment brands
        IntentRule {
            tag: Fanatec,
            predicate: |t| t.contains("fanatec"),
        },
        IntentRule {
            tag: Moza,
            predicate: |t| t.contains("moza"),
        },
        IntentRule {
            tag: Simagic,
            predicate: |t| t.contains("simagic"),
        },
        IntentRule {
            tag: Thrustmaster,
            predicate: |t| t.contains("thrustmaster"),
        },
        IntentRule {
            tag: Logitech,
            predicate: |t| t.contains("logitech"),
        },
        IntentRule {
            tag: Heusinkveld,
            predicate: |t| t.contains("heusinkveld"),
        },
    ]
}

/// Maps an utterance to the set of intent tags it triggers.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    rules: Vec<IntentRule>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::with_rules(default_rules())
    }
}

impl IntentClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<IntentRule>) -> Self {
        Self { rules }
    }

    /// Classify `utterance`. Never returns an empty set.
    pub fn classify(&self, utterance: &str) -> IntentSet {
        let lowered = utterance.to_lowercase();

        let mut intents: IntentSet = self
            .rules
            .iter()
            .filter(|rule| rule.matches(&lowered))
            .map(|rule| rule.tag)
            .collect();

        if intents.is_empty() {
            intents.insert(IntentTag::General);
        }
        intents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use IntentTag::*;

    fn classify(text: &str) -> Vec<IntentTag> {
        IntentClassifier::new().classify(text).as_slice().to_vec()
    }

    fn rule(tag: IntentTag) -> IntentRule {
        default_rules()
            .into_iter()
            .find(|r| r.tag == tag)
            .unwrap()
    }

    #[test]
    fn unmatched_is_general() {
        assert_eq!(classify("hi there"), vec![General]);
        assert_eq!(classify(""), vec![General]);
    }

    #[test]
    fn recommendation_with_brand() {
        assert_eq!(
            classify("Can you recommend a rig for my Fanatec DD2?"),
            vec![Recommendation, Fanatec]
        );
    }

    #[test]
    fn order_status_needs_order_and_status_word() {
        assert_eq!(classify("order TR-12345 status"), vec![OrderStatus]);
        assert!(!classify("I want to place an order").contains(&OrderStatus));
        assert!(!classify("what is the status").contains(&OrderStatus));
        assert!(rule(OrderStatus).matches("when will my order arrive"));
    }

    #[test]
    fn seat_rule_slider_or_seat_with_motion() {
        let r = rule(SeatIssue);
        assert!(r.matches("the slider sticks"));
        assert!(r.matches("my seat makes a noise"));
        assert!(r.matches("seat won't move"));
        assert!(!r.matches("which seat should i buy"));
    }

    #[test]
    fn monitor_rule_requires_fixture_word() {
        let r = rule(MonitorIssue);
        assert!(r.matches("monitor stand wobbles"));
        assert!(r.matches("gap between monitor panels"));
        assert!(!r.matches("new monitor arrived"));
    }

    #[test]
    fn fit_triggers_compatibility_and_alignment() {
        let tags = classify("Will it fit?");
        assert_eq!(tags, vec![Compatibility, AlignmentIssue]);
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        assert_eq!(classify("HEUSINKVELD sprints"), vec![Heusinkveld]);
        // "building" contains "build"
        assert!(classify("building the frame").contains(&AssemblyHelp));
    }

    #[test]
    fn tags_follow_rule_order_without_duplicates() {
        let tags = classify("my bolt is missing and the frame has a loose fit, help");
        let order: Vec<usize> = tags
            .iter()
            .map(|t| default_rules().iter().position(|r| r.tag == *t).unwrap())
            .collect();
        let mut sorted = order.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(order, sorted);
        assert!(!tags.contains(&General));
    }

    #[test]
    fn every_rule_tag_is_distinct_except_general() {
        let rules = default_rules();
        assert_eq!(rules.len(), IntentTag::ALL.len() - 1);
        assert!(rules.iter().all(|r| r.tag != General));
    }

    #[test]
    fn custom_rules_replace_table() {
        let classifier = IntentClassifier::with_rules(vec![IntentRule {
            tag: Pricing,
            predicate: |t| t.contains("€"),
        }]);
        assert_eq!(classifier.classify("is it 500€").as_slice(), &[Pricing]);
        assert_eq!(classifier.classify("price?").as_slice(), &[General]);
    }
}
