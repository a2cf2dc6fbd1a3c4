//! The Pitcrew support pipeline.
//!
//! One request runs through five stages:
//!
//! 1. **Load** the knowledge base (via [`pitcrew_core::KnowledgeSource`])
//! 2. **Classify** the last user message into intent tags
//! 3. **Resolve** a quoted order number, when the customer asks about an order
//! 4. **Assemble** the matching knowledge slices into a context block
//! 5. **Dispatch** the conversation to the model behind a fixed system prompt
//!
//! [`SupportAgent`] wires the stages together; each stage is usable alone.

pub mod context;
pub mod dispatcher;
pub mod intent;
pub mod orders;
pub mod support;

pub use context::{AssembledContext, ContextAssembler, ContextSection, MAX_COMMON_ISSUES};
pub use dispatcher::{ModelDispatcher, build_system_prompt, fallback_reply, strip_thinking};
pub use intent::{IntentClassifier, IntentRule, default_rules};
pub use orders::{DemoOrderBook, OrderResolver, extract_order_token, placeholder_order};
pub use support::{ORDER_SECTION_TITLE, PreparedTurn, SupportAgent, SupportError, SupportReply};
