//! Model dispatch: system prompt, backend call, reply cleanup.
//!
//! The dispatcher never fails. If the provider (normally the failover chain
//! over every backend candidate) returns an error, the customer gets a fixed
//! apology that points at the support mailbox.

use pitcrew_core::message::Message;
use pitcrew_core::provider::{Provider, ProviderRequest};
use regex_lite::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{debug, warn};

static THINK_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("Invalid think-span regex"));

/// Mailbox quoted in the apology when no other is configured.
pub const DEFAULT_SUPPORT_CONTACT: &str = "support@trackracer.com";

const PERSONA: &str = "You are the Track Racer AI Assistant - a helpful, knowledgeable customer service agent for Track Racer, a premium sim racing rig manufacturer.

Your capabilities:
1. **Sales & Recommendations**: Help customers choose the right rig based on their wheelbase, pedals, and budget
2. **Compatibility Checks**: Verify if equipment will work with our rigs
3. **Order Support**: Check order status and tracking
4. **Parts Support**: Help identify missing or damaged parts, look up part numbers

Personality:
- Enthusiastic about sim racing
- Knowledgeable but not condescending
- Efficient and helpful
- Always provide specific product recommendations when possible

When recommending products:
- Consider the customer's wheelbase torque level
- Match rig strength to their equipment
- Suggest bundles when they offer value
- Mention compatibility notes

For support issues:
- Ask for order number if not provided
- For missing parts, identify the specific part number needed
- For damaged parts, request photos and describe what information you need
- Be empathetic and solution-focused

";

/// The system instruction, with the knowledge block appended when `context`
/// is non-empty.
pub fn build_system_prompt(context: &str) -> String {
    if context.is_empty() {
        PERSONA.to_string()
    } else {
        format!("{PERSONA}\n## Knowledge Base Context\n{context}")
    }
}

/// Remove every `<think>...</think>` span, then trim.
pub fn strip_thinking(text: &str) -> String {
    THINK_SPAN.replace_all(text, "").trim().to_string()
}

/// The reply sent when no backend answered.
pub fn fallback_reply(contact: &str) -> String {
    format!(
        "I'm having trouble connecting to my AI backend right now. Please try again in a moment, or contact support directly at {contact}"
    )
}

/// Sends a conversation, prefixed with the system prompt, to the model.
pub struct ModelDispatcher {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    fallback: String,
}

impl ModelDispatcher {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            fallback: fallback_reply(DEFAULT_SUPPORT_CONTACT),
        }
    }

    /// Quote `contact` in the apology instead of the default mailbox.
    pub fn with_support_contact(mut self, contact: &str) -> Self {
        self.fallback = fallback_reply(contact);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// The cleaned model reply, or the apology if the backend is unreachable.
    pub async fn dispatch(&self, conversation: &[Message], context: &str) -> String {
        let mut messages = Vec::with_capacity(conversation.len() + 1);
        messages.push(Message::system(build_system_prompt(context)));
        messages.extend_from_slice(conversation);

        let request = ProviderRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
        };

        match self.provider.complete(request).await {
            Ok(response) => {
                debug!(
                    provider = %response.provider,
                    chars = response.message.content.len(),
                    "Model replied"
                );
                strip_thinking(&response.message.content)
            }
            Err(e) => {
                warn!(error = %e, "No model backend available, sending fallback reply");
                self.fallback.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pitcrew_core::error::ProviderError;
    use pitcrew_core::message::Role;
    use pitcrew_core::provider::ProviderResponse;
    use std::sync::Mutex;

    /// Replies with a fixed text and records the last request.
    struct ScriptedProvider {
        reply: Result<String, ProviderError>,
        last: Mutex<Option<ProviderRequest>>,
    }

    impl ScriptedProvider {
        fn ok(text: &str) -> Self {
            Self {
                reply: Ok(text.into()),
                last: Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(ProviderError::Network("connection refused".into())),
                last: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            request: ProviderRequest,
        ) -> std::result::Result<ProviderResponse, ProviderError> {
            *self.last.lock().unwrap() = Some(request);
            self.reply.clone().map(|text| ProviderResponse {
                message: Message::assistant(text),
                model: "qwen3:8b".into(),
                provider: "scripted".into(),
            })
        }
    }

    #[test]
    fn prompt_without_context_has_no_knowledge_block() {
        let prompt = build_system_prompt("");
        assert!(prompt.starts_with("You are the Track Racer AI Assistant"));
        assert!(!prompt.contains("## Knowledge Base Context"));
    }

    #[test]
    fn prompt_with_context_appends_block() {
        let prompt = build_system_prompt("## Parts Database\n{}");
        assert!(prompt.ends_with("solution-focused\n\n\n## Knowledge Base Context\n## Parts Database\n{}"));
    }

    #[test]
    fn strips_multiline_think_spans() {
        let raw = "<think>\nthe user wants\na rig\n</think>\n\nTry the TR120. <think>x</think>It fits.";
        assert_eq!(strip_thinking(raw), "Try the TR120. It fits.");
    }

    #[test]
    fn unterminated_think_is_left_alone() {
        assert_eq!(strip_thinking("  <think>half  "), "<think>half");
    }

    #[test]
    fn default_fallback_text() {
        assert_eq!(
            fallback_reply(DEFAULT_SUPPORT_CONTACT),
            "I'm having trouble connecting to my AI backend right now. Please try again in a moment, or contact support directly at support@trackracer.com"
        );
    }

    #[tokio::test]
    async fn prepends_system_prompt_and_cleans_reply() {
        let provider = Arc::new(ScriptedProvider::ok("<think>hmm</think>  Shipped yesterday. "));
        let dispatcher = ModelDispatcher::new(provider.clone(), "qwen3:8b", 0.7);

        let reply = dispatcher
            .dispatch(&[Message::user("where is TR-12345?")], "## Order Information Found\n{}")
            .await;
        assert_eq!(reply, "Shipped yesterday.");

        let request = provider.last.lock().unwrap().clone().unwrap();
        assert_eq!(request.model, "qwen3:8b");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert!(request.messages[0].content.contains("## Order Information Found"));
        assert_eq!(request.messages[1].content, "where is TR-12345?");
    }

    #[tokio::test]
    async fn backend_failure_becomes_apology() {
        let dispatcher = ModelDispatcher::new(Arc::new(ScriptedProvider::failing()), "qwen3:8b", 0.7)
            .with_support_contact("help@example.com");

        let reply = dispatcher.dispatch(&[Message::user("hi")], "").await;
        assert!(reply.starts_with("I'm having trouble connecting"));
        assert!(reply.ends_with("help@example.com"));
    }
}
