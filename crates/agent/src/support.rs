//! The per-request support pipeline.
//!
//! ```text
//! validate → load knowledge → classify → resolve order → assemble → dispatch
//! ```
//!
//! Validation happens before any collaborator is touched: a rejected
//! conversation never reads the knowledge base or calls the model.

use pitcrew_config::AppConfig;
use pitcrew_core::error::Error;
use pitcrew_core::intent::{IntentSet, IntentTag};
use pitcrew_core::knowledge::KnowledgeSource;
use pitcrew_core::message::{Message, Role};
use pitcrew_core::order::OrderRecord;
use pitcrew_core::provider::Provider;
use std::sync::Arc;
use tracing::{debug, info};

use crate::context::{AssembledContext, ContextAssembler, ContextSection};
use crate::dispatcher::ModelDispatcher;
use crate::intent::IntentClassifier;
use crate::orders::{DemoOrderBook, OrderResolver};

/// Title of the section carrying a resolved order.
pub const ORDER_SECTION_TITLE: &str = "Order Information Found";

#[derive(Debug, thiserror::Error)]
pub enum SupportError {
    #[error("Messages array required")]
    EmptyConversation,

    #[error("Last message must be from user")]
    LastTurnNotUser,

    #[error("Internal error: {0}")]
    Internal(#[from] Error),
}

impl SupportError {
    /// True for errors caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SupportError::EmptyConversation | SupportError::LastTurnNotUser
        )
    }
}

/// Everything decided about a turn before the model is called.
#[derive(Debug, Clone)]
pub struct PreparedTurn {
    pub intents: IntentSet,
    pub order: Option<OrderRecord>,
    pub context: AssembledContext,
}

/// The answer to one chat request.
#[derive(Debug, Clone)]
pub struct SupportReply {
    pub response: String,
    pub intents: IntentSet,
    /// Length of the assembled context, in characters
    pub context_length: usize,
}

pub struct SupportAgent {
    knowledge: Arc<dyn KnowledgeSource>,
    classifier: IntentClassifier,
    assembler: ContextAssembler,
    orders: OrderResolver,
    dispatcher: ModelDispatcher,
}

impl SupportAgent {
    pub fn new(
        knowledge: Arc<dyn KnowledgeSource>,
        orders: OrderResolver,
        dispatcher: ModelDispatcher,
    ) -> Self {
        Self {
            knowledge,
            classifier: IntentClassifier::default(),
            assembler: ContextAssembler::default(),
            orders,
            dispatcher,
        }
    }

    /// Wire the pipeline from configuration: demo order book, model settings,
    /// and the support mailbox quoted in the fallback reply.
    pub fn from_config(
        config: &AppConfig,
        knowledge: Arc<dyn KnowledgeSource>,
        provider: Arc<dyn Provider>,
    ) -> Self {
        let orders = OrderResolver::new(Arc::new(DemoOrderBook::from_config(&config.orders)));
        let dispatcher = ModelDispatcher::new(
            provider,
            config.backend.model.clone(),
            config.backend.temperature,
        )
        .with_support_contact(&config.support.contact_email);

        Self::new(knowledge, orders, dispatcher)
    }

    pub fn dispatcher(&self) -> &ModelDispatcher {
        &self.dispatcher
    }

    /// Validate and run every step short of the model call.
    pub async fn prepare(&self, conversation: &[Message]) -> Result<PreparedTurn, SupportError> {
        let utterance = validate(conversation)?;

        let knowledge = self.knowledge.load().await;
        let intents = self.classifier.classify(utterance);
        info!(intents = ?intents.names(), "Detected intents");

        let order = if intents.contains_any(&[IntentTag::Tracking, IntentTag::OrderStatus]) {
            self.orders.resolve(utterance).await
        } else {
            None
        };

        let mut context = self
            .assembler
            .assemble(&intents, &knowledge, utterance)
            .map_err(Error::from)?;

        if let Some(order) = &order {
            context.push(ContextSection::json(ORDER_SECTION_TITLE, order).map_err(Error::from)?);
        }

        debug!(sections = ?context.titles(), "Context assembled");

        Ok(PreparedTurn {
            intents,
            order,
            context,
        })
    }

    /// Handle one chat request end to end.
    pub async fn handle(&self, conversation: &[Message]) -> Result<SupportReply, SupportError> {
        let turn = self.prepare(conversation).await?;
        let context = turn.context.render();

        let response = self.dispatcher.dispatch(conversation, &context).await;

        Ok(SupportReply {
            response,
            intents: turn.intents,
            context_length: context.chars().count(),
        })
    }
}

/// The final user utterance, if the conversation is acceptable.
fn validate(conversation: &[Message]) -> Result<&str, SupportError> {
    let last = conversation
        .last()
        .ok_or(SupportError::EmptyConversation)?;
    if last.role != Role::User {
        return Err(SupportError::LastTurnNotUser);
    }
    Ok(&last.content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pitcrew_core::error::ProviderError;
    use pitcrew_core::knowledge::KnowledgeStore;
    use pitcrew_core::order::OrderStatus;
    use pitcrew_core::provider::{ProviderRequest, ProviderResponse};
    use pitcrew_knowledge::InMemoryKnowledge;
    use serde_json::json;
    use std::sync::Mutex;

    /// Counts loads; hands out a fixed store.
    struct CountingKnowledge {
        store: KnowledgeStore,
        loads: Mutex<usize>,
    }

    #[async_trait]
    impl KnowledgeSource for CountingKnowledge {
        async fn load(&self) -> KnowledgeStore {
            *self.loads.lock().unwrap() += 1;
            self.store.clone()
        }
    }

    /// Echoes the system prompt length and counts calls.
    struct CountingProvider {
        reply: String,
        calls: Mutex<usize>,
        last_system: Mutex<String>,
    }

    impl CountingProvider {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.into(),
                calls: Mutex::new(0),
                last_system: Mutex::new(String::new()),
            }
        }
    }

    #[async_trait]
    impl Provider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        async fn complete(
            &self,
            request: ProviderRequest,
        ) -> std::result::Result<ProviderResponse, ProviderError> {
            *self.calls.lock().unwrap() += 1;
            *self.last_system.lock().unwrap() = request.messages[0].content.clone();
            Ok(ProviderResponse {
                message: Message::assistant(self.reply.clone()),
                model: request.model,
                provider: "counting".into(),
            })
        }
    }

    fn store() -> KnowledgeStore {
        KnowledgeStore {
            products: json!({ "rigs": ["TR120", "TR8 Pro"] }),
            ..KnowledgeStore::empty()
        }
    }

    fn agent(
        knowledge: Arc<dyn KnowledgeSource>,
        provider: Arc<dyn Provider>,
    ) -> SupportAgent {
        SupportAgent::from_config(&AppConfig::default(), knowledge, provider)
    }

    #[tokio::test]
    async fn empty_conversation_rejected() {
        let provider = Arc::new(CountingProvider::new("unused"));
        let agent = agent(Arc::new(InMemoryKnowledge::default()), provider.clone());

        let err = agent.handle(&[]).await.unwrap_err();
        assert!(matches!(err, SupportError::EmptyConversation));
        assert_eq!(err.to_string(), "Messages array required");
        assert!(err.is_client_error());
        assert_eq!(*provider.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn assistant_last_rejected_before_any_work() {
        let knowledge = Arc::new(CountingKnowledge {
            store: store(),
            loads: Mutex::new(0),
        });
        let provider = Arc::new(CountingProvider::new("unused"));
        let agent = agent(knowledge.clone(), provider.clone());

        let conversation = [Message::user("hi"), Message::assistant("hello!")];
        let err = agent.handle(&conversation).await.unwrap_err();

        assert!(matches!(err, SupportError::LastTurnNotUser));
        assert_eq!(err.to_string(), "Last message must be from user");
        assert_eq!(*knowledge.loads.lock().unwrap(), 0);
        assert_eq!(*provider.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn general_question_has_empty_context() {
        let provider = Arc::new(CountingProvider::new("<think>plan</think>Hello!"));
        let agent = agent(Arc::new(InMemoryKnowledge::new(store())), provider.clone());

        let reply = agent.handle(&[Message::user("hi there")]).await.unwrap();
        assert_eq!(reply.response, "Hello!");
        assert_eq!(reply.intents.names(), vec!["general"]);
        assert_eq!(reply.context_length, 0);
        assert!(
            !provider
                .last_system
                .lock()
                .unwrap()
                .contains("Knowledge Base Context")
        );
    }

    #[tokio::test]
    async fn order_status_appends_order_section() {
        let provider = Arc::new(CountingProvider::new("It shipped."));
        let agent = agent(Arc::new(InMemoryKnowledge::new(store())), provider.clone());

        let turn = agent
            .prepare(&[Message::user("order TR-12345 status")])
            .await
            .unwrap();
        assert_eq!(turn.intents.names(), vec!["order_status"]);
        let order = turn.order.unwrap();
        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(turn.context.titles(), vec![ORDER_SECTION_TITLE]);

        let rendered = turn.context.render();
        assert!(rendered.starts_with("## Order Information Found\n{"));
        assert!(rendered.contains("\"tracking\": \"FX123456789US\""));
    }

    #[tokio::test]
    async fn order_section_follows_knowledge_sections() {
        let provider = Arc::new(CountingProvider::new("ok"));
        let agent = agent(Arc::new(InMemoryKnowledge::new(store())), provider.clone());

        let reply = agent
            .handle(&[Message::user("how much is shipping, where is my order #99999")])
            .await
            .unwrap();
        assert_eq!(reply.intents.names(), vec!["pricing", "tracking"]);

        let system = provider.last_system.lock().unwrap().clone();
        let catalog = system.find("## Track Racer Product Catalog").unwrap();
        let order = system.find("## Order Information Found").unwrap();
        assert!(catalog < order);
        assert!(system.contains("TR-99999"));
        assert!(reply.context_length > 0);
    }

    #[tokio::test]
    async fn tracking_without_number_has_no_order() {
        let agent = agent(
            Arc::new(InMemoryKnowledge::default()),
            Arc::new(CountingProvider::new("Which order?")),
        );
        let turn = agent
            .prepare(&[Message::user("where is my rig")])
            .await
            .unwrap();
        assert!(turn.intents.contains(IntentTag::Tracking));
        assert!(turn.order.is_none());
        assert!(turn.context.is_empty());
    }

    #[tokio::test]
    async fn earlier_turns_reach_the_model() {
        let provider = Arc::new(CountingProvider::new("Sure."));
        let agent = agent(Arc::new(InMemoryKnowledge::default()), provider.clone());
        let conversation = [
            Message::user("I have a Moza R9"),
            Message::assistant("Great wheelbase!"),
            Message::user("thanks"),
        ];

        let reply = agent.handle(&conversation).await.unwrap();
        assert_eq!(reply.response, "Sure.");
        assert_eq!(reply.intents.names(), vec!["general"]);
        assert_eq!(*provider.calls.lock().unwrap(), 1);
    }
}
