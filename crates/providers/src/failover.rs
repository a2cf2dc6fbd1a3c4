//! Failover across model endpoints.
//!
//! A [`FailoverChain`] holds one link per candidate endpoint. Each request
//! walks the links in order and gives every endpoint its own deadline; the
//! first endpoint that answers wins and later links are never contacted.

use async_trait::async_trait;
use pitcrew_core::error::ProviderError;
use pitcrew_core::provider::{Provider, ProviderRequest, ProviderResponse};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Deadline for one endpoint when the config does not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// One candidate endpoint and the transport that talks to it.
struct Link {
    endpoint: String,
    provider: Arc<dyn Provider>,
    timeout: Duration,
}

impl Link {
    async fn attempt(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        tokio::time::timeout(self.timeout, self.provider.complete(request))
            .await
            .unwrap_or_else(|_| {
                Err(ProviderError::Timeout(format!(
                    "{} gave no answer within {}s",
                    self.endpoint,
                    self.timeout.as_secs()
                )))
            })
    }
}

/// Ordered model endpoints, tried one at a time.
pub struct FailoverChain {
    name: String,
    links: Vec<Link>,
}

impl FailoverChain {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            links: Vec::new(),
        }
    }

    /// Append `endpoint`, served by `provider`, with its own deadline.
    pub fn then(
        mut self,
        endpoint: impl Into<String>,
        provider: Arc<dyn Provider>,
        timeout: Duration,
    ) -> Self {
        self.links.push(Link {
            endpoint: endpoint.into(),
            provider,
            timeout,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// `(candidate name, endpoint)` pairs in attempt order.
    pub fn endpoints(&self) -> impl Iterator<Item = (&str, &str)> {
        self.links
            .iter()
            .map(|l| (l.provider.name(), l.endpoint.as_str()))
    }
}

#[async_trait]
impl Provider for FailoverChain {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut tried = Vec::with_capacity(self.links.len());

        for link in &self.links {
            let candidate = link.provider.name();
            info!(candidate, endpoint = %link.endpoint, "Trying model backend");

            match link.attempt(request.clone()).await {
                Ok(response) => {
                    info!(candidate, endpoint = %link.endpoint, "Model backend answered");
                    return Ok(response);
                }
                Err(e) => {
                    warn!(candidate, endpoint = %link.endpoint, error = %e, "Model backend not available");
                    tried.push(link.endpoint.as_str());
                }
            }
        }

        if tried.is_empty() {
            return Err(ProviderError::NotConfigured(
                "no model endpoints configured".into(),
            ));
        }
        Err(ProviderError::Unavailable(tried.join(", ")))
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        for link in &self.links {
            if let Ok(true) = link.provider.health_check().await {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitcrew_core::message::Message;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Copy)]
    enum Reaction {
        Answer,
        Refuse,
        Stall,
    }

    /// An in-process stand-in for one Ollama address.
    struct Endpoint {
        name: &'static str,
        reaction: Reaction,
        hits: AtomicUsize,
    }

    impl Endpoint {
        fn new(name: &'static str, reaction: Reaction) -> Arc<Self> {
            Arc::new(Self {
                name,
                reaction,
                hits: AtomicUsize::new(0),
            })
        }

        fn hits(&self) -> usize {
            self.hits.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Provider for Endpoint {
        fn name(&self) -> &str {
            self.name
        }

        async fn complete(
            &self,
            request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            self.hits.fetch_add(1, Ordering::SeqCst);
            match self.reaction {
                Reaction::Answer => Ok(ProviderResponse {
                    message: Message::assistant(format!("answered by {}", self.name)),
                    model: request.model,
                    provider: self.name.into(),
                }),
                Reaction::Refuse => Err(ProviderError::Network("connection refused".into())),
                Reaction::Stall => std::future::pending().await,
            }
        }

        async fn health_check(&self) -> Result<bool, ProviderError> {
            Ok(matches!(self.reaction, Reaction::Answer))
        }
    }

    fn request() -> ProviderRequest {
        ProviderRequest {
            model: "qwen3:8b".into(),
            messages: vec![Message::user("will the TR120 fit a DD2?")],
            temperature: 0.7,
        }
    }

    fn chain(tunnel: &Arc<Endpoint>, lan: &Arc<Endpoint>, local: &Arc<Endpoint>) -> FailoverChain {
        FailoverChain::new("ollama")
            .then("https://gpu.example.com", tunnel.clone(), DEFAULT_TIMEOUT)
            .then("http://192.168.50.1:11434", lan.clone(), DEFAULT_TIMEOUT)
            .then("http://localhost:11434", local.clone(), DEFAULT_TIMEOUT)
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_tunnel_hands_over_to_lan() {
        let tunnel = Endpoint::new("tunnel", Reaction::Stall);
        let lan = Endpoint::new("lan", Reaction::Answer);
        let local = Endpoint::new("localhost", Reaction::Answer);

        let started = tokio::time::Instant::now();
        let reply = chain(&tunnel, &lan, &local).complete(request()).await.unwrap();

        assert_eq!(reply.message.content, "answered by lan");
        assert!(started.elapsed() >= DEFAULT_TIMEOUT);
        assert!(started.elapsed() < DEFAULT_TIMEOUT * 2);
        assert_eq!((tunnel.hits(), lan.hits(), local.hits()), (1, 1, 0));
    }

    #[tokio::test]
    async fn healthy_tunnel_is_the_only_one_contacted() {
        let tunnel = Endpoint::new("tunnel", Reaction::Answer);
        let lan = Endpoint::new("lan", Reaction::Answer);
        let local = Endpoint::new("localhost", Reaction::Answer);

        let reply = chain(&tunnel, &lan, &local).complete(request()).await.unwrap();

        assert_eq!(reply.provider, "tunnel");
        assert_eq!((tunnel.hits(), lan.hits(), local.hits()), (1, 0, 0));
    }

    #[tokio::test]
    async fn refusals_fall_through_to_localhost() {
        let tunnel = Endpoint::new("tunnel", Reaction::Refuse);
        let lan = Endpoint::new("lan", Reaction::Refuse);
        let local = Endpoint::new("localhost", Reaction::Answer);

        let reply = chain(&tunnel, &lan, &local).complete(request()).await.unwrap();

        assert_eq!(reply.message.content, "answered by localhost");
        assert_eq!((tunnel.hits(), lan.hits(), local.hits()), (1, 1, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_answering_names_every_endpoint() {
        let tunnel = Endpoint::new("tunnel", Reaction::Stall);
        let lan = Endpoint::new("lan", Reaction::Refuse);
        let local = Endpoint::new("localhost", Reaction::Refuse);

        let err = chain(&tunnel, &lan, &local)
            .complete(request())
            .await
            .unwrap_err();

        match err {
            ProviderError::Unavailable(tried) => assert_eq!(
                tried,
                "https://gpu.example.com, http://192.168.50.1:11434, http://localhost:11434"
            ),
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn chain_without_endpoints_is_not_configured() {
        let err = FailoverChain::new("ollama")
            .complete(request())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn healthy_when_any_endpoint_is() {
        let down = Endpoint::new("lan", Reaction::Refuse);
        let up = Endpoint::new("localhost", Reaction::Answer);

        let chain = FailoverChain::new("ollama")
            .then("http://192.168.50.1:11434", down.clone(), DEFAULT_TIMEOUT)
            .then("http://localhost:11434", up, DEFAULT_TIMEOUT);
        assert!(chain.health_check().await.unwrap());

        let dead = FailoverChain::new("ollama").then("http://192.168.50.1:11434", down, DEFAULT_TIMEOUT);
        assert!(!dead.health_check().await.unwrap());
    }
}
