//! Candidate endpoints, in priority order: tunnel > LAN > localhost.

use pitcrew_config::BackendConfig;
use std::sync::Arc;
use std::time::Duration;

use crate::failover::FailoverChain;
use crate::ollama::OllamaProvider;

/// One candidate address of the model service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: &'static str,
    pub base_url: String,
}

/// The candidates for `config`, in the order they will be attempted.
///
/// The tunnel entry only appears when a tunnel URL is configured.
pub fn candidates(config: &BackendConfig) -> Vec<Candidate> {
    let mut out = Vec::with_capacity(3);
    if let Some(tunnel) = config.tunnel_url.as_deref().filter(|u| !u.trim().is_empty()) {
        out.push(Candidate {
            name: "tunnel",
            base_url: tunnel.to_string(),
        });
    }
    out.push(Candidate {
        name: "lan",
        base_url: config.lan_url.clone(),
    });
    out.push(Candidate {
        name: "localhost",
        base_url: config.local_url.clone(),
    });
    out
}

/// Build the failover chain over all candidates, sharing one HTTP client.
pub fn build_chain(config: &BackendConfig) -> FailoverChain {
    let timeout = Duration::from_secs(config.timeout_secs);
    let client = reqwest::Client::new();

    candidates(config)
        .into_iter()
        .fold(FailoverChain::new("ollama"), |chain, c| {
            let provider = OllamaProvider::with_client(c.name, &c.base_url, client.clone());
            chain.then(c.base_url, Arc::new(provider), timeout)
        })
}
