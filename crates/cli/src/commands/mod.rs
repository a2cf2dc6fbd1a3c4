pub mod agent;
pub mod doctor;
pub mod gateway;
pub mod inspect;
pub mod onboard;
pub mod status;

use pitcrew_agent::SupportAgent;
use pitcrew_config::AppConfig;
use pitcrew_knowledge::FsKnowledgeSource;
use std::sync::Arc;

pub(crate) fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

/// The same pipeline the gateway serves, built from `config`.
pub(crate) fn build_agent(config: &AppConfig) -> SupportAgent {
    let knowledge = Arc::new(FsKnowledgeSource::from_config(config));
    let provider = Arc::new(pitcrew_providers::build_chain(&config.backend));
    SupportAgent::from_config(config, knowledge, provider)
}
