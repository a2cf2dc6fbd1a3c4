//! `pitcrew doctor`: diagnose configuration, knowledge and backends.

use pitcrew_config::AppConfig;
use pitcrew_core::Provider;
use pitcrew_knowledge::FsKnowledgeSource;
use pitcrew_providers::OllamaProvider;
use std::time::Duration;

/// How long to wait for each backend's `/api/tags`.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Pitcrew Doctor - System Diagnostics");
    println!("======================================\n");

    let mut issues = 0;

    // Config
    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  ⚠️  No config file, using defaults (run `pitcrew onboard`)");
    }
    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!("\n  ⚠️  Fix the configuration and re-run doctor.");
            return Ok(());
        }
    };

    // Knowledge base
    let source = FsKnowledgeSource::from_config(&config);
    match source.try_load().await {
        Ok(_) => println!(
            "  ✅ Knowledge base loaded from {}",
            config.knowledge.root.display()
        ),
        Err(e) => {
            println!("  ❌ Knowledge base unusable: {e}");
            println!("     Every request would run with an empty knowledge base.");
            issues += 1;
        }
    }

    // Model backends
    let mut reachable = 0;
    for candidate in pitcrew_providers::candidates(&config.backend) {
        let provider = OllamaProvider::new(candidate.name, &candidate.base_url);
        match tokio::time::timeout(PROBE_TIMEOUT, provider.health_check()).await {
            Ok(Ok(true)) => {
                println!("  ✅ Backend {} reachable at {}", candidate.name, candidate.base_url);
                reachable += 1;
            }
            Ok(Ok(false)) => println!(
                "  ⚠️  Backend {} at {} answered with an error",
                candidate.name, candidate.base_url
            ),
            Ok(Err(e)) => println!(
                "  ⚠️  Backend {} at {} unreachable: {e}",
                candidate.name, candidate.base_url
            ),
            Err(_) => println!(
                "  ⚠️  Backend {} at {} timed out",
                candidate.name, candidate.base_url
            ),
        }
    }
    if reachable == 0 {
        println!("  ❌ No model backend reachable; customers will get the fallback reply");
        issues += 1;
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
