//! `pitcrew status`: show the effective configuration.

use pitcrew_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;

    println!("🏁 Pitcrew Status");
    println!("=================");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Environment:  {}", config.environment);
    println!("  Gateway:      {}:{}", config.gateway.host, config.gateway.port);
    println!("  Origins:      {}", config.gateway.allowed_origins.join(", "));
    println!("  Model:        {}", config.backend.model);
    println!("  Temperature:  {}", config.backend.temperature);
    println!("  Timeout:      {}s per backend", config.backend.timeout_secs);
    for (i, candidate) in pitcrew_providers::candidates(&config.backend)
        .iter()
        .enumerate()
    {
        println!("  Backend #{}:   {} ({})", i + 1, candidate.base_url, candidate.name);
    }
    println!("  Knowledge:    {}", config.knowledge.root.display());
    println!("  Support:      {}", config.support.contact_email);
    println!("  Demo orders:  {}", config.orders.len());

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file, running on defaults (`pitcrew onboard` writes one)");
    }

    Ok(())
}
