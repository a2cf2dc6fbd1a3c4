//! `pitcrew gateway`: start the HTTP chat server.

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config()?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("🏁 Pitcrew Gateway");
    println!("   Listening:   {}:{}", config.gateway.host, config.gateway.port);
    println!("   Environment: {}", config.environment);
    println!("   Knowledge:   {}", config.knowledge.root.display());

    pitcrew_gateway::start(config).await?;

    Ok(())
}
