//! `pitcrew onboard`: first-time setup.

use pitcrew_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("🏁 Pitcrew - First-Time Setup");
    println!("=============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Point [knowledge] root at your knowledge pack");
        println!("   2. Set OLLAMA_URL if your model server sits behind a tunnel");
        println!("   3. Run: pitcrew doctor\n");
    }

    println!("🎉 Setup complete! Run `pitcrew gateway` to start serving chat.\n");

    Ok(())
}
