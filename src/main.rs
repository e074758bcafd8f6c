use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;
use tokio::net::TcpListener;

use saint_sync::config::Config;
use saint_sync::sheets::create_provider;
use saint_sync::storage::Storage;
use saint_sync::sync::SyncService;
use saint_sync::{api, logger};

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    if let Some(flag) = args.next() {
        match flag.as_str() {
            "--generate-config" => {
                let path = match args.next() {
                    Some(path) => PathBuf::from(path),
                    None => Config::get_default_config_path()?,
                };
                Config::generate_default_config(&path)?;
                println!("✅ Wrote default configuration to {}", path.display());
                return Ok(());
            }
            "--help" | "-h" => {
                println!("Usage: saint-sync [--generate-config [PATH]]");
                println!("\nServes the sheet import/export API. Configuration is read from");
                println!("./saint-sync.toml or the saint-sync directory of your config folder.");
                return Ok(());
            }
            other => {
                eprintln!("❌ Error: unknown argument '{}'", other);
                eprintln!("\n💡 Run saint-sync --help for usage");
                std::process::exit(2);
            }
        }
    }

    let config = Config::load()?;
    logger::init(&config.logging)?;

    let storage = Storage::connect(&config.database_url()).await?;
    let provider = create_provider(&config.sheets)?;
    let service = SyncService::new(storage, provider, config.sync.clone());

    let listener = TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_address))?;
    info!("🚀 Listening on {}", listener.local_addr()?);

    axum::serve(listener, api::router(service))
        .await
        .context("HTTP server failed")?;

    Ok(())
}
