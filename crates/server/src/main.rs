//! Combat server binary.
//!
//! Composition root that assembles:
//! 1. Configuration (`combat-server.toml`, `.env`, `COMBAT_*` variables)
//! 2. Content (rules, catalogs, profiles, level data) via `ContentFactory`
//! 3. Runtime (combat worker) via `RuntimeBuilder`
//!
//! Client commands are read as JSON lines from stdin and every outbound
//! envelope is written as a JSON line to stdout. Logs go to stderr.
//!
//! ```bash
//! COMBAT_CONTENT_DIR=data cargo run -p combat-server < commands.jsonl
//! ```

mod config;
mod harness;
mod logging;

use std::sync::Arc;

use anyhow::Result;
use combat_content::ContentFactory;
use combat_runtime::{InMemoryProfileStore, OracleManager, Runtime};
use tokio::io::BufReader;

use config::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // 1. Configuration
    let config = ServerConfig::from_env()?;
    let _log_guard = logging::setup_logging(config.log_dir.as_deref())?;
    tracing::info!("Starting combat server");
    tracing::info!("Content directory: {}", config.content_dir.display());

    // 2. Content
    let factory = match &config.maps_dir {
        Some(maps_dir) => ContentFactory::new(&config.content_dir).with_maps_dir(maps_dir),
        None => ContentFactory::new(&config.content_dir),
    };
    let combat = factory.load_config()?;
    let catalog = Arc::new(factory.load_catalog()?);
    let profiles = factory.load_profiles()?;
    tracing::info!("Loaded {} player profiles", profiles.len());
    let oracles = OracleManager::from_catalog(
        catalog,
        Arc::new(factory.collision_cache()),
        combat.clone(),
    );

    // 3. Runtime
    let runtime = Runtime::builder()
        .config(config.runtime_config(combat))
        .oracles(oracles)
        .profile_store(Arc::new(InMemoryProfileStore::with_profiles(profiles)))
        .build()?;
    let handle = runtime.handle();

    let writer = tokio::spawn(harness::write_envelopes(
        handle.subscribe_all(),
        tokio::io::stdout(),
    ));
    tracing::info!("Runtime ready, reading commands from stdin");

    harness::pump_commands(&handle, BufReader::new(tokio::io::stdin())).await?;

    tracing::info!("Input closed, waiting for pending AI turns");
    handle.settled().await?;

    tracing::info!("Shutting down");
    drop(handle);
    runtime.shutdown().await?;
    writer.await??;

    tracing::info!("Combat server shutdown complete");
    Ok(())
}
