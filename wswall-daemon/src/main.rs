use anyhow::Result;

use wswall_common::{DesktopProbe, StateStore};
use wswall_config::{Config, ConfigStore};

mod backend;
mod controller;
mod scheduler;

use scheduler::Scheduler;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    log::info!("Starting wswall daemon...");

    let config_path = Config::default_path().map_err(|e| {
        log::error!("Configuration error: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    // A missing or unusable configuration is fatal: the daemon must not
    // run without knowing its workspaces.
    let config = ConfigStore::open(config_path).map_err(|e| {
        log::error!("Configuration error: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    config.config().workspace_count().map_err(|e| {
        log::error!("Configuration error: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    let session = config.config().session_settings();
    log::info!(
        "Session: desktop={}, protocol={:?}, blanking={}",
        session.desktop,
        session.session,
        session.blanking_formatted
    );

    let backend = backend::select(&session);
    backend.configure_screen_blanking(&session);

    let state = StateStore::new(StateStore::default_path());

    let scheduler = Scheduler::new(
        config,
        state,
        Box::new(DesktopProbe::new()),
        backend,
        session,
    );
    scheduler.run().await;

    Ok(())
}
