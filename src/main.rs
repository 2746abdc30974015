//! Admin Portal - bootstrap entry point.
//!
//! 1. Load `portal.yaml` from the configuration directory (first argument, default
//!    `portal-data`), layered with `PORTAL__*` environment overrides
//! 2. Initialize logging -> `<logging.dir>/<logging.prefix>.<date>`
//! 3. Open the JSON file store named by `storage.data_file`
//! 4. Open the portal, seeding default users, applications and resources on first run
//! 5. Log a summary of the stored state

use admin_portal::{APP_NAME, ConfigManager, FileStore, Portal, SharedStore, VERSION};
use anyhow::{Context, Result};
use std::sync::Arc;

fn main() -> Result<()> {
    let config_dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "portal-data".to_string());

    let config_manager = ConfigManager::new(config_dir.as_str())?;
    let config = config_manager.load()?;

    let log_dir = config_manager.resolve(&config.logging.dir);
    let _guard = admin_portal::logging::setup_logging_with_console(
        log_dir.as_str(),
        &config.logging.prefix,
        config.logging.debug,
        config.logging.console,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let data_file = config_manager.resolve(&config.storage.data_file);
    let store: SharedStore = Arc::new(
        FileStore::open(&data_file)
            .with_context(|| format!("Failed to open data file: {}", data_file))?,
    );

    let portal = Portal::open(store, &config)?;

    match portal.directory.current_session()? {
        Some(session) => tracing::info!(
            "Restored session for {} (admin={})",
            session.username(),
            session.is_admin
        ),
        None => tracing::info!("No active session"),
    }

    let approved = portal.resources.list_approved().len();
    tracing::info!(
        "{} of {} resources approved, {} audit entries, theme={}",
        approved,
        portal.resources.list_all().len(),
        portal.directory.action_log().len(),
        portal.theme.current()
    );

    tracing::info!("Shutdown complete");
    Ok(())
}
