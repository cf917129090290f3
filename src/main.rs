//! icon-layout: rearrange desktop icons on a scaled schematic of every monitor
//!
//! Each icon's absolute desktop position is read from, and written back to,
//! a per-file metadata attribute; the desktop-icon manager is restarted after
//! every drag so it picks up the new position.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod config;
mod domain;
mod platform;
mod store;
mod ui;

use std::process::ExitCode;

use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use app::{AppController, AppError};
use config::AppConfig;
use domain::monitors::MonitorRegistry;
use store::{GioBackend, PositionStore, ProcessRefresher};

fn main() -> ExitCode {
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };

    init_logging(&config.log_level);
    if let Some(err) = config_error {
        warn!("{err}; using default configuration");
    }

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("icon_layout={level},warn")));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

fn run(config: AppConfig) -> Result<(), AppError> {
    let registry = detect_monitors();
    info!(
        monitors = registry.monitors().len(),
        canvas = ?registry.virtual_canvas(),
        desktop = %config.desktop_dir.display(),
        "starting"
    );

    let store = PositionStore::new(
        GioBackend::new(config.gio_program.clone()),
        config.desktop_dir.clone(),
        config.attribute.clone(),
    );
    let refresher = ProcessRefresher::new(
        config.manager_program.clone(),
        config.manager_quit_args.clone(),
    );
    let controller = AppController::new(
        registry,
        config.hit_radius,
        store,
        refresher,
        config.refresh_on_commit,
    );
    info!(icons = controller.model().len(), "icon positions loaded");

    platform::run(controller, config.window_width, config.window_height)?;
    Ok(())
}

#[cfg(windows)]
fn detect_monitors() -> MonitorRegistry {
    platform::monitors::enable_dpi_awareness();
    MonitorRegistry::detect(&platform::monitors::Win32Monitors)
}

#[cfg(not(windows))]
fn detect_monitors() -> MonitorRegistry {
    debug!("monitors are queried once the event loop is running");
    MonitorRegistry::default()
}
