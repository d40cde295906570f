pub mod app;
pub mod config;
pub mod error;
pub mod input;
pub mod journal;
pub mod logging;
pub mod notification;
pub mod permission;
pub mod session;
pub mod state;
pub mod storage;
#[cfg(test)]
mod testing;

pub use error::{AppError, AppResult};

/// Entrypoint used by the binary. With the `gui` feature the GTK window is
/// the default front-end; `--console` forces the terminal one.
pub fn run() -> AppResult<()> {
    logging::init();
    tracing::info!("starting SLAM launcher");

    let config = config::load_app_config();
    tracing::info!(
        engine = config.engine_command(),
        camera = %config.camera_device().display(),
        storage_root = %config.storage_root().display(),
        "loaded launcher config"
    );

    let force_console = std::env::args().skip(1).any(|arg| arg == "--console");
    run_front_end(config, force_console)?;

    tracing::info!("launcher exited");
    Ok(())
}

#[cfg(feature = "gui")]
fn run_front_end(config: config::AppConfig, force_console: bool) -> AppResult<()> {
    if force_console {
        app::console::run(&config)
    } else {
        app::gui::run(config)
    }
}

#[cfg(not(feature = "gui"))]
fn run_front_end(config: config::AppConfig, _force_console: bool) -> AppResult<()> {
    app::console::run(&config)
}
