//! subburn — caption burn-in render service.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use subburn::config::ServerConfig;
use subburn::core::ffmpeg::detect_ffmpeg;
use subburn::http::create_router;
use subburn::state::AppState;

/// Application name
const APP_NAME: &str = "subburn";

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

fn init_logging() {
    // Log to a daily-rolling file for production debugging; stdout remains
    // available in dev.
    let log_dir = std::env::var("SUBBURN_LOG_DIR").unwrap_or_else(|_| ".logs".to_string());
    let _ = std::fs::create_dir_all(&log_dir);

    let file_appender = tracing_appender::rolling::daily(&log_dir, "subburn.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    use tracing_subscriber::prelude::*;

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(cfg!(debug_assertions));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer);

    // Avoid panics if already initialized (tests, restarts under a harness).
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[tokio::main]
async fn main() {
    init_logging();
    tracing::info!("{} v{} starting", APP_NAME, VERSION);

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "subburn.json".to_string());
    let config = ServerConfig::load_or_default(Path::new(&config_path));
    tracing::info!("Configuration loaded: {:?}", config);

    let ffmpeg = match detect_ffmpeg(config.ffmpeg_path.as_deref()) {
        Ok(info) => info,
        Err(e) => {
            tracing::error!("FFmpeg detection failed: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!(
        "FFmpeg {} at {}",
        ffmpeg.version,
        ffmpeg.ffmpeg_path.display()
    );

    let addr = config.socket_addr();
    let state = Arc::new(AppState::new(config, ffmpeg));
    let app = create_router(state);

    tracing::info!("Starting HTTP server on {addr}");
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}
