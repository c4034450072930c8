//! HTTP server for the Attendance Engine.

use std::env;

use attendance_engine::api::{AppState, create_router};
use attendance_engine::config::RulesLoader;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("ATTENDANCE_ENGINE_LOG_JSON", false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let rules = match env::var("ATTENDANCE_ENGINE_RULES") {
        Ok(dir) => RulesLoader::load(&dir)?,
        Err(_) => RulesLoader::default(),
    };
    info!(
        night_shift_threshold = %rules.rules().night_shift_threshold,
        estimated_shift_hours = rules.rules().estimated_shift_hours,
        "Engine rules ready"
    );

    let bind_addr =
        env::var("ATTENDANCE_ENGINE_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "Attendance engine listening");

    axum::serve(listener, create_router(AppState::new(rules))).await?;
    Ok(())
}
