//! Study Session Replay
//!
//! Drives the study pipeline from recorded JSON-lines landmark frames,
//! stores the resulting summary and optionally publishes it over MQTT.

pub mod replay;
pub mod settings;

pub use replay::{replay_reader, ReplayError, ReplayReport, Replayer};
pub use settings::{AppConfig, ReplayConfig};

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize logging to stderr (stdout carries the summary)
pub fn init_logging(json: bool) {
    let builder = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())
            .expect("Failed to set tracing subscriber");
    } else {
        tracing::subscriber::set_global_default(builder.finish())
            .expect("Failed to set tracing subscriber");
    }
}
