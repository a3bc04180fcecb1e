pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::RelayConfig;

pub use core::{gradio::GradioClient, relay::VitalsRelay};
pub use domain::health::HealthStatus;
pub use domain::ports::RemoteClient;
pub use utils::error::{RelayError, Result};
