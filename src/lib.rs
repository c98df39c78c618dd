pub mod aggregator;
pub mod auth;
pub mod config;
pub mod models;
pub mod notifiers;
pub mod orchestrator;
pub mod querier;
pub mod scheduler;
pub mod secrets;
pub mod utils;

// Re-export commonly used types
pub use config::{AppConfig, SmtpConfig};
pub use models::{AuthType, DealResult, Price, RunResult, Source};
pub use orchestrator::{DealBot, NotificationStatus, RunReport, TickOutcome};
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
