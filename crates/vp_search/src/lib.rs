pub mod classifier;
pub mod cli;
pub mod logging;
pub mod manager;
pub mod providers;

pub use cli::{handle_command, WatchArgs};
pub use logging::{init_logging, Logger};
pub use manager::{WatchConfig, WatchManager, WatchReport, WatchRequest};
pub use providers::BraveClient;
