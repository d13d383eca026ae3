mod logging;
mod node;
mod types;

pub use logging::LoggingConfig;
pub use node::{ConfigSummary, NodeConfig, StorageSection};
pub use types::*;
