pub mod error;
pub mod files;
pub mod observability;

pub use error::{CliError, Result};
pub use files::{load_bridge_config, read_json, write_json};
pub use observability::LogConfig;
