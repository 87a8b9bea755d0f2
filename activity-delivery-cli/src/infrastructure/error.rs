use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown schema: {0}")]
    UnknownSchema(String),

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Action {action} failed: {reason}")]
    ActionFailed { action: String, reason: String },

    #[error("Activity {0} is not part of the scenario")]
    UnknownActivity(String),

    #[error("Bridge error: {0}")]
    Bridge(#[from] activity_delivery_bridge::BridgeError),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl CliError {
    pub fn file_not_found(path: PathBuf) -> Self {
        CliError::FileNotFound { path }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
