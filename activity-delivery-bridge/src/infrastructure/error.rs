/// Bridge errors
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Activity {0} is already mounted")]
    AlreadyMounted(String),

    #[error("Continuation already settled")]
    AlreadySettled,

    #[error("Continuation dropped before a result was produced")]
    ContinuationDropped,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Failure raised by a host lifecycle callback
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct CallbackError(pub String);

impl CallbackError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

impl From<serde_json::Error> for CallbackError {
    fn from(e: serde_json::Error) -> Self {
        Self(e.to_string())
    }
}
