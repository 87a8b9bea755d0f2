pub mod event;
pub mod registry;

pub use event::{BridgeEvent, Continuation, PendingResult};
pub use registry::{AttemptRecord, AttemptRegistry};
