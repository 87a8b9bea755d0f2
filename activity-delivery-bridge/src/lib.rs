// Domain layer (registry, events)
pub mod domain;

// Application layer (bridge lifecycle, host sync)
pub mod application;

// Infrastructure layer (bus, capabilities)
pub mod infrastructure;

// Re-exports for convenience
pub use application::{
    ActivityBridge, BridgeConfig, BridgeState, DeliveryContext, HostState, HostSync,
};
pub use domain::{AttemptRecord, AttemptRegistry, BridgeEvent, Continuation, PendingResult};
pub use infrastructure::error::{BridgeError, CallbackError, Result};
pub use infrastructure::{
    AcceptAll, ActivityElement, CallbackResult, ElementFactory, ElementProps, ElementRegistry,
    EventBus, GlobalEnvironment, HostCallbacks, LifecycleCall, ScriptEnvironment, ScriptScope,
};
