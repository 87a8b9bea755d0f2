pub mod bus;
pub mod capability;
pub mod error;

pub use bus::{EventBus, Listener, ListenerId};
pub use capability::{
    invoke_callback, AcceptAll, ActivityElement, CallbackResult, ElementFactory, ElementProps,
    ElementRegistry, GlobalEnvironment, HostCallbacks, LifecycleCall, ScriptEnvironment,
    ScriptScope,
};
pub use error::{BridgeError, CallbackError, Result};
