mod bridge;
mod config;
mod host_sync;

pub use bridge::{ActivityBridge, BridgeState, DeliveryContext};
pub use config::BridgeConfig;
pub use host_sync::{HostState, HostSync};
