// Concrete implementations at the edges of the push subsystem
// HTTP device registration and the listener registry host bindings build on

pub mod http;
pub mod listeners;

pub use http::{ApiEnvelope, ApiPushDevice, HttpDeviceRegistry};
pub use listeners::ListenerSet;
