//! Relay side of parley: live-peer presence and addressed message forwarding.

mod registry;
mod signaling;

pub use registry::*;
pub use signaling::*;
