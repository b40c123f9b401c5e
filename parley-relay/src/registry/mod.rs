mod peer_registry;
mod relay_error;

pub use peer_registry::*;
pub use relay_error::*;
