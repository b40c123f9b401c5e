//! Opaque external capabilities the engine drives: media capture and the
//! negotiation transport.

mod media;
mod transport;

pub use media::*;
pub use transport::*;
