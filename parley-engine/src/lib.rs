//! Client side of parley: the per-client call negotiation engine.
//!
//! [`CallEngine`] owns at most one [`CallSession`](session) at a time and
//! drives it through pre-offer, accept/reject and offer/answer/candidate
//! exchange. Media capture, the negotiation transport and the UI are reached
//! only through the traits in [`capability`] and [`ui`].

pub mod capability;
mod config;
mod engine;
mod error;
pub mod rtc;
mod session;
mod signaling;
pub mod ui;

pub use capability::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use session::{CallRole, CallState, CallStatus};
pub use signaling::*;
pub use ui::*;
