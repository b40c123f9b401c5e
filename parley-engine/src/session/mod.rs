mod call_session;
mod call_state;

pub(crate) use call_session::*;
pub use call_state::*;
