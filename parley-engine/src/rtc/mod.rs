//! [`TransportFactory`](crate::TransportFactory) backed by the `webrtc` crate.

mod rtc_transport;

pub use rtc_transport::*;
