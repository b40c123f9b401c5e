use parley_core::PeerId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelayError {
    /// Destination id has no open connection.
    #[error("peer {0} is not connected")]
    RoutingMiss(PeerId),

    /// Destination is registered but its outbound channel is already gone.
    #[error("outbound channel of peer {0} is closed")]
    ChannelClosed(PeerId),
}
