use crate::capability::MediaConstraints;
use parley_core::IceServerConfig;
use parley_core::utils::DEFAULT_STUN_ADDR;
use std::time::Duration;

pub const DEFAULT_PRE_OFFER_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Handed to every negotiation transport the engine creates.
    pub ice_servers: Vec<IceServerConfig>,
    /// How long a pre-offer may stay unanswered. `None` waits forever.
    pub pre_offer_timeout: Option<Duration>,
    /// Capture constraints for video calls.
    pub call_constraints: MediaConstraints,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig::stun(DEFAULT_STUN_ADDR)],
            pre_offer_timeout: Some(DEFAULT_PRE_OFFER_TIMEOUT),
            call_constraints: MediaConstraints::default(),
        }
    }
}
