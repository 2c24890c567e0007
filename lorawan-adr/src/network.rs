//! Network-wide status
//!
//! The controller components receive the network status alongside each
//! device so that policies needing a global view (gateway coverage, load)
//! can be plugged into the same hooks.

use heapless::Vec;

use crate::device::GatewayId;

/// Maximum number of gateways known to the network server
pub const MAX_NETWORK_GATEWAYS: usize = 64;

/// Network status shared by every device of the network
#[derive(Debug, Clone, Default)]
pub struct NetworkStatus {
    gateways: Vec<GatewayId, MAX_NETWORK_GATEWAYS>,
}

impl NetworkStatus {
    /// Create an empty network status
    pub fn new() -> Self {
        Self {
            gateways: Vec::new(),
        }
    }

    /// Register a gateway, returning it back if the registry is full
    pub fn add_gateway(&mut self, gateway: GatewayId) -> Result<(), GatewayId> {
        if self.gateways.contains(&gateway) {
            return Ok(());
        }
        self.gateways.push(gateway)
    }

    /// Whether a gateway belongs to the network
    pub fn has_gateway(&self, gateway: GatewayId) -> bool {
        self.gateways.contains(&gateway)
    }

    /// Registered gateways
    pub fn gateways(&self) -> &[GatewayId] {
        &self.gateways
    }
}
