//! Uplink reception records
//!
//! A single uplink may be demodulated by several gateways. Each gateway
//! reports the power it received the packet with, and the network server
//! keeps those reports together with the frame control flags of the uplink.

use heapless::LinearMap;

use crate::lorawan::mac::FCtrl;

/// Maximum number of gateways reporting a single uplink
pub const MAX_GATEWAYS: usize = 8;

/// Gateway identifier (EUI-64 as integer)
pub type GatewayId = u64;

/// Received power per gateway for one uplink
#[derive(Debug, Clone, Default)]
pub struct GatewayList {
    reports: LinearMap<GatewayId, f64, MAX_GATEWAYS>,
}

impl GatewayList {
    /// Create an empty gateway list
    pub fn new() -> Self {
        Self {
            reports: LinearMap::new(),
        }
    }

    /// Record the power (dBm) a gateway received the packet with
    ///
    /// Returns the previous report of that gateway, or the rejected entry
    /// when the list is full.
    pub fn insert(
        &mut self,
        gateway: GatewayId,
        rx_power: f64,
    ) -> Result<Option<f64>, (GatewayId, f64)> {
        self.reports.insert(gateway, rx_power)
    }

    /// Received power reported by a gateway
    pub fn rx_power(&self, gateway: GatewayId) -> Option<f64> {
        self.reports.get(&gateway).copied()
    }

    /// Iterate over every reported power
    pub fn rx_powers(&self) -> impl Iterator<Item = f64> + '_ {
        self.reports.values().copied()
    }

    /// Iterate over `(gateway, power)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (GatewayId, f64)> + '_ {
        self.reports.iter().map(|(gw, power)| (*gw, *power))
    }

    /// Number of reporting gateways
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// True when no gateway reported the packet
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

/// One uplink as seen by the network server
#[derive(Debug, Clone)]
pub struct ReceivedPacket {
    /// Frame control flags of the uplink
    pub f_ctrl: FCtrl,
    /// Reception reports of every gateway
    pub gateways: GatewayList,
}

impl ReceivedPacket {
    /// Create a packet record
    pub fn new(f_ctrl: FCtrl, gateways: GatewayList) -> Self {
        Self { f_ctrl, gateways }
    }

    /// Whether the device set the ADR bit on this uplink
    pub fn adr_requested(&self) -> bool {
        self.f_ctrl.adr
    }
}
