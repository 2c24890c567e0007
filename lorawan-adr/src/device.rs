//! End-device status tracked by the network server
//!
//! This module holds the per-device state the controller reads and writes:
//! the bounded uplink history, the radio parameters currently in use and
//! the reply being assembled for the next downlink.

/// Uplink reception records
pub mod packet;

use heapless::Deque;

use crate::lorawan::{
    commands::MacCommand,
    mac::{FrameHeader, MType},
};

pub use packet::{GatewayId, GatewayList, ReceivedPacket, MAX_GATEWAYS};

/// Number of uplinks kept per device
pub const HISTORY_CAPACITY: usize = 32;

/// Reply under construction for a device
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    /// A downlink must be sent to the device
    pub needs_reply: bool,
    /// Frame header, including staged MAC commands
    pub frame_header: FrameHeader,
    /// MAC message type of the reply, once decided
    pub mtype: Option<MType>,
}

impl Reply {
    /// Forget everything staged so far
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Stage a MAC command as an unconfirmed downlink
    ///
    /// A command of the same kind staged earlier in the cycle is replaced.
    /// Returns the command back if FOpts has no room left.
    pub fn stage(&mut self, command: MacCommand) -> Result<(), MacCommand> {
        self.frame_header.set_command(command)?;
        self.needs_reply = true;
        self.frame_header.set_as_downlink();
        self.mtype = Some(MType::UnconfirmedDataDown);
        Ok(())
    }
}

/// Status of one end device
#[derive(Debug, Clone)]
pub struct EndDeviceStatus {
    /// Received packets, oldest first
    history: Deque<ReceivedPacket, HISTORY_CAPACITY>,
    /// Spreading factor of the first receive window
    spreading_factor: u8,
    /// Transmit power in dBm
    tx_power: i8,
    /// Pending reply
    reply: Reply,
}

impl EndDeviceStatus {
    /// Create the status of a device using the given radio parameters
    pub fn new(spreading_factor: u8, tx_power: i8) -> Self {
        Self {
            history: Deque::new(),
            spreading_factor,
            tx_power,
            reply: Reply::default(),
        }
    }

    /// Append an uplink, evicting the oldest one when the history is full
    pub fn push_packet(&mut self, packet: ReceivedPacket) {
        if self.history.is_full() {
            self.history.pop_front();
        }
        // Room was made above
        let _ = self.history.push_back(packet);
    }

    /// Most recent uplink
    pub fn last_packet(&self) -> Option<&ReceivedPacket> {
        self.history.back()
    }

    /// Received packets, oldest first
    pub fn received_packets(&self) -> impl DoubleEndedIterator<Item = &ReceivedPacket> + '_ {
        self.history.iter()
    }

    /// Received packets, most recent first
    pub fn recent_packets(&self) -> impl Iterator<Item = &ReceivedPacket> + '_ {
        self.history.iter().rev()
    }

    /// Number of packets in the history
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Whether the latest uplink asked for ADR
    pub fn adr_requested(&self) -> bool {
        self.last_packet().map_or(false, ReceivedPacket::adr_requested)
    }

    /// Spreading factor of the first receive window
    pub fn spreading_factor(&self) -> u8 {
        self.spreading_factor
    }

    /// Update the spreading factor
    pub fn set_spreading_factor(&mut self, spreading_factor: u8) {
        self.spreading_factor = spreading_factor;
    }

    /// Transmit power in dBm
    pub fn tx_power(&self) -> i8 {
        self.tx_power
    }

    /// Update the transmit power
    pub fn set_tx_power(&mut self, tx_power: i8) {
        self.tx_power = tx_power;
    }

    /// Pending reply
    pub fn reply(&self) -> &Reply {
        &self.reply
    }

    /// Pending reply, mutable
    pub fn reply_mut(&mut self) -> &mut Reply {
        &mut self.reply
    }
}
