//! Adaptive Data Rate controller
//!
//! The ADR component acts once per uplink/downlink cycle, just before the
//! reply is assembled, when every gateway has reported the uplink. If the
//! device set the ADR bit and enough history is available it:
//! 1. Estimates the link SNR from the gateway reports of recent uplinks
//! 2. Computes the margin over the SNR required at the current data rate
//! 3. Turns the margin into spreading factor and transmit power steps
//! 4. Stages a `LinkADRReq` on the device's reply

/// Margin computation and step policy
pub mod policy;

/// SNR estimation from gateway reports
pub mod snr;

use core::fmt;

use crate::config::{AdrConfig, ConfigError};
use crate::controller::{ControllerComponent, ControllerError};
use crate::device::{EndDeviceStatus, ReceivedPacket};
use crate::lorawan::{commands::MacCommand, region::DataRate};
use crate::network::NetworkStatus;

use policy::{LinkParams, StepOutcome};

/// Channels enabled by every LinkADRReq
pub const ENABLED_CHANNELS: [u8; 3] = [1, 2, 3];

/// Number of transmissions requested by every LinkADRReq
pub const NB_TRANS: u8 = 1;

/// ADR error type
///
/// These signal a defect in the collaborator owning the device status,
/// never a link condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdrError {
    /// Device reports a spreading factor outside the configured bounds
    SpreadingFactorOutOfRange(u8),
    /// Device reports a transmit power outside the configured bounds
    TxPowerOutOfRange(i8),
    /// The reply has no room left for the LinkADRReq
    ReplyFull,
}

impl fmt::Display for AdrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdrError::SpreadingFactorOutOfRange(sf) => {
                write!(f, "spreading factor SF{} out of range", sf)
            }
            AdrError::TxPowerOutOfRange(power) => {
                write!(f, "transmit power {} dBm out of range", power)
            }
            AdrError::ReplyFull => f.write_str("no room for LinkADRReq in reply"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AdrError {}

/// Result of one run of the ADR algorithm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdrDecision {
    /// Aggregated SNR estimate (dB)
    pub estimated_snr: f64,
    /// SNR required at the current data rate (dB)
    pub required_snr: f64,
    /// Margin after the device offset (dB)
    pub margin: f64,
    /// Step count derived from the margin
    pub steps: i32,
    /// Steps dropped at the bounds
    pub discarded_steps: i32,
    /// Parameters before adjustment
    pub previous: LinkParams,
    /// Commanded data rate
    pub data_rate: DataRate,
    /// Commanded transmit power (dBm)
    pub tx_power: i8,
}

impl AdrDecision {
    /// Commanded spreading factor
    pub fn spreading_factor(&self) -> u8 {
        self.data_rate.spreading_factor()
    }

    /// Whether the device is asked to change anything
    pub fn changes_link(&self) -> bool {
        self.spreading_factor() != self.previous.spreading_factor
            || self.tx_power != self.previous.tx_power
    }

    /// LinkADRReq carrying this decision
    ///
    /// The TXPower field rounds `tx_power` down onto the EU868 2 dB grid,
    /// see [`tx_power_index`](crate::lorawan::commands::tx_power_index).
    pub fn to_command(&self) -> MacCommand {
        MacCommand::link_adr_req(
            self.data_rate.index(),
            self.tx_power,
            &ENABLED_CHANNELS,
            NB_TRANS,
        )
    }
}

/// Network-side ADR controller component
#[derive(Debug, Clone, Default)]
pub struct AdrComponent {
    config: AdrConfig,
}

impl AdrComponent {
    /// Create a component with a validated configuration
    pub fn new(config: AdrConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use
    pub fn config(&self) -> &AdrConfig {
        &self.config
    }

    /// Decide on new radio parameters for a device
    ///
    /// Returns `Ok(None)` when the latest uplink did not request ADR or the
    /// history is shorter than the configured window.
    pub fn decide(&self, status: &EndDeviceStatus) -> Result<Option<AdrDecision>, AdrError> {
        if !status.adr_requested() {
            trace!("ADR bit not set, nothing to do");
            return Ok(None);
        }

        if status.history_len() < self.config.history_range {
            debug!(
                "Not enough packets received by this device for ADR: {} of {}",
                status.history_len(),
                self.config.history_range
            );
            return Ok(None);
        }

        let params = LinkParams {
            spreading_factor: status.spreading_factor(),
            tx_power: status.tx_power(),
        };
        self.evaluate(params, status.recent_packets())
    }

    /// Run the ADR algorithm on a snapshot
    ///
    /// `packets` must yield the history most recent first. An iterator
    /// shorter than the window yields `Ok(None)`.
    pub fn evaluate<'a, I>(
        &self,
        params: LinkParams,
        packets: I,
    ) -> Result<Option<AdrDecision>, AdrError>
    where
        I: IntoIterator<Item = &'a ReceivedPacket>,
    {
        if !(self.config.min_spreading_factor..=self.config.max_spreading_factor)
            .contains(&params.spreading_factor)
        {
            return Err(AdrError::SpreadingFactorOutOfRange(params.spreading_factor));
        }
        let data_rate = DataRate::from_spreading_factor(params.spreading_factor)
            .ok_or(AdrError::SpreadingFactorOutOfRange(params.spreading_factor))?;

        if !(self.config.min_tx_power..=self.config.max_tx_power).contains(&params.tx_power) {
            return Err(AdrError::TxPowerOutOfRange(params.tx_power));
        }

        let estimated_snr = match snr::history_snr(packets, &self.config) {
            Some(snr) => snr,
            None => return Ok(None),
        };

        let required_snr = self.config.required_snr(data_rate);
        let margin = policy::margin(estimated_snr, required_snr, &self.config);
        let steps = policy::steps(margin);

        let StepOutcome {
            params: adjusted,
            discarded,
        } = policy::apply_steps(steps, params, &self.config);

        // apply_steps never raises the spreading factor
        let data_rate =
            DataRate::from_spreading_factor(adjusted.spreading_factor).unwrap_or(data_rate);

        Ok(Some(AdrDecision {
            estimated_snr,
            required_snr,
            margin,
            steps,
            discarded_steps: discarded,
            previous: params,
            data_rate,
            tx_power: adjusted.tx_power,
        }))
    }
}

impl ControllerComponent for AdrComponent {
    fn on_received_packet(
        &self,
        _packet: &ReceivedPacket,
        _status: &mut EndDeviceStatus,
        _network: &NetworkStatus,
    ) -> Result<(), ControllerError> {
        // Not every gateway has reported yet; wait for the reply hook.
        trace!("ADR: packet received");
        Ok(())
    }

    fn before_sending_reply(
        &self,
        status: &mut EndDeviceStatus,
        _network: &NetworkStatus,
    ) -> Result<(), ControllerError> {
        trace!("ADR: before sending reply");

        let decision = match self.decide(status) {
            Ok(Some(decision)) => decision,
            Ok(None) => return Ok(()),
            Err(e) => {
                warn!("ADR: inconsistent device status: {}", e);
                return Err(e.into());
            }
        };

        debug!(
            "Sending LinkADRReq with DR = {} and TP = {} dBm (margin {} dB, {} steps)",
            decision.data_rate.index(),
            decision.tx_power,
            decision.margin,
            decision.steps
        );

        status
            .reply_mut()
            .stage(decision.to_command())
            .map_err(|_| ControllerError::from(AdrError::ReplyFull))
    }

    fn on_failed_reply(
        &self,
        _status: &mut EndDeviceStatus,
        _network: &NetworkStatus,
    ) -> Result<(), ControllerError> {
        trace!("ADR: reply failed");
        Ok(())
    }
}
