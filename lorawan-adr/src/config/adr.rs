use core::fmt;

use crate::device::HISTORY_CAPACITY;
use crate::lorawan::region::{DataRate, MAX_SPREADING_FACTOR, MIN_SPREADING_FACTOR};

/// Number of entries in the required-SNR table (DR0 to DR5)
pub const SNR_THRESHOLD_COUNT: usize = 6;

/// How several measurements are reduced to a single figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aggregation {
    /// Keep the largest measurement
    Max,
    /// Arithmetic mean of all measurements
    #[default]
    Average,
}

/// Configuration error
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// History window is zero or exceeds the history capacity
    InvalidHistoryRange(usize),
    /// Spreading factor bounds are inverted or outside SF7-SF12
    InvalidSpreadingFactorBounds {
        /// Configured lower bound
        min: u8,
        /// Configured upper bound
        max: u8,
    },
    /// Transmit power bounds are inverted
    InvalidTxPowerBounds {
        /// Configured lower bound in dBm
        min: i8,
        /// Configured upper bound in dBm
        max: i8,
    },
    /// Transmit power step is not positive
    InvalidTxPowerStep(i8),
    /// Channel bandwidth is zero
    InvalidBandwidth,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidHistoryRange(range) => write!(
                f,
                "history range {} outside 1..={}",
                range, HISTORY_CAPACITY
            ),
            ConfigError::InvalidSpreadingFactorBounds { min, max } => {
                write!(f, "invalid spreading factor bounds SF{}-SF{}", min, max)
            }
            ConfigError::InvalidTxPowerBounds { min, max } => {
                write!(f, "invalid transmit power bounds {}-{} dBm", min, max)
            }
            ConfigError::InvalidTxPowerStep(step) => {
                write!(f, "transmit power step {} dB is not positive", step)
            }
            ConfigError::InvalidBandwidth => f.write_str("bandwidth must be non-zero"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// ADR policy configuration
///
/// Shared read-only by every invocation of the controller. The defaults
/// match EU868 end devices on 125 kHz channels.
#[derive(Debug, Clone, PartialEq)]
pub struct AdrConfig {
    /// Reduction of the per-gateway received power of one packet
    pub gateway_aggregation: Aggregation,
    /// Reduction of the per-packet SNR over the history window
    pub history_aggregation: Aggregation,
    /// Number of most recent packets considered
    pub history_range: usize,
    /// Lowest spreading factor the network may command
    pub min_spreading_factor: u8,
    /// Highest spreading factor a device may report
    ///
    /// Devices outside `min_spreading_factor..=max_spreading_factor` are
    /// reported as inconsistent.
    pub max_spreading_factor: u8,
    /// Minimum transmit power (dBm)
    pub min_tx_power: i8,
    /// Maximum transmit power (dBm)
    pub max_tx_power: i8,
    /// Transmit power adjustment per step (dB)
    pub tx_power_step: i8,
    /// Device specific SNR margin (dB)
    pub device_margin_db: f64,
    /// Channel bandwidth (Hz)
    pub bandwidth_hz: u32,
    /// Receiver noise figure (dB)
    pub noise_figure_db: f64,
    /// Required SNR (dB) indexed by data rate 0-5
    pub snr_thresholds: [f64; SNR_THRESHOLD_COUNT],
}

impl Default for AdrConfig {
    fn default() -> Self {
        Self {
            gateway_aggregation: Aggregation::Average,
            history_aggregation: Aggregation::Average,
            history_range: 20,
            min_spreading_factor: MIN_SPREADING_FACTOR,
            max_spreading_factor: MAX_SPREADING_FACTOR,
            min_tx_power: 2,
            max_tx_power: 14,
            tx_power_step: 3,
            device_margin_db: 10.0,
            bandwidth_hz: 125_000,
            noise_figure_db: 6.0,
            snr_thresholds: [-20.0, -17.5, -15.0, -12.5, -10.0, -7.5],
        }
    }
}

impl AdrConfig {
    /// Check the configuration invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_range == 0 || self.history_range > HISTORY_CAPACITY {
            return Err(ConfigError::InvalidHistoryRange(self.history_range));
        }

        if self.min_spreading_factor > self.max_spreading_factor
            || self.min_spreading_factor < MIN_SPREADING_FACTOR
            || self.max_spreading_factor > MAX_SPREADING_FACTOR
        {
            return Err(ConfigError::InvalidSpreadingFactorBounds {
                min: self.min_spreading_factor,
                max: self.max_spreading_factor,
            });
        }

        if self.min_tx_power > self.max_tx_power {
            return Err(ConfigError::InvalidTxPowerBounds {
                min: self.min_tx_power,
                max: self.max_tx_power,
            });
        }

        if self.tx_power_step <= 0 {
            return Err(ConfigError::InvalidTxPowerStep(self.tx_power_step));
        }

        if self.bandwidth_hz == 0 {
            return Err(ConfigError::InvalidBandwidth);
        }

        Ok(())
    }

    /// Required SNR for a data rate
    ///
    /// Indices past the end of the table are clamped to the last entry.
    pub fn required_snr(&self, data_rate: DataRate) -> f64 {
        let index = (data_rate.index() as usize).min(SNR_THRESHOLD_COUNT - 1);
        self.snr_thresholds[index]
    }
}
