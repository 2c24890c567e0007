//! Margin computation and step policy
//!
//! Positive margins first shorten airtime by lowering the spreading factor,
//! then save energy by lowering transmit power. Negative margins only raise
//! transmit power: raising the spreading factor is left to the device's own
//! ADR backoff. Steps that would leave the configured bounds are dropped.

use crate::config::AdrConfig;

/// SNR margin (dB) covered by one adjustment step
pub const MARGIN_DB_PER_STEP: f64 = 3.0;

/// Radio parameters of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkParams {
    /// Spreading factor (7-12)
    pub spreading_factor: u8,
    /// Transmit power (dBm)
    pub tx_power: i8,
}

/// Outcome of applying a step count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    /// Parameters after adjustment
    pub params: LinkParams,
    /// Steps that did not fit within the bounds
    pub discarded: i32,
}

/// SNR margin left after the demodulation threshold and the device offset
pub fn margin(estimated_snr: f64, required_snr: f64, config: &AdrConfig) -> f64 {
    estimated_snr - required_snr - config.device_margin_db
}

/// Number of adjustment steps for a margin, rounded towards negative infinity
pub fn steps(margin: f64) -> i32 {
    libm::floor(margin / MARGIN_DB_PER_STEP) as i32
}

/// Apply `steps` to `params` within the bounds of `config`
pub fn apply_steps(mut steps: i32, params: LinkParams, config: &AdrConfig) -> StepOutcome {
    let mut sf = params.spreading_factor;
    let mut tx_power = params.tx_power as i16;
    let step = config.tx_power_step as i16;
    let min_power = config.min_tx_power as i16;
    let max_power = config.max_tx_power as i16;

    while steps > 0 && sf > config.min_spreading_factor {
        sf -= 1;
        steps -= 1;
    }

    while steps > 0 && tx_power - step >= min_power {
        tx_power -= step;
        steps -= 1;
    }

    while steps < 0 && tx_power + step <= max_power {
        tx_power += step;
        steps += 1;
    }

    StepOutcome {
        params: LinkParams {
            spreading_factor: sf,
            // Stays within [min_tx_power, max_tx_power], both i8
            tx_power: tx_power as i8,
        },
        discarded: steps,
    }
}
