//! SNR estimation
//!
//! Gateways report received power, not SNR. The estimate uses a thermal
//! noise model: `SNR = P_rx + 174 - 10 log10(B) - NF`, with `-174 dBm/Hz`
//! the thermal noise density at room temperature, `B` the channel
//! bandwidth and `NF` the receiver noise figure. Interference is ignored.

use crate::config::{AdrConfig, Aggregation};
use crate::device::{GatewayList, ReceivedPacket};

/// Thermal noise density (dBm/Hz), sign inverted
const THERMAL_NOISE_DENSITY: f64 = 174.0;

/// Convert a received power (dBm) to an SNR estimate (dB)
pub fn rx_power_to_snr(rx_power: f64, config: &AdrConfig) -> f64 {
    rx_power + THERMAL_NOISE_DENSITY
        - 10.0 * libm::log10(config.bandwidth_hz as f64)
        - config.noise_figure_db
}

/// Reduce the reports of every gateway to a single received power (dBm)
///
/// A packet nobody reported falls back to the minimum transmit power.
pub fn received_power(gateways: &GatewayList, config: &AdrConfig) -> f64 {
    let fallback = config.min_tx_power as f64;
    if gateways.is_empty() {
        return fallback;
    }

    match config.gateway_aggregation {
        Aggregation::Max => gateways.rx_powers().fold(f64::NEG_INFINITY, f64::max),
        Aggregation::Average => {
            gateways.rx_powers().sum::<f64>() / gateways.len() as f64
        }
    }
}

/// SNR estimate of one packet
pub fn packet_snr(packet: &ReceivedPacket, config: &AdrConfig) -> f64 {
    rx_power_to_snr(received_power(&packet.gateways, config), config)
}

/// SNR estimate over the `history_range` packets yielded first by `packets`
///
/// Callers pass the history most recent first. Returns `None` when the
/// iterator is shorter than the window.
pub fn history_snr<'a, I>(packets: I, config: &AdrConfig) -> Option<f64>
where
    I: IntoIterator<Item = &'a ReceivedPacket>,
{
    let mut count = 0usize;
    let mut sum = 0.0;
    let mut max = f64::NEG_INFINITY;

    for packet in packets.into_iter().take(config.history_range) {
        let snr = packet_snr(packet, config);
        sum += snr;
        max = max.max(snr);
        count += 1;
    }

    if count < config.history_range {
        return None;
    }

    Some(match config.history_aggregation {
        Aggregation::Max => max,
        Aggregation::Average => sum / count as f64,
    })
}
