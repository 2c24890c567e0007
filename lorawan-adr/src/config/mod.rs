//! Controller configuration
//!
//! This module contains the policy constants used by the ADR controller. It
//! includes:
//! - Gateway and history aggregation policies
//! - Spreading factor and transmit power bounds
//! - Link budget parameters and demodulation thresholds

/// ADR policy configuration
pub mod adr;

pub use adr::{AdrConfig, Aggregation, ConfigError};
