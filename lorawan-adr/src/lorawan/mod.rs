//! LoRaWAN protocol types
//!
//! This module contains the parts of the LoRaWAN protocol the controller
//! reads and writes, including:
//! - MAC and frame headers
//! - Data rate definitions
//! - MAC command encoding

/// MAC command handling
pub mod commands;

/// MAC and frame headers
pub mod mac;

/// Regional data rate definitions
pub mod region;

pub use commands::MacCommand;
pub use mac::{Direction, FCtrl, MType};
pub use region::DataRate;
