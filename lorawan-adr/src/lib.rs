//! Network-side Adaptive Data Rate (ADR) controller for LoRaWAN
//!
//! This crate provides the rate-adaptation component of a LoRaWAN network
//! server. Given the uplink history of an end device, it decides whether to
//! command the device to a different data rate and/or transmit power and
//! stages a `LinkADRReq` MAC command on the device's pending reply.
//!
//! # Features
//! - SNR estimation from multi-gateway reception reports
//! - Configurable max/average aggregation across gateways and history
//! - Stepwise data-rate and transmit-power adjustment within hard bounds
//! - Ordered registry of controller components driven by a pipeline
//! - `no_std`, no allocation, no unsafe code
//!
//! # Example
//! ```
//! use lorawan_adr::{
//!     adr::AdrComponent,
//!     config::AdrConfig,
//!     controller::{ComponentTag, ControllerPipeline},
//!     device::{EndDeviceStatus, GatewayList, ReceivedPacket},
//!     lorawan::mac::FCtrl,
//!     network::NetworkStatus,
//! };
//!
//! let adr = AdrComponent::new(AdrConfig::default()).unwrap();
//! let mut pipeline: ControllerPipeline<'_, 4> = ControllerPipeline::new();
//! pipeline.register(ComponentTag::Adr, &adr).unwrap();
//!
//! let network = NetworkStatus::new();
//! let mut device = EndDeviceStatus::new(7, 14);
//! for _ in 0..20 {
//!     let mut gateways = GatewayList::new();
//!     gateways.insert(1, -80.0).unwrap();
//!     device.push_packet(ReceivedPacket::new(FCtrl::with_adr(true), gateways));
//! }
//!
//! pipeline.before_sending_reply(&mut device, &network).unwrap();
//! assert!(device.reply().needs_reply);
//! ```

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod fmt;

/// ADR decision algorithm and controller component
pub mod adr;

/// Controller configuration
pub mod config;

/// Controller component trait and pipeline
pub mod controller;

/// End-device status tracked by the network server
pub mod device;

/// LoRaWAN protocol types used by the controller
pub mod lorawan;

/// Network-wide status
pub mod network;

pub use adr::{AdrComponent, AdrDecision, AdrError};
pub use config::{AdrConfig, Aggregation, ConfigError};
pub use controller::{ComponentTag, ControllerComponent, ControllerError, ControllerPipeline};
