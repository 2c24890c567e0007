//! Controller components and the pipeline driving them
//!
//! The network server owns one [`ControllerPipeline`] holding the components
//! it runs, in registration order, at three points of each device's
//! uplink/downlink cycle:
//! - when an uplink arrives ([`ControllerComponent::on_received_packet`])
//! - when every gateway has reported it and a reply is being assembled
//!   ([`ControllerComponent::before_sending_reply`])
//! - when a reply could not be delivered ([`ControllerComponent::on_failed_reply`])
//!
//! The pipeline lends each component the device status for the duration of
//! the call only. Components hold no per-device state, so a pipeline can be
//! shared between threads serving different devices.

use core::fmt;

use heapless::Vec;

use crate::adr::AdrError;
use crate::device::{EndDeviceStatus, ReceivedPacket};
use crate::network::NetworkStatus;

/// Controller error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerError {
    /// ADR component error
    Adr(AdrError),
    /// No room left to register a component
    RegistryFull,
    /// Failure reported by a host supplied component
    Component(&'static str),
}

impl From<AdrError> for ControllerError {
    fn from(error: AdrError) -> Self {
        ControllerError::Adr(error)
    }
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::Adr(e) => write!(f, "ADR: {}", e),
            ControllerError::RegistryFull => f.write_str("controller registry full"),
            ControllerError::Component(name) => write!(f, "component {} failed", name),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ControllerError {}

/// Identifies a registered component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentTag {
    /// Adaptive data rate
    Adr,
    /// Component supplied by the host
    Custom(&'static str),
}

/// Common trait for all controller components
pub trait ControllerComponent: Sync {
    /// An uplink was received; not all gateways may have reported it yet
    fn on_received_packet(
        &self,
        packet: &ReceivedPacket,
        status: &mut EndDeviceStatus,
        network: &NetworkStatus,
    ) -> Result<(), ControllerError>;

    /// Every gateway has reported the uplink and the reply is being assembled
    fn before_sending_reply(
        &self,
        status: &mut EndDeviceStatus,
        network: &NetworkStatus,
    ) -> Result<(), ControllerError>;

    /// A reply scheduled for the device was not delivered
    fn on_failed_reply(
        &self,
        status: &mut EndDeviceStatus,
        network: &NetworkStatus,
    ) -> Result<(), ControllerError>;
}

/// Ordered registry of controller components
pub struct ControllerPipeline<'a, const N: usize> {
    components: Vec<(ComponentTag, &'a dyn ControllerComponent), N>,
}

impl<'a, const N: usize> Default for ControllerPipeline<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize> ControllerPipeline<'a, N> {
    /// Create an empty pipeline
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Append a component; it runs after every component registered before
    pub fn register(
        &mut self,
        tag: ComponentTag,
        component: &'a dyn ControllerComponent,
    ) -> Result<(), ControllerError> {
        self.components
            .push((tag, component))
            .map_err(|_| ControllerError::RegistryFull)
    }

    /// Tags of the registered components, in dispatch order
    pub fn tags(&self) -> impl Iterator<Item = ComponentTag> + '_ {
        self.components.iter().map(|(tag, _)| *tag)
    }

    /// Component registered under `tag`
    pub fn get(&self, tag: ComponentTag) -> Option<&'a dyn ControllerComponent> {
        self.components
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, component)| *component)
    }

    /// Number of registered components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True when no component is registered
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Dispatch an uplink to every component
    pub fn on_received_packet(
        &self,
        packet: &ReceivedPacket,
        status: &mut EndDeviceStatus,
        network: &NetworkStatus,
    ) -> Result<(), ControllerError> {
        for (_, component) in self.components.iter() {
            component.on_received_packet(packet, status, network)?;
        }
        Ok(())
    }

    /// Let every component contribute to the reply
    pub fn before_sending_reply(
        &self,
        status: &mut EndDeviceStatus,
        network: &NetworkStatus,
    ) -> Result<(), ControllerError> {
        for (_, component) in self.components.iter() {
            component.before_sending_reply(status, network)?;
        }
        Ok(())
    }

    /// Report a failed reply to every component
    pub fn on_failed_reply(
        &self,
        status: &mut EndDeviceStatus,
        network: &NetworkStatus,
    ) -> Result<(), ControllerError> {
        for (_, component) in self.components.iter() {
            component.on_failed_reply(status, network)?;
        }
        Ok(())
    }
}
