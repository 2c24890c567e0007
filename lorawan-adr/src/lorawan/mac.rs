use heapless::Vec;

use super::commands::MacCommand;

/// Maximum number of MAC commands piggybacked in FOpts
pub const MAX_MAC_COMMANDS: usize = 4;

/// MAC header types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MType {
    /// Join request
    JoinRequest = 0x00,
    /// Join accept
    JoinAccept = 0x20,
    /// Unconfirmed data uplink
    UnconfirmedDataUp = 0x40,
    /// Unconfirmed data downlink
    UnconfirmedDataDown = 0x60,
    /// Confirmed data uplink
    ConfirmedDataUp = 0x80,
    /// Confirmed data downlink
    ConfirmedDataDown = 0xA0,
    /// Rejoin request
    RejoinRequest = 0xC0,
    /// Proprietary
    Proprietary = 0xE0,
}

impl MType {
    /// Parse the message type from an MHDR byte
    pub fn from_mhdr(byte: u8) -> Self {
        match byte & 0xE0 {
            0x00 => MType::JoinRequest,
            0x20 => MType::JoinAccept,
            0x40 => MType::UnconfirmedDataUp,
            0x60 => MType::UnconfirmedDataDown,
            0x80 => MType::ConfirmedDataUp,
            0xA0 => MType::ConfirmedDataDown,
            0xC0 => MType::RejoinRequest,
            _ => MType::Proprietary,
        }
    }

    /// Whether this message type travels from the network to the device
    pub fn is_downlink(&self) -> bool {
        matches!(
            self,
            MType::JoinAccept | MType::UnconfirmedDataDown | MType::ConfirmedDataDown
        )
    }
}

/// Frame direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// End device to network
    Uplink,
    /// Network to end device
    Downlink,
}

/// Frame header flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FCtrl {
    /// Adaptive data rate enabled
    pub adr: bool,
    /// ADR acknowledgment request
    pub adr_ack_req: bool,
    /// Acknowledgment
    pub ack: bool,
    /// Frame pending
    pub f_pending: bool,
    /// FOpts length in bytes
    pub f_opts_len: u8,
}

impl FCtrl {
    /// Frame control with only the ADR bit set as requested
    pub fn with_adr(adr: bool) -> Self {
        Self {
            adr,
            ..Self::default()
        }
    }

    /// Serialize to the FCtrl byte
    pub fn to_byte(&self) -> u8 {
        let mut byte = self.f_opts_len & 0x0F;
        if self.adr {
            byte |= 0x80;
        }
        if self.adr_ack_req {
            byte |= 0x40;
        }
        if self.ack {
            byte |= 0x20;
        }
        if self.f_pending {
            byte |= 0x10;
        }
        byte
    }

    /// Parse the FCtrl byte of an uplink frame
    pub fn from_byte(byte: u8) -> Self {
        Self {
            adr: (byte & 0x80) != 0,
            adr_ack_req: (byte & 0x40) != 0,
            ack: (byte & 0x20) != 0,
            f_pending: (byte & 0x10) != 0,
            f_opts_len: byte & 0x0F,
        }
    }
}

/// Frame header of a reply under construction
#[derive(Debug, Clone, PartialEq)]
pub struct FrameHeader {
    direction: Direction,
    commands: Vec<MacCommand, MAX_MAC_COMMANDS>,
}

impl Default for FrameHeader {
    fn default() -> Self {
        Self {
            direction: Direction::Uplink,
            commands: Vec::new(),
        }
    }
}

impl FrameHeader {
    /// Mark the frame as network to device
    pub fn set_as_downlink(&mut self) {
        self.direction = Direction::Downlink;
    }

    /// Mark the frame as device to network
    pub fn set_as_uplink(&mut self) {
        self.direction = Direction::Uplink;
    }

    /// Current direction
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Append a MAC command, returning it back when FOpts is full
    pub fn add_command(&mut self, command: MacCommand) -> Result<(), MacCommand> {
        self.commands.push(command)
    }

    /// Replace the staged command sharing `command`'s CID, or append it
    ///
    /// Returns the command back if it is new and FOpts is full.
    pub fn set_command(&mut self, command: MacCommand) -> Result<(), MacCommand> {
        match self.commands.iter_mut().find(|c| c.cid() == command.cid()) {
            Some(staged) => {
                *staged = command;
                Ok(())
            }
            None => self.add_command(command),
        }
    }

    /// Staged MAC commands
    pub fn commands(&self) -> &[MacCommand] {
        &self.commands
    }

    /// Encoded length of the staged MAC commands (CID included)
    pub fn f_opts_len(&self) -> usize {
        self.commands.iter().map(|c| 1 + c.len()).sum()
    }

    /// Drop every staged command
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}
