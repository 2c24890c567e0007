use heapless::Vec;

/// Largest encoded MAC command handled here (CID + payload)
pub const MAX_COMMAND_SIZE: usize = 5;

/// MAC command identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandIdentifier {
    /// Network to device ADR request
    LinkADRReq = 0x03,
    /// Device to network ADR answer
    LinkADRAns = 0x83,
}

/// MAC command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacCommand {
    /// Link ADR request
    LinkADRReq {
        /// Data rate
        data_rate: u8,
        /// TX power index
        tx_power: u8,
        /// Channel mask
        ch_mask: u16,
        /// Channel mask control
        ch_mask_cntl: u8,
        /// Number of transmissions
        nb_trans: u8,
    },
    /// Link ADR answer
    LinkADRAns {
        /// Power ACK
        power_ack: bool,
        /// Data rate ACK
        data_rate_ack: bool,
        /// Channel mask ACK
        channel_mask_ack: bool,
    },
}

/// Map a transmit power in dBm to the LinkADRReq TXPower field
///
/// The field follows the EU868 2 dB grid (index 0 = 16 dBm down to
/// index 7 = 2 dBm). Powers between grid points round down, so 11 dBm
/// encodes as 10 dBm.
pub fn tx_power_index(tx_power: i8) -> u8 {
    if tx_power >= 16 {
        0
    } else if tx_power >= 14 {
        1
    } else if tx_power >= 12 {
        2
    } else if tx_power >= 10 {
        3
    } else if tx_power >= 8 {
        4
    } else if tx_power >= 6 {
        5
    } else if tx_power >= 4 {
        6
    } else {
        7
    }
}

/// Build a channel mask with bit `n` set for each enabled channel `n`
///
/// Channels past the 16-bit mask are ignored.
pub fn channel_mask(channels: &[u8]) -> u16 {
    channels
        .iter()
        .filter(|&&ch| ch < 16)
        .fold(0u16, |mask, &ch| mask | (1 << ch))
}

impl MacCommand {
    /// Build a LinkADRReq from a data rate, a transmit power in dBm, the
    /// enabled channel list and the repetition count
    pub fn link_adr_req(data_rate: u8, tx_power: i8, channels: &[u8], nb_trans: u8) -> Self {
        MacCommand::LinkADRReq {
            data_rate: data_rate & 0x0F,
            tx_power: tx_power_index(tx_power),
            ch_mask: channel_mask(channels),
            ch_mask_cntl: 0,
            nb_trans: nb_trans & 0x0F,
        }
    }

    /// Command identifier
    pub fn cid(&self) -> CommandIdentifier {
        match self {
            MacCommand::LinkADRReq { .. } => CommandIdentifier::LinkADRReq,
            MacCommand::LinkADRAns { .. } => CommandIdentifier::LinkADRAns,
        }
    }

    /// Parse MAC command from bytes
    pub fn from_bytes(cid: u8, payload: &[u8]) -> Option<Self> {
        match cid {
            0x03 if payload.len() >= 4 => Some(MacCommand::LinkADRReq {
                data_rate: payload[0] >> 4,
                tx_power: payload[0] & 0x0F,
                ch_mask: u16::from_le_bytes([payload[1], payload[2]]),
                ch_mask_cntl: (payload[3] >> 4) & 0x07,
                nb_trans: payload[3] & 0x0F,
            }),
            0x83 if !payload.is_empty() => Some(MacCommand::LinkADRAns {
                power_ack: (payload[0] & 0x04) != 0,
                data_rate_ack: (payload[0] & 0x02) != 0,
                channel_mask_ack: (payload[0] & 0x01) != 0,
            }),
            _ => None,
        }
    }

    /// Serialize the command, CID first
    pub fn to_bytes(&self) -> Vec<u8, MAX_COMMAND_SIZE> {
        let mut buffer = Vec::new();
        // Capacity covers the largest command
        let _ = buffer.push(self.cid() as u8);
        match self {
            MacCommand::LinkADRReq {
                data_rate,
                tx_power,
                ch_mask,
                ch_mask_cntl,
                nb_trans,
            } => {
                let mask = ch_mask.to_le_bytes();
                let _ = buffer.extend_from_slice(&[
                    (*data_rate << 4) | (*tx_power & 0x0F),
                    mask[0],
                    mask[1],
                    ((*ch_mask_cntl & 0x07) << 4) | (*nb_trans & 0x0F),
                ]);
            }
            MacCommand::LinkADRAns {
                power_ack,
                data_rate_ack,
                channel_mask_ack,
            } => {
                let mut status = 0u8;
                if *power_ack {
                    status |= 0x04;
                }
                if *data_rate_ack {
                    status |= 0x02;
                }
                if *channel_mask_ack {
                    status |= 0x01;
                }
                let _ = buffer.push(status);
            }
        }
        buffer
    }

    /// Get command payload length in bytes
    pub fn len(&self) -> usize {
        match self {
            MacCommand::LinkADRReq { .. } => 4,
            MacCommand::LinkADRAns { .. } => 1,
        }
    }

    /// Whether every request of a LinkADRAns was accepted
    pub fn is_accepted(&self) -> bool {
        match self {
            MacCommand::LinkADRAns {
                power_ack,
                data_rate_ack,
                channel_mask_ack,
            } => *power_ack && *data_rate_ack && *channel_mask_ack,
            MacCommand::LinkADRReq { .. } => false,
        }
    }
}
