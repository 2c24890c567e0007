/// Lowest LoRa spreading factor
pub const MIN_SPREADING_FACTOR: u8 = 7;

/// Highest LoRa spreading factor
pub const MAX_SPREADING_FACTOR: u8 = 12;

/// Data rate identifier (EU868, 125 kHz LoRa channels)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DataRate {
    /// DR0
    SF12BW125,
    /// DR1
    SF11BW125,
    /// DR2
    SF10BW125,
    /// DR3
    SF9BW125,
    /// DR4
    SF8BW125,
    /// DR5
    SF7BW125,
}

impl DataRate {
    /// Get the data rate for a data rate index
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(DataRate::SF12BW125),
            1 => Some(DataRate::SF11BW125),
            2 => Some(DataRate::SF10BW125),
            3 => Some(DataRate::SF9BW125),
            4 => Some(DataRate::SF8BW125),
            5 => Some(DataRate::SF7BW125),
            _ => None,
        }
    }

    /// Get the data rate for a spreading factor (DR = 12 - SF)
    pub fn from_spreading_factor(sf: u8) -> Option<Self> {
        if !(MIN_SPREADING_FACTOR..=MAX_SPREADING_FACTOR).contains(&sf) {
            return None;
        }
        Self::from_index(MAX_SPREADING_FACTOR - sf)
    }

    /// Get data rate index
    pub fn index(&self) -> u8 {
        *self as u8
    }

    /// Get spreading factor
    pub fn spreading_factor(&self) -> u8 {
        MAX_SPREADING_FACTOR - self.index()
    }

    /// Get bandwidth in Hz
    pub fn bandwidth(&self) -> u32 {
        125_000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spreading_factor_mapping() {
        assert_eq!(DataRate::from_spreading_factor(7), Some(DataRate::SF7BW125));
        assert_eq!(DataRate::from_spreading_factor(12), Some(DataRate::SF12BW125));
        assert_eq!(DataRate::SF7BW125.index(), 5);
        assert_eq!(DataRate::SF12BW125.index(), 0);
        assert_eq!(DataRate::SF9BW125.spreading_factor(), 9);
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(DataRate::from_spreading_factor(6), None);
        assert_eq!(DataRate::from_spreading_factor(13), None);
        assert_eq!(DataRate::from_index(6), None);
    }
}
