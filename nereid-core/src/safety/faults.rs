//! Fault flag word
//!
//! A u16 bitfield shared in spirit with the telemetry mailbox: each
//! bit is one monitored condition. Bits 0..=4 plus the core-stall bit
//! together form the critical mask that forces an emergency blow.

/// Set of active fault conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaultFlags(u16);

impl FaultFlags {
    /// No valid RC frame within the signal timeout
    pub const SIGNAL_LOST: u16 = 1 << 0;
    /// Battery below the minimum voltage
    pub const LOW_BATTERY: u16 = 1 << 1;
    /// Hull leak sensor wet
    pub const LEAK: u16 = 1 << 2;
    /// Depth beyond the configured maximum
    pub const DEPTH_EXCEEDED: u16 = 1 << 3;
    /// Pitch beyond the configured maximum
    pub const PITCH_EXCEEDED: u16 = 1 << 4;
    /// Control core heartbeat stopped
    pub const CORE_STALL: u16 = 1 << 8;

    /// Every fault that forces an emergency blow
    pub const CRITICAL_MASK: u16 = Self::SIGNAL_LOST
        | Self::LOW_BATTERY
        | Self::LEAK
        | Self::DEPTH_EXCEEDED
        | Self::PITCH_EXCEEDED
        | Self::CORE_STALL;

    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn set(&mut self, bit: u16) {
        self.0 |= bit;
    }

    pub fn clear(&mut self, bit: u16) {
        self.0 &= !bit;
    }

    pub fn contains(&self, bit: u16) -> bool {
        self.0 & bit != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Whether any blow-forcing fault is active
    pub fn any_critical(&self) -> bool {
        self.0 & Self::CRITICAL_MASK != 0
    }

    pub fn raw(&self) -> u16 {
        self.0
    }
}
