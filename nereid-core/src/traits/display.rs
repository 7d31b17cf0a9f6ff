//! Status display trait
//!
//! Presentation only - nothing on the display feeds back into control.
//! The firmware's implementation may be a real panel or just defmt.

/// Boot stages shown during the handshake
///
/// The numeric values double as the inter-core progress codes: core 1
/// pushes `stage as u32` into the FIFO as it initializes each sensor.
/// Values between `Pressure` and `Leak` inclusive are the reserved
/// progress-code range; everything else on the wire is a sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum BootStage {
    Core1 = 0,
    Pressure = 1,
    Imu = 2,
    RcInput = 3,
    Battery = 4,
    Leak = 5,
    Complete = 6,
}

impl BootStage {
    /// Decode a FIFO word as a progress code, if it is one
    pub fn from_progress_code(word: u32) -> Option<Self> {
        match word {
            1 => Some(Self::Pressure),
            2 => Some(Self::Imu),
            3 => Some(Self::RcInput),
            4 => Some(Self::Battery),
            5 => Some(Self::Leak),
            _ => None,
        }
    }
}

/// Faults worth a dedicated "do not dive" screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultScreen {
    PeerCoreFailed,
    InitTimeout,
    InitFailed,
}

/// Status display, driven from the safety core
pub trait BootDisplay {
    /// Show boot progress for a stage; `done` marks it as passed
    fn boot_progress(&mut self, stage: BootStage, done: bool);

    /// Show a fault screen
    fn fault(&mut self, fault: FaultScreen);

    /// Show the emergency screen
    fn emergency(&mut self);
}
