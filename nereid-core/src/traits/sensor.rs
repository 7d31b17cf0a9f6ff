//! Sensor traits and reading types
//!
//! Each reading carries a `valid` flag rather than an error: the control
//! loop runs at a fixed rate whether or not a sensor answered, and a
//! stale-but-flagged reading is more useful there than an `Err`.

/// Number of RC receiver channels
pub const RC_CHANNEL_COUNT: usize = 6;

/// One pressure sensor sample
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DepthReading {
    /// Depth below surface in centimeters
    pub depth_cm: i32,
    pub valid: bool,
}

/// One inertial sample, angles in 0.1 degree units
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AttitudeReading {
    /// Positive = nose up
    pub pitch_x10: i16,
    /// Positive = starboard down
    pub roll_x10: i16,
    pub valid: bool,
}

/// One RC receiver frame
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RcFrame {
    /// Channel pulse widths in microseconds (nominal 1000-2000)
    pub channels: [u16; RC_CHANNEL_COUNT],
    /// Timestamp of the last valid frame (ms since boot)
    pub timestamp_ms: u32,
    pub valid: bool,
}

/// Pressure sensor, read by the control loop
pub trait PressureSensor {
    fn read(&mut self) -> DepthReading;
}

/// Inertial measurement unit, read by the control loop
pub trait Imu {
    fn read(&mut self) -> AttitudeReading;
}

/// RC receiver, read by the control loop
pub trait RcReceiver {
    fn read(&mut self) -> RcFrame;
}

/// Battery voltage monitor, read by the safety loop
pub trait BatteryMonitor {
    fn read_millivolts(&mut self) -> u16;
}

/// Leak detector, read by the safety loop
pub trait LeakSensor {
    fn is_wet(&mut self) -> bool;
}
