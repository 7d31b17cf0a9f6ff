//! Boat-wide constants and tunable limits
//!
//! Timing, safety thresholds, and controller gains in one place.
//! The firmware reads these directly; tests override via [`SafetyLimits`].

/// Control loop rate on core 1 (Hz)
pub const CONTROL_LOOP_HZ: u32 = 50;
/// Safety loop rate on core 0 (Hz)
pub const SAFETY_LOOP_HZ: u32 = 100;
/// Control loop period in milliseconds
pub const CONTROL_LOOP_MS: u32 = 1000 / CONTROL_LOOP_HZ;
/// Safety loop period in milliseconds
pub const SAFETY_LOOP_MS: u32 = 1000 / SAFETY_LOOP_HZ;

/// Hardware watchdog timeout (ms). Either loop missing its feed for this
/// long forces an unconditional reset.
pub const WATCHDOG_TIMEOUT_MS: u32 = 1000;

/// Depth at which a dive counts as complete (cm)
pub const DIVE_COMPLETE_CM: i32 = 50;
/// Depth at or above which the boat counts as surfaced (cm)
pub const SURFACE_DEPTH_CM: i32 = 10;

/// Depth PID gains
pub const PID_DEPTH_KP: f32 = 2.0;
pub const PID_DEPTH_KI: f32 = 0.1;
pub const PID_DEPTH_KD: f32 = 0.5;
/// Depth controller integral windup limit
pub const PID_DEPTH_INTEGRAL_LIMIT: f32 = 500.0;

/// Pitch PID gains
pub const PID_PITCH_KP: f32 = 1.5;
pub const PID_PITCH_KI: f32 = 0.05;
pub const PID_PITCH_KD: f32 = 0.3;
/// Pitch controller integral windup limit
pub const PID_PITCH_INTEGRAL_LIMIT: f32 = 200.0;

/// Time for the ballast pump to traverse the full -100..+100 range (ms)
pub const BALLAST_FILL_TIME_MS: u32 = 10_000;
/// Ballast level error below which no pump action is taken
pub const BALLAST_LEVEL_TOLERANCE: i16 = 5;

/// How long core 0 waits for the control core's ALIVE word (ms).
/// Should be nearly instant - it is the first thing core 1 does.
pub const PEER_ALIVE_TIMEOUT_MS: u32 = 100;
/// How long core 0 waits for READY (ms). Sensors can be slow on cold boot.
pub const PEER_READY_TIMEOUT_MS: u32 = 5000;

/// Consecutive safety ticks with an unchanged control-loop heartbeat
/// before the peer counts as stalled (10 ticks = 100 ms at 100 Hz)
pub const CORE_STALL_THRESHOLD_TICKS: u32 = 10;

/// Heartbeat LED blink period, normal operation (ms)
pub const LED_BLINK_MS: u32 = 500;
/// Heartbeat LED blink period while the emergency latch is set (ms)
pub const LED_BLINK_EMERGENCY_MS: u32 = 100;

/// Safety thresholds evaluated by the monitor each tick
///
/// Defaults match the deployed boat; tests construct overrides.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SafetyLimits {
    /// RC signal loss timeout (ms)
    pub signal_timeout_ms: u32,
    /// Maximum operating depth (cm)
    pub max_depth_cm: i32,
    /// Maximum pitch excursion (whole degrees, symmetric)
    pub max_pitch_deg: i16,
    /// Minimum battery voltage (mV), 6.4 V for a 2S pack
    pub min_battery_mv: u16,
}

impl Default for SafetyLimits {
    fn default() -> Self {
        Self {
            signal_timeout_ms: 3000,
            max_depth_cm: 300,
            max_pitch_deg: 45,
            min_battery_mv: 6400,
        }
    }
}

impl SafetyLimits {
    /// Maximum pitch in 0.1 degree units, as published in the mailbox
    pub fn max_pitch_x10(&self) -> i16 {
        self.max_pitch_deg * 10
    }
}
