//! Pitch controller
//!
//! Wraps a [`Pid`] tuned for trim. Angles are in 0.1 degree units
//! throughout (the IMU's native resolution). Positive output is a
//! nose-up command for the dive planes.

use super::pid::Pid;
use crate::config;

#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PitchController {
    pid: Pid,
    target_pitch_x10: i16,
    enabled: bool,
}

impl Default for PitchController {
    fn default() -> Self {
        Self::new()
    }
}

impl PitchController {
    pub fn new() -> Self {
        let mut pid = Pid::new(
            config::PID_PITCH_KP,
            config::PID_PITCH_KI,
            config::PID_PITCH_KD,
        );
        pid.set_limits(-100.0, 100.0, config::PID_PITCH_INTEGRAL_LIMIT);

        Self {
            pid,
            target_pitch_x10: 0,
            // Trim runs whenever the boat is submerged, so default on
            enabled: true,
        }
    }

    /// Set the trim target; values beyond the pitch excursion limit are dropped
    pub fn set_target(&mut self, pitch_x10: i16) {
        let limit = config::SafetyLimits::default().max_pitch_x10();
        if !(-limit..=limit).contains(&pitch_x10) {
            return;
        }
        self.target_pitch_x10 = pitch_x10;
    }

    pub fn target(&self) -> i16 {
        self.target_pitch_x10
    }

    /// Enable or disable trim; the false-to-true edge resets the PID
    pub fn enable(&mut self, enable: bool) {
        if enable && !self.enabled {
            self.pid.reset();
        }
        self.enabled = enable;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Compute the plane command for the current pitch; `dt` in seconds.
    /// Returns 0 while disabled.
    pub fn update(&mut self, current_pitch_x10: i16, dt: f32) -> i8 {
        if !self.enabled {
            return 0;
        }

        let output = self.pid.update(
            self.target_pitch_x10 as f32,
            current_pitch_x10 as f32,
            dt,
        );

        // Nose down (negative pitch) gives positive error = nose-up command
        output as i8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_by_default() {
        assert!(PitchController::new().is_enabled());
    }

    #[test]
    fn test_target_validation() {
        let mut ctrl = PitchController::new();
        ctrl.set_target(200);
        assert_eq!(ctrl.target(), 200);
        ctrl.set_target(500); // beyond ±45.0 degrees
        assert_eq!(ctrl.target(), 200);
        ctrl.set_target(-500);
        assert_eq!(ctrl.target(), 200);
    }

    #[test]
    fn test_nose_down_commands_nose_up() {
        let mut ctrl = PitchController::new();
        // Level target, reading 10.0 degrees nose down, measurement on
        // its second sample so the derivative term is settled
        ctrl.update(-100, 0.02);
        assert!(ctrl.update(-100, 0.02) > 0);
    }

    #[test]
    fn test_disabled_outputs_zero() {
        let mut ctrl = PitchController::new();
        ctrl.enable(false);
        assert_eq!(ctrl.update(-100, 0.02), 0);
    }
}
