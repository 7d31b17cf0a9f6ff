//! Depth controller
//!
//! Wraps a [`Pid`] tuned for depth hold. The output is a ballast level
//! command: positive error (too shallow) commands fill, negative
//! commands drain.

use super::pid::Pid;
use crate::config;

#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DepthController {
    pid: Pid,
    target_depth_cm: i32,
    enabled: bool,
}

impl Default for DepthController {
    fn default() -> Self {
        Self::new()
    }
}

impl DepthController {
    pub fn new() -> Self {
        let mut pid = Pid::new(
            config::PID_DEPTH_KP,
            config::PID_DEPTH_KI,
            config::PID_DEPTH_KD,
        );
        pid.set_limits(-100.0, 100.0, config::PID_DEPTH_INTEGRAL_LIMIT);

        Self {
            pid,
            target_depth_cm: 0,
            enabled: false,
        }
    }

    /// Set the hold depth; values outside 0..=max depth are dropped
    pub fn set_target(&mut self, depth_cm: i32) {
        if !(0..=config::SafetyLimits::default().max_depth_cm).contains(&depth_cm) {
            return;
        }
        self.target_depth_cm = depth_cm;
    }

    pub fn target(&self) -> i32 {
        self.target_depth_cm
    }

    /// Enable or disable the controller
    ///
    /// The false-to-true edge resets the PID so integral accumulated
    /// while disabled cannot carry over into the first enabled cycle.
    pub fn enable(&mut self, enable: bool) {
        if enable && !self.enabled {
            self.pid.reset();
        }
        self.enabled = enable;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Compute the ballast command for the current depth; `dt` in seconds.
    /// Returns 0 while disabled.
    pub fn update(&mut self, current_depth_cm: i32, dt: f32) -> i8 {
        if !self.enabled {
            return 0;
        }

        let output = self.pid.update(
            self.target_depth_cm as f32,
            current_depth_cm as f32,
            dt,
        );

        // Positive = too shallow = fill ballast to sink
        output as i8
    }
}
