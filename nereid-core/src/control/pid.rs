//! PID controller
//!
//! Plain-f32 PID with integral anti-windup and selectable derivative
//! mode. Derivative-on-measurement is the default: differentiating the
//! measurement instead of the error suppresses the output kick when the
//! setpoint steps (a depth-hold engage would otherwise slam the pump).

/// PID controller state
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pid {
    // Gains
    kp: f32,
    ki: f32,
    kd: f32,

    // State
    integral: f32,
    prev_error: f32,
    prev_measurement: f32,

    // Limits
    integral_limit: f32,
    output_min: f32,
    output_max: f32,

    derivative_on_measurement: bool,
}

impl Pid {
    /// Create a controller with the given gains
    ///
    /// Output bounds default to [-100, 100], integral limit to 1000,
    /// derivative-on-measurement enabled.
    pub fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self {
            kp,
            ki,
            kd,
            integral: 0.0,
            prev_error: 0.0,
            prev_measurement: 0.0,
            integral_limit: 1000.0,
            output_min: -100.0,
            output_max: 100.0,
            derivative_on_measurement: true,
        }
    }

    /// Set output bounds and the integral windup limit
    ///
    /// No-op when `min >= max`.
    pub fn set_limits(&mut self, min: f32, max: f32, integral_limit: f32) {
        if min >= max {
            return;
        }
        self.output_min = min;
        self.output_max = max;
        self.integral_limit = integral_limit;
    }

    /// Select derivative mode (true = on measurement, false = on error)
    pub fn set_derivative_on_measurement(&mut self, on_measurement: bool) {
        self.derivative_on_measurement = on_measurement;
    }

    /// Run one controller step; `dt` in seconds
    ///
    /// Returns 0.0 without touching state when `dt <= 0`.
    pub fn update(&mut self, setpoint: f32, measurement: f32, dt: f32) -> f32 {
        if dt <= 0.0 {
            return 0.0;
        }

        let error = setpoint - measurement;

        let p_term = self.kp * error;

        self.integral += error * dt;
        self.integral = self
            .integral
            .clamp(-self.integral_limit, self.integral_limit);
        let i_term = self.ki * self.integral;

        let d_term = if self.derivative_on_measurement {
            -self.kd * (measurement - self.prev_measurement) / dt
        } else {
            self.kd * (error - self.prev_error) / dt
        };

        self.prev_error = error;
        self.prev_measurement = measurement;

        (p_term + i_term + d_term).clamp(self.output_min, self.output_max)
    }

    /// Clear accumulated state; gains and limits stay
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
        self.prev_measurement = 0.0;
    }

    /// Current integral accumulator (for diagnostics)
    pub fn integral(&self) -> f32 {
        self.integral
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn test_proportional_only() {
        // kp=2, setpoint=50, measurement=40 -> P = 2 * 10 = 20
        let mut pid = Pid::new(2.0, 0.0, 0.0);
        let out = pid.update(50.0, 40.0, 0.02);
        assert!((out - 20.0).abs() < EPSILON);
    }

    #[test]
    fn test_rejects_nonpositive_dt() {
        let mut pid = Pid::new(2.0, 1.0, 0.0);
        assert_eq!(pid.update(50.0, 40.0, 0.0), 0.0);
        assert_eq!(pid.update(50.0, 40.0, -0.02), 0.0);
        assert_eq!(pid.integral(), 0.0);
        // A following valid step integrates exactly one interval
        let out = pid.update(50.0, 40.0, 1.0);
        assert!((out - (20.0 + 10.0)).abs() < EPSILON);
        assert!((pid.integral() - 10.0).abs() < EPSILON);
    }

    #[test]
    fn test_set_limits_rejects_inverted_bounds() {
        let mut pid = Pid::new(100.0, 0.0, 0.0);
        pid.set_limits(50.0, -50.0, 10.0);
        // Default bounds still in force
        let out = pid.update(100.0, 0.0, 0.02);
        assert!((out - 100.0).abs() < EPSILON);
    }

    #[test]
    fn test_derivative_on_measurement_no_setpoint_kick() {
        let mut pid = Pid::new(0.0, 0.0, 1.0);
        pid.update(0.0, 10.0, 0.1);
        // Setpoint steps, measurement steady: derivative stays zero
        let out = pid.update(50.0, 10.0, 0.1);
        assert!(out.abs() < EPSILON);
    }

    #[test]
    fn test_derivative_on_error_sees_setpoint_step() {
        let mut pid = Pid::new(0.0, 0.0, 1.0);
        pid.set_derivative_on_measurement(false);
        pid.update(0.0, 10.0, 0.1);
        let out = pid.update(50.0, 10.0, 0.1);
        assert!(out.abs() > EPSILON);
    }

    #[test]
    fn test_reset_clears_state_keeps_gains() {
        let mut pid = Pid::new(2.0, 1.0, 0.0);
        pid.update(50.0, 40.0, 0.5);
        assert!(pid.integral().abs() > EPSILON);

        pid.reset();
        assert_eq!(pid.integral(), 0.0);

        // Gains survive: pure-P response unchanged
        let out = pid.update(50.0, 40.0, 0.001);
        assert!(out > 19.0);
    }

    proptest! {
        #[test]
        fn prop_output_always_bounded(
            setpoint in -1000.0f32..1000.0,
            measurement in -1000.0f32..1000.0,
            dt in 0.001f32..1.0,
            steps in 1usize..50,
        ) {
            let mut pid = Pid::new(2.0, 0.5, 0.1);
            for _ in 0..steps {
                let out = pid.update(setpoint, measurement, dt);
                prop_assert!((-100.0..=100.0).contains(&out));
                prop_assert!(pid.integral().abs() <= 1000.0);
            }
        }

        #[test]
        fn prop_integral_respects_custom_limit(
            error in 1.0f32..500.0,
            steps in 1usize..100,
        ) {
            let mut pid = Pid::new(0.0, 1.0, 0.0);
            pid.set_limits(-100.0, 100.0, 50.0);
            for _ in 0..steps {
                pid.update(error, 0.0, 0.1);
            }
            prop_assert!(pid.integral().abs() <= 50.0);
        }
    }
}
