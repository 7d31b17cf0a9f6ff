//! Ballast tank controller
//!
//! Four-state machine (Idle / Filling / Draining / Holding) with a
//! time-integrated level estimate. There is no level sensor: the level
//! is dead-reckoned from pump run time against the configured full
//! fill duration, kept in a x1000 fixed-point accumulator so sub-unit
//! progress survives 20 ms update steps.

use crate::config;

/// Internal scale of the level accumulator
const SCALE_X1000: i32 = 1000;
/// Full traversal of the level range in units (-100 to +100)
const FULL_RANGE_UNITS: i32 = 200;

/// Ballast state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BallastState {
    Idle,
    Filling,
    Draining,
    Holding,
}

/// Pump and valve commands produced by one update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BallastOutputs {
    /// -100 (full drain) to +100 (full fill)
    pub pump_speed: i8,
    pub valve_open: bool,
}

impl BallastOutputs {
    /// Safe defaults: pump stopped, valve closed
    pub const SAFE: Self = Self {
        pump_speed: 0,
        valve_open: false,
    };
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BallastController {
    state: BallastState,
    /// -100 (empty) to +100 (full)
    target_level: i8,
    /// Whole-unit estimate derived from the accumulator
    current_level: i8,
    /// Fixed-point level estimate (level x1000)
    current_level_x1000: i32,
    /// Integration time base; None right after a state entry
    last_update_ms: Option<u32>,
    fill_time_ms: u32,
}

impl Default for BallastController {
    fn default() -> Self {
        Self::new()
    }
}

impl BallastController {
    pub fn new() -> Self {
        Self {
            state: BallastState::Idle,
            target_level: 0,
            current_level: 0,
            current_level_x1000: 0,
            last_update_ms: None,
            fill_time_ms: config::BALLAST_FILL_TIME_MS,
        }
    }

    /// Override the full fill duration (test hook and trim option)
    pub fn set_fill_time_ms(&mut self, fill_time_ms: u32) {
        if fill_time_ms == 0 {
            return;
        }
        self.fill_time_ms = fill_time_ms;
    }

    /// Set the desired level, clamped to [-100, 100]
    pub fn set_target(&mut self, level: i8) {
        self.target_level = level.clamp(-100, 100);
    }

    pub fn state(&self) -> BallastState {
        self.state
    }

    pub fn target(&self) -> i8 {
        self.target_level
    }

    pub fn current(&self) -> i8 {
        self.current_level
    }

    /// Run one step of the state machine
    ///
    /// Outputs default to safe values; only an active fill or drain
    /// overrides them.
    pub fn update(&mut self, now_ms: u32) -> BallastOutputs {
        let mut out = BallastOutputs::SAFE;

        let error = self.target_level as i16 - self.current_level as i16;

        match self.state {
            BallastState::Idle => {
                if error.abs() > config::BALLAST_LEVEL_TOLERANCE {
                    if error > 0 {
                        self.state = BallastState::Filling;
                        out.pump_speed = 100;
                        out.valve_open = false;
                    } else {
                        self.state = BallastState::Draining;
                        out.pump_speed = -100;
                        out.valve_open = true;
                    }
                    // Fresh time base; the first Filling/Draining update
                    // only establishes it and advances nothing
                    self.last_update_ms = None;
                }
            }

            BallastState::Filling => {
                out.pump_speed = 100;
                out.valve_open = false;

                self.advance_level(1, now_ms);
                if self.current_level >= self.target_level {
                    self.snap_to_target();
                    self.state = BallastState::Holding;
                }
            }

            BallastState::Draining => {
                out.pump_speed = -100;
                out.valve_open = true;

                self.advance_level(-1, now_ms);
                if self.current_level <= self.target_level {
                    self.snap_to_target();
                    self.state = BallastState::Holding;
                }
            }

            BallastState::Holding => {
                // Drift beyond twice the tolerance re-engages the pump
                if error.abs() > config::BALLAST_LEVEL_TOLERANCE * 2 {
                    self.state = BallastState::Idle;
                }
            }
        }

        out
    }

    /// Integrate the level estimate in the given direction
    fn advance_level(&mut self, direction: i32, now_ms: u32) {
        let Some(last_ms) = self.last_update_ms else {
            // First call after a state entry: establish the time base
            // so a stale timestamp can't produce a huge spurious delta
            self.last_update_ms = Some(now_ms);
            return;
        };

        let dt_ms = now_ms.wrapping_sub(last_ms);
        self.last_update_ms = Some(now_ms);

        // Clamp dt to the full fill time: a long stall advances the
        // estimate at most one full traversal, never past it
        let dt_clamped = dt_ms.min(self.fill_time_ms);

        let delta = ((dt_clamped as u64 * (FULL_RANGE_UNITS * SCALE_X1000) as u64)
            / self.fill_time_ms as u64) as i32;

        self.current_level_x1000 = (self.current_level_x1000 + direction * delta)
            .clamp(-100 * SCALE_X1000, 100 * SCALE_X1000);
        self.current_level = (self.current_level_x1000 / SCALE_X1000) as i8;
    }

    /// Land exactly on the target so Holding sees zero error
    fn snap_to_target(&mut self) {
        self.current_level = self.target_level;
        self.current_level_x1000 = self.target_level as i32 * SCALE_X1000;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_init_defaults() {
        let ctrl = BallastController::new();
        assert_eq!(ctrl.state(), BallastState::Idle);
        assert_eq!(ctrl.target(), 0);
        assert_eq!(ctrl.current(), 0);
    }

    #[test]
    fn test_set_target_clamps() {
        let mut ctrl = BallastController::new();
        ctrl.set_target(120);
        assert_eq!(ctrl.target(), 100);
        ctrl.set_target(-120);
        assert_eq!(ctrl.target(), -100);
    }

    #[test]
    fn test_idle_within_tolerance_stays_idle() {
        let mut ctrl = BallastController::new();
        ctrl.set_target(5);
        let out = ctrl.update(0);
        assert_eq!(ctrl.state(), BallastState::Idle);
        assert_eq!(out, BallastOutputs::SAFE);
    }

    #[test]
    fn test_idle_commands_fill() {
        let mut ctrl = BallastController::new();
        ctrl.set_target(50);
        let out = ctrl.update(0);
        assert_eq!(ctrl.state(), BallastState::Filling);
        assert_eq!(out.pump_speed, 100);
        assert!(!out.valve_open);
    }

    #[test]
    fn test_idle_commands_drain() {
        let mut ctrl = BallastController::new();
        ctrl.set_target(-50);
        let out = ctrl.update(0);
        assert_eq!(ctrl.state(), BallastState::Draining);
        assert_eq!(out.pump_speed, -100);
        assert!(out.valve_open);
    }

    #[test]
    fn test_first_update_after_entry_only_sets_time_base() {
        let mut ctrl = BallastController::new();
        ctrl.set_target(100);
        ctrl.update(0); // Idle -> Filling
        ctrl.update(1000); // establishes the time base only
        assert_eq!(ctrl.current(), 0);
        ctrl.update(2000); // now 1000 ms of fill = 20 units
        assert_eq!(ctrl.current(), 20);
    }

    #[test]
    fn test_half_traversal_reaches_half_range() {
        // Fill rate is 200 units per 10 s; 2.5 s of integration moves
        // the estimate 50 units and the fill is still in progress
        let mut ctrl = BallastController::new();
        ctrl.set_target(100);
        ctrl.update(0); // Idle -> Filling
        ctrl.update(0); // time base at t=0
        ctrl.update(2500);
        assert_eq!(ctrl.state(), BallastState::Filling);
        assert!((48..=52).contains(&ctrl.current()));
    }

    #[test]
    fn test_reaches_target_and_holds_exactly() {
        let mut ctrl = BallastController::new();
        ctrl.set_target(10);
        ctrl.update(0); // -> Filling
        ctrl.update(1000); // time base
        ctrl.update(3000); // 2000 ms = 40 units, overshoots 10
        assert_eq!(ctrl.state(), BallastState::Holding);
        assert_eq!(ctrl.current(), 10);

        // Holding outputs are safe
        let out = ctrl.update(4000);
        assert_eq!(out, BallastOutputs::SAFE);
    }

    #[test]
    fn test_stall_delta_clamped_to_fill_time() {
        let mut ctrl = BallastController::new();
        ctrl.set_target(-100);
        ctrl.update(0); // -> Draining
        ctrl.update(10); // time base
        // An hour-long stall still drains at most one full traversal
        ctrl.update(3_600_000);
        assert_eq!(ctrl.current(), -100);
        assert_eq!(ctrl.state(), BallastState::Holding);
    }

    #[test]
    fn test_holding_reengages_past_double_tolerance() {
        let mut ctrl = BallastController::new();
        ctrl.set_target(10);
        ctrl.update(0);
        ctrl.update(1000);
        ctrl.update(3000);
        assert_eq!(ctrl.state(), BallastState::Holding);

        // Move the target just past 2x tolerance from current
        ctrl.set_target(21);
        ctrl.update(4000);
        assert_eq!(ctrl.state(), BallastState::Idle);
    }

    proptest! {
        #[test]
        fn prop_level_always_bounded(
            target in -100i8..=100,
            step_ms in 1u32..5000,
            steps in 1u32..60,
        ) {
            let mut ctrl = BallastController::new();
            ctrl.set_target(target);
            let mut now = 0u32;
            for _ in 0..steps {
                ctrl.update(now);
                prop_assert!((-100..=100).contains(&ctrl.current()));
                now += step_ms;
            }
        }

        #[test]
        fn prop_repeated_updates_reach_target(target in -100i8..=100) {
            let mut ctrl = BallastController::new();
            ctrl.set_target(target);
            // 30 s of 100 ms steps covers any traversal plus settling
            for i in 1..=300u32 {
                ctrl.update(i * 100);
            }
            if (target as i16).abs() > crate::config::BALLAST_LEVEL_TOLERANCE {
                prop_assert_eq!(ctrl.state(), BallastState::Holding);
                prop_assert_eq!(ctrl.current(), target);
            } else {
                prop_assert_eq!(ctrl.state(), BallastState::Idle);
            }
        }
    }
}
