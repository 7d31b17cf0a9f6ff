//! Dive state machine
//!
//! Ballast and depth-hold behavior is a function of the current state,
//! the operator command, and the measured depth. Emergency is absorbing:
//! once entered, only a reboot leaves it.

use super::command::Command;
use crate::config;

/// Depth at or above which a dive counts as complete (cm)
const DIVE_COMPLETE_CM: i32 = config::DIVE_COMPLETE_CM;
/// Depth at or below which the vehicle counts as surfaced (cm)
const SURFACE_DEPTH_CM: i32 = config::SURFACE_DEPTH_CM;

/// Vehicle mission states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DiveState {
    /// Power-on, before the first process() call
    Init,
    /// At the surface, ballast empty
    Surface,
    /// Descending toward the target depth
    Diving,
    /// At depth, planes under direct operator control
    SubmergedManual,
    /// At depth, closed-loop depth hold active
    SubmergedDepthHold,
    /// Ascending, ballast draining
    Surfacing,
    /// Emergency blow latched; absorbing
    Emergency,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DiveStateMachine {
    state: DiveState,
    target_depth_cm: i32,
    state_start_ms: u32,
    ballast_target_level: i8,
    depth_hold_enabled: bool,
}

impl Default for DiveStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl DiveStateMachine {
    pub fn new() -> Self {
        Self {
            state: DiveState::Init,
            target_depth_cm: 0,
            state_start_ms: 0,
            ballast_target_level: -100,
            depth_hold_enabled: false,
        }
    }

    /// Set the depth a Dive command descends toward
    ///
    /// Rejected outside [0, max depth].
    pub fn set_target_depth(&mut self, depth_cm: i32) {
        if depth_cm < 0 || depth_cm > crate::config::SafetyLimits::default().max_depth_cm {
            return;
        }
        self.target_depth_cm = depth_cm;
    }

    pub fn state(&self) -> DiveState {
        self.state
    }

    pub fn target_depth_cm(&self) -> i32 {
        self.target_depth_cm
    }

    /// Ballast level the current state wants
    pub fn ballast_target(&self) -> i8 {
        self.ballast_target_level
    }

    /// Whether the depth controller should be engaged
    pub fn depth_hold_enabled(&self) -> bool {
        self.depth_hold_enabled
    }

    /// Force the Emergency state regardless of current state
    pub fn trigger_emergency(&mut self) {
        self.state = DiveState::Emergency;
        self.set_outputs(-100, false);
    }

    /// Run one state machine step
    pub fn process(&mut self, cmd: Command, depth_cm: i32, now_ms: u32) {
        if cmd == Command::Emergency {
            self.trigger_emergency();
            return;
        }

        match self.state {
            DiveState::Init => {
                self.enter(DiveState::Surface, now_ms);
                self.set_outputs(-100, false);
            }

            DiveState::Surface => {
                self.set_outputs(-100, false);
                if cmd == Command::Dive && self.target_depth_cm > 0 {
                    self.enter(DiveState::Diving, now_ms);
                    self.set_outputs(50, false);
                }
            }

            DiveState::Diving => {
                self.set_outputs(50, false);
                if cmd == Command::Surface {
                    self.enter(DiveState::Surfacing, now_ms);
                    self.set_outputs(-100, false);
                } else if depth_cm >= DIVE_COMPLETE_CM {
                    self.enter(DiveState::SubmergedManual, now_ms);
                    self.set_outputs(0, false);
                }
            }

            DiveState::SubmergedManual => {
                self.set_outputs(0, false);
                if cmd == Command::Surface {
                    self.enter(DiveState::Surfacing, now_ms);
                    self.set_outputs(-100, false);
                } else if cmd == Command::DepthHold {
                    // Hold the depth the vehicle is at right now
                    self.state = DiveState::SubmergedDepthHold;
                    self.set_target_depth(depth_cm);
                    self.set_outputs(0, true);
                }
            }

            DiveState::SubmergedDepthHold => {
                self.set_outputs(0, true);
                if cmd == Command::Surface {
                    self.enter(DiveState::Surfacing, now_ms);
                    self.set_outputs(-100, false);
                } else if cmd == Command::Manual {
                    self.enter(DiveState::SubmergedManual, now_ms);
                    self.set_outputs(0, false);
                }
            }

            DiveState::Surfacing => {
                // Surfacing ignores everything but Emergency until shallow
                self.set_outputs(-100, false);
                if depth_cm <= SURFACE_DEPTH_CM {
                    self.enter(DiveState::Surface, now_ms);
                }
            }

            DiveState::Emergency => {}
        }
    }

    fn enter(&mut self, state: DiveState, now_ms: u32) {
        self.state = state;
        self.state_start_ms = now_ms;
    }

    fn set_outputs(&mut self, ballast_level: i8, depth_hold: bool) {
        self.ballast_target_level = ballast_level;
        self.depth_hold_enabled = depth_hold;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_goes_to_surface() {
        let mut sm = DiveStateMachine::new();
        assert_eq!(sm.state(), DiveState::Init);
        sm.process(Command::None, 0, 0);
        assert_eq!(sm.state(), DiveState::Surface);
        assert_eq!(sm.ballast_target(), -100);
        assert!(!sm.depth_hold_enabled());
    }

    #[test]
    fn test_dive_requires_target_depth() {
        let mut sm = DiveStateMachine::new();
        sm.process(Command::None, 0, 0);
        // No target set yet: Dive is ignored
        sm.process(Command::Dive, 0, 10);
        assert_eq!(sm.state(), DiveState::Surface);

        sm.set_target_depth(100);
        sm.process(Command::Dive, 0, 20);
        assert_eq!(sm.state(), DiveState::Diving);
        assert_eq!(sm.ballast_target(), 50);
    }

    #[test]
    fn test_dive_completes_at_depth() {
        let mut sm = DiveStateMachine::new();
        sm.process(Command::None, 0, 0);
        sm.set_target_depth(100);
        sm.process(Command::Dive, 0, 10);
        assert_eq!(sm.state(), DiveState::Diving);
        assert_eq!(sm.ballast_target(), 50);

        // Still shallow: keep diving
        sm.process(Command::None, 40, 15);
        assert_eq!(sm.state(), DiveState::Diving);

        sm.process(Command::None, 60, 20);
        assert_eq!(sm.state(), DiveState::SubmergedManual);
        assert_eq!(sm.ballast_target(), 0);
        assert!(!sm.depth_hold_enabled());
    }

    #[test]
    fn test_depth_hold_captures_current_depth() {
        let mut sm = DiveStateMachine::new();
        sm.process(Command::None, 0, 0);
        sm.set_target_depth(150);
        sm.process(Command::Dive, 0, 10);
        sm.process(Command::None, 150, 20);
        assert_eq!(sm.state(), DiveState::SubmergedManual);

        // Drifted to 142 cm by the time the operator asks for hold
        sm.process(Command::DepthHold, 142, 30);
        assert_eq!(sm.state(), DiveState::SubmergedDepthHold);
        assert_eq!(sm.target_depth_cm(), 142);
        assert!(sm.depth_hold_enabled());

        sm.process(Command::Manual, 142, 40);
        assert_eq!(sm.state(), DiveState::SubmergedManual);
        assert!(!sm.depth_hold_enabled());
    }

    #[test]
    fn test_surface_command_from_submerged_states() {
        for setup in [Command::None, Command::DepthHold] {
            let mut sm = DiveStateMachine::new();
            sm.process(Command::None, 0, 0);
            sm.set_target_depth(100);
            sm.process(Command::Dive, 0, 10);
            sm.process(Command::None, 100, 20);
            sm.process(setup, 100, 30);

            sm.process(Command::Surface, 100, 40);
            assert_eq!(sm.state(), DiveState::Surfacing);
            assert_eq!(sm.ballast_target(), -100);
            assert!(!sm.depth_hold_enabled());
        }
    }

    #[test]
    fn test_surfacing_completes_when_shallow() {
        let mut sm = DiveStateMachine::new();
        sm.process(Command::None, 0, 0);
        sm.set_target_depth(100);
        sm.process(Command::Dive, 0, 10);
        sm.process(Command::Surface, 30, 20);
        assert_eq!(sm.state(), DiveState::Surfacing);

        // Commands other than Emergency are ignored on the way up
        sm.process(Command::Dive, 25, 30);
        assert_eq!(sm.state(), DiveState::Surfacing);

        sm.process(Command::None, 8, 40);
        assert_eq!(sm.state(), DiveState::Surface);
    }

    #[test]
    fn test_emergency_from_any_state_is_absorbing() {
        let mut sm = DiveStateMachine::new();
        sm.process(Command::None, 0, 0);
        sm.set_target_depth(100);
        sm.process(Command::Dive, 0, 10);
        sm.process(Command::Emergency, 30, 20);
        assert_eq!(sm.state(), DiveState::Emergency);
        assert_eq!(sm.ballast_target(), -100);
        assert!(!sm.depth_hold_enabled());

        // Nothing leaves Emergency
        for cmd in [
            Command::None,
            Command::Dive,
            Command::Surface,
            Command::DepthHold,
            Command::Manual,
            Command::Emergency,
        ] {
            sm.process(cmd, 0, 100);
            assert_eq!(sm.state(), DiveState::Emergency);
            assert_eq!(sm.ballast_target(), -100);
        }
    }

    #[test]
    fn test_trigger_emergency_direct() {
        let mut sm = DiveStateMachine::new();
        sm.process(Command::None, 0, 0);
        sm.trigger_emergency();
        assert_eq!(sm.state(), DiveState::Emergency);
        assert_eq!(sm.ballast_target(), -100);
    }

    #[test]
    fn test_set_target_depth_rejects_out_of_range() {
        let mut sm = DiveStateMachine::new();
        sm.set_target_depth(100);
        sm.set_target_depth(-5);
        assert_eq!(sm.target_depth_cm(), 100);
        sm.set_target_depth(10_000);
        assert_eq!(sm.target_depth_cm(), 100);
    }
}
