//! Mission state machine
//!
//! Tracks the vehicle's high-level mode (surfaced, diving, submerged,
//! surfacing, emergency) and derives the ballast target and depth-hold
//! enable from it.

pub mod command;
pub mod machine;

pub use command::Command;
pub use machine::{DiveState, DiveStateMachine};
