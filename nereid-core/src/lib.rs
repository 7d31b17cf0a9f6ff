//! Board-agnostic core logic for the Nereid submersible controller
//!
//! This crate contains all control and safety logic that does not depend
//! on specific hardware implementations:
//!
//! - Hardware abstraction traits (actuators, sensors, watchdog, FIFO)
//! - PID engine and the depth/pitch controllers built on it
//! - Ballast fill/drain state machine
//! - Dive state machine (mission modes)
//! - Safety monitor, emergency blow sequence, catastrophic-failure path
//! - Two-stage inter-core boot handshake
//! - Cross-core telemetry mailbox and the event log
//!
//! The firmware crate wires these to RP2040 peripherals; everything here
//! runs on the host for testing.

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod control;
pub mod log;
pub mod safety;
pub mod state;
pub mod telemetry;
pub mod traits;
