//! Cross-core shared statics
//!
//! Core 1 publishes telemetry into the mailbox; core 0 reads it every
//! safety tick. The actuator bank normally belongs to the control
//! loop, but the safety core takes it away for good when an emergency
//! triggers.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use nereid_core::log::{EventCode, EventLog, EventSink};
use nereid_core::telemetry::SharedState;

use crate::drivers::actuators::ActuatorBank;

/// Telemetry mailbox, written by core 1, read by core 0
pub static SHARED: SharedState = SharedState::new();

/// Actuator bank. `None` once the safety core has seized it.
pub static ACTUATORS: Mutex<CriticalSectionRawMutex, RefCell<Option<ActuatorBank>>> =
    Mutex::new(RefCell::new(None));

/// Event log ring, written from both cores
pub static EVENTS: Mutex<CriticalSectionRawMutex, RefCell<EventLog>> =
    Mutex::new(RefCell::new(EventLog::new()));

/// [`EventSink`] over the shared log, with a defmt echo of each event
pub struct SharedEventSink;

impl EventSink for SharedEventSink {
    fn log(&mut self, code: EventCode, timestamp_ms: u32, param1: u8, param2: u8) {
        defmt::info!(
            "event {:?} t={=u32}ms p1={=u8} p2={=u8}",
            code,
            timestamp_ms,
            param1,
            param2
        );
        EVENTS.lock(|log| log.borrow_mut().log(code, timestamp_ms, param1, param2));
    }
}
