//! Emergency blow sequence
//!
//! Blow the ballast and plane up: vent valve open, pump full reverse,
//! rudder neutral, both dive planes full up. Once triggered the
//! sequence stays active until power-off; `run` re-asserts the outputs
//! every cycle in case anything else wrote to the actuators.
//!
//! This is the code that runs when everything else has failed, so
//! nothing in this module panics.

use crate::log::{EventCode, EventSink};
use crate::traits::{Actuators, ServoChannel, SystemControl};
use embedded_hal::delay::DelayNs;

/// Bounded wait in the catastrophic path: 500 cycles of 10 ms
const CATASTROPHIC_WAIT_CYCLES: u32 = 500;
const CATASTROPHIC_CYCLE_MS: u32 = 10;

#[derive(Debug, Clone)]
pub struct EmergencySequence {
    active: bool,
    reason: EventCode,
}

impl Default for EmergencySequence {
    fn default() -> Self {
        Self::new()
    }
}

impl EmergencySequence {
    pub const fn new() -> Self {
        Self {
            active: false,
            reason: EventCode::None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn reason(&self) -> EventCode {
        self.reason
    }

    /// Start the blow. One-way: nothing deactivates it.
    pub fn trigger(
        &mut self,
        reason: EventCode,
        actuators: &mut impl Actuators,
        sink: &mut impl EventSink,
        now_ms: u32,
    ) {
        self.active = true;
        self.reason = reason;

        actuators.open();
        actuators.set_speed(-100);
        actuators.set_position(ServoChannel::Rudder, 0);
        actuators.set_position(ServoChannel::BowPlane, 100);
        actuators.set_position(ServoChannel::SternPlane, 100);

        sink.log(reason, now_ms, 0, 0);
    }

    /// Re-assert the blow outputs; a no-op until triggered
    pub fn run(&mut self, actuators: &mut impl Actuators) {
        if !self.active {
            return;
        }

        actuators.open();
        actuators.set_speed(-100);
        actuators.set_position(ServoChannel::BowPlane, 100);
        actuators.set_position(ServoChannel::SternPlane, 100);
    }
}

/// Last-resort handler for an unrecoverable internal failure
///
/// Starts the blow, holds it for a bounded window of re-assert cycles,
/// then halts; if the sequence somehow never reports active, falls back
/// to a forced watchdog reset. Never returns and never panics: a panic
/// here would re-enter the failure path.
pub fn catastrophic_failure(
    sequence: &mut EmergencySequence,
    actuators: &mut impl Actuators,
    delay: &mut impl DelayNs,
    system: &mut impl SystemControl,
    sink: &mut impl EventSink,
    now_ms: u32,
) -> ! {
    sequence.trigger(EventCode::AssertFail, actuators, sink, now_ms);

    for _ in 0..CATASTROPHIC_WAIT_CYCLES {
        sequence.run(actuators);
        delay.delay_ms(CATASTROPHIC_CYCLE_MS);

        if sequence.is_active() {
            system.halt();
        }
    }

    system.force_reset()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::{EventLog, NullSink};
    use crate::traits::{BallastPump, Servos, VentValve};

    #[derive(Debug, Default)]
    struct RecordedActuators {
        pump_speed: i8,
        valve_open: bool,
        rudder: i8,
        bow_plane: i8,
        stern_plane: i8,
    }

    impl BallastPump for RecordedActuators {
        fn set_speed(&mut self, speed: i8) {
            self.pump_speed = speed;
        }
    }

    impl VentValve for RecordedActuators {
        fn set_open(&mut self, open: bool) {
            self.valve_open = open;
        }
    }

    impl Servos for RecordedActuators {
        fn set_position(&mut self, channel: ServoChannel, position: i8) {
            match channel {
                ServoChannel::Rudder => self.rudder = position,
                ServoChannel::BowPlane => self.bow_plane = position,
                ServoChannel::SternPlane => self.stern_plane = position,
            }
        }
    }

    #[test]
    fn test_trigger_sets_blow_outputs() {
        let mut seq = EmergencySequence::new();
        let mut act = RecordedActuators::default();
        let mut log = EventLog::new();

        assert!(!seq.is_active());
        seq.trigger(EventCode::LeakDetected, &mut act, &mut log, 1000);

        assert!(seq.is_active());
        assert_eq!(seq.reason(), EventCode::LeakDetected);
        assert!(act.valve_open);
        assert_eq!(act.pump_speed, -100);
        assert_eq!(act.rudder, 0);
        assert_eq!(act.bow_plane, 100);
        assert_eq!(act.stern_plane, 100);

        let evt = log.newest(0).unwrap();
        assert_eq!(evt.code, EventCode::LeakDetected);
        assert_eq!(evt.timestamp_ms, 1000);
    }

    #[test]
    fn test_run_is_noop_until_triggered() {
        let mut seq = EmergencySequence::new();
        let mut act = RecordedActuators::default();
        seq.run(&mut act);
        assert_eq!(act.pump_speed, 0);
        assert!(!act.valve_open);
    }

    struct PanicSystem;

    impl SystemControl for PanicSystem {
        fn halt(&mut self) -> ! {
            panic!("halted");
        }

        fn force_reset(&mut self) -> ! {
            panic!("reset");
        }
    }

    struct NoopDelay;

    impl DelayNs for NoopDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    #[test]
    #[should_panic(expected = "halted")]
    fn test_catastrophic_blows_then_halts() {
        let mut seq = EmergencySequence::new();
        let mut act = RecordedActuators::default();
        catastrophic_failure(
            &mut seq,
            &mut act,
            &mut NoopDelay,
            &mut PanicSystem,
            &mut NullSink,
            0,
        );
    }

    #[test]
    fn test_run_reasserts_after_override() {
        let mut seq = EmergencySequence::new();
        let mut act = RecordedActuators::default();
        seq.trigger(EventCode::EmergencyBlow, &mut act, &mut NullSink, 0);

        // Something else writes to the actuators
        act.set_speed(50);
        act.set_open(false);
        act.set_position(ServoChannel::BowPlane, -20);

        seq.run(&mut act);
        assert_eq!(act.pump_speed, -100);
        assert!(act.valve_open);
        assert_eq!(act.bow_plane, 100);
        assert_eq!(act.stern_plane, 100);
    }
}
