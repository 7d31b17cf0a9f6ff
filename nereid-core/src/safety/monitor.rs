//! Safety monitor
//!
//! The 100 Hz watchdog-feeding loop body. Each run checks RC link age,
//! battery voltage, leak, depth, pitch, and the control core heartbeat,
//! maintains the fault flag word, and reports when an emergency blow
//! must start. Signal and battery faults clear themselves when the
//! condition recovers; leak, depth, and pitch faults are sticky. The
//! emergency decision itself is one-way regardless.

use crate::config::{self, SafetyLimits};
use crate::log::{EventCode, EventSink};
use crate::safety::faults::FaultFlags;
use crate::telemetry::SharedState;
use crate::traits::Watchdog;

/// What the caller must act on after one monitor run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetyOutputs {
    /// Reason to start the emergency blow, at most once per boot
    pub trigger: Option<EventCode>,
    /// Heartbeat LED level for this cycle
    pub led_on: bool,
}

pub struct SafetyMonitor<W: Watchdog> {
    watchdog: W,
    limits: SafetyLimits,
    faults: FaultFlags,
    emergency: bool,
    last_heartbeat: u32,
    stall_count: u32,
    last_led_toggle_ms: u32,
    led_on: bool,
}

impl<W: Watchdog> SafetyMonitor<W> {
    pub fn new(watchdog: W) -> Self {
        Self::with_limits(watchdog, SafetyLimits::default())
    }

    pub fn with_limits(watchdog: W, limits: SafetyLimits) -> Self {
        Self {
            watchdog,
            limits,
            faults: FaultFlags::empty(),
            emergency: false,
            last_heartbeat: 0,
            stall_count: 0,
            last_led_toggle_ms: 0,
            led_on: false,
        }
    }

    pub fn faults(&self) -> FaultFlags {
        self.faults
    }

    pub fn is_emergency(&self) -> bool {
        self.emergency
    }

    /// Run one monitor cycle
    ///
    /// The watchdog is fed first, unconditionally: the monitor running
    /// at all is what the watchdog certifies. Battery voltage and the
    /// leak sensor are sampled by the caller because they are wired to
    /// the safety core's peripherals.
    pub fn run(
        &mut self,
        now_ms: u32,
        shared: &SharedState,
        battery_mv: u16,
        leak_wet: bool,
        sink: &mut impl EventSink,
    ) -> SafetyOutputs {
        self.watchdog.feed();

        let mut trigger = None;

        self.check_rc_signal(now_ms, shared, sink);
        self.check_battery(battery_mv, sink);
        self.check_sensors(shared, leak_wet, sink);
        self.check_peer_heartbeat(now_ms, shared, sink, &mut trigger);

        // Any critical fault forces the blow exactly once per boot
        if self.faults.any_critical() && !self.emergency {
            self.emergency = true;
            shared.latch_emergency();
            if trigger.is_none() {
                trigger = Some(EventCode::EmergencyBlow);
            }
        }

        self.update_led(now_ms);

        SafetyOutputs {
            trigger,
            led_on: self.led_on,
        }
    }

    fn check_rc_signal(&mut self, now_ms: u32, shared: &SharedState, sink: &mut impl EventSink) {
        if now_ms.wrapping_sub(shared.last_rc_valid_ms()) > self.limits.signal_timeout_ms {
            if !self.faults.contains(FaultFlags::SIGNAL_LOST) {
                self.faults.set(FaultFlags::SIGNAL_LOST);
                sink.log(EventCode::SignalLost, now_ms, 0, 0);
            }
        } else if self.faults.contains(FaultFlags::SIGNAL_LOST) {
            self.faults.clear(FaultFlags::SIGNAL_LOST);
            sink.log(EventCode::SignalRestored, now_ms, 0, 0);
        }
    }

    fn check_battery(&mut self, battery_mv: u16, sink: &mut impl EventSink) {
        if battery_mv < self.limits.min_battery_mv {
            if !self.faults.contains(FaultFlags::LOW_BATTERY) {
                self.faults.set(FaultFlags::LOW_BATTERY);
                sink.log(
                    EventCode::LowBattery,
                    0,
                    (battery_mv >> 8) as u8,
                    (battery_mv & 0xFF) as u8,
                );
            }
        } else if self.faults.contains(FaultFlags::LOW_BATTERY) {
            self.faults.clear(FaultFlags::LOW_BATTERY);
            sink.log(EventCode::BatteryRestored, 0, 0, 0);
        }
    }

    fn check_sensors(&mut self, shared: &SharedState, leak_wet: bool, sink: &mut impl EventSink) {
        // Leak is sticky: a wet sensor means water got in, drying out
        // later does not make the hull sound again
        if leak_wet && !self.faults.contains(FaultFlags::LEAK) {
            self.faults.set(FaultFlags::LEAK);
            sink.log(EventCode::LeakDetected, 0, 0, 0);
        }

        let depth_cm = shared.depth_cm();
        if depth_cm > self.limits.max_depth_cm && !self.faults.contains(FaultFlags::DEPTH_EXCEEDED)
        {
            self.faults.set(FaultFlags::DEPTH_EXCEEDED);
            sink.log(
                EventCode::DepthExceeded,
                0,
                (depth_cm >> 8) as u8,
                (depth_cm & 0xFF) as u8,
            );
        }

        let pitch_deg = shared.pitch_x10() / 10;
        if pitch_deg.abs() > self.limits.max_pitch_deg
            && !self.faults.contains(FaultFlags::PITCH_EXCEEDED)
        {
            self.faults.set(FaultFlags::PITCH_EXCEEDED);
            sink.log(EventCode::PitchExceeded, 0, pitch_deg as u8, 0);
        }
    }

    fn check_peer_heartbeat(
        &mut self,
        now_ms: u32,
        shared: &SharedState,
        sink: &mut impl EventSink,
        trigger: &mut Option<EventCode>,
    ) {
        let heartbeat = shared.heartbeat();
        if heartbeat == self.last_heartbeat {
            self.stall_count += 1;
            if self.stall_count > config::CORE_STALL_THRESHOLD_TICKS
                && !self.faults.contains(FaultFlags::CORE_STALL)
            {
                self.faults.set(FaultFlags::CORE_STALL);
                sink.log(EventCode::CoreStall, now_ms, 0, 0);
                // A dead control core cannot wait for the mask check:
                // claim the trigger slot with the specific reason
                if !self.emergency {
                    self.emergency = true;
                    shared.latch_emergency();
                    *trigger = Some(EventCode::CoreStall);
                }
            }
        } else {
            self.stall_count = 0;
            self.faults.clear(FaultFlags::CORE_STALL);
        }
        self.last_heartbeat = heartbeat;
    }

    fn update_led(&mut self, now_ms: u32) {
        let blink_ms = if self.emergency {
            config::LED_BLINK_EMERGENCY_MS
        } else {
            config::LED_BLINK_MS
        };
        if now_ms.wrapping_sub(self.last_led_toggle_ms) >= blink_ms {
            self.led_on = !self.led_on;
            self.last_led_toggle_ms = now_ms;
        }
    }
}
