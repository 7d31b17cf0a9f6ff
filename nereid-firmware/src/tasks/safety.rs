//! Core 0: safety supervision at 100 Hz
//!
//! Owns the hardware watchdog. Waits for the control core's boot
//! handshake, then runs fault checks every 10 ms and fires the
//! emergency blow when the monitor asks for it.

use defmt::*;
use embassy_time::{Delay, Duration, Instant, Ticker};
use nereid_core::config::{SAFETY_LOOP_MS, WATCHDOG_TIMEOUT_MS};
use nereid_core::safety::{catastrophic_failure, handshake, EmergencySequence, HandshakeResult};
use nereid_core::safety::SafetyMonitor;
use nereid_core::traits::{BatteryMonitor, BootDisplay, BootStage, LeakSensor, StatusLed};

use crate::channels::{SharedEventSink, ACTUATORS, SHARED};
use crate::display::DefmtDisplay;
use crate::drivers::actuators::ActuatorBank;
use crate::drivers::battery::BatteryAdc;
use crate::drivers::fifo::SioFifo;
use crate::drivers::leak::LeakProbe;
use crate::drivers::led::PanelLed;
use crate::drivers::watchdog::{HardwareWatchdog, SystemOps};

#[embassy_executor::task]
pub async fn safety_task(
    mut watchdog: HardwareWatchdog,
    mut battery: BatteryAdc,
    mut leak: LeakProbe,
    mut led: PanelLed,
) {
    info!("Core 0: safety monitor starting");
    watchdog.start(Duration::from_millis(WATCHDOG_TIMEOUT_MS as u64));

    let mut fifo = SioFifo;
    let mut display = DefmtDisplay;
    let mut delay = Delay;
    let mut events = SharedEventSink;

    // Battery and leak sense live on this core and are already up
    display.boot_progress(BootStage::Battery, true);
    display.boot_progress(BootStage::Leak, true);

    let (result, timing) =
        handshake::wait_for_peer(&mut fifo, &mut watchdog, &mut display, &mut delay);
    info!(
        "handshake: {=str} (alive {=u32} ms, ready {=u32} ms)",
        result.as_str(),
        timing.alive_ms,
        timing.ready_ms
    );

    if result != HandshakeResult::Ok {
        // The boat must not dive. Blow whatever ballast it is carrying
        // and stop here; the blow sequence never returns.
        let mut system = SystemOps;
        let bank = ACTUATORS.lock(|bank| bank.borrow_mut().take());
        if let Some(mut bank) = bank {
            let mut sequence = EmergencySequence::new();
            let now_ms = Instant::now().as_millis() as u32;
            catastrophic_failure(
                &mut sequence,
                &mut bank,
                &mut delay,
                &mut system,
                &mut events,
                now_ms,
            );
        }
        // Nothing to blow without the bank; reset and try again.
        system.force_reset();
    }

    let mut monitor = SafetyMonitor::new(watchdog);
    let mut sequence = EmergencySequence::new();
    let mut seized: Option<ActuatorBank> = None;

    let mut ticker = Ticker::every(Duration::from_millis(SAFETY_LOOP_MS as u64));
    let mut loops: u32 = 0;
    loop {
        ticker.next().await;
        let now_ms = Instant::now().as_millis() as u32;

        let battery_mv = battery.read_millivolts();
        let leak_wet = leak.is_wet();
        let out = monitor.run(now_ms, &SHARED, battery_mv, leak_wet, &mut events);

        if let Some(reason) = out.trigger {
            warn!("emergency blow: {:?}", reason);
            display.emergency();
            // Take the bank away from the control loop for good
            seized = ACTUATORS.lock(|bank| bank.borrow_mut().take());
            if let Some(bank) = seized.as_mut() {
                sequence.trigger(reason, bank, &mut events, now_ms);
            }
        }
        if let Some(bank) = seized.as_mut() {
            sequence.run(bank);
        }

        led.set(out.led_on);

        loops += 1;
        if loops >= 100 {
            debug!(
                "core0: faults={=u16:x} batt={=u16}mV",
                monitor.faults().raw(),
                battery_mv
            );
            loops = 0;
        }
    }
}
