//! Hardware watchdog and reset control

use embassy_rp::pac;
use embassy_rp::watchdog::Watchdog as RpWatchdog;
use embassy_time::Duration;
use nereid_core::traits::{SystemControl, Watchdog};

/// Maximum watchdog reload value (counts down at 2 per microsecond)
const WATCHDOG_RELOAD_MAX: u32 = 0xFF_FFFF;

pub struct HardwareWatchdog {
    inner: RpWatchdog,
}

impl HardwareWatchdog {
    pub fn new(inner: RpWatchdog) -> Self {
        Self { inner }
    }

    /// Arm the watchdog; a missed feed resets both cores
    pub fn start(&mut self, timeout: Duration) {
        self.inner.start(timeout);
    }
}

impl Watchdog for HardwareWatchdog {
    fn feed(&mut self) {
        self.inner.feed();
    }
}

/// Halt and reset for the catastrophic-failure path
///
/// Register-level access because the moment this runs, ownership of
/// the watchdog driver is stranded inside the safety monitor.
pub struct SystemOps;

impl SystemControl for SystemOps {
    fn halt(&mut self) -> ! {
        // Keep the dog fed so the blow outputs stay asserted forever.
        loop {
            pac::WATCHDOG
                .load()
                .write(|w| w.set_load(WATCHDOG_RELOAD_MAX));
            cortex_m::asm::delay(1_000_000);
        }
    }

    fn force_reset(&mut self) -> ! {
        pac::WATCHDOG.ctrl().write(|w| w.set_trigger(true));
        loop {
            cortex_m::asm::nop();
        }
    }
}
