//! Leak probe on a pulled-down GPIO
//!
//! Water across the probe contacts pulls the pin high. The monitor
//! latches the fault, so the probe itself just reports the level.

use embassy_rp::gpio::Input;
use nereid_core::traits::LeakSensor;

pub struct LeakProbe {
    pin: Input<'static>,
}

impl LeakProbe {
    pub fn new(pin: Input<'static>) -> Self {
        Self { pin }
    }
}

impl LeakSensor for LeakProbe {
    fn is_wet(&mut self) -> bool {
        self.pin.is_high()
    }
}
