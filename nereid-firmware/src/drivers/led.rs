//! Onboard status LED

use embassy_rp::gpio::{Level, Output};
use nereid_core::traits::StatusLed;

pub struct PanelLed {
    pin: Output<'static>,
}

impl PanelLed {
    pub fn new(pin: Output<'static>) -> Self {
        Self { pin }
    }
}

impl StatusLed for PanelLed {
    fn set(&mut self, on: bool) {
        let level = if on { Level::High } else { Level::Low };
        self.pin.set_level(level);
    }
}
