//! Battery voltage sense on ADC0
//!
//! The pack feeds GPIO 26 through a 4.03:1 resistive divider.

use embassy_rp::adc::{Adc, Blocking, Channel};
use nereid_core::traits::BatteryMonitor;

/// Divider ratio, x100
const DIVIDER_X100: u32 = 403;

pub struct BatteryAdc {
    adc: Adc<'static, Blocking>,
    channel: Channel<'static>,
}

impl BatteryAdc {
    pub fn new(adc: Adc<'static, Blocking>, channel: Channel<'static>) -> Self {
        Self { adc, channel }
    }
}

impl BatteryMonitor for BatteryAdc {
    fn read_millivolts(&mut self) -> u16 {
        // A failed conversion reads as 0 mV, which the monitor flags
        // as a low-battery fault instead of silently passing.
        let raw = match self.adc.blocking_read(&mut self.channel) {
            Ok(raw) => raw as u32,
            Err(_) => return 0,
        };
        let adc_mv = raw * 3300 / 4096;
        (adc_mv * DIVIDER_X100 / 100) as u16
    }
}
