//! Pump, valve and servo outputs
//!
//! PWM assignments follow the slice layout: the rudder and bow plane
//! share slice 5 (channels A and B), the stern plane sits on slice 6
//! and the pump on slice 7. A 125x divider puts the counters at 1 MHz,
//! so servo compare values are pulse widths in microseconds.

use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{
    PIN_10, PIN_11, PIN_12, PIN_13, PIN_14, PIN_15, PWM_SLICE5, PWM_SLICE6, PWM_SLICE7,
};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::Peri;
use fixed::traits::ToFixed;
use nereid_core::traits::{BallastPump, ServoChannel, Servos, VentValve};

/// 125 MHz system clock / 125 = 1 MHz PWM counter
const PWM_CLKDIV: u8 = 125;
/// Servo frame: 20 000 counts at 1 MHz is the standard 50 Hz
const SERVO_PWM_TOP: u16 = 19_999;
/// Pump PWM: 1 kHz, 0.1 % duty resolution
const PUMP_PWM_TOP: u16 = 999;

const SERVO_PULSE_CENTER_US: i16 = 1500;
const SERVO_PULSE_MIN_US: i16 = 1000;
const SERVO_PULSE_MAX_US: i16 = 2000;

/// Every output the boat can move
///
/// Owned by the control loop in normal operation; the safety core
/// takes the whole bank when it fires the blow.
pub struct ActuatorBank {
    // Rudder on channel A, bow plane on channel B
    front: Pwm<'static>,
    front_cfg: PwmConfig,
    stern: Pwm<'static>,
    stern_cfg: PwmConfig,
    pump: Pwm<'static>,
    pump_cfg: PwmConfig,
    pump_dir: Output<'static>,
    valve: Output<'static>,
}

impl ActuatorBank {
    /// Take ownership of the output pins and drive everything to its
    /// safe state: servos centered, pump stopped, valve closed.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        front_slice: Peri<'static, PWM_SLICE5>,
        rudder_pin: Peri<'static, PIN_10>,
        bow_pin: Peri<'static, PIN_11>,
        stern_slice: Peri<'static, PWM_SLICE6>,
        stern_pin: Peri<'static, PIN_12>,
        pump_slice: Peri<'static, PWM_SLICE7>,
        pump_pin: Peri<'static, PIN_14>,
        pump_dir_pin: Peri<'static, PIN_15>,
        valve_pin: Peri<'static, PIN_13>,
    ) -> Self {
        let mut servo_cfg = PwmConfig::default();
        servo_cfg.divider = PWM_CLKDIV.to_fixed();
        servo_cfg.top = SERVO_PWM_TOP;
        servo_cfg.compare_a = SERVO_PULSE_CENTER_US as u16;
        servo_cfg.compare_b = SERVO_PULSE_CENTER_US as u16;

        let front_cfg = servo_cfg.clone();
        let front = Pwm::new_output_ab(front_slice, rudder_pin, bow_pin, front_cfg.clone());

        let stern_cfg = servo_cfg.clone();
        let stern = Pwm::new_output_a(stern_slice, stern_pin, stern_cfg.clone());

        let mut pump_cfg = PwmConfig::default();
        pump_cfg.divider = PWM_CLKDIV.to_fixed();
        pump_cfg.top = PUMP_PWM_TOP;
        pump_cfg.compare_a = 0;
        let pump = Pwm::new_output_a(pump_slice, pump_pin, pump_cfg.clone());

        Self {
            front,
            front_cfg,
            stern,
            stern_cfg,
            pump,
            pump_cfg,
            pump_dir: Output::new(pump_dir_pin, Level::Low),
            valve: Output::new(valve_pin, Level::Low),
        }
    }

    fn position_to_pulse_us(position: i8) -> u16 {
        let position = position.clamp(-100, 100) as i16;
        let pulse = SERVO_PULSE_CENTER_US + position * 5;
        pulse.clamp(SERVO_PULSE_MIN_US, SERVO_PULSE_MAX_US) as u16
    }
}

impl BallastPump for ActuatorBank {
    fn set_speed(&mut self, speed: i8) {
        let speed = speed.clamp(-100, 100) as i32;
        // High side of the H-bridge fills, low side drains
        let dir = if speed >= 0 { Level::High } else { Level::Low };
        self.pump_dir.set_level(dir);

        let level = speed.unsigned_abs() * PUMP_PWM_TOP as u32 / 100;
        self.pump_cfg.compare_a = level as u16;
        self.pump.set_config(&self.pump_cfg);
    }
}

impl VentValve for ActuatorBank {
    fn set_open(&mut self, open: bool) {
        let level = if open { Level::High } else { Level::Low };
        self.valve.set_level(level);
    }
}

impl Servos for ActuatorBank {
    fn set_position(&mut self, channel: ServoChannel, position: i8) {
        let pulse = Self::position_to_pulse_us(position);
        match channel {
            ServoChannel::Rudder => {
                self.front_cfg.compare_a = pulse;
                self.front.set_config(&self.front_cfg);
            }
            ServoChannel::BowPlane => {
                self.front_cfg.compare_b = pulse;
                self.front.set_config(&self.front_cfg);
            }
            ServoChannel::SternPlane => {
                self.stern_cfg.compare_a = pulse;
                self.stern.set_config(&self.stern_cfg);
            }
        }
    }
}
