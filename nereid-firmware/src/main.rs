//! Nereid - RC Submersible Controller Firmware
//!
//! Dual-core RP2040 firmware. Core 0 supervises: it feeds the hardware
//! watchdog, watches for faults, and fires the emergency blow. Core 1
//! drives the boat: sensors, dive state machine, ballast and attitude
//! control.
//!
//! Named after the Nereids, the sea nymphs of Greek myth - fitting
//! company for a machine whose whole job is to go under water and
//! come back up.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{Executor, Spawner};
use embassy_rp::adc::{Adc, Channel as AdcChannel, Config as AdcConfig};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_rp::peripherals::{PIO0, PIO1};
use embassy_rp::pio::InterruptHandler as PioInterruptHandler;
use embassy_rp::watchdog::Watchdog as RpWatchdog;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

mod channels;
mod display;
mod drivers;
mod tasks;

use crate::drivers::actuators::ActuatorBank;
use crate::drivers::battery::BatteryAdc;
use crate::drivers::leak::LeakProbe;
use crate::drivers::led::PanelLed;
use crate::drivers::watchdog::HardwareWatchdog;
use crate::tasks::control::{control_task, ControlResources};
use crate::tasks::safety::safety_task;

bind_interrupts!(pub struct Irqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
    PIO1_IRQ_0 => PioInterruptHandler<PIO1>;
});

// Core 1 runs its own executor on a dedicated stack
static mut CORE1_STACK: Stack<8192> = Stack::new();
static EXECUTOR1: StaticCell<Executor> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Nereid firmware starting...");

    let p = embassy_rp::init(Default::default());

    // Build the actuator bank first so every output sits in its safe
    // state before either loop runs.
    let actuators = ActuatorBank::new(
        p.PWM_SLICE5,
        p.PIN_10, // rudder
        p.PIN_11, // bow plane
        p.PWM_SLICE6,
        p.PIN_12, // stern plane
        p.PWM_SLICE7,
        p.PIN_14, // pump PWM
        p.PIN_15, // pump direction
        p.PIN_13, // vent valve
    );
    channels::ACTUATORS.lock(|bank| {
        *bank.borrow_mut() = Some(actuators);
    });
    info!("Actuators initialized");

    // Safety-core peripherals
    let watchdog = HardwareWatchdog::new(RpWatchdog::new(p.WATCHDOG));
    let adc = Adc::new_blocking(p.ADC, AdcConfig::default());
    let battery = BatteryAdc::new(adc, AdcChannel::new_pin(p.PIN_26, Pull::None));
    let leak = LeakProbe::new(Input::new(p.PIN_16, Pull::Down));
    let led = PanelLed::new(Output::new(p.PIN_25, Level::Low));

    // Control-core peripherals, moved into the core 1 entry closure
    let control = ControlResources {
        i2c: p.I2C0,
        sda: p.PIN_8,
        scl: p.PIN_9,
        pio0: p.PIO0,
        ch1: p.PIN_0,
        ch2: p.PIN_1,
        ch3: p.PIN_2,
        ch4: p.PIN_3,
        pio1: p.PIO1,
        ch5: p.PIN_4,
        ch6: p.PIN_5,
    };

    spawn_core1(
        p.CORE1,
        unsafe { &mut *core::ptr::addr_of_mut!(CORE1_STACK) },
        move || {
            let executor1 = EXECUTOR1.init(Executor::new());
            executor1.run(|spawner| spawner.must_spawn(control_task(control)));
        },
    );
    info!("Core 1 launched");

    spawner.must_spawn(safety_task(watchdog, battery, leak, led));
}
