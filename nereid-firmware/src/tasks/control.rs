//! Core 1: dive control at 50 Hz
//!
//! Boot order matters: the ALIVE word goes out before any sensor is
//! touched, a progress code precedes each init stage, and READY (or
//! INIT_FAILED) ends the handshake. After that the loop reads sensors,
//! publishes telemetry, runs the mission state machine and the
//! controllers, and writes the actuators - unless the emergency latch
//! is set, in which case core 0 owns the outputs.

use defmt::*;
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C0, PIN_0, PIN_1, PIN_2, PIN_3, PIN_4, PIN_5, PIN_8, PIN_9, PIO0, PIO1};
use embassy_rp::Peri;
use embassy_time::{Duration, Instant, Ticker, Timer};
use nereid_core::config::{SafetyLimits, CONTROL_LOOP_MS};
use nereid_core::control::{BallastController, DepthController, PitchController};
use nereid_core::log::{EventCode, EventSink};
use nereid_core::safety::handshake;
use nereid_core::state::{Command, DiveState, DiveStateMachine};
use nereid_core::traits::{BootStage, Imu, PressureSensor, RcFrame, RcReceiver, ServoChannel};

use crate::channels::{SharedEventSink, ACTUATORS, SHARED};
use crate::drivers::fifo::SioFifo;
use crate::drivers::rc::RcInputs;
use crate::drivers::sensors::Sensors;

/// Three-position mode switch thresholds (us)
const MODE_LOW_US: u16 = 1300;
const MODE_HIGH_US: u16 = 1700;
/// Emergency switch threshold (us)
const EMERGENCY_ON_US: u16 = 1700;

const STICK_CENTER_US: i16 = 1500;

/// Peripherals handed to core 1 at spawn
pub struct ControlResources {
    pub i2c: Peri<'static, I2C0>,
    pub sda: Peri<'static, PIN_8>,
    pub scl: Peri<'static, PIN_9>,
    pub pio0: Peri<'static, PIO0>,
    pub ch1: Peri<'static, PIN_0>,
    pub ch2: Peri<'static, PIN_1>,
    pub ch3: Peri<'static, PIN_2>,
    pub ch4: Peri<'static, PIN_3>,
    pub pio1: Peri<'static, PIO1>,
    pub ch5: Peri<'static, PIN_4>,
    pub ch6: Peri<'static, PIN_5>,
}

#[embassy_executor::task]
pub async fn control_task(r: ControlResources) {
    info!("Core 1: control loop starting");

    let mut fifo = SioFifo;
    let mut events = SharedEventSink;

    // First word out, before anything that can hang
    handshake::send_alive(&mut fifo);

    handshake::send_progress(&mut fifo, BootStage::Pressure);
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = 400_000;
    let bus = I2c::new_blocking(r.i2c, r.scl, r.sda, i2c_config);
    let mut sensors = match Sensors::new(bus) {
        Ok(s) => s,
        Err(_) => {
            error!("pressure sensor init failed");
            handshake::send_failed(&mut fifo);
            return;
        }
    };

    handshake::send_progress(&mut fifo, BootStage::Imu);
    if sensors.init_imu().is_err() {
        error!("imu init failed");
        handshake::send_failed(&mut fifo);
        return;
    }

    handshake::send_progress(&mut fifo, BootStage::RcInput);
    let mut rc = RcInputs::new(r.pio0, r.ch1, r.ch2, r.ch3, r.ch4, r.pio1, r.ch5, r.ch6);

    handshake::send_ready(&mut fifo);
    events.log(
        EventCode::InitComplete,
        Instant::now().as_millis() as u32,
        0,
        0,
    );

    let max_depth_cm = SafetyLimits::default().max_depth_cm;
    let mut machine = DiveStateMachine::new();
    let mut ballast = BallastController::new();
    let mut depth_ctrl = DepthController::new();
    let mut pitch_ctrl = PitchController::new();

    let mut ticker = Ticker::every(Duration::from_millis(CONTROL_LOOP_MS as u64));
    let mut last = Instant::now();
    let mut loops: u32 = 0;
    loop {
        ticker.next().await;

        if SHARED.is_emergency() {
            // Core 0 owns the actuators now; keep out of the way
            Timer::after_millis(100).await;
            continue;
        }

        let now = Instant::now();
        let dt = (now - last).as_micros() as f32 / 1_000_000.0;
        last = now;
        let now_ms = now.as_millis() as u32;

        let frame = rc.read();
        let depth = PressureSensor::read(&mut sensors);
        let attitude = Imu::read(&mut sensors);

        if frame.valid {
            SHARED.update_rc_time(frame.timestamp_ms);
        }
        if depth.valid {
            SHARED.update_depth(depth.depth_cm);
        }
        if attitude.valid {
            SHARED.update_pitch(attitude.pitch_x10);
        }

        // The depth knob only takes effect while surfaced; once the
        // dive starts the target is locked in.
        if machine.state() == DiveState::Surface {
            machine.set_target_depth(knob_to_depth_cm(frame.channels[3], max_depth_cm));
        }

        let cmd = derive_command(&frame, machine.state());
        machine.process(cmd, depth.depth_cm, now_ms);

        ballast.set_target(machine.ballast_target());
        depth_ctrl.enable(machine.depth_hold_enabled());

        let (pump_speed, valve_open) = if machine.depth_hold_enabled() {
            depth_ctrl.set_target(machine.target_depth_cm());
            let speed = depth_ctrl.update(depth.depth_cm, dt);
            // Draining needs the vent open
            (speed, speed < 0)
        } else {
            let out = ballast.update(now_ms);
            (out.pump_speed, out.valve_open)
        };

        let submerged = matches!(
            machine.state(),
            DiveState::SubmergedManual | DiveState::SubmergedDepthHold
        );
        pitch_ctrl.enable(submerged);
        let planes = if submerged {
            // Elevator stick trims the pitch setpoint, +/-30 degrees
            pitch_ctrl.set_target(stick_to_percent(frame.channels[2]) as i16 * 3);
            pitch_ctrl.update(attitude.pitch_x10, dt)
        } else {
            0
        };
        let rudder = stick_to_percent(frame.channels[1]);

        ACTUATORS.lock(|bank| {
            if let Some(bank) = bank.borrow_mut().as_mut() {
                bank.set_speed(pump_speed);
                bank.set_open(valve_open);
                bank.set_position(ServoChannel::Rudder, rudder);
                bank.set_position(ServoChannel::BowPlane, planes);
                bank.set_position(ServoChannel::SternPlane, planes);
            }
        });

        SHARED.bump_heartbeat();

        loops += 1;
        if loops >= 50 {
            debug!(
                "core1: state={:?} depth={=i32}cm pitch={=i16}",
                machine.state(),
                depth.depth_cm,
                attitude.pitch_x10
            );
            loops = 0;
        }
    }
}

/// Decode the mode and emergency switches into a command
///
/// The mid switch position reads as Dive from the surface but as
/// Manual when depth hold is active, so flicking high-mid-high works
/// as a hold toggle.
fn derive_command(frame: &RcFrame, state: DiveState) -> Command {
    if !frame.valid {
        return Command::None;
    }
    if frame.channels[5] > EMERGENCY_ON_US {
        return Command::Emergency;
    }
    let mode = frame.channels[4];
    if mode < MODE_LOW_US {
        Command::Surface
    } else if mode > MODE_HIGH_US {
        Command::DepthHold
    } else if state == DiveState::SubmergedDepthHold {
        Command::Manual
    } else {
        Command::Dive
    }
}

/// Aux knob to target depth: 1000 us is the surface, 2000 us is the
/// depth ceiling
fn knob_to_depth_cm(us: u16, max_depth_cm: i32) -> i32 {
    let span = (us.clamp(1000, 2000) - 1000) as i32;
    span * max_depth_cm / 1000
}

/// Stick pulse width to a -100..+100 command with the usual 5 us/%
fn stick_to_percent(us: u16) -> i8 {
    ((us as i16 - STICK_CENTER_US) / 5).clamp(-100, 100) as i8
}
