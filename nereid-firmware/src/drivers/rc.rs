//! RC receiver capture
//!
//! One PIO state machine per channel measures servo pulse widths.
//! The program arms on a rising edge and busy-counts while the pin is
//! high; the counting loop is two instructions, so at a 2 MHz state
//! machine clock each count is one microsecond. Channels 1-4 occupy
//! the four state machines of PIO0, channels 5-6 the first two of
//! PIO1.

use embassy_rp::gpio::Pull;
use embassy_rp::peripherals::{PIN_0, PIN_1, PIN_2, PIN_3, PIN_4, PIN_5, PIO0, PIO1};
use embassy_rp::pio::{
    Common, Config as PioConfig, Direction, Instance, LoadedProgram, Pio, PioPin, StateMachine,
};
use embassy_rp::Peri;
use embassy_time::Instant;
use fixed::types::U24F8;
use nereid_core::traits::{RcFrame, RcReceiver, RC_CHANNEL_COUNT};

use crate::Irqs;

/// A channel with no fresh pulse for this long drops out of the frame
const FRAME_MAX_AGE_MS: u32 = 100;
/// Accepted pulse width range (us)
const PULSE_MIN_US: u32 = 1000;
const PULSE_MAX_US: u32 = 2000;
const PULSE_CENTER_US: u16 = 1500;

/// 125 MHz system clock / 62.5 = 2 MHz state machine clock
const CAPTURE_CLKDIV: f32 = 62.5;

#[derive(Clone, Copy)]
struct ChannelState {
    pulse_us: u16,
    last_update_ms: u32,
    seen: bool,
}

impl ChannelState {
    const fn new() -> Self {
        Self {
            pulse_us: PULSE_CENTER_US,
            last_update_ms: 0,
            seen: false,
        }
    }
}

pub struct RcInputs {
    sm0: StateMachine<'static, PIO0, 0>,
    sm1: StateMachine<'static, PIO0, 1>,
    sm2: StateMachine<'static, PIO0, 2>,
    sm3: StateMachine<'static, PIO0, 3>,
    sm4: StateMachine<'static, PIO1, 0>,
    sm5: StateMachine<'static, PIO1, 1>,
    channels: [ChannelState; RC_CHANNEL_COUNT],
}

impl RcInputs {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pio0: Peri<'static, PIO0>,
        ch1: Peri<'static, PIN_0>,
        ch2: Peri<'static, PIN_1>,
        ch3: Peri<'static, PIN_2>,
        ch4: Peri<'static, PIN_3>,
        pio1: Peri<'static, PIO1>,
        ch5: Peri<'static, PIN_4>,
        ch6: Peri<'static, PIN_5>,
    ) -> Self {
        let Pio {
            mut common,
            mut sm0,
            mut sm1,
            mut sm2,
            mut sm3,
            ..
        } = Pio::new(pio0, Irqs);
        let program = load_capture(&mut common);
        setup_channel(&mut common, &program, &mut sm0, ch1);
        setup_channel(&mut common, &program, &mut sm1, ch2);
        setup_channel(&mut common, &program, &mut sm2, ch3);
        setup_channel(&mut common, &program, &mut sm3, ch4);

        let Pio {
            mut common,
            sm0: mut sm4,
            sm1: mut sm5,
            ..
        } = Pio::new(pio1, Irqs);
        let program = load_capture(&mut common);
        setup_channel(&mut common, &program, &mut sm4, ch5);
        setup_channel(&mut common, &program, &mut sm5, ch6);

        Self {
            sm0,
            sm1,
            sm2,
            sm3,
            sm4,
            sm5,
            channels: [ChannelState::new(); RC_CHANNEL_COUNT],
        }
    }
}

impl RcReceiver for RcInputs {
    fn read(&mut self) -> RcFrame {
        let now_ms = Instant::now().as_millis() as u32;

        drain(&mut self.sm0, &mut self.channels[0], now_ms);
        drain(&mut self.sm1, &mut self.channels[1], now_ms);
        drain(&mut self.sm2, &mut self.channels[2], now_ms);
        drain(&mut self.sm3, &mut self.channels[3], now_ms);
        drain(&mut self.sm4, &mut self.channels[4], now_ms);
        drain(&mut self.sm5, &mut self.channels[5], now_ms);

        let mut frame = RcFrame::default();
        let mut all_valid = true;
        for (slot, out) in self.channels.iter().zip(frame.channels.iter_mut()) {
            if slot.seen && now_ms.wrapping_sub(slot.last_update_ms) <= FRAME_MAX_AGE_MS {
                *out = slot.pulse_us;
            } else {
                *out = PULSE_CENTER_US;
                all_valid = false;
            }
        }
        frame.timestamp_ms = now_ms;
        frame.valid = all_valid;
        frame
    }
}

/// Empty a state machine's RX FIFO, keeping the newest valid pulse
fn drain<P: Instance, const SM: usize>(
    sm: &mut StateMachine<'static, P, SM>,
    slot: &mut ChannelState,
    now_ms: u32,
) {
    while let Some(count) = sm.rx().try_pull() {
        if (PULSE_MIN_US..=PULSE_MAX_US).contains(&count) {
            slot.pulse_us = count as u16;
            slot.last_update_ms = now_ms;
            slot.seen = true;
        }
    }
}

fn load_capture<'d, P: Instance>(common: &mut Common<'d, P>) -> LoadedProgram<'d, P> {
    let prg = pio::pio_asm!(
        ".wrap_target",
        "mov x, !null",
        "wait 0 pin 0",
        "wait 1 pin 0",
        "count:",
        "jmp x-- next",
        "next:",
        "jmp pin count",
        "mov isr, !x",
        "push noblock",
        ".wrap"
    );
    common.load_program(&prg.program)
}

fn setup_channel<'d, P: Instance, const SM: usize>(
    common: &mut Common<'d, P>,
    program: &LoadedProgram<'d, P>,
    sm: &mut StateMachine<'d, P, SM>,
    pin: Peri<'d, impl PioPin>,
) {
    let mut pin = common.make_pio_pin(pin);
    pin.set_pull(Pull::Down);

    let mut cfg = PioConfig::default();
    cfg.use_program(program, &[]);
    cfg.set_in_pins(&[&pin]);
    cfg.set_jmp_pin(&pin);
    cfg.clock_divider = U24F8::from_num(CAPTURE_CLKDIV);
    sm.set_config(&cfg);
    sm.set_pin_dirs(Direction::In, &[&pin]);
    sm.set_enable(true);
}
