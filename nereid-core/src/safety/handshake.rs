//! Two-stage inter-core boot handshake
//!
//! The safety core will not arm anything until the control core proves
//! itself twice over the FIFO: first an ALIVE sentinel (its code is
//! executing at all), then a READY sentinel after sensor bring-up.
//! Between the two, the control core streams boot-stage progress codes
//! so a stuck init names the sensor that hung. The safety core polls
//! at 1 ms and keeps feeding the watchdog while it waits.

use crate::config;
use crate::traits::{BootDisplay, BootStage, FaultScreen, InterCoreFifo, Watchdog};
use embedded_hal::delay::DelayNs;

/// Control core has started executing
pub const ALIVE_MAGIC: u32 = 0xC0DE_0001;
/// Control core finished sensor init
pub const READY_MAGIC: u32 = 0xC0DE_1001;
/// Control core gave up during init
pub const INIT_FAILED_MAGIC: u32 = 0xC0DE_DEAD;

/// Handshake outcome, from the safety core's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandshakeResult {
    Ok,
    AliveTimeout,
    AliveBadMagic,
    ReadyTimeout,
    InitFailed,
    ReadyBadMagic,
}

impl HandshakeResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::AliveTimeout => "ALIVE timeout",
            Self::AliveBadMagic => "ALIVE bad magic",
            Self::ReadyTimeout => "READY timeout",
            Self::InitFailed => "init failed",
            Self::ReadyBadMagic => "READY bad magic",
        }
    }
}

/// How long each stage took, in 1 ms poll counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HandshakeTiming {
    pub alive_ms: u32,
    pub ready_ms: u32,
    pub total_ms: u32,
}

/// Safety-core side: wait for the control core to come up
///
/// Returns the outcome plus stage timings. Anything other than
/// [`HandshakeResult::Ok`] means the boat must not dive.
pub fn wait_for_peer(
    fifo: &mut impl InterCoreFifo,
    watchdog: &mut impl Watchdog,
    display: &mut impl BootDisplay,
    delay: &mut impl DelayNs,
) -> (HandshakeResult, HandshakeTiming) {
    let mut timing = HandshakeTiming::default();

    // Stage 1: ALIVE. Should land within a millisecond or two; the
    // timeout only catches a peer that never launched.
    display.boot_progress(BootStage::Core1, false);

    let mut waited = 0u32;
    loop {
        if let Some(word) = fifo.try_read() {
            timing.alive_ms = waited;
            if word != ALIVE_MAGIC {
                timing.total_ms = waited;
                display.fault(FaultScreen::PeerCoreFailed);
                return (HandshakeResult::AliveBadMagic, timing);
            }
            break;
        }
        if waited >= config::PEER_ALIVE_TIMEOUT_MS {
            timing.alive_ms = waited;
            timing.total_ms = waited;
            display.fault(FaultScreen::PeerCoreFailed);
            return (HandshakeResult::AliveTimeout, timing);
        }
        delay.delay_ms(1);
        waited += 1;
        watchdog.feed();
    }

    display.boot_progress(BootStage::Core1, true);

    // Stage 2: READY, with progress codes along the way
    let mut waited = 0u32;
    while waited < config::PEER_READY_TIMEOUT_MS {
        if let Some(word) = fifo.try_read() {
            if word == READY_MAGIC {
                timing.ready_ms = waited;
                timing.total_ms = timing.alive_ms + waited;
                display.boot_progress(BootStage::Complete, true);
                return (HandshakeResult::Ok, timing);
            }
            if word == INIT_FAILED_MAGIC {
                timing.ready_ms = waited;
                timing.total_ms = timing.alive_ms + waited;
                display.fault(FaultScreen::InitFailed);
                return (HandshakeResult::InitFailed, timing);
            }
            if let Some(stage) = BootStage::from_progress_code(word) {
                display.boot_progress(stage, false);
            }
            // Anything else is noise; keep waiting
        }
        delay.delay_ms(1);
        waited += 1;
        watchdog.feed();
    }

    timing.ready_ms = waited;
    timing.total_ms = timing.alive_ms + waited;
    display.fault(FaultScreen::InitTimeout);
    (HandshakeResult::ReadyTimeout, timing)
}

/// Control-core side: first word out, before any init
pub fn send_alive(fifo: &mut impl InterCoreFifo) {
    fifo.write(ALIVE_MAGIC);
}

/// Control-core side: all sensors up
pub fn send_ready(fifo: &mut impl InterCoreFifo) {
    fifo.write(READY_MAGIC);
}

/// Control-core side: init failed, do not arm
pub fn send_failed(fifo: &mut impl InterCoreFifo) {
    fifo.write(INIT_FAILED_MAGIC);
}

/// Control-core side: about to init the sensor for `stage`
pub fn send_progress(fifo: &mut impl InterCoreFifo, stage: BootStage) {
    fifo.write(stage as u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// FIFO that yields one scripted word per poll
    struct ScriptedFifo {
        script: &'static [u32],
        pos: usize,
    }

    impl ScriptedFifo {
        fn new(script: &'static [u32]) -> Self {
            Self { script, pos: 0 }
        }
    }

    impl InterCoreFifo for ScriptedFifo {
        fn try_read(&mut self) -> Option<u32> {
            let word = self.script.get(self.pos).copied();
            if word.is_some() {
                self.pos += 1;
            }
            word
        }

        fn write(&mut self, _word: u32) {}
    }

    struct CountingWatchdog {
        feeds: u32,
    }

    impl Watchdog for CountingWatchdog {
        fn feed(&mut self) {
            self.feeds += 1;
        }
    }

    struct NoopDelay;

    impl DelayNs for NoopDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    #[derive(Default)]
    struct RecordedDisplay {
        last_stage: Option<(BootStage, bool)>,
        last_fault: Option<FaultScreen>,
        progress_count: u32,
    }

    impl BootDisplay for RecordedDisplay {
        fn boot_progress(&mut self, stage: BootStage, done: bool) {
            self.last_stage = Some((stage, done));
            self.progress_count += 1;
        }

        fn fault(&mut self, fault: FaultScreen) {
            self.last_fault = Some(fault);
        }

        fn emergency(&mut self) {}
    }

    fn run(script: &'static [u32]) -> (HandshakeResult, HandshakeTiming, RecordedDisplay, u32) {
        let mut fifo = ScriptedFifo::new(script);
        let mut watchdog = CountingWatchdog { feeds: 0 };
        let mut display = RecordedDisplay::default();
        let (result, timing) = wait_for_peer(&mut fifo, &mut watchdog, &mut display, &mut NoopDelay);
        (result, timing, display, watchdog.feeds)
    }

    #[test]
    fn test_full_sequence_succeeds() {
        let (result, timing, display, _) = run(&[
            ALIVE_MAGIC,
            BootStage::Pressure as u32,
            BootStage::Imu as u32,
            BootStage::RcInput as u32,
            BootStage::Battery as u32,
            BootStage::Leak as u32,
            READY_MAGIC,
        ]);
        assert_eq!(result, HandshakeResult::Ok);
        assert_eq!(timing.alive_ms, 0);
        // One word per 1 ms poll: five progress codes before READY
        assert_eq!(timing.ready_ms, 5);
        assert_eq!(timing.total_ms, 5);
        assert_eq!(display.last_stage, Some((BootStage::Complete, true)));
        assert_eq!(display.last_fault, None);
    }

    #[test]
    fn test_silent_peer_times_out_alive() {
        let (result, timing, display, feeds) = run(&[]);
        assert_eq!(result, HandshakeResult::AliveTimeout);
        assert_eq!(timing.alive_ms, config::PEER_ALIVE_TIMEOUT_MS);
        assert_eq!(timing.total_ms, config::PEER_ALIVE_TIMEOUT_MS);
        assert_eq!(display.last_fault, Some(FaultScreen::PeerCoreFailed));
        // Watchdog was fed through the whole wait
        assert_eq!(feeds, config::PEER_ALIVE_TIMEOUT_MS);
    }

    #[test]
    fn test_wrong_alive_word_rejected() {
        let (result, _, display, _) = run(&[0xDEAD_BEEF]);
        assert_eq!(result, HandshakeResult::AliveBadMagic);
        assert_eq!(display.last_fault, Some(FaultScreen::PeerCoreFailed));
    }

    #[test]
    fn test_peer_reports_init_failure() {
        let (result, _, display, _) = run(&[ALIVE_MAGIC, INIT_FAILED_MAGIC]);
        assert_eq!(result, HandshakeResult::InitFailed);
        assert_eq!(display.last_fault, Some(FaultScreen::InitFailed));
    }

    #[test]
    fn test_stuck_init_times_out_ready() {
        let (result, timing, display, _) =
            run(&[ALIVE_MAGIC, BootStage::Pressure as u32]);
        assert_eq!(result, HandshakeResult::ReadyTimeout);
        assert_eq!(timing.ready_ms, config::PEER_READY_TIMEOUT_MS);
        assert_eq!(display.last_fault, Some(FaultScreen::InitTimeout));
        // The stage that hung is the last one shown
        assert_eq!(display.last_stage, Some((BootStage::Pressure, false)));
    }

    #[test]
    fn test_unknown_words_ignored_during_ready_wait() {
        let (result, _, _, _) = run(&[ALIVE_MAGIC, 0xFFFF_FFFF, 42, READY_MAGIC]);
        assert_eq!(result, HandshakeResult::Ok);
    }
}
