//! System-level traits: watchdog, inter-core FIFO, status LED
//!
//! These wrap RP2040 facilities the safety code depends on. Splitting
//! them out keeps the monitor, handshake, and catastrophic path
//! testable on the host.

/// Hardware watchdog
///
/// Both loops must feed this within its configured window; missing a
/// feed forces an unconditional reset. That reset is also used
/// deliberately as the last resort of the catastrophic path.
pub trait Watchdog {
    /// Service the watchdog (must be called every loop iteration)
    fn feed(&mut self);
}

/// Terminal exits for the catastrophic-failure path
///
/// Deliberately separate from [`Watchdog`]: the handler that services a
/// failed assertion must not depend on anything that can itself assert.
pub trait SystemControl {
    /// Halt the processor with a solid fault indicator. Never returns.
    fn halt(&mut self) -> !;

    /// Force an immediate hardware reset. Never returns.
    fn force_reset(&mut self) -> !;
}

/// One-word inter-core channel (the RP2040 SIO FIFO)
///
/// Used exactly once, for the boot handshake. Words are 32-bit
/// sentinels or boot-stage progress codes.
pub trait InterCoreFifo {
    /// Take the next word if one is waiting
    fn try_read(&mut self) -> Option<u32>;

    /// Push a word, blocking until there is space
    fn write(&mut self, word: u32);
}

/// Heartbeat / fault indicator LED
pub trait StatusLed {
    fn set(&mut self, on: bool);
}
