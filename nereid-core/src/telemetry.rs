//! Cross-core telemetry mailbox
//!
//! The two loops share a handful of scalars with exactly one writer
//! each: the control loop publishes RC validity, depth, and pitch plus
//! its heartbeat; the safety loop owns the emergency latch. Readers
//! tolerate staleness because every field is independently meaningful
//! and re-read each cycle - there is no cross-field consistency to
//! protect, so there is no lock.

use portable_atomic::{AtomicBool, AtomicI16, AtomicI32, AtomicU32, Ordering};

/// Upper bound accepted by [`SharedState::update_depth`] (cm)
const DEPTH_SANITY_CM: i32 = 10_000;
/// Bound accepted by [`SharedState::update_pitch`] (0.1 degree units)
const PITCH_SANITY_X10: i16 = 1800;

/// The telemetry mailbox shared between the two cores
///
/// Const-constructible so the firmware can place it in a `static`.
/// All accesses are `Relaxed`: each field has a single writer and the
/// readers only need eventual visibility.
pub struct SharedState {
    /// Timestamp of the last valid RC frame (ms). Writer: control loop.
    last_rc_valid_ms: AtomicU32,
    /// Current depth (cm). Writer: control loop.
    depth_cm: AtomicI32,
    /// Current pitch (0.1 degrees). Writer: control loop.
    pitch_x10: AtomicI16,
    /// Control-loop liveness counter. Writer: control loop.
    heartbeat: AtomicU32,
    /// Monotonic emergency latch. Writer: safety loop.
    emergency: AtomicBool,
}

impl SharedState {
    pub const fn new() -> Self {
        Self {
            last_rc_valid_ms: AtomicU32::new(0),
            depth_cm: AtomicI32::new(0),
            pitch_x10: AtomicI16::new(0),
            heartbeat: AtomicU32::new(0),
            emergency: AtomicBool::new(false),
        }
    }

    /// Record the timestamp of a valid RC frame
    pub fn update_rc_time(&self, ms: u32) {
        self.last_rc_valid_ms.store(ms, Ordering::Relaxed);
    }

    /// Publish a depth reading; out-of-range values are dropped
    pub fn update_depth(&self, depth_cm: i32) {
        if !(0..=DEPTH_SANITY_CM).contains(&depth_cm) {
            return;
        }
        self.depth_cm.store(depth_cm, Ordering::Relaxed);
    }

    /// Publish a pitch reading; out-of-range values are dropped
    pub fn update_pitch(&self, pitch_x10: i16) {
        if !(-PITCH_SANITY_X10..=PITCH_SANITY_X10).contains(&pitch_x10) {
            return;
        }
        self.pitch_x10.store(pitch_x10, Ordering::Relaxed);
    }

    /// Advance the control-loop heartbeat (single writer, so a plain
    /// load+store is enough - no RMW available on thumbv6m anyway)
    pub fn bump_heartbeat(&self) {
        let next = self.heartbeat.load(Ordering::Relaxed).wrapping_add(1);
        self.heartbeat.store(next, Ordering::Relaxed);
    }

    /// Latch the emergency flag. One-way: there is no clearing call.
    pub fn latch_emergency(&self) {
        self.emergency.store(true, Ordering::Relaxed);
    }

    pub fn last_rc_valid_ms(&self) -> u32 {
        self.last_rc_valid_ms.load(Ordering::Relaxed)
    }

    pub fn depth_cm(&self) -> i32 {
        self.depth_cm.load(Ordering::Relaxed)
    }

    pub fn pitch_x10(&self) -> i16 {
        self.pitch_x10.load(Ordering::Relaxed)
    }

    pub fn heartbeat(&self) -> u32 {
        self.heartbeat.load(Ordering::Relaxed)
    }

    pub fn is_emergency(&self) -> bool {
        self.emergency.load(Ordering::Relaxed)
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_roundtrip() {
        let shared = SharedState::new();
        shared.update_rc_time(1234);
        shared.update_depth(150);
        shared.update_pitch(-300);

        assert_eq!(shared.last_rc_valid_ms(), 1234);
        assert_eq!(shared.depth_cm(), 150);
        assert_eq!(shared.pitch_x10(), -300);
    }

    #[test]
    fn test_out_of_range_writes_dropped() {
        let shared = SharedState::new();
        shared.update_depth(150);
        shared.update_depth(-5);
        shared.update_depth(20_000);
        assert_eq!(shared.depth_cm(), 150);

        shared.update_pitch(450);
        shared.update_pitch(2000);
        assert_eq!(shared.pitch_x10(), 450);
    }

    #[test]
    fn test_heartbeat_wraps() {
        let shared = SharedState::new();
        shared.heartbeat.store(u32::MAX, Ordering::Relaxed);
        shared.bump_heartbeat();
        assert_eq!(shared.heartbeat(), 0);
    }

    #[test]
    fn test_emergency_latch_is_one_way() {
        let shared = SharedState::new();
        assert!(!shared.is_emergency());
        shared.latch_emergency();
        shared.latch_emergency();
        assert!(shared.is_emergency());
    }
}
