//! Event logging
//!
//! A small ring of timestamped event records. Logging is fire-and-forget
//! everywhere: nothing in the control or safety path waits on, or can be
//! failed by, the log.

/// Number of entries the ring retains
pub const EVENT_LOG_SIZE: usize = 32;

/// Event codes recorded by the safety and control paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum EventCode {
    #[default]
    None = 0,
    InitComplete,
    SignalLost,
    SignalRestored,
    LowBattery,
    BatteryRestored,
    LeakDetected,
    DepthExceeded,
    PitchExceeded,
    CoreStall,
    EmergencyBlow,
    AssertFail,
}

/// One recorded event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventRecord {
    pub timestamp_ms: u32,
    pub code: EventCode,
    pub param1: u8,
    pub param2: u8,
}

/// Fire-and-forget event sink
pub trait EventSink {
    fn log(&mut self, code: EventCode, timestamp_ms: u32, param1: u8, param2: u8);
}

/// Sink that drops everything; for paths and tests that don't log
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn log(&mut self, _code: EventCode, _timestamp_ms: u32, _param1: u8, _param2: u8) {}
}

/// Fixed-size event ring buffer
///
/// Overwrites the oldest entry once full. Indexing is newest-first so a
/// post-mortem readout starts with what mattered.
#[derive(Debug)]
pub struct EventLog {
    entries: [EventRecord; EVENT_LOG_SIZE],
    head: usize,
    count: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    pub const fn new() -> Self {
        Self {
            entries: [EventRecord {
                timestamp_ms: 0,
                code: EventCode::None,
                param1: 0,
                param2: 0,
            }; EVENT_LOG_SIZE],
            head: 0,
            count: 0,
        }
    }

    /// Number of retained entries
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Fetch an entry counting back from the newest (0 = newest)
    pub fn newest(&self, index_from_newest: usize) -> Option<EventRecord> {
        if index_from_newest >= self.count {
            return None;
        }
        let newest = (self.head + EVENT_LOG_SIZE - 1) % EVENT_LOG_SIZE;
        let idx = (newest + EVENT_LOG_SIZE - index_from_newest) % EVENT_LOG_SIZE;
        Some(self.entries[idx])
    }
}

impl EventSink for EventLog {
    fn log(&mut self, code: EventCode, timestamp_ms: u32, param1: u8, param2: u8) {
        self.entries[self.head] = EventRecord {
            timestamp_ms,
            code,
            param1,
            param2,
        };
        self.head = (self.head + 1) % EVENT_LOG_SIZE;
        if self.count < EVENT_LOG_SIZE {
            self.count += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_log() {
        let log = EventLog::new();
        assert!(log.is_empty());
        assert_eq!(log.newest(0), None);
    }

    #[test]
    fn test_newest_first_ordering() {
        let mut log = EventLog::new();
        log.log(EventCode::SignalLost, 100, 0, 0);
        log.log(EventCode::LeakDetected, 200, 0, 0);

        assert_eq!(log.len(), 2);
        assert_eq!(log.newest(0).unwrap().code, EventCode::LeakDetected);
        assert_eq!(log.newest(1).unwrap().code, EventCode::SignalLost);
        assert_eq!(log.newest(2), None);
    }

    #[test]
    fn test_wraparound_overwrites_oldest() {
        let mut log = EventLog::new();
        for i in 0..(EVENT_LOG_SIZE as u32 + 5) {
            log.log(EventCode::LowBattery, i, 0, 0);
        }

        assert_eq!(log.len(), EVENT_LOG_SIZE);
        assert_eq!(
            log.newest(0).unwrap().timestamp_ms,
            EVENT_LOG_SIZE as u32 + 4
        );
        assert_eq!(
            log.newest(EVENT_LOG_SIZE - 1).unwrap().timestamp_ms,
            5
        );
    }
}
