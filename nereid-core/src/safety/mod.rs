//! Safety core logic
//!
//! Everything the 100 Hz safety loop runs: fault detection, the
//! emergency blow sequence, the catastrophic-failure path, and the
//! boot handshake that gates the dive on the control core coming up.

pub mod emergency;
pub mod faults;
pub mod handshake;
pub mod monitor;

pub use emergency::{catastrophic_failure, EmergencySequence};
pub use faults::FaultFlags;
pub use handshake::{HandshakeResult, HandshakeTiming};
pub use monitor::{SafetyMonitor, SafetyOutputs};
