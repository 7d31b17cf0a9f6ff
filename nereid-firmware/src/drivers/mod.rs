//! Hardware drivers behind the nereid-core traits

pub mod actuators;
pub mod battery;
pub mod fifo;
pub mod leak;
pub mod led;
pub mod rc;
pub mod sensors;
pub mod watchdog;
