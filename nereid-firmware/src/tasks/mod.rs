//! Per-core tasks: safety supervision on core 0, dive control on core 1

pub mod control;
pub mod safety;
