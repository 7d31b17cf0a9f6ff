//! Hardware abstraction traits
//!
//! These traits define the interface between the control/safety logic
//! and hardware-specific implementations.

pub mod actuator;
pub mod display;
pub mod sensor;
pub mod system;

pub use actuator::{Actuators, BallastPump, ServoChannel, Servos, VentValve};
pub use display::{BootDisplay, BootStage, FaultScreen};
pub use sensor::{
    AttitudeReading, BatteryMonitor, DepthReading, Imu, LeakSensor, PressureSensor, RcFrame,
    RcReceiver, RC_CHANNEL_COUNT,
};
pub use system::{InterCoreFifo, StatusLed, SystemControl, Watchdog};
