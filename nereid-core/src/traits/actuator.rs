//! Actuator traits
//!
//! The boat has three actuator groups: the ballast pump (bidirectional,
//! PWM speed), the ballast vent valve (open/closed), and three control
//! surface servos. Implementations live in the firmware crate.

/// Control surface servo channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServoChannel {
    Rudder,
    BowPlane,
    SternPlane,
}

/// Bidirectional ballast pump
pub trait BallastPump {
    /// Set pump speed: -100 (full drain) to +100 (full fill), 0 stops.
    ///
    /// Implementations clamp out-of-range values.
    fn set_speed(&mut self, speed: i8);
}

/// Ballast vent valve
pub trait VentValve {
    /// Open or close the valve
    fn set_open(&mut self, open: bool);

    fn open(&mut self) {
        self.set_open(true);
    }

    fn close(&mut self) {
        self.set_open(false);
    }
}

/// Control surface servos
pub trait Servos {
    /// Set a servo position: -100 to +100, 0 is neutral.
    ///
    /// For the dive planes, +100 is maximum ascend.
    fn set_position(&mut self, channel: ServoChannel, position: i8);
}

/// Everything the emergency sequence needs to seize
///
/// The safety core drives this during an emergency blow; the control
/// core must stop issuing its own writes once the latch is visible.
pub trait Actuators: BallastPump + VentValve + Servos {}

impl<T: BallastPump + VentValve + Servos> Actuators for T {}
