//! Closed-loop controllers
//!
//! The PID engine plus the domain controllers built on it, and the
//! ballast state machine that turns level targets into pump/valve
//! commands.

pub mod ballast;
pub mod depth;
pub mod pid;
pub mod pitch;

pub use ballast::{BallastController, BallastOutputs, BallastState};
pub use depth::DepthController;
pub use pid::Pid;
pub use pitch::PitchController;
