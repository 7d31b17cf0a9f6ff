//! Operator commands

/// High-level commands decoded from the RC link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// No command this cycle
    None,
    /// Begin a dive toward the configured target depth
    Dive,
    /// Return to the surface
    Surface,
    /// Hold the current depth under closed-loop control
    DepthHold,
    /// Release depth hold, operator controls planes directly
    Manual,
    /// Immediate emergency blow
    Emergency,
}
