//! Parameters structure for NavCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Navigation control.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    // ---- MOTION MODEL ----

    /// Distance covered by one full-speed forward step.
    ///
    /// Units: meters
    pub increment_m: f64,

    /// Linear speed demanded during a full forward step.
    ///
    /// Units: meters/second
    pub fwd_speed_ms: f64,

    /// Angular rate demanded for a quarter turn. Positive rates turn the
    /// robot left.
    ///
    /// Units: radians/second
    pub quarter_turn_rate_rads: f64,

    // ---- SCHEDULING ----

    /// Settle pause requested after each translation demand.
    ///
    /// Units: seconds
    pub translate_settle_s: f64,

    /// Settle pause requested after each rotation demand.
    ///
    /// Units: seconds
    pub rotate_settle_s: f64,

    // ---- STRATEGY ----

    /// If true a goal with both components nonzero starts with a rotation
    /// onto the goal heading, and the forward distance becomes the straight
    /// line to the goal. If false the goal is driven axis by axis, forward
    /// first.
    pub turn_then_forward: bool,
}
