//! # Goal telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use structopt::StructOpt;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A relative navigation goal for the vehicle.
///
/// The goal is expressed in the vehicle's own frame at the moment the command
/// is accepted, and is consumed as a remaining-distance register as the
/// vehicle moves.
///
/// No bounds validation is performed on the magnitudes: arbitrarily large or
/// non-finite values are accepted and will propagate into velocity demands.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, StructOpt, PartialEq)]
pub struct GoalCmd {
    /// Offset along the vehicle's forward axis in meters.
    ///
    /// Positive offsets are "forwards", negative offsets are "backwards".
    #[structopt(allow_hyphen_values = true)]
    pub x_m: f64,

    /// Offset along the vehicle's lateral axis in meters.
    ///
    /// Follows the right hand rule about the vehicle's upwards axis, so that
    /// positive offsets are to the left and negative offsets to the right.
    #[structopt(allow_hyphen_values = true)]
    pub y_m: f64,
}
