//! # Rotation onto the goal heading

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::f64::consts::FRAC_PI_2;

use comms_if::eqpt::base::BaseDems;
use nalgebra::Vector2;

// Internal
use super::*;

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl NavCtrl {
    /// Issue the single rotation demand which points the robot at the goal.
    ///
    /// The rotation angle is `atan(x / y)`, positive to the left, and the
    /// angular rate is the quarter turn rate scaled by the fraction of a
    /// quarter turn to cover. Angles are radians throughout. The entry rules
    /// guarantee `y != 0` here, purely forward and purely lateral goals never
    /// enter this phase.
    ///
    /// Once the demand is issued the goal collapses onto the new forward
    /// axis, with the full straight line distance in `x`, and the phase moves
    /// to [`Phase::MovingForward`] so the next cycle starts translating.
    pub(crate) fn rotate_to_heading(&mut self) {
        let angle_rads = (self.goal.x / self.goal.y).atan();

        self.output.base_dems = Some(BaseDems {
            linear_ms: 0.0,
            angular_rads: self.params.quarter_turn_rate_rads * angle_rads / FRAC_PI_2,
        });
        self.output.settle_duration_s = Some(self.params.rotate_settle_s);

        self.goal = Vector2::new(self.goal.norm(), 0.0);
        self.phase = Phase::MovingForward;
    }
}
