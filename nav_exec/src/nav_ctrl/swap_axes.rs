//! # Lateral to forward axis swap

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use comms_if::eqpt::base::BaseDems;
use nalgebra::Vector2;

// Internal
use super::*;

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl NavCtrl {
    /// Turn a purely lateral remaining goal into a forward one.
    ///
    /// Issues a full quarter turn towards the sign of `y`, then swaps the
    /// lateral distance into the forward register so the following cycles
    /// consume it as translation steps.
    pub(crate) fn swap_axes(&mut self) {
        if self.goal.y == 0.0 {
            self.phase = Phase::Done;
            return;
        }

        self.output.base_dems = Some(BaseDems {
            linear_ms: 0.0,
            angular_rads: self.params.quarter_turn_rate_rads * self.goal.y.signum(),
        });
        self.output.settle_duration_s = Some(self.params.rotate_settle_s);

        self.goal = Vector2::new(self.goal.y.abs(), 0.0);
        self.phase = Phase::MovingForward;
    }
}
