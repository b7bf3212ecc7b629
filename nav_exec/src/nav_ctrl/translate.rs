//! # Forward translation steps

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use comms_if::eqpt::base::BaseDems;

// Internal
use super::*;
use util::maths::lin_map;

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl NavCtrl {
    /// Consume one increment of the forward component of the goal.
    ///
    /// The translation is an open loop integrator: a full step assumes that
    /// driving at the fixed speed for one cycle covers exactly one increment,
    /// with no odometry feedback. The last step of an axis is scaled to the
    /// exact remainder and zeroes the register, so accumulated float error
    /// never leaves a dangling sub-increment residue (see [`DIST_EPS_M`]).
    pub(crate) fn translate(&mut self) {
        if self.goal.x.abs() > self.params.increment_m + DIST_EPS_M {
            // Full step at the fixed speed, sign following the register
            self.output.base_dems = Some(BaseDems {
                linear_ms: self.params.fwd_speed_ms * self.goal.x.signum(),
                angular_rads: 0.0,
            });

            self.goal.x -= self.params.increment_m * self.goal.x.signum();
        } else {
            // Final partial step, scaled to the exact remainder. lin_map is
            // linear through zero so the sign of x carries into the demand.
            self.output.base_dems = Some(BaseDems {
                linear_ms: lin_map(
                    (0.0, self.params.increment_m),
                    (0.0, self.params.fwd_speed_ms),
                    self.goal.x,
                ),
                angular_rads: 0.0,
            });

            self.goal.x = 0.0;
        }

        self.output.settle_duration_s = Some(self.params.translate_settle_s);

        if self.goal.x == 0.0 {
            self.phase = if self.goal.y == 0.0 {
                Phase::Done
            } else {
                Phase::SwappingAxes
            };
        }
    }
}
