//! # Mobility Base Equipment Commands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Velocity demands that are sent from the BaseClient to the motor controller.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct BaseDems {
    /// The demanded linear velocity along the vehicle's forward axis.
    ///
    /// Units: meters/second. Positive demands are "forwards", negative
    /// demands are "backwards".
    pub linear_ms: f64,

    /// The demanded angular velocity about the vehicle's upwards axis.
    ///
    /// Units: radians/second. Follows the right hand rule, so positive
    /// demands rotate the vehicle to the left, negative to the right.
    pub angular_rads: f64,
}

/// A sensor frame published by the motor controller.
///
/// Only the fields the software consumes are represented here, the controller
/// publishes more which are skipped during deserialisation.
#[derive(Serialize, Deserialize, Debug, Copy, Clone)]
pub struct BaseSensFrame {
    /// Time at which the controller sampled the sensors.
    pub timestamp: DateTime<Utc>,

    /// Bitfield of the bumper and wheel-drop switches. Nonzero means at least
    /// one switch is active.
    pub bumps_wheeldrops: u8,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Response from the motor controller based on the demands sent by the client.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum BaseDemsResponse {
    /// Demands were valid and will be executed
    DemsOk,

    /// Demands were invalid and have been rejected
    DemsInvalid,

    /// Equipment is invalid so demands cannot be actuated
    EqptInvalid,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl BaseDems {
    /// A demand which brings the vehicle to a full stop.
    pub fn stop() -> Self {
        Self {
            linear_ms: 0.0,
            angular_rads: 0.0,
        }
    }
}

impl Default for BaseDems {
    fn default() -> Self {
        Self::stop()
    }
}

impl BaseSensFrame {
    /// True if any bumper or wheel-drop switch is active in this frame.
    pub fn bumped(&self) -> bool {
        self.bumps_wheeldrops != 0
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_stop_dems_are_zero() {
        let dems = BaseDems::stop();
        assert_eq!(dems.linear_ms, 0.0);
        assert_eq!(dems.angular_rads, 0.0);

        // The default demand must also be a stop
        assert_eq!(BaseDems::default(), dems);
    }

    #[test]
    fn test_sens_frame_bumped() {
        let mut frame = BaseSensFrame {
            timestamp: Utc::now(),
            bumps_wheeldrops: 0,
        };
        assert!(!frame.bumped());

        // Any single switch in the bitfield counts as a bump
        frame.bumps_wheeldrops = 0b0000_0100;
        assert!(frame.bumped());
    }
}
