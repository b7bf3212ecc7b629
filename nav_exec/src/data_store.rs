//! # Data Store

use comms_if::eqpt::base::BaseSensFrame;
use log::{info, warn};
use serde::Serialize;
use util::module::State;

use crate::nav_ctrl;

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Gives the reason the robot has been put into safe mode
#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize)]
pub enum SafeModeCause {
    MakeSafeTc,
    TcServerNotConnected,
    BaseNotConnected,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// Elapsed time since the start of the session
    pub elapsed_time_s: f64,

    // Safe mode variables
    /// Determines if the robot is in safe mode.
    pub safe: bool,

    /// Gives the reason for the robot being in safe mode.
    pub safe_cause: Option<SafeModeCause>,

    // NavCtrl
    pub nav_ctrl: nav_ctrl::NavCtrl,
    pub nav_ctrl_input: nav_ctrl::InputData,
    pub nav_ctrl_output: nav_ctrl::OutputData,
    pub nav_ctrl_status_rpt: nav_ctrl::StatusReport,

    /// Most recent sensor frame recieved from the base
    pub last_base_sens: Option<BaseSensFrame>,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Number of consecutive base client recieve errors
    pub num_consec_base_recv_errors: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Puts the robot into safe mode with the given cause.
    ///
    /// Entering safe mode abandons any goal in progress, safe mode must
    /// result in no motion of the vehicle.
    pub fn make_safe(&mut self, cause: SafeModeCause) {
        if !self.safe {
            warn!("Make safe requested, cause: {:?}", cause);
            self.safe = true;
            self.safe_cause = Some(cause);

            // Make nav_ctrl safe
            self.nav_ctrl.make_safe();
        }
    }

    /// Attempts to disable the safe mode by clearing the given cause.
    ///
    /// Returns `Ok(())` if this cause was cleared and safe mode was disabled, or `Err(())`
    /// otherwise. To remove safe mode the provided cause must match the initial reason for safe
    /// mode being enabled.
    ///
    /// If safe mode was not enabled `Ok(())` is returned
    pub fn make_unsafe(&mut self, cause: SafeModeCause) -> Result<(), ()> {
        if !self.safe {
            return Ok(());
        }

        match self.safe_cause {
            Some(root_cause) => {
                if cause == root_cause {
                    self.safe = false;
                    self.safe_cause = None;
                    info!("Make unsafe requested, root cause match, safe mode disabled");
                    Ok(())
                } else {
                    Err(())
                }
            }
            None => Ok(()),
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle.
    pub fn cycle_start(&mut self) {
        self.nav_ctrl_input = nav_ctrl::InputData::default();
        self.nav_ctrl_output = nav_ctrl::OutputData::default();
        self.nav_ctrl_status_rpt = nav_ctrl::StatusReport::default();

        self.elapsed_time_s = util::session::get_elapsed_seconds();
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::tc::GoalCmd;

    #[test]
    fn test_make_unsafe_requires_root_cause() {
        let mut ds = DataStore::default();

        ds.make_safe(SafeModeCause::TcServerNotConnected);
        assert!(ds.safe);

        // A different cause does not clear safe mode
        assert!(ds.make_unsafe(SafeModeCause::MakeSafeTc).is_err());
        assert!(ds.safe);

        // The root cause does
        assert!(ds.make_unsafe(SafeModeCause::TcServerNotConnected).is_ok());
        assert!(!ds.safe);

        // Clearing while not safe is not an error
        assert!(ds.make_unsafe(SafeModeCause::MakeSafeTc).is_ok());
    }

    #[test]
    fn test_make_safe_abandons_goal() {
        let mut ds = DataStore::default();

        ds.nav_ctrl.set_goal(&GoalCmd { x_m: 1.0, y_m: 0.0 }).unwrap();
        assert!(ds.nav_ctrl.busy());

        ds.make_safe(SafeModeCause::MakeSafeTc);
        assert!(!ds.nav_ctrl.busy());
    }
}
