//! # Telecommand processor module
//!
//! The telecommand processor routes TCs coming from any source into the
//! datastore, and decides the response to send back for each one.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};

// Internal
use comms_if::tc::{Tc, TcResponse};
use nav_lib::data_store::{DataStore, SafeModeCause};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Mutates the datastore to send commands to different modules. The returned
/// response is what the source of the TC should be told about it. A `Goto`
/// response only reflects that the goal was handed to the controller, a goal
/// arriving while one is in progress is still dropped later in the cycle.
pub(crate) fn exec(ds: &mut DataStore, tc: &Tc) -> TcResponse {
    // Handle different Tcs
    match tc {
        Tc::MakeSafe => {
            debug!("Recieved MakeSafe command");
            ds.make_safe(SafeModeCause::MakeSafeTc);

            TcResponse::Ok
        }
        Tc::MakeUnsafe => {
            debug!("Recieved MakeUnsafe command");

            match ds.make_unsafe(SafeModeCause::MakeSafeTc) {
                Ok(()) => TcResponse::Ok,
                // Safe mode was not commanded, the root cause has to clear
                // itself and the operator cannot override it
                Err(()) => {
                    warn!(
                        "MakeUnsafe rejected, safe mode cause is {:?}",
                        ds.safe_cause
                    );

                    TcResponse::CannotExecute
                }
            }
        }
        Tc::Goto(cmd) => {
            if ds.safe {
                warn!("Goto rejected, the vehicle is in safe mode");

                TcResponse::CannotExecute
            } else {
                ds.nav_ctrl_input.goal_cmd = Some(*cmd);

                TcResponse::Ok
            }
        }
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
    fn test_goto_routing() {
        let mut ds = DataStore::default();

        let resp = exec(&mut ds, &Tc::Goto(GoalCmd { x_m: 1.0, y_m: 2.0 }));
        assert_eq!(resp, TcResponse::Ok);

        let cmd = ds.nav_ctrl_input.goal_cmd.unwrap();
        assert_eq!(cmd.x_m, 1.0);
        assert_eq!(cmd.y_m, 2.0);
    }

    #[test]
    fn test_goto_rejected_in_safe_mode() {
        let mut ds = DataStore::default();

        assert_eq!(exec(&mut ds, &Tc::MakeSafe), TcResponse::Ok);
        assert!(ds.safe);

        let resp = exec(&mut ds, &Tc::Goto(GoalCmd { x_m: 1.0, y_m: 0.0 }));
        assert_eq!(resp, TcResponse::CannotExecute);
        assert!(ds.nav_ctrl_input.goal_cmd.is_none());

        // MakeUnsafe clears an operator commanded safe mode
        assert_eq!(exec(&mut ds, &Tc::MakeUnsafe), TcResponse::Ok);
        assert!(!ds.safe);
    }

    #[test]
    fn test_make_unsafe_cannot_clear_other_causes() {
        let mut ds = DataStore::default();

        ds.make_safe(SafeModeCause::BaseNotConnected);

        assert_eq!(exec(&mut ds, &Tc::MakeUnsafe), TcResponse::CannotExecute);
        assert!(ds.safe);
    }
}
