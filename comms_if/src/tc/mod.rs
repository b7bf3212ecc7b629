//! # Telecommand module
//!
//! This module provides telecommand functionality to the communications
//! interface.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod goal;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use serde_json;
use thiserror::Error;

// Internal
pub use goal::GoalCmd;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the vehicle by the operator.
///
/// TCs are serialised as JSON on the wire. The variant name identifies the
/// purpose of the telecommand and is used by the executive's telecommand
/// processor to determine where to route the command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Tc {
    /// Put the vehicle into safe mode, halting all motion.
    MakeSafe,

    /// Take the vehicle out of safe mode, provided safe mode was commanded.
    MakeUnsafe,

    /// Drive to a point given relative to the vehicle's current frame.
    Goto(GoalCmd),
}

/// Response to a telecommand, sent back over the same link the TC arrived on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TcResponse {
    /// The TC was accepted for execution.
    Ok,

    /// The TC was understood but cannot be executed now (for example, the
    /// vehicle is in safe mode).
    CannotExecute,

    /// The TC could not be parsed.
    Invalid,
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {
    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)
    }

    /// Serialise the TC into a JSON packet
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_tc_json_round() {
        let tc = Tc::Goto(GoalCmd {
            x_m: 1.5,
            y_m: -0.5,
        });

        let json = tc.to_json().unwrap();
        assert_eq!(Tc::from_json(&json).unwrap(), tc);
    }

    #[test]
    fn test_tc_from_json_variants() {
        assert_eq!(Tc::from_json("\"MakeSafe\"").unwrap(), Tc::MakeSafe);
        assert_eq!(Tc::from_json("\"MakeUnsafe\"").unwrap(), Tc::MakeUnsafe);

        let tc = Tc::from_json(r#"{"Goto": {"x_m": 2.0, "y_m": 0.0}}"#).unwrap();
        match tc {
            Tc::Goto(cmd) => {
                assert_eq!(cmd.x_m, 2.0);
                assert_eq!(cmd.y_m, 0.0);
            }
            _ => panic!("Expected a Goto TC"),
        }
    }

    #[test]
    fn test_tc_invalid_json() {
        assert!(Tc::from_json("not json at all").is_err());
        assert!(Tc::from_json("\"Selfdestruct\"").is_err());
    }
}
