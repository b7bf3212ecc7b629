//! # Script interpreter module
//!
//! This module provides an interpreter for timed telecommand scripts, allowing
//! TCs to be executed from a file rather than from a remote TC server.
//!
//! A script is a plain text file in which each line has the format
//! `<exec_time_s>: <tc json>;`, for example:
//!
//! ```text
//! 1.0: {"Goto": {"x_m": 2.0, "y_m": 0.0}};
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use thiserror::Error;

// Internal
use crate::session::get_elapsed_seconds;
use comms_if::tc::{Tc, TcParseError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command which is scripted to occur at a specific time.
struct Command {
    /// The time the command is supposed to execute at
    exec_time_s: f64,

    /// The telecommand to run
    tc: Tc,
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use
/// `.get_pending_tcs` to acquire the telecommands that need executing.
pub struct ScriptInterpreter {
    cmds: VecDeque<Command>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script contains no commands")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)"
    )]
    InvalidTimestamp(String),

    #[error("Script contains an invalid TC at {0} s: {1}")]
    InvalidTc(f64, TcParseError),
}

pub enum PendingTcs {
    None,
    Some(Vec<Tc>),
    EndOfScript,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {
    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let path = script_path.as_ref();

        // Check that the script file exists.
        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(
                path.to_string_lossy().to_string(),
            ));
        }

        // Load the script into a string
        let script = fs::read_to_string(path).map_err(ScriptError::ScriptLoadError)?;

        // Empty queue of commands
        let mut tc_queue: VecDeque<Command> = VecDeque::new();

        // Each line of the script is `<time>: <payload>;`, the regex splits
        // out the time (group 1) and the payload (group 3).
        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .unwrap();

        for cap in re.captures_iter(&script) {
            // Parse the exec time
            let exec_time_s: f64 = match cap.get(1).unwrap().as_str().parse() {
                Ok(t) => t,
                Err(e) => return Err(ScriptError::InvalidTimestamp(format!("{}", e))),
            };

            // Parse the TC from the payload. The scripts contain JSON only.
            let tc = Tc::from_json(cap.get(3).unwrap().as_str())
                .map_err(|e| ScriptError::InvalidTc(exec_time_s, e))?;

            // Build command from the match
            tc_queue.push_back(Command { exec_time_s, tc });
        }

        if tc_queue.is_empty() {
            return Err(ScriptError::ScriptEmpty);
        }

        Ok(ScriptInterpreter { cmds: tc_queue })
    }

    /// Return a vector of pending TCs, or `None` if no TCs need executing now.
    pub fn get_pending_tcs(&mut self) -> PendingTcs {
        // If the queue is empty the script is over and we return the end of
        // script variant
        if self.cmds.is_empty() {
            return PendingTcs::EndOfScript;
        }

        let mut tc_vec: Vec<Tc> = vec![];

        let current_time_s = get_elapsed_seconds();

        // Pop items from the front of the queue for as long as their exec
        // times are lower than the current time.
        while let Some(cmd) = self.cmds.front() {
            if cmd.exec_time_s < current_time_s {
                if let Some(cmd) = self.cmds.pop_front() {
                    tc_vec.push(cmd.tc);
                }
            } else {
                break;
            }
        }

        if tc_vec.is_empty() {
            PendingTcs::None
        } else {
            PendingTcs::Some(tc_vec)
        }
    }

    /// Get the number of TCs remaining in the script
    pub fn get_num_tcs(&self) -> usize {
        self.cmds.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.cmds.back() {
            Some(c) => c.exec_time_s,
            None => 0f64,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_script(name: &str, content: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_script_parsing() {
        let path = write_script(
            "test_script_parsing.tcs",
            "1.0: {\"Goto\": {\"x_m\": 2.0, \"y_m\": 0.0}};\n\
             2.5: \"MakeSafe\";\n",
        );

        let interp = ScriptInterpreter::new(&path).unwrap();

        assert_eq!(interp.get_num_tcs(), 2);
        assert_eq!(interp.get_duration(), 2.5);
    }

    #[test]
    fn test_empty_script() {
        let path = write_script("test_empty_script.tcs", "# no commands in here\n");

        assert!(matches!(
            ScriptInterpreter::new(&path),
            Err(ScriptError::ScriptEmpty)
        ));
    }

    #[test]
    fn test_invalid_tc() {
        let path = write_script("test_invalid_tc.tcs", "1.0: {\"Goto\": 12};\n");

        assert!(matches!(
            ScriptInterpreter::new(&path),
            Err(ScriptError::InvalidTc(_, _))
        ));
    }

    #[test]
    fn test_missing_script() {
        assert!(matches!(
            ScriptInterpreter::new("/definitely/not/a/script.tcs"),
            Err(ScriptError::ScriptNotFound(_))
        ));
    }
}
