//! Host platform (linux for example) utility functions

use std::path::PathBuf;
use uname;

/// Retrieve uname information.
pub fn get_uname() -> std::io::Result<uname::Info> {
    uname::uname()
}

/// Get the software root directory from the `TALOS_SW_ROOT` environment
/// variable.
pub fn get_talos_sw_root() -> Result<PathBuf, std::env::VarError> {
    std::env::var("TALOS_SW_ROOT").map(PathBuf::from)
}
