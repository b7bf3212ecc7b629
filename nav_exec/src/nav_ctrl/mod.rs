//! Navigation control module
//!
//! NavCtrl drives the robot to a single relative `(x, y)` goal by decomposing
//! it into discrete rotate and translate velocity demands, one per cycle. The
//! goal is held as a live remaining-distance register which is consumed as
//! demands are issued, and which a collision event resets unconditionally.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod rotate_to_heading;
mod state;
mod swap_axes;
mod translate;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Tolerance applied when deciding if a full increment step remains, so that
/// accumulated float error in the register cannot turn an exact multiple of
/// the increment into an extra partial step.
pub const DIST_EPS_M: f64 = 1e-9;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during NavCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum NavCtrlError {
    #[error("A goal is already in progress, the new goal has been dropped")]
    GoalInProgress,
}

/// Possible errors that can occur during NavCtrl initialisation.
#[derive(Debug, thiserror::Error)]
pub enum NavCtrlInitError {
    #[error("Could not load the NavCtrl parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("Could not initialise the NavCtrl archivers: {0}")]
    ArchInitError(#[from] util::archive::ArchiveError),
}
