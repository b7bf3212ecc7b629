//! # Navigation executive library.
//!
//! This library allows other crates in the workspace to access items defined
//! inside the navigation executive.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Base client - sends velocity demands to the mobility base and recieves its sensor frames
#[cfg(feature = "base")]
pub mod base_client;

/// Global data store for the executive
pub mod data_store;

/// Navigation control module - decomposes relative goals into rotate/translate demands
pub mod nav_ctrl;

/// Executive parameters
pub mod params;

/// Telecommand client - recieves telecommands from the tc server
pub mod tc_client;

/// Telemetry server - publishes the executive's state once per cycle
pub mod tm_server;
