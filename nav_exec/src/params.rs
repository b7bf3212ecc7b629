//! # Navigation Executable Parameters
//!
//! This module provides parameters for the navigation executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
pub struct NavExecParams {
    /// Network endpoint for the telecommand client
    pub tc_endpoint: String,

    /// Network endpoint for the base demands socket
    pub base_dems_endpoint: String,

    /// Network endpoint for the base sensor data socket
    pub base_sens_endpoint: String,

    /// Network endpoint for the telemetry publisher
    pub tm_endpoint: String,
}
