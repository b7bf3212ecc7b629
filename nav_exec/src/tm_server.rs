//! # TM Server
//!
//! Publishes one telemetry packet per cycle so that ground tools can follow what the executive is
//! doing without being part of the command loop.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Serialize;

use comms_if::{
    eqpt::base::BaseSensFrame,
    net::{zmq, MonitoredSocket, MonitoredSocketError, SocketOptions},
};

use crate::{
    data_store::{DataStore, SafeModeCause},
    nav_ctrl,
};

use crate::params::NavExecParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Telemetry server
pub struct TmServer {
    socket: MonitoredSocket,
}

/// Telemetry packet that is output by the server.
#[derive(Debug, Serialize)]
pub struct TmPacket {
    /// Elapsed session time at the point the packet was built
    pub time_s: f64,

    pub safe: bool,

    pub safe_cause: Option<SafeModeCause>,

    pub nav_ctrl_output: nav_ctrl::OutputData,

    pub nav_ctrl_status_rpt: nav_ctrl::StatusReport,

    pub last_base_sens: Option<BaseSensFrame>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TmServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send telemetry: {0}")]
    SendError(zmq::Error),

    #[error("Could not serialize the telemetry: {0}")]
    SerializationError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TmServer {
    /// Create a new instance of the TM Server.
    ///
    /// The server binds and publishes whether or not anyone is listening.
    pub fn new(ctx: &zmq::Context, params: &NavExecParams) -> Result<Self, TmServerError> {
        // Create the socket options
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            bind: true,
            connect_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            ..Default::default()
        };

        // Bind the socket
        let socket = MonitoredSocket::new(ctx, zmq::PUB, socket_options, &params.tm_endpoint)
            .map_err(TmServerError::SocketError)?;

        Ok(Self { socket })
    }

    /// Publish the telemetry for this cycle.
    pub fn send(&mut self, ds: &DataStore) -> Result<(), TmServerError> {
        // Build packet
        let packet = TmPacket::from_datastore(ds);

        // Serialize packet
        let packet_string =
            serde_json::to_string(&packet).map_err(TmServerError::SerializationError)?;

        // Send the packet
        self.socket
            .send(&packet_string, 0)
            .map_err(TmServerError::SendError)
    }
}

impl TmPacket {
    pub fn from_datastore(ds: &DataStore) -> Self {
        Self {
            time_s: ds.elapsed_time_s,
            safe: ds.safe,
            safe_cause: ds.safe_cause,
            nav_ctrl_output: ds.nav_ctrl_output,
            nav_ctrl_status_rpt: ds.nav_ctrl_status_rpt,
            last_base_sens: ds.last_base_sens,
        }
    }
}
