//! # Telecommand Client
//!
//! Receives telecommands from the operator's console over a REP socket and
//! sends back the response for each one.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    net::{zmq, MonitoredSocket, MonitoredSocketError, SocketOptions},
    tc::{Tc, TcParseError, TcResponse},
};

use crate::params::NavExecParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Telecommand client
pub struct TcClient {
    socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TcClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("The client is not connected to the server")]
    NotConnected,

    #[error("Could not send a response to the server: {0}")]
    SendError(zmq::Error),

    #[error("Could not recieve a message from the server: {0}")]
    RecvError(zmq::Error),

    #[error("Could not serialize the response: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not parse the recieved telecommand: {0}")]
    TcParseError(TcParseError),

    #[error("The server sent a message which was not valid UTF-8")]
    NonUtf8Tc,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TcClient {
    /// Create a new instance of the TC Client.
    ///
    /// This function will not block until the server connects.
    pub fn new(ctx: &zmq::Context, params: &NavExecParams) -> Result<Self, TcClientError> {
        // Create the socket options
        // TODO: Move these into a parameter file
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            ..Default::default()
        };

        // Connect the socket
        let socket = MonitoredSocket::new(ctx, zmq::REP, socket_options, &params.tc_endpoint)
            .map_err(TcClientError::SocketError)?;

        Ok(Self { socket })
    }

    /// Check if the client is connected to the server
    pub fn is_connected(&self) -> bool {
        self.socket.connected()
    }

    /// Recieve a single TC from the server.
    ///
    /// The protocol here is to call recieve_tc in a loop until `Ok(None)` is returned, indicating
    /// that there are no more pending TCs to be recieved. This does not mean that the server will
    /// not send another TC in the future, just that there are none to handle right now.
    ///
    /// After recieving a valid TC the client must send a response using `.send_response()` before
    /// attempting to recieve another TC. If the recieved message cannot be parsed the `Invalid`
    /// response is sent automatically by this function.
    pub fn recieve_tc(&self) -> Result<Option<Tc>, TcClientError> {
        // Check the server is connected
        if !self.socket.connected() {
            return Err(TcClientError::NotConnected);
        }

        // Attempt to read a string from the socket
        let tc_str = match self.socket.recv_string(0) {
            // Valid message
            Ok(Ok(s)) => s,
            // Non UTF-8 message
            Ok(Err(_)) => {
                self.send_response(TcResponse::Invalid)?;

                return Err(TcClientError::NonUtf8Tc);
            }
            // No message in timeout
            Err(zmq::Error::EAGAIN) => return Ok(None),
            // Recieve error, no response is sent since nothing was recieved
            Err(e) => return Err(TcClientError::RecvError(e)),
        };

        // Parse the TC, sending the invalid response on failure. The parse
        // error is the one reported if the response also fails to send.
        match Tc::from_json(&tc_str) {
            Ok(tc) => Ok(Some(tc)),
            Err(e) => {
                self.send_response(TcResponse::Invalid).ok();

                Err(TcClientError::TcParseError(e))
            }
        }
    }

    /// Send the given response back to the server.
    ///
    /// This function must be called after recieving a TC.
    pub fn send_response(&self, response: TcResponse) -> Result<(), TcClientError> {
        // Check the server is connected
        if !self.socket.connected() {
            return Err(TcClientError::NotConnected);
        }

        // Serialise the response
        let response_str =
            serde_json::to_string(&response).map_err(TcClientError::SerializationError)?;

        // Send the response
        self.socket
            .send(&response_str, 0)
            .map_err(TcClientError::SendError)
    }
}
