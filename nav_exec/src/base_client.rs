//! # Mobility Base Client
//!
//! This module provides networking abstractions to connect to the mobility base. Two links are
//! managed:
//!
//! - A request/reply link used to send velocity demands to the base and collect the base's
//!   acknowledgement of each one.
//! - A subscription to the base's sensor feed. Frames arrive as fast as the base publishes them,
//!   so a background thread collects them into a queue which the executive drains at the start of
//!   each cycle. Queueing rather than keeping the latest frame means a bump bit can never be lost
//!   behind a later clean frame.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{channel, Receiver, Sender},
        Arc,
    },
    thread::{self, JoinHandle},
};

use log::{error, warn};

use comms_if::{
    eqpt::base::{BaseDems, BaseDemsResponse, BaseSensFrame},
    net::{zmq, MonitoredSocket, MonitoredSocketError, SocketOptions},
};

use crate::params::NavExecParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct BaseClient {
    dems_socket: MonitoredSocket,

    sens_rx: Receiver<BaseSensFrame>,

    bg_jh: Option<JoinHandle<()>>,
    bg_run: Arc<AtomicBool>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum BaseClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not subscribe to the base sensor feed: {0}")]
    SubscribeError(zmq::Error),

    #[error("The client is not connected to the base")]
    NotConnected,

    #[error("Could not send demands to the base: {0}")]
    SendError(zmq::Error),

    #[error("Could not recieve a message from the base: {0}")]
    RecvError(zmq::Error),

    #[error("Could not serialize the demands: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not deserialize the response from the base: {0}")]
    DeserializeError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl BaseClient {
    /// Create a new instance of the base client.
    ///
    /// This function will not block until the base connects, demands sent before the base is up
    /// fail with [`BaseClientError::NotConnected`] and the executive handles that as a safe mode
    /// cause.
    pub fn new(ctx: &zmq::Context, params: &NavExecParams) -> Result<Self, BaseClientError> {
        // Create the socket options
        let dems_socket_options = SocketOptions {
            block_on_first_connect: false,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            req_correlate: true,
            req_relaxed: true,
            ..Default::default()
        };
        let sens_socket_options = SocketOptions {
            block_on_first_connect: false,
            connect_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            ..Default::default()
        };

        // Create the sockets
        let dems_socket =
            MonitoredSocket::new(ctx, zmq::REQ, dems_socket_options, &params.base_dems_endpoint)
                .map_err(BaseClientError::SocketError)?;
        let sens_socket =
            MonitoredSocket::new(ctx, zmq::SUB, sens_socket_options, &params.base_sens_endpoint)
                .map_err(BaseClientError::SocketError)?;

        // Subscribe to everything the base publishes
        sens_socket
            .set_subscribe(b"")
            .map_err(BaseClientError::SubscribeError)?;

        // Create the queue and run flag shared with the background thread
        let (sens_tx, sens_rx) = channel();
        let bg_run = Arc::new(AtomicBool::new(true));

        let bg_run_clone = bg_run.clone();

        // Start BG thread
        let bg_jh = Some(thread::spawn(move || {
            bg_thread(sens_socket, bg_run_clone, sens_tx)
        }));

        Ok(Self {
            dems_socket,
            sens_rx,
            bg_jh,
            bg_run,
        })
    }

    /// Check if the demands link to the base is connected
    pub fn is_connected(&self) -> bool {
        self.dems_socket.connected()
    }

    /// Send velocity demands to the base.
    ///
    /// Sends the given demands to the base. If the base acknowledges the demands within the
    /// configured timeout the response is returned, otherwise an `Err()` is returned.
    pub fn send_demands(&mut self, demands: &BaseDems) -> Result<BaseDemsResponse, BaseClientError> {
        // If not connected return now
        if !self.dems_socket.connected() {
            return Err(BaseClientError::NotConnected);
        }

        // Serialize the demands
        let dems_str =
            serde_json::to_string(demands).map_err(BaseClientError::SerializationError)?;

        // Send the demands to the base
        self.dems_socket
            .send(&dems_str, 0)
            .map_err(BaseClientError::SendError)?;

        // Recieve response back from the base
        match self.dems_socket.recv_msg(0) {
            Ok(m) => serde_json::from_str(m.as_str().unwrap_or(""))
                .map_err(BaseClientError::DeserializeError),
            Err(e) => Err(BaseClientError::RecvError(e)),
        }
    }

    /// Drain all sensor frames recieved since the last call.
    ///
    /// Frames are returned oldest first. An empty vector means the base has not published since
    /// the last drain, which is only a problem if it persists, and is left to the executive's
    /// monitoring counters to detect.
    pub fn drain_frames(&self) -> Vec<BaseSensFrame> {
        self.sens_rx.try_iter().collect()
    }
}

impl Drop for BaseClient {
    fn drop(&mut self) {
        self.bg_run.store(false, Ordering::Relaxed);

        if let Some(jh) = self.bg_jh.take() {
            jh.join().ok();
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Background thread, queues each sensor frame the base publishes.
fn bg_thread(socket: MonitoredSocket, run: Arc<AtomicBool>, sens_tx: Sender<BaseSensFrame>) {
    // While instructed to run
    while run.load(Ordering::Relaxed) {
        // Read string from the socket
        let msg = match socket.recv_string(0) {
            Ok(Ok(s)) => s,
            Ok(Err(_)) => {
                warn!("Non UTF-8 message from the base");
                continue;
            }
            Err(zmq::Error::EAGAIN) => continue,
            Err(e) => {
                error!("Error recieving sensor frame from the base: {:?}", e);
                break;
            }
        };

        // Deserialize the frame
        let frame: BaseSensFrame = match serde_json::from_str(&msg) {
            Ok(f) => f,
            Err(e) => {
                warn!("Error deserialising sensor frame from the base: {:?}", e);
                continue;
            }
        };

        // Queue the frame, if the executive has gone away stop the thread
        if sens_tx.send(frame).is_err() {
            break;
        }
    }
}
