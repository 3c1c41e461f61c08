//! # Marker Client
//!
//! The marker client subscribes to the stream of detections published by the
//! marker recognizer process. The exec only ever acts on the newest
//! detection, so the client drains its queue every cycle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::marker::MarkerDetection,
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};
use log::warn;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The marker recognizer client
pub struct MarkerClient {
    /// Subscriber socket for the detection stream
    socket: MonitoredSocket,
}

#[derive(Debug, thiserror::Error)]
pub enum MarkerClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not recieve a detection from the recognizer: {0}")]
    RecvError(zmq::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MarkerClient {
    /// Create a new instance of the marker client.
    ///
    /// This function will not block if the recognizer isn't up yet, the
    /// socket reconnects in the background.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, MarkerClientError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            // Polled every cycle, so an empty queue must return immediately
            recv_timeout: 0,
            subscribe_topic: Some(String::new()),
            ..Default::default()
        };

        let socket = MonitoredSocket::new(ctx, zmq::SUB, socket_options, &params.marker_endpoint)
            .map_err(MarkerClientError::SocketError)?;

        Ok(Self { socket })
    }

    /// True if the recognizer is currently connected.
    pub fn is_connected(&self) -> bool {
        self.socket.connected()
    }

    /// Drain the detection queue and return the newest detection, or
    /// `Ok(None)` if the recognizer published nothing since the last call.
    ///
    /// Messages that aren't valid detections are dropped with a warning,
    /// they must not stall the rest of the cycle.
    pub fn latest_detection(&mut self) -> Result<Option<MarkerDetection>, MarkerClientError> {
        let mut latest = None;

        loop {
            match self.socket.recv_string(0) {
                Ok(Ok(msg_str)) => match serde_json::from_str(&msg_str) {
                    Ok(detection) => latest = Some(detection),
                    Err(e) => warn!("Could not parse marker detection: {}", e),
                },
                Ok(Err(_)) => warn!("Recieved non-UTF-8 message from the recognizer"),
                Err(zmq::Error::EAGAIN) => break,
                Err(e) => return Err(MarkerClientError::RecvError(e)),
            }
        }

        Ok(latest)
    }
}
