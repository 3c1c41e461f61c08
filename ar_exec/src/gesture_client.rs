//! # Gesture Client
//!
//! The gesture client subscribes to the steering stream published by the hand
//! tracker process. Like the marker client it drains its queue every cycle
//! and keeps only the newest sample.
//!
//! The tracker is the flakiest process in the system (it dies whenever the
//! camera does), so the socket is configured to retry its connection at a
//! fixed interval forever rather than backing off.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::gesture::{GestureMsg, SteeringData},
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};
use log::{info, warn};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Fixed interval between reconnection attempts to the tracker.
///
/// Units: milliseconds
const RECONNECT_IVL_MS: i32 = 3000;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The gesture tracker client
pub struct GestureClient {
    /// Subscriber socket for the steering stream
    socket: MonitoredSocket,
}

#[derive(Debug, thiserror::Error)]
pub enum GestureClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not recieve a sample from the tracker: {0}")]
    RecvError(zmq::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl GestureClient {
    /// Create a new instance of the gesture client.
    ///
    /// This function will not block if the tracker isn't up yet.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, GestureClientError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 0,
            // Pin min and max together for a constant retry cadence
            reconnect_ivl: RECONNECT_IVL_MS,
            reconnect_ivl_max: RECONNECT_IVL_MS,
            subscribe_topic: Some(String::new()),
            ..Default::default()
        };

        let socket = MonitoredSocket::new(ctx, zmq::SUB, socket_options, &params.gesture_endpoint)
            .map_err(GestureClientError::SocketError)?;

        Ok(Self { socket })
    }

    /// True if the tracker is currently connected.
    pub fn is_connected(&self) -> bool {
        self.socket.connected()
    }

    /// Drain the steering queue and return the newest sample, or `Ok(None)`
    /// if the tracker published nothing since the last call.
    pub fn latest_steering(&mut self) -> Result<Option<SteeringData>, GestureClientError> {
        let mut latest = None;

        loop {
            match self.socket.recv_string(0) {
                Ok(Ok(msg_str)) => match serde_json::from_str(&msg_str) {
                    Ok(GestureMsg::SteeringData(sample)) => latest = Some(sample),
                    Ok(GestureMsg::Connection { status }) => {
                        info!("Gesture tracker connection status: {}", status)
                    }
                    Err(e) => warn!("Could not parse gesture message: {}", e),
                },
                Ok(Err(_)) => warn!("Recieved non-UTF-8 message from the tracker"),
                Err(zmq::Error::EAGAIN) => break,
                Err(e) => return Err(GestureClientError::RecvError(e)),
            }
        }

        Ok(latest)
    }
}
