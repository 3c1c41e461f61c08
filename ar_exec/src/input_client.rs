//! # Input Client
//!
//! The input client receives driver commands from whichever frontend is
//! attached (the AR display or `drive_cli`). The exec binds this endpoint so
//! frontends can come and go freely during a session.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    input::DriverCmd,
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};
use log::warn;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The driver input client
pub struct InputClient {
    /// Subscriber socket for driver commands
    socket: MonitoredSocket,
}

#[derive(Debug, thiserror::Error)]
pub enum InputClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not recieve a driver command: {0}")]
    RecvError(zmq::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl InputClient {
    /// Create a new instance of the input client.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, InputClientError> {
        let socket_options = SocketOptions {
            bind: true,
            block_on_first_connect: false,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 0,
            subscribe_topic: Some(String::new()),
            ..Default::default()
        };

        let socket = MonitoredSocket::new(ctx, zmq::SUB, socket_options, &params.input_endpoint)
            .map_err(InputClientError::SocketError)?;

        Ok(Self { socket })
    }

    /// True if a frontend is currently connected.
    pub fn is_connected(&self) -> bool {
        self.socket.connected()
    }

    /// Drain all pending driver commands, in arrival order.
    ///
    /// Unlike the sensor channels every command matters here, a key release
    /// must not be dropped just because a key press arrived after it.
    pub fn pending_cmds(&mut self) -> Result<Vec<DriverCmd>, InputClientError> {
        let mut cmds = vec![];

        loop {
            match self.socket.recv_string(0) {
                Ok(Ok(msg_str)) => match DriverCmd::from_json(&msg_str) {
                    Ok(cmd) => cmds.push(cmd),
                    Err(e) => warn!("Could not parse driver command: {}", e),
                },
                Ok(Err(_)) => warn!("Recieved non-UTF-8 driver command"),
                Err(zmq::Error::EAGAIN) => break,
                Err(e) => return Err(InputClientError::RecvError(e)),
            }
        }

        Ok(cmds)
    }
}
