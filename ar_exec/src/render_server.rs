//! # Render Server
//!
//! Publishes the scene state once per cycle for the display process to draw.
//! The packet is a complete description of the scene, so the display can be
//! restarted mid-session and pick straight back up.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use comms_if::net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions};

use crate::anchor::AnchorPhase;
use crate::data_store::DataStore;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Render state server
pub struct RenderServer {
    socket: MonitoredSocket,
}

/// Scene state packet that is output by the server.
#[derive(Debug, Serialize, Deserialize)]
pub struct RenderState {
    pub time_s: f64,

    pub anchor_status: AnchorStatus,

    /// The anchoring transform as a column-major array, present once anchored
    pub anchor_transform: Option<[f64; 16]>,

    /// The car is only drawn once the scene is anchored
    pub car_visible: bool,

    pub car_position: [f64; 2],

    pub car_heading_rad: f64,

    pub car_speed: f64,

    pub grid_visible: bool,

    pub marker_connected: bool,

    pub gesture_connected: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Anchor status as shown to the user by the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorStatus {
    /// Still looking for a marker
    Searching,

    /// Pinned to a marker
    Anchored,

    /// The marker channel never came up, anchoring can't happen this session
    Disabled,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send the render state: {0}")]
    SendError(zmq::Error),

    #[error("Could not serialize the render state: {0}")]
    SerializationError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RenderServer {
    /// Create a new instance of the render server.
    ///
    /// This function will not block until a display connects.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, RenderServerError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            bind: true,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(ctx, zmq::PUB, socket_options, &params.render_endpoint)
            .map_err(RenderServerError::SocketError)?;

        Ok(Self { socket })
    }

    pub fn send(&mut self, ds: &DataStore) -> Result<(), RenderServerError> {
        let packet = RenderState::from_datastore(ds);

        let packet_string =
            serde_json::to_string(&packet).map_err(RenderServerError::SerializationError)?;

        self.socket
            .send(&packet_string, 0)
            .map_err(RenderServerError::SendError)
    }
}

impl RenderState {
    pub fn from_datastore(ds: &DataStore) -> Self {
        let anchor_status = if !ds.marker_capability.is_available() {
            AnchorStatus::Disabled
        } else {
            match ds.anchor_output.phase {
                AnchorPhase::Searching => AnchorStatus::Searching,
                AnchorPhase::Anchored => AnchorStatus::Anchored,
            }
        };

        Self {
            time_s: ds.elapsed_time_s,
            anchor_status,
            anchor_transform: ds.anchor_output.transform_scene,
            car_visible: anchor_status == AnchorStatus::Anchored,
            car_position: ds.motion_output.position,
            car_heading_rad: ds.motion_output.heading_rad,
            car_speed: ds.motion_output.speed,
            grid_visible: ds.grid_visible,
            marker_connected: ds.marker_connected,
            gesture_connected: ds.gesture_connected,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::data_store::Capability;

    #[test]
    fn test_disabled_marker_channel_reported() {
        let mut ds = DataStore::default();
        ds.marker_capability = Capability::Unavailable("No recognizer".into());

        let packet = RenderState::from_datastore(&ds);

        assert_eq!(packet.anchor_status, AnchorStatus::Disabled);
        assert!(!packet.car_visible);
    }

    #[test]
    fn test_car_hidden_while_searching() {
        let mut ds = DataStore::default();
        ds.marker_capability = Capability::Available;

        let packet = RenderState::from_datastore(&ds);

        assert_eq!(packet.anchor_status, AnchorStatus::Searching);
        assert!(!packet.car_visible);
    }

    #[test]
    fn test_car_shown_once_anchored() {
        let mut ds = DataStore::default();
        ds.marker_capability = Capability::Available;
        ds.anchor_output.phase = AnchorPhase::Anchored;
        ds.anchor_output.transform_scene = Some([0.0; 16]);

        let packet = RenderState::from_datastore(&ds);

        assert_eq!(packet.anchor_status, AnchorStatus::Anchored);
        assert!(packet.car_visible);
        assert!(packet.anchor_transform.is_some());
    }
}
