//! # Data Store

use comms_if::eqpt::gesture::SteeringData;
use log::info;

use crate::{anchor, motion};

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Whether an optional external channel is usable in this run.
///
/// Computed once during network initialisation and never re-evaluated, so
/// every part of the exec sees the same answer for the whole session.
#[derive(Debug, Clone, PartialEq)]
pub enum Capability {
    /// The channel came up and can be polled.
    Available,

    /// The channel could not be brought up, with the reason why.
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// State of the driver's held controls, accumulated from key events.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyState {
    pub forward: bool,
    pub backward: bool,
    pub steer_left: bool,
    pub steer_right: bool,
    pub brake: bool,
}

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Session elapsed time
    pub elapsed_time_s: f64,

    // Channel capabilities
    pub marker_capability: Capability,
    pub gesture_capability: Capability,

    /// True if the marker channel is currently connected
    pub marker_connected: bool,

    /// True if the gesture channel is currently connected
    pub gesture_connected: bool,

    // Driver inputs
    pub key_state: KeyState,

    /// The newest steering sample from the gesture tracker, cleared once it
    /// goes stale.
    pub latest_steering: Option<SteeringData>,

    /// Number of cycles since the last fresh steering sample arrived
    pub steering_age_cycles: u64,

    /// True if a reset was commanded this cycle
    pub reset_requested: bool,

    /// Whether the ground grid overlay is shown in the scene
    pub grid_visible: bool,

    // AnchorCtrl
    pub anchor_ctrl: anchor::AnchorCtrl,
    pub anchor_input: anchor::InputData,
    pub anchor_output: anchor::OutputData,
    pub anchor_status_rpt: anchor::StatusReport,

    // MotionCtrl
    pub motion_ctrl: motion::MotionCtrl,
    pub motion_input: motion::InputData,
    pub motion_output: motion::OutputData,
    pub motion_status_rpt: motion::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl Default for Capability {
    fn default() -> Self {
        Capability::Unavailable(String::from("Not initialised"))
    }
}

impl Capability {
    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available)
    }
}

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        self.is_1_hz_cycle = self.num_cycles % (cycle_frequency_hz as u128) == 0;

        self.anchor_input = anchor::InputData::default();
        self.anchor_status_rpt = anchor::StatusReport::default();
        self.motion_input = motion::InputData::default();
        self.motion_status_rpt = motion::StatusReport::default();

        self.elapsed_time_s = util::session::get_elapsed_seconds();
    }

    /// Reset the scene back to its startup state.
    ///
    /// Drops the anchor, zeroes the car, and releases any held controls. Does
    /// not touch the channel capabilities, which are fixed for the session.
    pub fn reset(&mut self) {
        self.anchor_ctrl.reset();
        self.motion_ctrl.reset();
        self.key_state = KeyState::default();
        self.latest_steering = None;
        self.reset_requested = false;

        info!("Scene reset, searching for marker again");
    }

    /// Record this cycle's result of polling the gesture channel.
    ///
    /// A fresh sample replaces the held one and resets its age. An empty poll
    /// ages the held sample, and once it outlives the stale limit it is
    /// dropped so steering falls back to the keys. A dead tracker must never
    /// pin the wheel at its last angle.
    pub fn note_steering_sample(
        &mut self,
        sample: Option<SteeringData>,
        stale_limit_cycles: u64,
    ) {
        match sample {
            Some(s) => {
                self.latest_steering = Some(s);
                self.steering_age_cycles = 0;
            }
            None => {
                self.steering_age_cycles += 1;

                if self.steering_age_cycles > stale_limit_cycles {
                    self.latest_steering = None;
                }
            }
        }
    }

    /// Build this cycle's control inputs from the held keys and the newest
    /// steering sample.
    ///
    /// A live gesture sample takes priority over the steering keys. Throttle
    /// and brake always come from the keys. Opposing steer keys cancel out.
    pub fn control_inputs(&self) -> motion::ControlInputs {
        let steer = match self.latest_steering {
            Some(ref sample) => motion::SteerInput::Gesture {
                angle_deg: sample.clamped_angle_deg(),
                confidence: sample.confidence,
            },
            None => match (self.key_state.steer_left, self.key_state.steer_right) {
                (true, false) => motion::SteerInput::Left,
                (false, true) => motion::SteerInput::Right,
                _ => motion::SteerInput::None,
            },
        };

        motion::ControlInputs {
            forward: self.key_state.forward,
            backward: self.key_state.backward,
            brake: self.key_state.brake,
            steer,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::motion::SteerInput;

    const STALE_LIMIT: u64 = 30;

    fn sample(angle_deg: f64) -> SteeringData {
        SteeringData {
            timestamp: 0,
            steering_angle: angle_deg,
            confidence: 0.9,
        }
    }

    #[test]
    fn test_gesture_sample_overrides_steer_keys() {
        let mut ds = DataStore::default();
        ds.key_state.steer_left = true;
        ds.note_steering_sample(Some(sample(20.0)), STALE_LIMIT);

        let controls = ds.control_inputs();

        assert_eq!(
            controls.steer,
            SteerInput::Gesture {
                angle_deg: 20.0,
                confidence: 0.9
            }
        );
    }

    #[test]
    fn test_throttle_and_brake_stay_on_keys_with_gesture_live() {
        let mut ds = DataStore::default();
        ds.key_state.forward = true;
        ds.key_state.brake = true;
        ds.note_steering_sample(Some(sample(-10.0)), STALE_LIMIT);

        let controls = ds.control_inputs();

        assert!(controls.forward);
        assert!(controls.brake);
        assert!(matches!(controls.steer, SteerInput::Gesture { .. }));
    }

    #[test]
    fn test_opposed_steer_keys_cancel() {
        let mut ds = DataStore::default();
        ds.key_state.steer_left = true;
        ds.key_state.steer_right = true;

        assert_eq!(ds.control_inputs().steer, SteerInput::None);

        // And a single key still steers
        ds.key_state.steer_right = false;
        assert_eq!(ds.control_inputs().steer, SteerInput::Left);
    }

    #[test]
    fn test_stale_sample_degrades_to_key_steering() {
        let mut ds = DataStore::default();
        ds.key_state.steer_right = true;
        ds.note_steering_sample(Some(sample(15.0)), STALE_LIMIT);

        // Empty polls up to the limit keep the sample usable
        for _ in 0..STALE_LIMIT {
            ds.note_steering_sample(None, STALE_LIMIT);
            assert!(matches!(
                ds.control_inputs().steer,
                SteerInput::Gesture { .. }
            ));
        }

        // One more and the sample is dropped, the keys take over
        ds.note_steering_sample(None, STALE_LIMIT);
        assert!(ds.latest_steering.is_none());
        assert_eq!(ds.control_inputs().steer, SteerInput::Right);
    }

    #[test]
    fn test_fresh_sample_resets_the_age() {
        let mut ds = DataStore::default();
        ds.note_steering_sample(Some(sample(5.0)), STALE_LIMIT);

        for _ in 0..STALE_LIMIT {
            ds.note_steering_sample(None, STALE_LIMIT);
        }

        // A fresh sample just before expiry starts a new lifetime
        ds.note_steering_sample(Some(sample(8.0)), STALE_LIMIT);
        assert_eq!(ds.steering_age_cycles, 0);

        ds.note_steering_sample(None, STALE_LIMIT);
        assert!(ds.latest_steering.is_some());
    }
}
