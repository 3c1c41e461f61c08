//! Implementations for the AnchorCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace};
use nalgebra::Matrix4;
use serde::Serialize;

// Internal
use super::Params;
use comms_if::eqpt::marker::MarkerDetection;
use util::{
    archive::{Archived, Archiver},
    convert::{self, Convert},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The phase of the anchor state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnchorPhase {
    /// No anchor yet, recognition requests are being made.
    Searching,

    /// The scene is pinned to a marker and recognition has stopped.
    Anchored,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Plane anchor module state
#[derive(Default)]
pub struct AnchorCtrl {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    /// Current phase of the state machine.
    phase: AnchorPhase,

    /// The anchoring transform in the scene frame, set exactly once per
    /// search.
    anchor_transform: Option<Matrix4<f64>>,

    pub(crate) output: OutputData,
    arch_output: Archiver,
}

/// Input data to the plane anchor.
#[derive(Default)]
pub struct InputData {
    /// The newest marker detection, or `None` if the recognizer produced
    /// nothing this cycle (or recognition is gated off).
    pub detection: Option<MarkerDetection>,
}

/// Output from the plane anchor describing where the scene is pinned.
#[derive(Clone, Copy, Serialize, Debug)]
pub struct OutputData {
    /// Current phase of the state machine
    pub phase: AnchorPhase,

    /// The anchoring transform in the scene frame as a column-major array,
    /// or `None` while searching.
    pub transform_scene: Option<[f64; 16]>,
}

/// Status report for anchor processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True if the anchor was set on this cycle
    pub anchored_this_cycle: bool,

    /// Number of detections rejected this cycle for malformed poses
    pub num_rejected_detections: u32,

    /// Number of "no marker" sentinel detections seen this cycle
    pub num_sentinel_detections: u32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for AnchorPhase {
    fn default() -> Self {
        AnchorPhase::Searching
    }
}

impl Default for OutputData {
    fn default() -> Self {
        OutputData {
            phase: AnchorPhase::Searching,
            transform_scene: None,
        }
    }
}

impl State for AnchorCtrl {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = super::AnchorCtrlError;

    /// Initialise the AnchorCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        // Load the parameters
        self.params = match params::load(init_data) {
            Ok(p) => p,
            Err(e) => return Err(e),
        };

        // Create the arch folder for anchor_ctrl
        let mut arch_path = session.arch_root.clone();
        arch_path.push("anchor_ctrl");
        std::fs::create_dir_all(arch_path).unwrap();

        // Initialise the archivers
        self.arch_report = Archiver::from_path(session, "anchor_ctrl/status_report.csv").unwrap();
        self.arch_output = Archiver::from_path(session, "anchor_ctrl/output.csv").unwrap();

        Ok(())
    }

    /// Perform cyclic processing of the plane anchor.
    ///
    /// While searching the newest detection is inspected, and the first one
    /// carrying a well-formed pose anchors the scene. Once anchored all
    /// further detections are ignored until a reset.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        if let Some(ref detection) = input_data.detection {
            if self.phase == AnchorPhase::Searching {
                self.try_anchor(detection);
            } else {
                trace!(
                    "Detection of marker {} ignored, already anchored",
                    detection.marker_id
                );
            }
        }

        self.output = OutputData {
            phase: self.phase,
            transform_scene: self.anchor_transform.map(|m| m.convert()),
        };

        Ok((self.output, self.report))
    }
}

impl Archived for AnchorCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.arch_report.serialise(self.report)?;
        self.arch_output.serialise(self.output)?;

        Ok(())
    }
}

impl AnchorCtrl {
    /// Attempt to anchor the scene on the given detection.
    ///
    /// Sentinel and malformed detections are counted in the status report and
    /// otherwise ignored, the search simply continues on the next cycle.
    fn try_anchor(&mut self, detection: &MarkerDetection) {
        if detection.is_sentinel() {
            self.report.num_sentinel_detections += 1;
            return;
        }

        match detection.pose_elements() {
            Some(elements) => {
                let pose: Matrix4<f64> = elements.convert();

                self.anchor_transform = Some(convert::recognizer_to_scene(&pose));
                self.phase = AnchorPhase::Anchored;
                self.report.anchored_this_cycle = true;

                info!(
                    "Anchored the scene to marker {} (detected at {})",
                    detection.marker_id, detection.timestamp
                );
            }
            None => {
                self.report.num_rejected_detections += 1;
                trace!(
                    "Rejected detection of marker {}, malformed pose",
                    detection.marker_id
                );
            }
        }
    }

    /// Drop the anchor and resume searching.
    ///
    /// Valid in any phase, resetting while still searching is a no-op.
    pub fn reset(&mut self) {
        self.phase = AnchorPhase::Searching;
        self.anchor_transform = None;
    }

    /// True if recognition requests should be made this cycle.
    ///
    /// Recognition only runs while searching, once anchored the camera
    /// pipeline goes quiet until a reset.
    pub fn should_run_recognition(&self) -> bool {
        self.phase == AnchorPhase::Searching
    }

    /// True if the scene is currently anchored.
    pub fn is_anchored(&self) -> bool {
        self.phase == AnchorPhase::Anchored
    }

    /// The anchoring transform in the scene frame, if anchored.
    pub fn anchor_transform(&self) -> Option<&Matrix4<f64>> {
        self.anchor_transform.as_ref()
    }

    /// Minimum time between recognition requests while searching.
    pub fn recognition_interval_s(&self) -> f64 {
        self.params.recognition_interval_s
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Utc;
    use comms_if::eqpt::marker::{NO_MARKER_ID, POSE_NUM_ELEMENTS};

    fn identity_pose() -> Vec<f64> {
        let mut pose = vec![0.0; POSE_NUM_ELEMENTS];
        for i in 0..4 {
            pose[i * 5] = 1.0;
        }
        pose
    }

    fn detection(marker_id: i32, pose: Vec<f64>) -> InputData {
        InputData {
            detection: Some(MarkerDetection {
                marker_id,
                pose,
                timestamp: Utc::now(),
            }),
        }
    }

    #[test]
    fn test_anchors_on_first_valid_detection() {
        let mut ctrl = AnchorCtrl::default();

        let (output, report) = ctrl.proc(&detection(7, identity_pose())).unwrap();

        assert!(ctrl.is_anchored());
        assert!(report.anchored_this_cycle);
        assert_eq!(output.phase, AnchorPhase::Anchored);

        // An identity marker pose anchors the scene at the pure basis change
        let expected: [f64; 16] = util::convert::recognizer_to_scene_basis().convert();
        assert_eq!(output.transform_scene.unwrap(), expected);
    }

    #[test]
    fn test_second_detection_ignored() {
        let mut ctrl = AnchorCtrl::default();

        ctrl.proc(&detection(7, identity_pose())).unwrap();
        let first = ctrl.anchor_transform().cloned().unwrap();

        // A later detection with a different pose must not move the anchor
        let mut moved = identity_pose();
        moved[12] = 5.0;
        let (output, report) = ctrl.proc(&detection(9, moved)).unwrap();

        assert!(!report.anchored_this_cycle);
        assert_eq!(ctrl.anchor_transform().cloned().unwrap(), first);
        assert_eq!(output.phase, AnchorPhase::Anchored);
    }

    #[test]
    fn test_sentinel_keeps_searching() {
        let mut ctrl = AnchorCtrl::default();

        let (output, report) = ctrl.proc(&detection(NO_MARKER_ID, vec![])).unwrap();

        assert!(!ctrl.is_anchored());
        assert!(ctrl.should_run_recognition());
        assert_eq!(report.num_sentinel_detections, 1);
        assert!(output.transform_scene.is_none());
    }

    #[test]
    fn test_malformed_pose_rejected() {
        let mut ctrl = AnchorCtrl::default();

        // Wrong length
        let (_, report) = ctrl.proc(&detection(7, vec![1.0, 2.0])).unwrap();
        assert_eq!(report.num_rejected_detections, 1);
        assert!(!ctrl.is_anchored());

        // Non-finite element
        let mut pose = identity_pose();
        pose[5] = f64::INFINITY;
        let (_, report) = ctrl.proc(&detection(7, pose)).unwrap();
        assert_eq!(report.num_rejected_detections, 1);
        assert!(!ctrl.is_anchored());

        // A good detection afterwards still anchors
        ctrl.proc(&detection(7, identity_pose())).unwrap();
        assert!(ctrl.is_anchored());
    }

    #[test]
    fn test_no_detection_is_noop() {
        let mut ctrl = AnchorCtrl::default();

        let (output, report) = ctrl.proc(&InputData::default()).unwrap();

        assert!(!ctrl.is_anchored());
        assert!(!report.anchored_this_cycle);
        assert!(output.transform_scene.is_none());
    }

    #[test]
    fn test_reset_resumes_search() {
        let mut ctrl = AnchorCtrl::default();

        ctrl.proc(&detection(7, identity_pose())).unwrap();
        assert!(ctrl.is_anchored());
        assert!(!ctrl.should_run_recognition());

        ctrl.reset();
        assert!(!ctrl.is_anchored());
        assert!(ctrl.should_run_recognition());
        assert!(ctrl.anchor_transform().is_none());

        // Resetting while searching is valid and changes nothing
        ctrl.reset();
        assert!(ctrl.should_run_recognition());

        // And a new marker can be anchored after the reset
        ctrl.proc(&detection(3, identity_pose())).unwrap();
        assert!(ctrl.is_anchored());
    }
}
