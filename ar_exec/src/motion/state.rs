//! Implementations for the MotionCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use super::Params;
use util::{
    archive::{Archived, Archiver},
    maths::wrap_to_tau,
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Vehicle motion module state
pub struct MotionCtrl {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    /// Car position on the anchored ground plane, (x, z).
    ///
    /// Units: scene units
    pub(crate) position: Vector2<f64>,

    /// Car heading, zero along +z, wrapped into [0, tau).
    ///
    /// Units: radians
    pub(crate) heading_rad: f64,

    /// Car velocity on the ground plane, (x, z).
    ///
    /// Units: scene units/cycle
    pub(crate) velocity: Vector2<f64>,

    /// Smoothed gesture wheel angle.
    ///
    /// Units: degrees
    pub(crate) smoothed_steer_deg: f64,

    pub(crate) output: OutputData,
    arch_output: Archiver,
}

/// Input data to the motion model.
#[derive(Default)]
pub struct InputData {
    /// The driver's controls for this cycle.
    pub controls: ControlInputs,
}

/// The driver's controls, resolved from key state and gesture samples.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ControlInputs {
    /// Accelerate along the heading
    pub forward: bool,

    /// Accelerate against the heading
    pub backward: bool,

    /// Scrub speed without changing heading
    pub brake: bool,

    /// Steering input for this cycle
    pub steer: SteerInput,
}

/// Output pose of the car after this cycle's integration step.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct OutputData {
    /// Car position on the ground plane, (x, z)
    pub position: [f64; 2],

    /// Car heading, zero along +z
    pub heading_rad: f64,

    /// Car velocity, (x, z)
    pub velocity: [f64; 2],

    /// Magnitude of the velocity
    pub speed: f64,
}

/// Status report for motion processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True if the speed limit clamped the velocity this cycle
    pub speed_clamped: bool,

    /// True if a low-confidence gesture sample froze the car this cycle
    pub gesture_gated: bool,

    /// True if the heading changed this cycle
    pub steered: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The steering input for one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SteerInput {
    /// No steering this cycle
    None,

    /// Discrete steer to the left (heading increases)
    Left,

    /// Discrete steer to the right (heading decreases)
    Right,

    /// A wheel angle from the gesture tracker, positive to the right
    Gesture { angle_deg: f64, confidence: f64 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SteerInput {
    fn default() -> Self {
        SteerInput::None
    }
}

impl Default for MotionCtrl {
    fn default() -> Self {
        MotionCtrl {
            params: Params::default(),
            report: StatusReport::default(),
            arch_report: Archiver::default(),
            position: Vector2::zeros(),
            heading_rad: 0.0,
            velocity: Vector2::zeros(),
            smoothed_steer_deg: 0.0,
            output: OutputData::default(),
            arch_output: Archiver::default(),
        }
    }
}

impl State for MotionCtrl {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = super::MotionCtrlError;

    /// Initialise the MotionCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        // Load the parameters
        self.params = match params::load(init_data) {
            Ok(p) => p,
            Err(e) => return Err(e),
        };

        // Create the arch folder for motion_ctrl
        let mut arch_path = session.arch_root.clone();
        arch_path.push("motion_ctrl");
        std::fs::create_dir_all(arch_path).unwrap();

        // Initialise the archivers
        self.arch_report = Archiver::from_path(session, "motion_ctrl/status_report.csv").unwrap();
        self.arch_output = Archiver::from_path(session, "motion_ctrl/output.csv").unwrap();

        Ok(())
    }

    /// Perform cyclic processing of the motion model.
    ///
    /// Runs exactly one fixed integration step, branching on whether steering
    /// comes from the gesture tracker or from discrete keys.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        match input_data.controls.steer {
            SteerInput::Gesture {
                angle_deg,
                confidence,
            } => self.calc_gesture(&input_data.controls, angle_deg, confidence),
            _ => self.calc_discrete(&input_data.controls),
        }

        self.output = OutputData {
            position: [self.position.x, self.position.y],
            heading_rad: self.heading_rad,
            velocity: [self.velocity.x, self.velocity.y],
            speed: self.velocity.norm(),
        };

        trace!(
            "MotionCtrl output:\n    pos: {:?}\n    heading: {:.4} rad\n    speed: {:.4}",
            self.output.position,
            self.output.heading_rad,
            self.output.speed
        );

        Ok((self.output, self.report))
    }
}

impl Archived for MotionCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.arch_report.serialise(self.report)?;
        self.arch_output.serialise(self.output)?;

        Ok(())
    }
}

impl MotionCtrl {
    /// Create a module with the given parameters and no archiving.
    ///
    /// Used by benchmarks and tests, the exec initialises through
    /// [`State::init`] instead.
    pub fn with_params(params: Params) -> Self {
        MotionCtrl {
            params,
            ..Default::default()
        }
    }

    /// Run one integration step of the motion model.
    ///
    /// The step order is fixed: brake, friction, steering, acceleration,
    /// speed clamp, then the position update. Applying friction before the
    /// acceleration increment puts the full-throttle steady state at
    /// `accel_rate / (1 - friction_factor)`.
    pub(crate) fn step(&mut self, accel: f64, brake: bool, steer_delta_rad: f64) {
        if brake {
            self.velocity *= self.params.brake_factor;
        }

        self.velocity *= self.params.friction_factor;

        // Steering only bites above the deadzone speed, and reverses with the
        // direction of travel so a reversing car steers like a real one
        if steer_delta_rad != 0.0 && self.velocity.norm() > self.params.turn_deadzone {
            let travel_sign = self.forward_speed().signum();
            self.heading_rad = wrap_to_tau(self.heading_rad + steer_delta_rad * travel_sign);
            self.report.steered = true;
        }

        self.velocity += accel * self.heading_vector();

        let speed = self.velocity.norm();
        if speed > self.params.max_speed {
            self.velocity *= self.params.max_speed / speed;
            self.report.speed_clamped = true;
        }

        self.position += self.velocity;
    }

    /// Unit vector along the current heading.
    pub(crate) fn heading_vector(&self) -> Vector2<f64> {
        Vector2::new(self.heading_rad.sin(), self.heading_rad.cos())
    }

    /// Signed speed along the heading, negative when reversing.
    pub(crate) fn forward_speed(&self) -> f64 {
        self.velocity.dot(&self.heading_vector())
    }

    /// The throttle acceleration for this cycle. Holding both throttle
    /// controls resolves in favour of forward.
    pub(crate) fn throttle_accel(&self, controls: &ControlInputs) -> f64 {
        if controls.forward {
            self.params.accel_rate
        } else if controls.backward {
            -self.params.accel_rate
        } else {
            0.0
        }
    }

    /// Zero the car back to its startup pose.
    pub fn reset(&mut self) {
        self.position = Vector2::zeros();
        self.heading_rad = 0.0;
        self.velocity = Vector2::zeros();
        self.smoothed_steer_deg = 0.0;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn test_params() -> Params {
        Params {
            accel_rate: 0.012,
            max_speed: 0.40,
            friction_factor: 0.95,
            brake_factor: 0.80,
            turn_rate_rad: 0.05,
            turn_deadzone: 0.01,
            steer_smoothing_factor: 0.3,
            confidence_threshold: 0.7,
            gesture_turn_gain: 0.06,
        }
    }

    fn test_ctrl() -> MotionCtrl {
        MotionCtrl::with_params(test_params())
    }

    fn input(controls: ControlInputs) -> InputData {
        InputData { controls }
    }

    fn hold_forward() -> InputData {
        input(ControlInputs {
            forward: true,
            ..Default::default()
        })
    }

    #[test]
    fn test_full_throttle_approaches_steady_state() {
        let mut ctrl = test_ctrl();

        // With friction applied before the increment the terminal speed is
        // accel_rate / (1 - friction_factor) = 0.24
        let steady_state = 0.012 / (1.0 - 0.95);

        let mut last_speed = 0.0;
        for _ in 0..100 {
            let (output, report) = ctrl.proc(&hold_forward()).unwrap();

            // Below the limit, so never clamped, and speed only grows
            assert!(!report.speed_clamped);
            assert!(output.speed > last_speed);
            assert!(output.speed < steady_state);

            last_speed = output.speed;
        }

        // Within 1% of the steady state after 100 cycles
        assert!((last_speed - steady_state).abs() < steady_state * 0.01);
    }

    #[test]
    fn test_first_cycle_speed_is_accel_rate() {
        let mut ctrl = test_ctrl();

        let (output, _) = ctrl.proc(&hold_forward()).unwrap();

        assert!((output.speed - 0.012).abs() < 1e-12);
        // Heading starts along +z
        assert!((output.velocity[1] - 0.012).abs() < 1e-12);
    }

    #[test]
    fn test_speed_clamped_to_max() {
        let mut ctrl = test_ctrl();
        ctrl.params.max_speed = 0.1;

        let mut clamped = false;
        for _ in 0..100 {
            let (output, report) = ctrl.proc(&hold_forward()).unwrap();
            clamped |= report.speed_clamped;
            assert!(output.speed <= 0.1 + 1e-12);
        }

        assert!(clamped);
        assert!((ctrl.output.speed - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_coast_down_on_release() {
        let mut ctrl = test_ctrl();

        for _ in 0..100 {
            ctrl.proc(&hold_forward()).unwrap();
        }
        let released_speed = ctrl.output.speed;
        let released_pos = ctrl.output.position;

        let (output, _) = ctrl.proc(&input(ControlInputs::default())).unwrap();

        // One cycle of pure friction, and the car keeps rolling
        assert!((output.speed - released_speed * 0.95).abs() < 1e-12);
        assert!(output.position[1] > released_pos[1]);

        // And friction alone brings the car to rest in bounded time
        for _ in 0..200 {
            ctrl.proc(&input(ControlInputs::default())).unwrap();
        }
        assert!(ctrl.output.speed < 1e-4);
    }

    #[test]
    fn test_brake_scrubs_speed_faster_than_coasting() {
        let mut coasting = test_ctrl();
        let mut braking = test_ctrl();

        for _ in 0..100 {
            coasting.proc(&hold_forward()).unwrap();
            braking.proc(&hold_forward()).unwrap();
        }

        coasting.proc(&input(ControlInputs::default())).unwrap();
        braking
            .proc(&input(ControlInputs {
                brake: true,
                ..Default::default()
            }))
            .unwrap();

        assert!(braking.output.speed < coasting.output.speed);
        // Braking does not change the heading
        assert_eq!(braking.output.heading_rad, 0.0);
    }

    #[test]
    fn test_forward_wins_over_backward() {
        let mut both = test_ctrl();
        let mut forward_only = test_ctrl();

        both.proc(&input(ControlInputs {
            forward: true,
            backward: true,
            ..Default::default()
        }))
        .unwrap();
        forward_only.proc(&hold_forward()).unwrap();

        assert_eq!(both.output.velocity, forward_only.output.velocity);
    }

    #[test]
    fn test_steer_deadzone_prevents_spinning_on_the_spot() {
        let mut ctrl = test_ctrl();

        let steer_only = input(ControlInputs {
            steer: SteerInput::Left,
            ..Default::default()
        });

        // Stationary car must not turn no matter how long steer is held
        for _ in 0..50 {
            let (output, report) = ctrl.proc(&steer_only).unwrap();
            assert_eq!(output.heading_rad, 0.0);
            assert!(!report.steered);
        }
    }

    #[test]
    fn test_steering_applies_above_deadzone() {
        let mut ctrl = test_ctrl();

        let forward_left = input(ControlInputs {
            forward: true,
            steer: SteerInput::Left,
            ..Default::default()
        });

        // First cycle: the pre-acceleration speed is still zero, no turn
        let (output, report) = ctrl.proc(&forward_left).unwrap();
        assert_eq!(output.heading_rad, 0.0);
        assert!(!report.steered);

        // Second cycle: speed carried over exceeds the deadzone
        let (output, report) = ctrl.proc(&forward_left).unwrap();
        assert!((output.heading_rad - 0.05).abs() < 1e-12);
        assert!(report.steered);

        // Right steering turns the other way
        let mut ctrl = test_ctrl();
        let forward_right = input(ControlInputs {
            forward: true,
            steer: SteerInput::Right,
            ..Default::default()
        });
        ctrl.proc(&forward_right).unwrap();
        ctrl.proc(&forward_right).unwrap();
        assert!((ctrl.output.heading_rad - (std::f64::consts::TAU - 0.05)).abs() < 1e-12);
    }

    #[test]
    fn test_steering_reverses_when_reversing() {
        let mut ctrl = test_ctrl();

        let backward_left = input(ControlInputs {
            backward: true,
            steer: SteerInput::Left,
            ..Default::default()
        });

        ctrl.proc(&backward_left).unwrap();
        ctrl.proc(&backward_left).unwrap();

        // Steering left while reversing swings the heading right
        assert!((ctrl.output.heading_rad - (std::f64::consts::TAU - 0.05)).abs() < 1e-12);
    }

    #[test]
    fn test_reset_zeroes_the_car() {
        let mut ctrl = test_ctrl();

        for _ in 0..20 {
            ctrl.proc(&input(ControlInputs {
                forward: true,
                steer: SteerInput::Left,
                ..Default::default()
            }))
            .unwrap();
        }

        ctrl.reset();
        let (output, _) = ctrl.proc(&input(ControlInputs::default())).unwrap();

        assert_eq!(output.position, [0.0, 0.0]);
        assert_eq!(output.heading_rad, 0.0);
        assert_eq!(output.speed, 0.0);
    }

    #[test]
    fn test_low_confidence_gesture_freezes_the_car() {
        let mut ctrl = test_ctrl();

        for _ in 0..50 {
            ctrl.proc(&hold_forward()).unwrap();
        }
        let before = ctrl.output;

        // Hands off the wheel: even with throttle held nothing may move
        let (output, report) = ctrl
            .proc(&input(ControlInputs {
                forward: true,
                steer: SteerInput::Gesture {
                    angle_deg: 20.0,
                    confidence: 0.5,
                },
                ..Default::default()
            }))
            .unwrap();

        assert!(report.gesture_gated);
        assert_eq!(output.position, before.position);
        assert_eq!(output.velocity, before.velocity);
        assert_eq!(output.heading_rad, before.heading_rad);
    }

    #[test]
    fn test_gesture_angle_is_smoothed() {
        let mut ctrl = test_ctrl();

        let wheel_at_30 = input(ControlInputs {
            forward: true,
            steer: SteerInput::Gesture {
                angle_deg: 30.0,
                confidence: 0.9,
            },
            ..Default::default()
        });

        // smoothed += (target - smoothed) * factor
        ctrl.proc(&wheel_at_30).unwrap();
        assert!((ctrl.smoothed_steer_deg - 9.0).abs() < 1e-12);

        ctrl.proc(&wheel_at_30).unwrap();
        assert!((ctrl.smoothed_steer_deg - 15.3).abs() < 1e-12);
    }

    #[test]
    fn test_gesture_angle_clamped_to_limit() {
        let mut ctrl = test_ctrl();

        ctrl.proc(&input(ControlInputs {
            forward: true,
            steer: SteerInput::Gesture {
                angle_deg: 90.0,
                confidence: 0.9,
            },
            ..Default::default()
        }))
        .unwrap();

        // The target was clamped to 45 degrees before smoothing
        assert!((ctrl.smoothed_steer_deg - 13.5).abs() < 1e-12);
    }

    #[test]
    fn test_gesture_steers_the_moving_car() {
        let mut ctrl = test_ctrl();

        let wheel_right = input(ControlInputs {
            forward: true,
            steer: SteerInput::Gesture {
                angle_deg: 30.0,
                confidence: 0.9,
            },
            ..Default::default()
        });

        for _ in 0..20 {
            ctrl.proc(&wheel_right).unwrap();
        }

        // Positive wheel angle steers right, dropping the heading below tau
        let heading = ctrl.output.heading_rad;
        assert!(heading > std::f64::consts::PI);
        assert!(ctrl.report.steered);
    }
}
