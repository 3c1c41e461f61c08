//! # Driver input module
//!
//! This module defines the input events sent to the exec by whichever
//! frontend the driver is using (the AR display, `drive_cli`, or a timed
//! drive script).

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Serialize, Deserialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The five named vehicle controls the driver can hold down.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
pub enum Control {
    /// Accelerate along the current heading
    Forward,
    /// Accelerate against the current heading
    Backward,
    /// Steer to the left
    SteerLeft,
    /// Steer to the right
    SteerRight,
    /// Scrub speed without changing heading
    Brake,
}

/// A command from the driver to the exec.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum DriverCmd {
    /// A control key changed state.
    Key {
        control: Control,
        pressed: bool,
    },

    /// Reset the anchor and the vehicle to their initial states.
    Reset,

    /// Toggle the ground grid overlay in the scene.
    ToggleGrid,
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum DriverCmdParseError {
    #[error("Driver command contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriverCmd {
    /// Parse a new driver command from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, DriverCmdParseError> {
        serde_json::from_str(json_str).map_err(DriverCmdParseError::InvalidJson)
    }

    /// Serialise the command as a JSON packet
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl std::str::FromStr for Control {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward" => Ok(Control::Forward),
            "backward" => Ok(Control::Backward),
            "left" => Ok(Control::SteerLeft),
            "right" => Ok(Control::SteerRight),
            "brake" => Ok(Control::Brake),
            _ => Err(format!("{} is not a recognised control", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let cmds = [
            DriverCmd::Key {
                control: Control::Forward,
                pressed: true,
            },
            DriverCmd::Key {
                control: Control::SteerLeft,
                pressed: false,
            },
            DriverCmd::Reset,
            DriverCmd::ToggleGrid,
        ];

        for cmd in cmds.iter() {
            let json = cmd.to_json().unwrap();
            let parsed = DriverCmd::from_json(&json).unwrap();
            assert_eq!(*cmd, parsed);
        }
    }

    #[test]
    fn test_control_from_str() {
        assert_eq!("forward".parse::<Control>().unwrap(), Control::Forward);
        assert_eq!("left".parse::<Control>().unwrap(), Control::SteerLeft);
        assert!("handbrake".parse::<Control>().is_err());
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(DriverCmd::from_json("not json").is_err());
        assert!(DriverCmd::from_json(r#"{"Key": {}}"#).is_err());
    }
}
