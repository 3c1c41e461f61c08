//! # Drive script interpreter module
//!
//! This module provides an interpreter for timed drive scripts, allowing
//! driver input commands to be replayed from a file without a frontend
//! attached.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::fs;
use regex::RegexBuilder;
use thiserror::Error;

// Internal
use comms_if::input::{DriverCmd, DriverCmdParseError};
use crate::session::get_elapsed_seconds;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command which is scripted to occur at a specific time.
pub struct Command {
    /// The time the command is supposed to execute at
    exec_time_s: f64,

    /// The driver command to run
    cmd: DriverCmd
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use
/// `.get_pending_cmds` to acquire a list of commands that need executing.
pub struct ScriptInterpreter {
    _script_path: PathBuf,
    cmds: VecDeque<Command>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid command at {0} s: {1}")]
    InvalidCmd(f64, DriverCmdParseError)
}

pub enum PendingCmds {
    None,
    Some(Vec<DriverCmd>),
    EndOfScript
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {

    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {

        // Get the path in a buffer
        let path = PathBuf::from(script_path.as_ref());

        // Check that the script file exists.
        if !path.exists() {
            return Err(
                ScriptError::ScriptNotFound(path.to_str().unwrap().to_string()));
        }

        // Load the script into a string
        let script = match fs::read_to_string(script_path) {
            Ok(s) => s,
            Err(e) => return Err(ScriptError::ScriptLoadError(e))
        };

        let cmds = Self::parse(&script)?;

        Ok(ScriptInterpreter {
            _script_path: path,
            cmds
        })
    }

    /// Return a vector of pending commands, or `None` if no commands need
    /// executing now.
    pub fn get_pending_cmds(&mut self) -> PendingCmds {

        // If the queue is empty the script is over and we return the end of
        // script variant
        if self.cmds.is_empty() {
            return PendingCmds::EndOfScript
        }

        let mut cmd_vec: Vec<DriverCmd> = vec![];

        let current_time_s = get_elapsed_seconds();

        // Peek items from the queue, if the head's exec time is lower than
        // the current time add it to the vector, and keep adding commands
        // until the exec times are larger than the current time.
        while
            self.cmds.len() > 0
            &&
            self.cmds.front().unwrap().exec_time_s < current_time_s
        {
            cmd_vec.push(self.cmds.pop_front().unwrap().cmd);
        }

        // If the vector is longer than 0 return Some, otherwise None
        if cmd_vec.len() > 0 {
            PendingCmds::Some(cmd_vec)
        }
        else {
            PendingCmds::None
        }
    }

    /// Get the number of commands in the script
    pub fn get_num_cmds(&self) -> usize {
        self.cmds.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.cmds.back() {
            Some(c) => c.exec_time_s,
            None => 0f64
        }
    }

    /// Parse the script text into the command queue.
    ///
    /// Lines have the shape `<time_s>: <json>;`, one command per line.
    fn parse(script: &str) -> Result<VecDeque<Command>, ScriptError> {
        // Empty queue of commands
        let mut cmd_queue: VecDeque<Command> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::
            new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .unwrap();

        for cap in re.captures_iter(script) {
            // Parse the exec time
            let exec_time_s: f64 = match cap.get(1).unwrap().as_str().parse() {
                Ok(t) => t,
                Err(e) => return Err(
                    ScriptError::InvalidTimestamp(format!("{}", e)))
            };

            // Parse the command from the payload. The scripts contain JSON
            // only.
            let cmd = match DriverCmd::from_json(
                cap.get(3).unwrap().as_str())
            {
                Ok(c) => c,
                Err(e) => return Err(ScriptError::InvalidCmd(
                    exec_time_s, e
                ))
            };

            // Build command from the match
            cmd_queue.push_back(Command {
                exec_time_s,
                cmd
            });
        }

        if cmd_queue.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        Ok(cmd_queue)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::input::Control;

    #[test]
    fn test_parse_script() {
        let script = r#"
            0.0: {"Key":{"control":"Forward","pressed":true}};
            2.5: {"Key":{"control":"Forward","pressed":false}};
            3.0: "Reset";
        "#;

        let cmds = ScriptInterpreter::parse(script).unwrap();

        assert_eq!(cmds.len(), 3);
        assert_eq!(cmds[0].exec_time_s, 0.0);
        assert_eq!(
            cmds[0].cmd,
            DriverCmd::Key { control: Control::Forward, pressed: true }
        );
        assert_eq!(cmds[2].exec_time_s, 3.0);
        assert_eq!(cmds[2].cmd, DriverCmd::Reset);
    }

    #[test]
    fn test_empty_script_rejected() {
        assert!(matches!(
            ScriptInterpreter::parse("just a comment\n"),
            Err(ScriptError::ScriptEmpty)
        ));
    }

    #[test]
    fn test_invalid_cmd_rejected() {
        assert!(matches!(
            ScriptInterpreter::parse("1.0: {\"Nope\":true};"),
            Err(ScriptError::InvalidCmd(_, _))
        ));
    }
}
