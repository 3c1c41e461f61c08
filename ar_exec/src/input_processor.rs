//! # Input Processor
//!
//! Applies driver commands to the data store. Key events only change the held
//! key state, the motion model picks the state up on the same cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};

// Internal
use ar_lib::data_store::DataStore;
use comms_if::input::{Control, DriverCmd};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a driver command against the data store.
pub fn exec(ds: &mut DataStore, cmd: &DriverCmd) {
    match cmd {
        DriverCmd::Key { control, pressed } => {
            debug!("Driver key event: {:?} pressed = {}", control, pressed);

            let flag = match control {
                Control::Forward => &mut ds.key_state.forward,
                Control::Backward => &mut ds.key_state.backward,
                Control::SteerLeft => &mut ds.key_state.steer_left,
                Control::SteerRight => &mut ds.key_state.steer_right,
                Control::Brake => &mut ds.key_state.brake,
            };

            *flag = *pressed;
        }

        DriverCmd::Reset => {
            info!("Reset commanded by the driver");
            ds.reset_requested = true;
        }

        DriverCmd::ToggleGrid => {
            ds.grid_visible = !ds.grid_visible;
            info!("Ground grid toggled, now visible = {}", ds.grid_visible);
        }
    }
}
