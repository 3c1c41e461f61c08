//! Main AR executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Driver input acquisition and processing
//!         - Sensor channel draining:
//!             - Gesture steering samples
//!             - Marker detections (gated while anchored)
//!         - Plane anchor processing
//!         - Vehicle motion processing
//!         - Render state publication
//!
//! # Modules
//!
//! All modules (e.g. `anchor`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

#[cfg(feature = "gesture")]
use ar_lib::gesture_client::GestureClient;
use ar_lib::{
    data_store::{Capability, DataStore},
    input_client::InputClient,
    marker_client::MarkerClient,
    params::ArExecParams,
    render_server::RenderServer,
};
use comms_if::{eqpt::marker::MarkerDetection, net::NetParams};

mod input_processor;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    archive::Archived,
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    raise_error,
    script_interpreter::{PendingCmds, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 1.0 / 60.0;

/// Number of cycles per second
const CYCLE_FREQUENCY_HZ: f64 = 60.0;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("ar_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Ghost Wheel AR Executable\n");
    info!("Running on: {}", host::get_host_description());
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let net_params: NetParams =
        util::params::load("net.toml").wrap_err("Could not load net params")?;

    let exec_params: ArExecParams =
        util::params::load("ar_exec.toml").wrap_err("Could not load exec params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE INPUT SOURCE ----

    // Input source is used to determine whether driver commands come from a
    // script or from a live frontend.
    let mut input_source = InputSource::None;
    let mut use_input_client = false;

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    // If we have a single argument use it as the script path
    if args.len() == 2 {
        info!("Loading drive script from \"{}\"", &args[1]);

        // Load the script interpreter
        let si = ScriptInterpreter::new(&args[1]).wrap_err("Failed to load drive script")?;

        // Display some info
        info!(
            "Loaded script lasts {:.02} s and contains {} commands\n",
            si.get_duration(),
            si.get_num_cmds()
        );

        input_source = InputSource::Script(si);
    }
    // If no arguments then setup the input client
    else if args.len() == 1 {
        info!("No script provided, driver input via the InputClient will be used\n");
        use_input_client = true;
    } else {
        return Err(eyre!(
            "Expected either zero or one argument, found {}",
            args.len() - 1
        ));
    }

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    ds.grid_visible = exec_params.grid_visible_default;

    // ---- INITIALISE MODULES ----

    ds.anchor_ctrl
        .init("anchor_ctrl.toml", &session)
        .wrap_err("Failed to initialise AnchorCtrl")?;
    info!("AnchorCtrl init complete");

    ds.motion_ctrl
        .init("motion_ctrl.toml", &session)
        .wrap_err("Failed to initialise MotionCtrl")?;
    info!("MotionCtrl init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = comms_if::net::zmq::Context::new();

    if use_input_client {
        input_source = InputSource::Live(
            InputClient::new(&zmq_ctx, &net_params)
                .wrap_err("Failed to initialise the InputClient")?,
        );
        info!("InputClient initialised");
    }

    // The sensor channels are optional: a failure to bring one up degrades
    // the session rather than killing it. The capability is decided here,
    // once, and holds for the whole run.
    let mut marker_client = match MarkerClient::new(&zmq_ctx, &net_params) {
        Ok(c) => {
            ds.marker_capability = Capability::Available;
            info!("MarkerClient initialised");
            Some(c)
        }
        Err(e) => {
            ds.marker_capability = Capability::Unavailable(format!("{}", e));
            warn!("MarkerClient unavailable, anchoring disabled: {}", e);
            None
        }
    };

    #[cfg(feature = "gesture")]
    let mut gesture_client = match GestureClient::new(&zmq_ctx, &net_params) {
        Ok(c) => {
            ds.gesture_capability = Capability::Available;
            info!("GestureClient initialised");
            Some(c)
        }
        Err(e) => {
            ds.gesture_capability = Capability::Unavailable(format!("{}", e));
            warn!("GestureClient unavailable, key steering only: {}", e);
            None
        }
    };

    let mut render_server = {
        let s = RenderServer::new(&zmq_ctx, &net_params)
            .wrap_err("Failed to initialise RenderServer")?;
        info!("RenderServer initialised");
        s
    };

    info!("Network initialisation complete");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    // Time of the last recognition request handed to the anchor
    let mut last_recognition_instant: Option<Instant> = None;

    // Newest detection awaiting the next recognition slot
    let mut pending_detection: Option<MarkerDetection> = None;

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(CYCLE_FREQUENCY_HZ);

        // ---- DRIVER INPUT PROCESSING ----

        // Branch depending on the source
        match input_source {
            // If no source no point in continuing so break
            InputSource::None => raise_error!("No driver input source present"),

            InputSource::Live(ref mut client) => match client.pending_cmds() {
                Ok(cmds) => {
                    for cmd in cmds.iter() {
                        input_processor::exec(&mut ds, cmd);
                    }
                }
                Err(e) => warn!("Could not recieve driver commands: {}", e),
            },

            InputSource::Script(ref mut si) => match si.get_pending_cmds() {
                PendingCmds::None => (),
                PendingCmds::Some(cmd_vec) => {
                    for cmd in cmd_vec.iter() {
                        input_processor::exec(&mut ds, cmd);
                    }
                }
                // Exit if end of script reached
                PendingCmds::EndOfScript => {
                    info!("End of drive script reached, stopping");
                    break;
                }
            },
        };

        // A commanded reset applies before this cycle's processing, so the
        // car and anchor restart cleanly on the same cycle
        if ds.reset_requested {
            ds.reset();
            last_recognition_instant = None;
            pending_detection = None;
        }

        // ---- GESTURE INPUT ----

        #[cfg(feature = "gesture")]
        if let Some(ref mut client) = gesture_client {
            ds.gesture_connected = client.is_connected();

            match client.latest_steering() {
                Ok(sample) => {
                    ds.note_steering_sample(sample, exec_params.gesture_stale_limit_cycles)
                }
                Err(e) => warn!("Could not recieve steering samples: {}", e),
            }
        }

        // ---- MARKER RECOGNITION ----

        if let Some(ref mut client) = marker_client {
            ds.marker_connected = client.is_connected();

            // The channel is drained every cycle even when recognition is
            // gated, so stale frames never queue up
            match client.latest_detection() {
                Ok(Some(detection)) => pending_detection = Some(detection),
                Ok(None) => (),
                Err(e) => warn!("Could not recieve marker detections: {}", e),
            }

            if ds.anchor_ctrl.should_run_recognition() {
                let due = match last_recognition_instant {
                    Some(t) => t.elapsed().as_secs_f64() >= ds.anchor_ctrl.recognition_interval_s(),
                    None => true,
                };

                if due {
                    ds.anchor_input.detection = pending_detection.take();
                    last_recognition_instant = Some(Instant::now());
                }
            } else {
                pending_detection = None;
            }
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        // AnchorCtrl processing
        match ds.anchor_ctrl.proc(&ds.anchor_input) {
            Ok((o, r)) => {
                ds.anchor_output = o;
                ds.anchor_status_rpt = r;
            }
            Err(e) => warn!("Error during AnchorCtrl processing: {}", e),
        };

        // Keep a copy of the anchoring transform in the session for later
        // inspection of a run
        if ds.anchor_status_rpt.anchored_this_cycle {
            session.save("anchor/anchor_transform.json", ds.anchor_output);
        }

        // MotionCtrl processing
        ds.motion_input.controls = ds.control_inputs();

        match ds.motion_ctrl.proc(&ds.motion_input) {
            Ok((o, r)) => {
                ds.motion_output = o;
                ds.motion_status_rpt = r;
            }
            Err(e) => warn!("Error during MotionCtrl processing: {}", e),
        };

        // ---- WRITE ARCHIVES ----

        if let Err(e) = ds.anchor_ctrl.write() {
            warn!("Could not write AnchorCtrl archives: {}", e);
        }
        if let Err(e) = ds.motion_ctrl.write() {
            warn!("Could not write MotionCtrl archives: {}", e);
        }

        // ---- RENDER STATE ----

        match render_server.send(&ds) {
            Ok(_) => (),
            Err(e) => warn!("RenderServer error: {}", e),
        };

        // Low rate status line for watching a session from the terminal
        if ds.is_1_hz_cycle {
            debug!(
                "Status: anchored = {}, pos = [{:.2}, {:.2}], speed = {:.3}",
                ds.anchor_ctrl.is_anchored(),
                ds.motion_output.position[0],
                ds.motion_output.position[1],
                ds.motion_output.speed
            );
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    info!("End of execution");

    session.exit();

    Ok(())
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Various sources for the driver commands incoming to the exec.
enum InputSource {
    None,
    Live(InputClient),
    Script(ScriptInterpreter),
}
