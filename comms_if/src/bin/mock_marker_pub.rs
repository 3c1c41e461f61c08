//! Mock marker recognizer publisher
//!
//! Publishes marker detections the way the real recognizer process would, so
//! that ar_exec can be exercised without a camera. Sends the sentinel for a
//! few frames, then a fixed detection of the requested marker.

use chrono::Utc;
use comms_if::eqpt::marker::{MarkerDetection, NO_MARKER_ID, POSE_NUM_ELEMENTS};
use comms_if::net::{MonitoredSocket, SocketOptions};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "mock_marker_pub", about = "Publish fake marker detections")]
struct Opts {
    /// Endpoint to bind the publisher to
    #[structopt(long, default_value = "tcp://*:5011")]
    endpoint: String,

    /// Marker id to report once the warmup frames have elapsed
    #[structopt(long, default_value = "7")]
    marker_id: i32,

    /// Number of sentinel frames to send before the detection
    #[structopt(long, default_value = "30")]
    warmup_frames: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = Opts::from_args();

    // Create zmq context
    let ctx = zmq::Context::new();

    // Create socket options
    let socket_options = SocketOptions {
        bind: true,
        block_on_first_connect: false,
        ..Default::default()
    };

    // Create the socket
    let socket = MonitoredSocket::new(&ctx, zmq::PUB, socket_options, &opts.endpoint)?;

    println!("Mock marker recognizer publishing on {}", opts.endpoint);

    let mut identity_pose = vec![0.0; POSE_NUM_ELEMENTS];
    for i in 0..4 {
        identity_pose[i * 5] = 1.0;
    }

    let mut frame = 0u32;

    loop {
        let detection = if frame < opts.warmup_frames {
            MarkerDetection {
                marker_id: NO_MARKER_ID,
                pose: vec![],
                timestamp: Utc::now(),
            }
        } else {
            MarkerDetection {
                marker_id: opts.marker_id,
                pose: identity_pose.clone(),
                timestamp: Utc::now(),
            }
        };

        let msg = serde_json::to_string(&detection)?;

        match socket.send(&msg, 0) {
            Ok(_) => (),
            Err(e) => println!("Failed to send detection: {}", e),
        }

        frame += 1;

        // Recognition cadence of the real process, roughly 30 Hz
        std::thread::sleep(std::time::Duration::from_millis(33));
    }
}
