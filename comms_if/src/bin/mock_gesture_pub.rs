//! Mock gesture tracker publisher
//!
//! Publishes a slow steering sine wave with high confidence, with periodic
//! low-confidence dropouts to exercise the exec's dead-man's-switch gating.

use comms_if::eqpt::gesture::{GestureMsg, SteeringData, MAX_STEERING_ANGLE_DEG};
use comms_if::net::{MonitoredSocket, SocketOptions};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "mock_gesture_pub", about = "Publish fake steering data")]
struct Opts {
    /// Endpoint to bind the publisher to
    #[structopt(long, default_value = "tcp://*:8765")]
    endpoint: String,

    /// Peak steering angle of the sine wave in degrees
    #[structopt(long, default_value = "30.0")]
    amplitude_deg: f64,

    /// Period of the sine wave in seconds
    #[structopt(long, default_value = "8.0")]
    period_s: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = Opts::from_args();

    let ctx = zmq::Context::new();

    let socket_options = SocketOptions {
        bind: true,
        block_on_first_connect: false,
        ..Default::default()
    };

    let socket = MonitoredSocket::new(&ctx, zmq::PUB, socket_options, &opts.endpoint)?;

    println!("Mock gesture tracker publishing on {}", opts.endpoint);

    let amplitude = opts.amplitude_deg.min(MAX_STEERING_ANGLE_DEG);
    let start = std::time::Instant::now();

    loop {
        let t = start.elapsed().as_secs_f64();

        // Drop to zero confidence for one second out of every ten, as if the
        // driver took their hands off the wheel
        let hands_on = (t % 10.0) > 1.0;

        let msg = GestureMsg::SteeringData(SteeringData {
            timestamp: chrono::Utc::now().timestamp_millis(),
            steering_angle: amplitude
                * (t * std::f64::consts::TAU / opts.period_s).sin(),
            confidence: if hands_on { 0.95 } else { 0.1 },
        });

        let msg_str = serde_json::to_string(&msg)?;

        match socket.send(&msg_str, 0) {
            Ok(_) => (),
            Err(e) => println!("Failed to send steering data: {}", e),
        }

        // Tracker cadence, roughly 60 Hz
        std::thread::sleep(std::time::Duration::from_millis(16));
    }
}
