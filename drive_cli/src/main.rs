//! # Drive CLI
//!
//! A small interactive frontend for `ar_exec`, for driving the car without
//! the AR display attached. Commands typed at the prompt are published as
//! driver commands on the exec's input endpoint.

use std::str::FromStr;
use std::thread;
use std::time::Duration;

use color_eyre::{eyre::WrapErr, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use structopt::StructOpt;

use comms_if::{
    input::{Control, DriverCmd},
    net::{zmq, MonitoredSocket, SocketOptions},
};

const PROMPT: &str = "ghost_wheel $ ";

/// How long `tap` holds the key before releasing it
const TAP_HOLD_MS: u64 = 500;

#[derive(Debug, StructOpt)]
#[structopt(name = "drive_cli", about = "Drive the AR car from a terminal")]
struct Opts {
    /// The exec's driver input endpoint
    #[structopt(long, default_value = "tcp://localhost:5030")]
    endpoint: String,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    let ctx = zmq::Context::new();

    let socket_options = SocketOptions {
        block_on_first_connect: false,
        linger: 1,
        send_timeout: 10,
        ..Default::default()
    };

    let socket = MonitoredSocket::new(&ctx, zmq::PUB, socket_options, &opts.endpoint)
        .wrap_err("Could not connect to the exec")?;

    println!("Publishing driver commands to {}", opts.endpoint);
    println!("Type `help` for the available commands");

    let mut rl = DefaultEditor::new()?;

    loop {
        let readline = rl.readline(PROMPT);
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                rl.add_history_entry(line)?;

                if line == "exit" || line == "quit" {
                    break;
                }

                match parse(line) {
                    Ok(cmds) => {
                        for (cmd, delay_ms) in cmds {
                            if delay_ms > 0 {
                                thread::sleep(Duration::from_millis(delay_ms));
                            }
                            send(&socket, &cmd);
                        }
                    }
                    Err(msg) => println!("{}", msg),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Unhandled error: {:?}", err);
                break;
            }
        }
    }

    println!("Exiting...");

    Ok(())
}

/// Parse a prompt line into commands and the delays to apply before each.
fn parse(line: &str) -> Result<Vec<(DriverCmd, u64)>, String> {
    let split: Vec<&str> = line.split_whitespace().collect();

    match split.as_slice() {
        ["help"] => {
            println!("Commands:");
            println!("    press <control>     hold a control down");
            println!("    release <control>   release a held control");
            println!("    tap <control>       hold a control for {} ms", TAP_HOLD_MS);
            println!("    reset               reset the anchor and the car");
            println!("    grid                toggle the ground grid");
            println!("    exit | quit         leave the prompt");
            println!();
            println!("Controls: forward, backward, left, right, brake");
            Ok(vec![])
        }

        ["press", control] => Ok(vec![(key_cmd(control, true)?, 0)]),

        ["release", control] => Ok(vec![(key_cmd(control, false)?, 0)]),

        ["tap", control] => Ok(vec![
            (key_cmd(control, true)?, 0),
            (key_cmd(control, false)?, TAP_HOLD_MS),
        ]),

        ["reset"] => Ok(vec![(DriverCmd::Reset, 0)]),

        ["grid"] => Ok(vec![(DriverCmd::ToggleGrid, 0)]),

        _ => Err(format!(
            "Unrecognised command \"{}\", type `help` for the list",
            line
        )),
    }
}

fn key_cmd(control: &str, pressed: bool) -> Result<DriverCmd, String> {
    let control = Control::from_str(control)?;
    Ok(DriverCmd::Key { control, pressed })
}

fn send(socket: &MonitoredSocket, cmd: &DriverCmd) {
    let json = match cmd.to_json() {
        Ok(j) => j,
        Err(e) => {
            println!("Could not serialise the command: {}", e);
            return;
        }
    };

    match socket.send(&json, 0) {
        Ok(_) => (),
        Err(e) => println!("Could not send the command: {}", e),
    }
}
