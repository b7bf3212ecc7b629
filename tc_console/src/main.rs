//! # Telecommand Console
//!
//! Interactive console used to command the navigation executive. The console
//! binds the telecommand endpoint, the executive connects to it and polls for
//! commands every cycle. Each command typed at the prompt is serialised as a
//! JSON TC, sent over the request socket, and the executive's response is
//! printed.

use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use rustyline::{error::ReadlineError, DefaultEditor};
use structopt::{clap::AppSettings, StructOpt};

use comms_if::{
    net::{zmq, MonitoredSocket, SocketOptions},
    tc::{GoalCmd, Tc, TcResponse},
};

const PROMPT: &str = "Talos $ ";
const HISTORY_PATH: &str = "tc_console_history.txt";

/// Endpoint the console binds, the executive connects to this.
const TC_ENDPOINT: &str = "tcp://*:5020";

/// A command typed at the console prompt.
#[derive(Debug, StructOpt)]
#[structopt(name = "tc_console", setting = AppSettings::NoBinaryName)]
enum ConsoleCmd {
    /// Drive to a point given relative to the vehicle's current frame
    Goto(GoalCmd),

    /// Put the vehicle into safe mode, halting all motion
    Safe,

    /// Take the vehicle out of safe mode, provided safe mode was commanded
    Unsafe,

    /// Exit the console
    Exit,
}

fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // Bind the socket the executive will connect to
    let ctx = zmq::Context::new();

    let socket_options = SocketOptions {
        bind: true,
        block_on_first_connect: false,
        linger: 1,
        recv_timeout: 5000,
        send_timeout: 1000,
        req_correlate: true,
        req_relaxed: true,
        ..Default::default()
    };

    let socket = MonitoredSocket::new(&ctx, zmq::REQ, socket_options, TC_ENDPOINT)
        .wrap_err("Could not open the telecommand socket")?;

    println!("Telecommand console ready on {}", TC_ENDPOINT);
    println!("Type `help` for the list of commands");

    let mut rl = DefaultEditor::new().wrap_err("Could not start the line editor")?;
    if rl.load_history(HISTORY_PATH).is_err() {
        println!("No history detected");
    }

    loop {
        let readline = rl.readline(PROMPT);
        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }

                rl.add_history_entry(line.as_str()).ok();

                // Parse the line as a console command. The error message
                // carries clap's usage text, which also covers `help`.
                let cmd = match ConsoleCmd::from_iter_safe(line.split_whitespace()) {
                    Ok(c) => c,
                    Err(e) => {
                        println!("{}", e.message);
                        continue;
                    }
                };

                let tc = match cmd {
                    ConsoleCmd::Goto(goal) => Tc::Goto(goal),
                    ConsoleCmd::Safe => Tc::MakeSafe,
                    ConsoleCmd::Unsafe => Tc::MakeUnsafe,
                    ConsoleCmd::Exit => break,
                };

                match send_tc(&socket, &tc) {
                    Ok(response) => println!("{:?}", response),
                    Err(e) => println!("Error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Unhandled Error: {:?}", err);
                break;
            }
        }
    }

    rl.save_history(HISTORY_PATH).ok();

    println!("Exiting...");

    Ok(())
}

/// Send a TC to the executive and wait for its response.
fn send_tc(socket: &MonitoredSocket, tc: &Tc) -> Result<TcResponse, Report> {
    let tc_json = tc.to_json().wrap_err("Could not serialise the TC")?;

    socket.send(&tc_json, 0).wrap_err("Could not send the TC")?;

    let msg = socket
        .recv_string(0)
        .wrap_err("No response from the executive")?
        .map_err(|_| eyre!("The executive's response was not valid UTF-8"))?;

    serde_json::from_str(&msg).wrap_err("Could not parse the executive's response")
}
