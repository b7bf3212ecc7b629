//! Main navigation executive entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Sensor frame acquisition from the base
//!         - Telecommand processing and handling
//!         - Navigation control processing
//!         - Demand sending
//!         - Archiving and telemetry
//!
//! # Modules
//!
//! All modules (e.g. `nav_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

#[cfg(feature = "base")]
use comms_if::eqpt::base::{BaseDems, BaseDemsResponse};
use comms_if::tc::TcResponse;
#[cfg(feature = "base")]
use nav_lib::base_client::{BaseClient, BaseClientError};
use nav_lib::{
    data_store::{DataStore, SafeModeCause},
    params::NavExecParams,
    tc_client::{TcClient, TcClientError},
    tm_server::TmServer,
};

mod tc_processor;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, error, info, warn};
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
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 1.0;

/// Limit of the number of times recieve errors from the base can be created consecutively before
/// safe mode will be engaged.
#[cfg(feature = "base")]
const MAX_BASE_RECV_ERROR_LIMIT: u64 = 5;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("nav_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Talos Navigation Executive\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: NavExecParams =
        util::params::load("nav_exec.toml").wrap_err("Could not load nav_exec params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE TC SOURCE ----

    // TC source is used to determine whether we're getting TCs from a script
    // or from the operator's console.
    let mut tc_source = TcSource::None;
    let mut use_tc_client = false;

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    // If we have a single argument use it as the script path
    if args.len() == 2 {
        info!("Loading script from \"{}\"", &args[1]);

        // Load the script interpreter
        let si = ScriptInterpreter::new(&args[1]).wrap_err("Failed to load script")?;

        // Display some info
        info!(
            "Loaded script lasts {:.02} s and contains {} TCs\n",
            si.get_duration(),
            si.get_num_tcs()
        );

        // Set the interpreter in the source
        tc_source = TcSource::Script(si);
    }
    // If no arguments then setup the tc client
    else if args.len() == 1 {
        info!("No script provided, remote control via the TcClient will be used\n");
        use_tc_client = true;
    } else {
        return Err(eyre!(
            "Expected either zero or one argument, found {}",
            args.len() - 1
        ));
    }

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.nav_ctrl
        .init("nav_ctrl.toml", &session)
        .wrap_err("Failed to initialise NavCtrl")?;
    info!("NavCtrl init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = comms_if::net::zmq::Context::new();

    if use_tc_client {
        tc_source = TcSource::Remote(
            TcClient::new(&zmq_ctx, &exec_params).wrap_err("Failed to initialise the TcClient")?,
        );
        info!("TcClient initialised");
    }

    #[cfg(feature = "base")]
    let mut base_client = {
        let c = BaseClient::new(&zmq_ctx, &exec_params)
            .wrap_err("Failed to initialise the BaseClient")?;
        info!("BaseClient initialised");
        c
    };

    let mut tm_server = {
        let s =
            TmServer::new(&zmq_ctx, &exec_params).wrap_err("Failed to initialise the TmServer")?;
        info!("TmServer initialised");
        s
    };

    info!("Network initialisation complete");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start();

        // ---- DATA INPUT ----

        // Drain the sensor frames published by the base since the last cycle.
        // Bump bits are ORed together so a bump in any frame is seen by the
        // controller even if a clean frame follows it.
        #[cfg(feature = "base")]
        for frame in base_client.drain_frames() {
            ds.nav_ctrl_input.bumps_wheeldrops |= frame.bumps_wheeldrops;
            ds.last_base_sens = Some(frame);
        }

        // ---- TELECOMMAND PROCESSING ----

        // Branch depending on the source
        match tc_source {
            // If no source no point in continuing so break
            TcSource::None => raise_error!("No TC source present"),

            TcSource::Remote(ref client) => {
                // If the client is connected remove any safe mode, otherwise make safe
                if client.is_connected() {
                    ds.make_unsafe(SafeModeCause::TcServerNotConnected).ok();
                } else {
                    ds.make_safe(SafeModeCause::TcServerNotConnected);
                }

                // Get commands until none remain
                loop {
                    match client.recieve_tc() {
                        Ok(Some(tc)) => {
                            // Process the TC and respond to the server with
                            // the outcome
                            let response = tc_processor::exec(&mut ds, &tc);

                            if let Err(e) = client.send_response(response) {
                                warn!("Could not respond to TC: {}", e);
                            }
                        }
                        Ok(None) => break,
                        // If not connected go into safe mode
                        Err(TcClientError::NotConnected) => {
                            if !ds.safe {
                                error!("Connection to TcServer lost");
                            }

                            ds.make_safe(SafeModeCause::TcServerNotConnected);
                            break;
                        }
                        Err(TcClientError::TcParseError(e)) => {
                            warn!("Could not parse recieved TC: {}", e);
                            break;
                        }
                        Err(e) => {
                            return Err(e)
                                .wrap_err("An error occured while recieving TCs from the server")
                        }
                    }
                }
            }

            TcSource::Script(ref mut si) => match si.get_pending_tcs() {
                PendingTcs::None => (),
                PendingTcs::Some(tc_vec) => {
                    for tc in tc_vec.iter() {
                        if tc_processor::exec(&mut ds, tc) != TcResponse::Ok {
                            warn!("Script TC {:?} could not be executed", tc);
                        }
                    }
                }
                // Exit if end of script reached
                PendingTcs::EndOfScript => {
                    info!("End of TC script reached, stopping");
                    break;
                }
            },
        };

        // ---- CONTROL ALGORITHM PROCESSING ----

        // NavCtrl processing
        match ds.nav_ctrl.proc(&ds.nav_ctrl_input) {
            Ok((o, r)) => {
                ds.nav_ctrl_output = o;
                ds.nav_ctrl_status_rpt = r;
            }
            Err(e) => {
                // NavCtrl errors usually just mean you sent the wrong TC, so just issue the
                // warning and continue.
                warn!("Error during NavCtrl processing: {}", e)
            }
        };

        // ---- DEMAND SENDING ----

        #[cfg(feature = "base")]
        {
            // Track the connection on every cycle, not just on cycles with a
            // demand, so a lost base engages safe mode even while idle
            if base_client.is_connected() {
                ds.make_unsafe(SafeModeCause::BaseNotConnected).ok();
            } else {
                if !ds.safe {
                    error!("Connection to the base lost");
                }

                ds.make_safe(SafeModeCause::BaseNotConnected);
            }

            // In safe mode the controller's demands are overridden and the
            // base is commanded to stop on every cycle
            let dems_to_send = match ds.safe {
                true => Some(BaseDems::stop()),
                false => ds.nav_ctrl_output.base_dems,
            };

            if let Some(dems) = dems_to_send {
                match base_client.send_demands(&dems) {
                    Ok(BaseDemsResponse::DemsOk) => {
                        // Reset the recieve error counter
                        ds.num_consec_base_recv_errors = 0;
                    }
                    Ok(r) => warn!("Recieved non-nominal response from the base: {:?}", r),
                    Err(BaseClientError::NotConnected) => {
                        if !ds.safe {
                            error!("Connection to the base lost");
                        }

                        ds.make_safe(SafeModeCause::BaseNotConnected);
                    }
                    Err(BaseClientError::RecvError(_)) => {
                        ds.num_consec_base_recv_errors += 1;

                        // If over the limit print error and enter safe mode
                        if ds.num_consec_base_recv_errors > MAX_BASE_RECV_ERROR_LIMIT {
                            if !ds.safe {
                                error!(
                                    "Maximum number of base recieve errors ({}) has been exceeded",
                                    MAX_BASE_RECV_ERROR_LIMIT
                                );
                            }

                            ds.make_safe(SafeModeCause::BaseNotConnected);
                        }
                    }
                    Err(e) => warn!("BaseClient processing error: {}", e),
                }
            }
        }

        // ---- WRITE ARCHIVES ----

        if let Err(e) = ds.nav_ctrl.write() {
            warn!("Could not write NavCtrl archives: {}", e);
        }

        // ---- TELEMETRY ----

        match tm_server.send(&ds) {
            Ok(_) => (),
            Err(e) => warn!("TmServer error: {}", e),
        };

        // ---- CYCLE MANAGEMENT ----

        // A settle pause requested by the controller extends this cycle's
        // period, giving the motion time to finish before the next demand is
        // issued.
        let mut period_s = CYCLE_PERIOD_S;
        if let Some(settle_s) = ds.nav_ctrl_output.settle_duration_s {
            period_s += settle_s;
        }

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(period_s).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!("Cycle overran by {:.06} s", cycle_dur.as_secs_f64() - period_s);
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    info!("End of execution");

    Ok(())
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Various sources for the telecommands incoming to the exec.
enum TcSource {
    None,
    Remote(TcClient),
    Script(ScriptInterpreter),
}
