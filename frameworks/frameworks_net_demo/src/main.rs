//! netshim
//!
//! Echo server and client over the network adapter.
//!
//! Usage:
//!   netshim serve --port 4433 [--udp] [--backend iot|bsd]
//!   netshim connect --host localhost --port 4433 --message hello

use clap::Parser;
use frameworks_net_demo::{run_on_app_thread, NetshimArgs, Outcome};
use infrastructure_rtos::StdKernel;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = NetshimArgs::parse();
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    match run_on_app_thread(&StdKernel, args) {
        Ok(Outcome::Served(summary)) => match summary.peer {
            Some(peer) => println!("echoed {} bytes to {}", summary.bytes, peer),
            None => println!("echoed {} bytes", summary.bytes),
        },
        Ok(Outcome::Echoed(reply)) => println!("{}", String::from_utf8_lossy(&reply)),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
