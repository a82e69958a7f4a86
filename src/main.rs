mod args;
mod tally;

use clap::Parser;
use log::{info, warn};

use crate::args::Args;

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    info!("args {:?}", args);

    if let Err(e) = tally::run_allocation(&args) {
        warn!("Error occured {:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
