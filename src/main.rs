use std::path::Path;

use clap::Parser;
use log::info;
use snafu::ErrorCompat;

mod analysis;
mod args;

fn main() {
    let args = args::Args::parse();

    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
            .init();
    } else {
        env_logger::init();
    }

    info!(
        "Reading candidates from {:?}, writing results to {:?}",
        args.input, args.out_dir
    );

    if let Err(e) = analysis::run_analysis(&args.input, Path::new(&args.out_dir)) {
        eprintln!("An error occured: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
