// External crates
use clap::Parser;
use skylift_core::sky_error;

use skylift::cli::Args;
use skylift::commands::execute_command;

fn main() {
    // Keep the guard alive so file logging flushes on exit.
    let _log_guard = skylift_logging::init_subscriber();

    let args = Args::parse();
    if let Err(e) = execute_command(args) {
        sky_error!("{}", e);
        std::process::exit(1);
    }
}
