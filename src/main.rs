use std::process::ExitCode;

use clap::Parser;

use veerji::driver::{self, Args, DriverExecutionError};

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(err) = stderrlog::new()
        .verbosity(1 + args.verbose as usize)
        .init()
    {
        eprintln!("WARN: Could not set up logging due to {}, continuing", err);
    }

    match driver::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{:#}", err);
            let code = err
                .downcast_ref::<DriverExecutionError>()
                .map_or(1, DriverExecutionError::exit_code);
            ExitCode::from(code)
        }
    }
}
