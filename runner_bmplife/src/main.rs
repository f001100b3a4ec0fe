mod cli;
mod runner;

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use log::{error, LevelFilter};

use cli::Args;

fn main() -> ExitCode {
    let args = Args::parse();

    let logging = match &args.log_file {
        Some(path) => lib_bmplife::init_logging(path),
        None => env_logger::Builder::new()
            .filter_level(LevelFilter::Info)
            .parse_default_env()
            .try_init()
            .map_err(std::io::Error::other),
    };
    if let Err(err) = logging {
        eprintln!("Can't initialize logging: {err}");
    }

    match runner::run(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            eprintln!("Error: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
