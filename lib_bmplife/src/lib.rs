pub mod bitmap;
pub mod grid;
pub mod life;
pub mod simulation;

use log::*;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

pub use crate::bitmap::{decode, decode_file, encode, encode_file, DecodeError, EncodeError, Image};
pub use crate::grid::{Color, DimensionError, PixelGrid};
pub use crate::life::{classify, step, step_image, CellState, StepReport, UnsupportedColorError};
pub use crate::simulation::{
    DirectorySink, GenerationSink, RunSummary, Simulation, SimulationConfig, SimulationError,
    StopReason,
};

/// Sends log records to `path`, with debug output for this library.
pub fn init_logging<P: AsRef<Path>>(path: P) -> io::Result<()> {
    let target = Box::new(File::create(path)?);

    env_logger::Builder::new()
        .target(env_logger::Target::Pipe(target))
        .filter_level(LevelFilter::Info)
        .filter(Some("lib_bmplife"), LevelFilter::Debug)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}:{}] {}",
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .try_init()
        .map_err(io::Error::other)
}
