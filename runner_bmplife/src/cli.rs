use std::path::PathBuf;

use clap::Parser;
use lib_bmplife::SimulationConfig;

#[derive(Parser, Debug)]
#[command(name = "bmplife")]
#[command(about = "Run Conway's Game of Life over the black and white pixels of a 24-bit BMP")]
pub struct Args {
    /// Starting generation, a 24-bit uncompressed bitmap
    #[arg(long)]
    pub input: PathBuf,

    /// Directory that receives gen_<n>.bmp files
    #[arg(long)]
    pub output: PathBuf,

    /// Stop after this many generations
    #[arg(long = "max-iter")]
    pub max_iterations: Option<u64>,

    /// Write every n-th generation
    #[arg(
        long = "dump-freq",
        default_value_t = 1,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub dump_frequency: u64,

    /// Pause between generations, in milliseconds
    #[arg(long = "delay-ms", default_value_t = 0)]
    pub delay_ms: u64,

    /// Write a JSON run summary to this path
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Send log output to this file instead of stderr
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    pub fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            max_iterations: self.max_iterations,
            dump_frequency: self.dump_frequency,
        }
    }
}
