use std::fs::File;
use std::io::{self, BufWriter};
use std::thread;
use std::time::Duration;

use lib_bmplife::{decode_file, DecodeError, DirectorySink, RunSummary, Simulation, SimulationError};
use log::info;
use thiserror::Error;

use crate::cli::Args;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Can't load the starting generation")]
    Decode(#[from] DecodeError),
    #[error("Simulation failed")]
    Simulation(#[from] SimulationError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Can't write the run summary")]
    Summary(#[from] serde_json::Error),
}

pub fn run(args: &Args) -> Result<RunSummary, RunnerError> {
    let image = decode_file(&args.input)?;
    info!(
        "Loaded {} ({}x{})",
        args.input.display(),
        image.width(),
        image.height()
    );

    let mut sink = DirectorySink::new(&args.output)?;
    let mut simulation = Simulation::new(image, args.simulation_config())?;
    let delay = Duration::from_millis(args.delay_ms);

    let summary = simulation.run(&mut sink, |generation| {
        info!("Generation {} done", generation);
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    })?;

    info!(
        "Finished after {} generations ({:?}), {} live cells",
        summary.generations, summary.stop_reason, summary.final_live_cells
    );

    if let Some(path) = &args.summary {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &summary)?;
        info!("Summary written to {}", path.display());
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use lib_bmplife::{encode_file, Image, PixelGrid, StopReason};
    use std::ffi::OsString;

    #[test]
    fn test_run_writes_generations_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("start.bmp");
        let output = dir.path().join("out");
        let summary_path = dir.path().join("summary.json");

        let grid = PixelGrid::from_cells(5, 5, [(2, 1), (2, 2), (2, 3)]).unwrap();
        encode_file(&Image::from_grid(grid).unwrap(), &input).unwrap();

        let argv: Vec<OsString> = vec![
            "bmplife".into(),
            "--input".into(),
            input.clone().into(),
            "--output".into(),
            output.clone().into(),
            "--max-iter".into(),
            "3".into(),
            "--summary".into(),
            summary_path.clone().into(),
        ];
        let args = Args::try_parse_from(argv).unwrap();

        let summary = run(&args).unwrap();
        assert_eq!(summary.stop_reason, StopReason::IterationLimit);
        assert_eq!(summary.generations, 3);
        for generation in 1..=3 {
            assert!(output.join(format!("gen_{generation}.bmp")).exists());
        }

        let json: serde_json::Value =
            serde_json::from_reader(File::open(&summary_path).unwrap()).unwrap();
        assert_eq!(json["generations"], 3);
        assert_eq!(json["stop_reason"], "IterationLimit");
    }

    #[test]
    fn test_run_reports_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let argv: Vec<OsString> = vec![
            "bmplife".into(),
            "--input".into(),
            dir.path().join("nope.bmp").into(),
            "--output".into(),
            dir.path().join("out").into(),
        ];
        let args = Args::try_parse_from(argv).unwrap();
        assert!(matches!(run(&args), Err(RunnerError::Decode(DecodeError::Io(_)))));
    }
}
