use std::fs;
use std::io;
use std::path::PathBuf;

use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bitmap::{encode_file, EncodeError, Image};
use crate::life::{self, StepReport};

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Dump frequency must be at least 1")]
    InvalidDumpFrequency,
    #[error("Failed to persist generation {generation}")]
    PersistFailed {
        generation: u64,
        #[source]
        source: EncodeError,
    },
    #[error("Failed to prepare output directory {}", .0.display())]
    OutputDirectory(PathBuf, #[source] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// `None` runs until the pattern settles or dies out.
    pub max_iterations: Option<u64>,
    /// Persist every n-th generation. The final generation is always persisted.
    pub dump_frequency: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_iterations: None,
            dump_frequency: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    Stable,
    Extinct,
    IterationLimit,
}

impl StopReason {
    /// Stability takes priority over extinction.
    pub fn from_report(report: &StepReport) -> Option<Self> {
        if report.stable {
            Some(StopReason::Stable)
        } else if report.extinct {
            Some(StopReason::Extinct)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub generations: u64,
    pub stop_reason: StopReason,
    pub final_live_cells: usize,
    pub unsupported_colors: usize,
}

/// Destination for generations produced by a run.
pub trait GenerationSink {
    fn persist(&mut self, generation: u64, image: &Image) -> Result<(), SimulationError>;
}

/// Writes each persisted generation to `<dir>/gen_<n>.bmp`.
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Result<Self, SimulationError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|err| {
            error!("Can't create output directory {}: {}", dir.display(), err);
            SimulationError::OutputDirectory(dir.clone(), err)
        })?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, generation: u64) -> PathBuf {
        self.dir.join(format!("gen_{generation}.bmp"))
    }
}

impl GenerationSink for DirectorySink {
    fn persist(&mut self, generation: u64, image: &Image) -> Result<(), SimulationError> {
        let path = self.path_for(generation);
        encode_file(image, &path)
            .map_err(|source| SimulationError::PersistFailed { generation, source })?;
        debug!("Generation {} written to {}", generation, path.display());
        Ok(())
    }
}

/// Owns the current generation and drives it forward.
pub struct Simulation {
    image: Image,
    config: SimulationConfig,
    generation: u64,
}

impl Simulation {
    pub fn new(image: Image, config: SimulationConfig) -> Result<Self, SimulationError> {
        if config.dump_frequency == 0 {
            return Err(SimulationError::InvalidDumpFrequency);
        }
        Ok(Self {
            image,
            config,
            generation: 0,
        })
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    fn limit_reached(&self) -> bool {
        self.config
            .max_iterations
            .is_some_and(|max| self.generation >= max)
    }

    /// Computes one generation; the previous grid is released here.
    pub fn advance(&mut self) -> StepReport {
        let (next, report) = life::step(self.image.pixels());
        drop(self.image.swap_generation(next));
        self.generation += 1;
        report
    }

    /// Steps until the pattern is stable, extinct, or the iteration limit is
    /// hit. `pace` runs between iterations with the generation just finished.
    pub fn run<S, F>(&mut self, sink: &mut S, mut pace: F) -> Result<RunSummary, SimulationError>
    where
        S: GenerationSink + ?Sized,
        F: FnMut(u64),
    {
        info!(
            "Starting simulation on a {}x{} grid",
            self.image.width(),
            self.image.height()
        );
        let mut unsupported_colors = 0;

        let stop_reason = loop {
            if self.limit_reached() {
                break StopReason::IterationLimit;
            }

            let report = self.advance();
            unsupported_colors += report.unsupported.len();

            let stop = StopReason::from_report(&report)
                .or_else(|| self.limit_reached().then_some(StopReason::IterationLimit));
            if stop.is_some() || self.generation % self.config.dump_frequency == 0 {
                sink.persist(self.generation, &self.image)?;
            }
            if let Some(reason) = stop {
                break reason;
            }

            pace(self.generation);
        };

        let summary = RunSummary {
            generations: self.generation,
            stop_reason,
            final_live_cells: self.image.pixels().live_count(),
            unsupported_colors,
        };
        info!(
            "Simulation stopped after {} generations: {:?}",
            summary.generations, summary.stop_reason
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::PixelGrid;

    #[derive(Default)]
    struct Recorder {
        generations: Vec<u64>,
    }

    impl GenerationSink for Recorder {
        fn persist(&mut self, generation: u64, _image: &Image) -> Result<(), SimulationError> {
            self.generations.push(generation);
            Ok(())
        }
    }

    fn blinker() -> Image {
        let grid = PixelGrid::from_cells(5, 5, [(2, 1), (2, 2), (2, 3)]).unwrap();
        Image::from_grid(grid).unwrap()
    }

    #[test]
    fn test_zero_dump_frequency_rejected() {
        let config = SimulationConfig {
            max_iterations: None,
            dump_frequency: 0,
        };
        assert!(matches!(
            Simulation::new(blinker(), config),
            Err(SimulationError::InvalidDumpFrequency)
        ));
    }

    #[test]
    fn test_zero_iterations_runs_nothing() {
        let config = SimulationConfig {
            max_iterations: Some(0),
            ..Default::default()
        };
        let mut simulation = Simulation::new(blinker(), config).unwrap();
        let mut recorder = Recorder::default();
        let summary = simulation.run(&mut recorder, |_| {}).unwrap();

        assert_eq!(summary.generations, 0);
        assert_eq!(summary.stop_reason, StopReason::IterationLimit);
        assert!(recorder.generations.is_empty());
    }

    #[test]
    fn test_dump_frequency_always_persists_last() {
        let config = SimulationConfig {
            max_iterations: Some(7),
            dump_frequency: 3,
        };
        let mut simulation = Simulation::new(blinker(), config).unwrap();
        let mut recorder = Recorder::default();
        let mut paced = Vec::new();
        let summary = simulation.run(&mut recorder, |g| paced.push(g)).unwrap();

        assert_eq!(summary.generations, 7);
        assert_eq!(summary.stop_reason, StopReason::IterationLimit);
        assert_eq!(recorder.generations, vec![3, 6, 7]);
        assert_eq!(paced, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_stop_reason_prefers_stable() {
        let report = StepReport {
            stable: true,
            extinct: true,
            ..Default::default()
        };
        assert_eq!(StopReason::from_report(&report), Some(StopReason::Stable));

        let report = StepReport {
            extinct: true,
            ..Default::default()
        };
        assert_eq!(StopReason::from_report(&report), Some(StopReason::Extinct));
        assert_eq!(StopReason::from_report(&StepReport::default()), None);
    }
}
