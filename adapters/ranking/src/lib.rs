#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Persistent contest log and the standings computed from it.
//!
//! Completed contests are appended to a line-oriented JSON log. Loading the
//! log and folding it into [`Standings`] produces the ranking table printed
//! by the command-line adapter.

mod standings;

use std::{
    fs::{self, OpenOptions},
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use petri_core::{ColonyReport, ContestResult, Outcome};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use standings::{Standing, Standings};

/// File name of the contest log inside the results directory.
pub const LOG_FILE_NAME: &str = "contests.jsonl";

/// Winner marker recorded for contests without a winner.
pub const DRAW: &str = "draw";

/// Failures raised while reading or writing the contest log.
#[derive(Debug, Error)]
pub enum RankingError {
    /// The log or its directory could not be accessed.
    #[error("failed to access {path}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// A line of the log does not hold a valid record.
    #[error("malformed record on line {line} of {path}")]
    Parse {
        /// Path of the log.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// Underlying decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// A record could not be encoded.
    #[error("failed to encode contest record")]
    Encode(#[from] serde_json::Error),
}

/// One finished contest as stored in the log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Competing policies joined as `"A vs B"`.
    pub matchup: String,
    /// Name of the winning policy, or [`DRAW`].
    pub winner: String,
    /// Points awarded to the winner.
    pub points: usize,
    /// Final standing of every colony.
    pub colonies: Vec<ColonyReport>,
    /// Ticks the contest lasted.
    pub ticks: u64,
    /// Whether the contest ended on its own.
    pub completed: bool,
    /// Seconds since the Unix epoch when the record was made.
    pub timestamp: u64,
}

impl MatchRecord {
    /// Captures a contest result at the given Unix time.
    #[must_use]
    pub fn new(result: &ContestResult, timestamp: u64) -> Self {
        let winner = match result.outcome {
            Outcome::Winner(_) => result
                .winner()
                .map_or_else(|| DRAW.to_owned(), |report| report.name.clone()),
            Outcome::Draw => DRAW.to_owned(),
        };
        Self {
            matchup: result.matchup(),
            winner,
            points: result.points(),
            colonies: result.colonies.clone(),
            ticks: result.ticks,
            completed: result.completed,
            timestamp,
        }
    }

    /// Reports whether the contest ended without a winner.
    #[must_use]
    pub fn is_draw(&self) -> bool {
        self.winner == DRAW
    }
}

/// Append-only contest log stored as JSON lines.
#[derive(Clone, Debug)]
pub struct ResultLog {
    path: PathBuf,
}

impl ResultLog {
    /// Opens the log stored inside `directory`. Nothing is touched on disk yet.
    #[must_use]
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            path: directory.as_ref().join(LOG_FILE_NAME),
        }
    }

    /// Location of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a record, creating the results directory when needed.
    pub fn append(&self, record: &MatchRecord) -> Result<(), RankingError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| RankingError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let line = serde_json::to_string(record)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.io_error(source))?;
        writeln!(file, "{line}").map_err(|source| self.io_error(source))?;
        tracing::debug!(path = %self.path.display(), matchup = %record.matchup, "contest recorded");
        Ok(())
    }

    /// Reads every record. A missing log reads as empty; blank lines are skipped.
    pub fn load(&self) -> Result<Vec<MatchRecord>, RankingError> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(self.io_error(source)),
        };

        let mut records = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|source| self.io_error(source))?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|source| RankingError::Parse {
                path: self.path.clone(),
                line: index + 1,
                source,
            })?;
            records.push(record);
        }
        Ok(records)
    }

    fn io_error(&self, source: io::Error) -> RankingError {
        RankingError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
