//! Result records, the append-only result log and the final summary

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::matrix::error::MatrixError;

/// Outcome of running the test command against one version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRun {
    pub version: String,
    pub exit_code: i32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl TestRun {
    pub fn passed(&self) -> bool {
        self.exit_code == 0
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Line written to the result log
    pub fn log_line(&self) -> String {
        format!("{} ; {}", self.version, self.exit_code)
    }
}

/// Flat text log with one `<version> ; <exit code>` line per executed version
#[derive(Debug)]
pub struct ResultLog {
    path: PathBuf,
}

impl ResultLog {
    /// Start a fresh log, discarding the previous run's results
    pub fn create(path: &Path) -> Result<Self, MatrixError> {
        let log_err = |source| MatrixError::ResultLog {
            path: path.to_path_buf(),
            source,
        };
        if path.exists() {
            std::fs::remove_file(path).map_err(log_err)?;
        }
        std::fs::File::create(path).map_err(log_err)?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record; each record is flushed before returning
    pub fn append(&self, run: &TestRun) -> Result<(), MatrixError> {
        let log_err = |source| MatrixError::ResultLog {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(log_err)?;
        writeln!(file, "{}", run.log_line()).map_err(log_err)?;
        file.flush().map_err(log_err)
    }
}

/// Per-version summary table in selection order
pub struct Summary<'a> {
    runs: &'a [TestRun],
}

impl<'a> Summary<'a> {
    pub fn new(runs: &'a [TestRun]) -> Self {
        Self { runs }
    }

    pub fn passed(&self) -> usize {
        self.runs.iter().filter(|run| run.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.runs.len() - self.passed()
    }
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.runs.is_empty() {
            return writeln!(f, "No versions were tested.");
        }

        let width = self
            .runs
            .iter()
            .map(|run| run.version.len())
            .max()
            .unwrap_or(0)
            .max("VERSION".len());

        writeln!(f, "{:<width$}  {:>4}  {:<6}  {:>8}", "VERSION", "RC", "RESULT", "TIME")?;
        for run in self.runs {
            let seconds = run.duration().num_milliseconds() as f64 / 1000.0;
            writeln!(
                f,
                "{:<width$}  {:>4}  {:<6}  {:>7.1}s",
                run.version,
                run.exit_code,
                if run.passed() { "PASS" } else { "FAIL" },
                seconds,
            )?;
        }
        writeln!(
            f,
            "{} tested, {} passed, {} failed",
            self.runs.len(),
            self.passed(),
            self.failed()
        )
    }
}
