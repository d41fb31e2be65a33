//! Output hooks for completed runs: a sink trait invoked once per run, a file-backed
//! tape log, and a writer for the distinct-state count.

use crate::types::TuringMachineError;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Receives the outcome of every run that reached a final state.
pub trait RunSink {
    /// Called with the trimmed tape content and the number of steps executed.
    fn on_halt(&mut self, tape: &str, steps: usize) -> Result<(), TuringMachineError>;
}

impl<F> RunSink for F
where
    F: FnMut(&str, usize) -> Result<(), TuringMachineError>,
{
    fn on_halt(&mut self, tape: &str, steps: usize) -> Result<(), TuringMachineError> {
        self(tape, steps)
    }
}

/// Appends each run's trimmed tape to a file, one line per run.
#[derive(Debug)]
pub struct TapeLog {
    path: PathBuf,
    file: File,
}

impl TapeLog {
    /// Creates (or truncates) the log file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, TuringMachineError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| file_error("create", path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Opens the log file for appending, creating it if it does not exist.
    pub fn append(path: impl AsRef<Path>) -> Result<Self, TuringMachineError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| file_error("open", path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Returns the path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RunSink for TapeLog {
    fn on_halt(&mut self, tape: &str, _steps: usize) -> Result<(), TuringMachineError> {
        writeln!(self.file, "{tape}").map_err(|e| file_error("write", &self.path, e))
    }
}

/// Writes `count` followed by a newline to `path`, replacing any previous content.
pub fn write_state_count(path: impl AsRef<Path>, count: usize) -> Result<(), TuringMachineError> {
    let path = path.as_ref();
    fs::write(path, format!("{count}\n")).map_err(|e| file_error("write", path, e))
}

fn file_error(action: &str, path: &Path, e: std::io::Error) -> TuringMachineError {
    TuringMachineError::FileError(format!("Failed to {action} {}: {e}", path.display()))
}

/// Collects runs in memory. Clones share the same record list.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub(crate) struct MemorySink {
    records: std::sync::Arc<std::sync::Mutex<Vec<(String, usize)>>>,
}

#[cfg(test)]
impl MemorySink {
    pub(crate) fn records(&self) -> Vec<(String, usize)> {
        self.records.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl RunSink for MemorySink {
    fn on_halt(&mut self, tape: &str, steps: usize) -> Result<(), TuringMachineError> {
        self.records.lock().unwrap().push((tape.to_string(), steps));
        Ok(())
    }
}
