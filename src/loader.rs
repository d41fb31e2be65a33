//! This module provides the `ProgramLoader` struct, responsible for loading transition
//! programs from files and strings into tables.

use crate::table::{TableBuilder, TransitionTable};
use crate::types::{TuringMachineError, MAX_PROGRAM_SIZE};
use std::fs;
use std::path::Path;

/// `ProgramLoader` is a utility struct for loading transition programs.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Reads program text from `path`.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` with the file content.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read or exceeds
    ///   `MAX_PROGRAM_SIZE` bytes.
    pub fn read_program(path: &Path) -> Result<String, TuringMachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        check_size(&content)?;
        Ok(content)
    }

    /// Loads a table from the program file at `path` using `builder`'s settings.
    pub fn load_table(
        path: &Path,
        builder: TableBuilder,
    ) -> Result<TransitionTable, TuringMachineError> {
        builder.build(&Self::read_program(path)?)
    }

    /// Loads a table from program text using `builder`'s settings.
    ///
    /// This is useful for programs that are not stored in files, e.g. piped via stdin.
    pub fn load_table_from_string(
        content: &str,
        builder: TableBuilder,
    ) -> Result<TransitionTable, TuringMachineError> {
        check_size(content)?;
        builder.build(content)
    }
}

fn check_size(content: &str) -> Result<(), TuringMachineError> {
    if content.len() > MAX_PROGRAM_SIZE {
        return Err(TuringMachineError::FileError(format!(
            "Program is {} bytes, the limit is {} bytes",
            content.len(),
            MAX_PROGRAM_SIZE
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_valid_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("increment.tm");

        let mut file = File::create(&file_path).unwrap();
        file.write_all(b"; increment\nstart 1 1 r start\nstart B 1 r stop\n")
            .unwrap();

        let table =
            ProgramLoader::load_table(&file_path, TransitionTable::builder().final_state("stop"))
                .unwrap();

        assert_eq!(table.initial_state(), "start");
        assert!(table.is_final("stop"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_load_invalid_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("invalid.tm");
        fs::write(&file_path, "This is not a valid program").unwrap();

        let result = ProgramLoader::load_table(&file_path, TransitionTable::builder());
        assert!(matches!(
            result,
            Err(TuringMachineError::MalformedLine { line: 1, .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = ProgramLoader::read_program(&dir.path().join("missing.tm"));

        let error = result.unwrap_err();
        assert!(matches!(error, TuringMachineError::FileError(_)));
        assert!(error.to_string().contains("missing.tm"));
    }

    #[test]
    fn test_load_from_string() {
        let table = ProgramLoader::load_table_from_string(
            "a x y R b\n",
            TransitionTable::builder().blank('_'),
        )
        .unwrap();
        assert_eq!(table.blank(), '_');
    }

    #[test]
    fn test_oversized_program() {
        let content = "a x y R b\n".repeat(MAX_PROGRAM_SIZE / 10 + 1);
        let result = ProgramLoader::load_table_from_string(&content, TransitionTable::builder());
        assert!(matches!(result, Err(TuringMachineError::FileError(_))));
    }
}
