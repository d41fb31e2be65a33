//! Embedded transition programs and a shared cache of their parsed tables.

use crate::table::TransitionTable;
use crate::types::TuringMachineError;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Name of the embedded binary multiplication program.
pub const MULTIPLICATION: &str = "multiplication";
/// Name of the embedded unary increment program.
pub const UNARY_INCREMENT: &str = "unary-increment";

/// Describes an embedded program and how its final states are recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub source: &'static str,
    /// Every `next_state` starting with this prefix is a final state.
    pub halt_prefix: &'static str,
}

static PROGRAMS: [ProgramInfo; 2] = [
    ProgramInfo {
        name: MULTIPLICATION,
        description: "Multiplies two binary numbers written as <a>#<b>$",
        source: include_str!("../programs/multiplication.tm"),
        halt_prefix: "halt",
    },
    ProgramInfo {
        name: UNARY_INCREMENT,
        description: "Appends one 1 to a block of 1s",
        source: include_str!("../programs/unary-increment.tm"),
        halt_prefix: "halt",
    },
];

lazy_static::lazy_static! {
    static ref TABLES: RwLock<HashMap<&'static str, Arc<TransitionTable>>> =
        RwLock::new(HashMap::new());
}

pub struct ProgramManager;

impl ProgramManager {
    /// Returns every embedded program.
    pub fn programs() -> &'static [ProgramInfo] {
        &PROGRAMS
    }

    /// List all program names
    pub fn list_program_names() -> Vec<&'static str> {
        PROGRAMS.iter().map(|program| program.name).collect()
    }

    /// Get an embedded program by its name
    pub fn get_program_info(name: &str) -> Result<&'static ProgramInfo, TuringMachineError> {
        PROGRAMS
            .iter()
            .find(|program| program.name == name)
            .ok_or_else(|| TuringMachineError::UnknownProgram(name.to_string()))
    }

    /// Builds a fresh table for `info`, recognizing final states by its halt prefix.
    pub fn build(info: &ProgramInfo) -> Result<TransitionTable, TuringMachineError> {
        let prefix = info.halt_prefix;
        TransitionTable::builder()
            .final_when(move |state| state.starts_with(prefix))
            .build(info.source)
    }

    /// Returns the shared table for the named program, parsing it on first use.
    pub fn get_table(name: &str) -> Result<Arc<TransitionTable>, TuringMachineError> {
        let info = Self::get_program_info(name)?;

        if let Some(table) = TABLES
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(info.name)
        {
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(Self::build(info)?);
        TABLES
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(info.name)
            .or_insert_with(|| Arc::clone(&table));

        Ok(table)
    }
}

/// Returns the shared binary multiplication table.
pub fn multiplication() -> Result<Arc<TransitionTable>, TuringMachineError> {
    ProgramManager::get_table(MULTIPLICATION)
}
