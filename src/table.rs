//! This module defines the `TransitionTable`, the immutable rule set a machine executes,
//! and the `TableBuilder` used to construct one from program text.

use crate::parser::parse;
use crate::types::{
    Duplicate, Mode, Transition, TuringMachineError, DEFAULT_BLANK_SYMBOL,
    DEFAULT_WILDCARD_SYMBOL,
};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

type FinalPredicate = Box<dyn Fn(&str) -> bool>;

/// An immutable mapping from `(state, symbol)` to a [`Transition`].
///
/// Built once from program text, then shared read-only (typically behind an `Arc`)
/// by any number of machines.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionTable {
    rules: HashMap<String, HashMap<char, Transition>>,
    initial_state: String,
    final_states: HashSet<String>,
    blank: char,
    wildcard: char,
    rule_count: usize,
    duplicates: Vec<Duplicate>,
}

/// Configures how a [`TransitionTable`] is built.
///
/// Defaults: blank `B`, wildcard `*`, [`Mode::Normal`], and no final states. A table
/// without final states never halts, so callers name them explicitly with
/// [`TableBuilder::final_state`] or supply a predicate with [`TableBuilder::final_when`].
pub struct TableBuilder {
    blank: char,
    wildcard: char,
    mode: Mode,
    final_states: HashSet<String>,
    final_when: Option<FinalPredicate>,
}

impl TransitionTable {
    /// Builds a table from program text using the default builder settings.
    pub fn build(program: &str) -> Result<Self, TuringMachineError> {
        Self::builder().build(program)
    }

    /// Creates a new builder.
    pub fn builder() -> TableBuilder {
        TableBuilder::default()
    }

    /// Finds the rule for `state` reading `symbol`.
    ///
    /// An exact `(state, symbol)` entry takes precedence; otherwise the `(state, wildcard)`
    /// entry is used if present.
    pub fn get(&self, state: &str, symbol: char) -> Option<&Transition> {
        let transitions = self.rules.get(state)?;
        transitions
            .get(&symbol)
            .or_else(|| transitions.get(&self.wildcard))
    }

    /// Returns the state the machine starts in: the origin state of the first rule.
    pub fn initial_state(&self) -> &str {
        &self.initial_state
    }

    /// Returns the set of states that halt execution.
    pub fn final_states(&self) -> &HashSet<String> {
        &self.final_states
    }

    /// Checks whether `state` halts execution.
    pub fn is_final(&self, state: &str) -> bool {
        self.final_states.contains(state)
    }

    /// Returns the blank symbol.
    pub fn blank(&self) -> char {
        self.blank
    }

    /// Returns the wildcard symbol.
    pub fn wildcard(&self) -> char {
        self.wildcard
    }

    /// Returns the number of distinct `(state, symbol)` rules.
    pub fn len(&self) -> usize {
        self.rule_count
    }

    /// Returns `true` if the table holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rule_count == 0
    }

    /// Returns the definitions that replaced an earlier rule for the same key.
    pub fn duplicates(&self) -> &[Duplicate] {
        &self.duplicates
    }

    /// Counts the distinct state names used as origin or destination of any rule.
    pub fn state_count(&self) -> usize {
        self.states().len()
    }

    /// Returns the distinct state names used as origin or destination of any rule, sorted.
    pub fn states(&self) -> BTreeSet<&str> {
        self.rules
            .iter()
            .flat_map(|(state, transitions)| {
                std::iter::once(state.as_str())
                    .chain(transitions.values().map(|t| t.next_state.as_str()))
            })
            .collect()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self {
            blank: DEFAULT_BLANK_SYMBOL,
            wildcard: DEFAULT_WILDCARD_SYMBOL,
            mode: Mode::default(),
            final_states: HashSet::new(),
            final_when: None,
        }
    }
}

impl fmt::Debug for TableBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableBuilder")
            .field("blank", &self.blank)
            .field("wildcard", &self.wildcard)
            .field("mode", &self.mode)
            .field("final_states", &self.final_states)
            .field("final_when", &self.final_when.is_some())
            .finish()
    }
}

impl TableBuilder {
    /// Set the blank symbol (default: `B`).
    pub fn blank(mut self, blank: char) -> Self {
        self.blank = blank;
        self
    }

    /// Set the wildcard symbol (default: `*`).
    pub fn wildcard(mut self, wildcard: char) -> Self {
        self.wildcard = wildcard;
        self
    }

    /// Set the duplicate-definition policy (default: [`Mode::Normal`]).
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Add a state name to the final-state set.
    pub fn final_state(mut self, state: impl Into<String>) -> Self {
        self.final_states.insert(state.into());
        self
    }

    /// Treat every `next_state` accepted by `predicate` as a final state.
    pub fn final_when(mut self, predicate: impl Fn(&str) -> bool + 'static) -> Self {
        self.final_when = Some(Box::new(predicate));
        self
    }

    /// Parses `program` and builds the table.
    ///
    /// # Returns
    ///
    /// * `Ok(TransitionTable)` if every line is well formed.
    /// * `Err(TuringMachineError::EmptyProgram)` if the program has no rule lines.
    /// * `Err(TuringMachineError::DuplicateTransition)` for a repeated key in strict mode.
    /// * Any error from [`crate::parser::parse`]. No partial table is produced.
    pub fn build(self, program: &str) -> Result<TransitionTable, TuringMachineError> {
        let parsed = parse(program)?;

        let initial_state = parsed
            .first()
            .map(|rule| rule.state.clone())
            .ok_or(TuringMachineError::EmptyProgram)?;

        let mut rules: HashMap<String, HashMap<char, Transition>> = HashMap::new();
        let mut final_states = self.final_states;
        let mut duplicates = Vec::new();
        let mut rule_count = 0;

        for rule in parsed {
            if let Some(predicate) = &self.final_when {
                if predicate(&rule.transition.next_state) {
                    final_states.insert(rule.transition.next_state.clone());
                }
            }

            let previous = rules
                .entry(rule.state.clone())
                .or_default()
                .insert(rule.symbol, rule.transition);

            if previous.is_none() {
                rule_count += 1;
                continue;
            }

            match self.mode {
                Mode::Normal => duplicates.push(Duplicate {
                    line: rule.line,
                    state: rule.state,
                    symbol: rule.symbol,
                }),
                Mode::Strict => {
                    return Err(TuringMachineError::DuplicateTransition {
                        line: rule.line,
                        state: rule.state,
                        symbol: rule.symbol,
                    })
                }
            }
        }

        Ok(TransitionTable {
            rules,
            initial_state,
            final_states,
            blank: self.blank,
            wildcard: self.wildcard,
            rule_count,
            duplicates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    const INCREMENT: &str = "start 1 1 r start\nstart B 1 r halt\n";

    #[test]
    fn test_build_simple_table() {
        let table = TransitionTable::builder()
            .final_state("halt")
            .build(INCREMENT)
            .unwrap();

        assert_eq!(table.initial_state(), "start");
        assert!(table.is_final("halt"));
        assert!(!table.is_final("start"));
        assert_eq!(table.len(), 2);
        assert_eq!(table.blank(), 'B');
        assert_eq!(table.wildcard(), '*');
        assert_eq!(
            table.get("start", 'B'),
            Some(&Transition {
                write: '1',
                direction: Direction::Right,
                next_state: "halt".into(),
            })
        );
    }

    #[test]
    fn test_initial_state_is_first_rule() {
        let table = TransitionTable::build("; header\n\nb x x R a\na x x R b\n").unwrap();
        assert_eq!(table.initial_state(), "b");
    }

    #[test]
    fn test_final_predicate_only_sees_next_states() {
        let program = "halt_early x x R q1\nq1 x x R halt_done\nq1 y y R accept\n";
        let table = TransitionTable::builder()
            .final_when(|state| state.starts_with("halt"))
            .build(program)
            .unwrap();

        let mut finals: Vec<&String> = table.final_states().iter().collect();
        finals.sort();
        assert_eq!(finals, vec!["halt_done"]);
    }

    #[test]
    fn test_explicit_final_states_are_kept() {
        let table = TransitionTable::builder()
            .final_state("accept")
            .final_state("reject")
            .build("q0 a a R accept\n")
            .unwrap();

        assert!(table.is_final("accept"));
        assert!(table.is_final("reject"));
    }

    #[test]
    fn test_no_final_states_by_default() {
        let table = TransitionTable::build(INCREMENT).unwrap();
        assert!(table.final_states().is_empty());
    }

    #[test]
    fn test_wildcard_fallback() {
        let table = TransitionTable::build("s 1 0 R s\ns * * L t\n").unwrap();

        assert_eq!(table.get("s", '1').unwrap().write, '0');
        assert_eq!(table.get("s", 'x').unwrap().next_state, "t");
        assert!(table.get("t", '1').is_none());
    }

    #[test]
    fn test_custom_wildcard() {
        let table = TransitionTable::builder()
            .wildcard('?')
            .blank('_')
            .build("s ? ? R s\ns * 1 R t\n")
            .unwrap();

        assert_eq!(table.get("s", '*').unwrap().next_state, "t");
        assert_eq!(table.get("s", 'z').unwrap().next_state, "s");
        assert_eq!(table.blank(), '_');
    }

    #[test]
    fn test_duplicate_last_definition_wins() {
        let program = "s a b R t\ns a c L u\n";
        let table = TransitionTable::build(program).unwrap();

        let rule = table.get("s", 'a').unwrap();
        assert_eq!(rule.write, 'c');
        assert_eq!(rule.next_state, "u");
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.duplicates(),
            &[Duplicate {
                line: 2,
                state: "s".into(),
                symbol: 'a',
            }]
        );
    }

    #[test]
    fn test_duplicate_rejected_in_strict_mode() {
        let program = "s a b R t\ns b b R t\ns a c L u\n";
        let error = TransitionTable::builder()
            .mode(Mode::Strict)
            .build(program)
            .unwrap_err();

        assert_eq!(
            error,
            TuringMachineError::DuplicateTransition {
                line: 3,
                state: "s".into(),
                symbol: 'a',
            }
        );
    }

    #[test]
    fn test_empty_program() {
        assert_eq!(
            TransitionTable::build("; only a comment\n"),
            Err(TuringMachineError::EmptyProgram)
        );
    }

    #[test]
    fn test_malformed_line_produces_no_table() {
        let result = TransitionTable::build("s a b R t\ns a b R\n");
        assert!(matches!(
            result,
            Err(TuringMachineError::MalformedLine { line: 2, .. })
        ));
    }

    #[test]
    fn test_state_count() {
        let table = TransitionTable::build("a x x R b\nb x x R c\nb y y R a\nc x x R halt\n")
            .unwrap();

        assert_eq!(table.state_count(), 4);
        assert_eq!(
            table.states().into_iter().collect::<Vec<_>>(),
            vec!["a", "b", "c", "halt"]
        );
    }
}
