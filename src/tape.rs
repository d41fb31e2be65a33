//! The unbounded tape of a single-tape machine.
//!
//! Cells live in a `VecDeque` so the tape can grow at either edge in amortized constant
//! time. The head is a signed index: a move off the left edge leaves it at `-1` until the
//! next [`Tape::extend_to_head`] prepends blanks and re-bases it to `0`.

use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: VecDeque<char>,
    head: isize,
    blank: char,
}

impl Tape {
    /// Creates a tape holding `content` with the head at `head`.
    pub fn new(content: &str, head: isize, blank: char) -> Self {
        Self {
            cells: content.chars().collect(),
            head,
            blank,
        }
    }

    /// Materializes blank cells until the head indexes a stored cell.
    ///
    /// Prepending re-bases the head to `0`; previously written symbols keep their
    /// positions relative to each other.
    pub fn extend_to_head(&mut self) {
        if self.head < 0 {
            for _ in 0..self.head.unsigned_abs() {
                self.cells.push_front(self.blank);
            }
            self.head = 0;
        }

        let head = self.head as usize;
        if head >= self.cells.len() {
            self.cells.resize(head + 1, self.blank);
        }
    }

    /// Returns the symbol under the head, blank if that cell is not materialized.
    pub fn read(&self) -> char {
        usize::try_from(self.head)
            .ok()
            .and_then(|i| self.cells.get(i).copied())
            .unwrap_or(self.blank)
    }

    /// Writes `symbol` under the head, extending the tape first if needed.
    pub fn write(&mut self, symbol: char) {
        self.extend_to_head();
        self.cells[self.head as usize] = symbol;
    }

    /// Moves the head by `offset` cells without materializing anything.
    pub fn shift(&mut self, offset: isize) {
        self.head += offset;
    }

    /// Returns the head index, which may lie outside the materialized cells.
    pub fn head(&self) -> isize {
        self.head
    }

    /// Returns the blank symbol.
    pub fn blank(&self) -> char {
        self.blank
    }

    /// Returns the number of materialized cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if no cell has been materialized.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the materialized cells, left to right.
    pub fn cells(&self) -> Vec<char> {
        self.cells.iter().copied().collect()
    }

    /// Returns the tape as a string with leading and trailing blanks removed.
    /// Interior blanks are kept.
    pub fn content(&self) -> String {
        let text: String = self.cells.iter().collect();
        text.trim_matches(self.blank).to_string()
    }
}
