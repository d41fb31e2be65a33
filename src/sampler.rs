//! Step-count sampling over operand bit widths.
//!
//! For a pair of bit widths `(a, b)` the sampler enumerates every operand pair when the
//! search space is small enough, otherwise it draws a fixed number of random pairs. Each
//! pair is encoded with [`encode_operands`] and run on a shared multiplication table;
//! the step counts feed [`Summary`], [`histogram`] and [`Heatmap`].
//!
//! Random draws use a ChaCha8 RNG seeded from `seed XOR (a << 32 | b)`, so a given
//! configuration always produces the same samples regardless of thread count.

use crate::encoder::encode_operands;
use crate::machine::TuringMachine;
use crate::table::TransitionTable;
use crate::types::TuringMachineError;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::sync::Arc;
use std::thread;

/// Largest supported operand width.
pub const MAX_BIT_WIDTH: u32 = 63;

/// Runs the multiplication program over sampled operand pairs.
#[derive(Debug, Clone)]
pub struct Sampler {
    table: Arc<TransitionTable>,
    samples: usize,
    seed: u64,
    threads: usize,
    max_steps: Option<usize>,
}

impl Sampler {
    /// Creates a sampler over `table` with 1000 samples, seed 1108, one thread and no
    /// step ceiling.
    pub fn new(table: Arc<TransitionTable>) -> Self {
        Self {
            table,
            samples: 1000,
            seed: 1108,
            threads: 1,
            max_steps: None,
        }
    }

    /// Set the sample budget per bit-width pair (default: 1000).
    pub fn samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    /// Set the RNG seed (default: 1108).
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of worker threads (default: 1). Zero is treated as one.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Abort any run that has not halted after `max_steps` steps (default: unbounded).
    pub fn max_steps(mut self, max_steps: Option<usize>) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Returns the operand pairs for widths `a_bits` and `b_bits`.
    ///
    /// Operands range over `[2^(bits-1), 2^bits)`. When the full cross product holds at
    /// most `samples` pairs it is returned in order; otherwise `samples` random pairs are
    /// drawn.
    pub fn operand_pairs(
        &self,
        a_bits: u32,
        b_bits: u32,
    ) -> Result<Vec<(u64, u64)>, TuringMachineError> {
        let a_range = operand_range(a_bits)?;
        let b_range = operand_range(b_bits)?;

        let space = 1u128 << (a_bits - 1 + b_bits - 1);
        if space <= self.samples as u128 {
            return Ok(a_range
                .clone()
                .flat_map(|a| b_range.clone().map(move |b| (a, b)))
                .collect());
        }

        let stream = ((a_bits as u64) << 32) | b_bits as u64;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed ^ stream);
        Ok((0..self.samples)
            .map(|_| {
                (
                    rng.random_range(a_range.clone()),
                    rng.random_range(b_range.clone()),
                )
            })
            .collect())
    }

    /// Runs one multiplication per operand pair and returns the step counts in pair order.
    pub fn steps_count(&self, a_bits: u32, b_bits: u32) -> Result<Vec<usize>, TuringMachineError> {
        let pairs = self.operand_pairs(a_bits, b_bits)?;
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let chunk_size = pairs.len().div_ceil(self.threads);

        thread::scope(|scope| {
            let workers: Vec<_> = pairs
                .chunks(chunk_size)
                .map(|chunk| scope.spawn(move || self.run_chunk(chunk)))
                .collect();

            let mut steps = Vec::with_capacity(pairs.len());
            for worker in workers {
                let chunk = worker
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))?;
                steps.extend(chunk);
            }
            Ok(steps)
        })
    }

    /// Summarizes the step counts for widths `a_bits` and `b_bits`.
    pub fn summary(&self, a_bits: u32, b_bits: u32) -> Result<Summary, TuringMachineError> {
        Ok(Summary::from_steps(&self.steps_count(a_bits, b_bits)?))
    }

    /// Computes the mean step count for every width pair in `low..=high`.
    pub fn heatmap(&self, low: u32, high: u32) -> Result<Heatmap, TuringMachineError> {
        operand_range(low)?;
        operand_range(high)?;

        let mut rows = Vec::new();
        for b in low..=high {
            let mut row = Vec::new();
            for a in low..=high {
                row.push(Summary::from_steps(&self.steps_count(a, b)?).mean);
            }
            rows.push(row);
        }

        Ok(Heatmap { low, high, rows })
    }

    fn run_chunk(&self, pairs: &[(u64, u64)]) -> Result<Vec<usize>, TuringMachineError> {
        let mut machine = TuringMachine::new(Arc::clone(&self.table));
        pairs
            .iter()
            .map(|&(a, b)| machine.run_with_limit(&encode_operands(a, b), self.max_steps))
            .collect()
    }
}

fn operand_range(bits: u32) -> Result<std::ops::Range<u64>, TuringMachineError> {
    if bits == 0 || bits > MAX_BIT_WIDTH {
        return Err(TuringMachineError::InvalidBitWidth(bits));
    }
    let low = 1u64 << (bits - 1);
    Ok(low..low << 1)
}

/// Basic statistics over a set of step counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub min: usize,
    pub max: usize,
    pub mean: f64,
}

impl Summary {
    /// Summarizes `steps`. An empty slice yields zeros.
    pub fn from_steps(steps: &[usize]) -> Self {
        let count = steps.len();
        let total: u128 = steps.iter().map(|&s| s as u128).sum();
        Self {
            count,
            min: steps.iter().copied().min().unwrap_or(0),
            max: steps.iter().copied().max().unwrap_or(0),
            mean: if count == 0 {
                0.0
            } else {
                total as f64 / count as f64
            },
        }
    }
}

/// One histogram bin covering `[start, end)`; the last bin also includes `end`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Splits `[min, max]` of `steps` into `bins` equal-width bins and counts the members.
pub fn histogram(steps: &[usize], bins: usize) -> Vec<Bin> {
    let (Some(&min), Some(&max)) = (steps.iter().min(), steps.iter().max()) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }

    // A single distinct value gets a unit-wide range, centered on it.
    let (start, end) = if min == max {
        (min as f64 - 0.5, max as f64 + 0.5)
    } else {
        (min as f64, max as f64)
    };
    let width = (end - start) / bins as f64;

    let mut result: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            start: start + width * i as f64,
            end: start + width * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for &step in steps {
        let index = (((step as f64 - start) / width) as usize).min(bins - 1);
        result[index].count += 1;
    }

    result
}

/// Mean step counts indexed by operand widths. `rows[j][i]` holds the mean for
/// `a = low + i` and `b = low + j`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub low: u32,
    pub high: u32,
    pub rows: Vec<Vec<f64>>,
}

impl Heatmap {
    /// Returns the mean for widths `a` and `b`, if they lie in the grid.
    pub fn get(&self, a: u32, b: u32) -> Option<f64> {
        let i = a.checked_sub(self.low)? as usize;
        let j = b.checked_sub(self.low)? as usize;
        self.rows.get(j)?.get(i).copied()
    }

    /// Renders the grid as CSV with a `b\a` header row and one row per `b`.
    pub fn to_csv(&self) -> String {
        let header = std::iter::once("b\\a".to_string())
            .chain((self.low..=self.high).map(|a| a.to_string()))
            .collect::<Vec<_>>()
            .join(",");

        let mut lines = vec![header];
        for (b, row) in (self.low..=self.high).zip(&self.rows) {
            let cells = row.iter().map(|mean| format!("{mean:.2}"));
            lines.push(
                std::iter::once(b.to_string())
                    .chain(cells)
                    .collect::<Vec<_>>()
                    .join(","),
            );
        }

        lines.join("\n")
    }
}
