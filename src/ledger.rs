// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Per-mnemonic cycle accounting
//!
//! A [`Ledger`] consumes a stream of mnemonic observations and keeps, per
//! mnemonic, a frequency count and an editable cycles-per-instruction cost.
//! Cycle totals and usage shares are never stored; they are derived when a
//! [`Snapshot`] is computed, so a cost edit is retroactive for all cycles
//! already attributed to its mnemonic.
//!
//! An optional filter restricts counting to a fixed mnemonic set. Changing
//! the filter never touches frequencies that were already recorded.


use core::fmt;

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::instruction::Format;

/// Default cycles-per-instruction cost
pub const DEFAULT_CPI: f64 = 1.0;

/// Coarse per-format execution counters
///
/// The I counter aggregates everything of the I family, including loads,
/// stores and branches.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Tallies {
    pub total: u64,
    pub r: u64,
    pub i: u64,
    pub j: u64,
}

#[derive(Clone, Debug)]
struct Entry {
    frequency: u64,
    cpi: f64,
}

impl Default for Entry {
    fn default() -> Self {
        Self {
            frequency: 0,
            cpi: DEFAULT_CPI,
        }
    }
}

/// Frequency and cycle cost bookkeeping for observed mnemonics
#[derive(Clone, Debug, Default)]
pub struct Ledger {
    entries: BTreeMap<String, Entry>,
    tallies: Tallies,
    filter: BTreeSet<String>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one executed instruction
    ///
    /// Returns `false` if a non-empty filter excludes the mnemonic, in
    /// which case neither the frequency nor the tallies change.
    pub fn observe(&mut self, mnemonic: &str, format: Format) -> bool {
        if !self.filter.is_empty() && !self.filter.contains(mnemonic) {
            log::debug!("not counting filtered mnemonic `{mnemonic}`");
            return false;
        }

        self.entries
            .entry(mnemonic.to_string())
            .or_default()
            .frequency += 1;
        self.tallies.total += 1;
        match format {
            Format::R => self.tallies.r += 1,
            Format::J => self.tallies.j += 1,
            _ => self.tallies.i += 1,
        }
        true
    }

    /// Change the cycle cost of a mnemonic
    ///
    /// The cost applies to all cycles attributed to the mnemonic, including
    /// observations that were recorded before the change: costs are
    /// multiplied in at snapshot time, not at observation time.
    pub fn set_cpi(&mut self, mnemonic: &str, cpi: f64) -> Result<(), Error> {
        if !cpi.is_finite() || cpi < 0.0 {
            return Err(Error::InvalidCpi(cpi));
        }
        self.entries.entry(mnemonic.to_string()).or_default().cpi = cpi;
        Ok(())
    }

    /// Current cycle cost of a mnemonic
    pub fn cpi(&self, mnemonic: &str) -> f64 {
        self.entries
            .get(mnemonic)
            .map(|entry| entry.cpi)
            .unwrap_or(DEFAULT_CPI)
    }

    /// Times the mnemonic was observed and counted
    pub fn frequency(&self, mnemonic: &str) -> u64 {
        self.entries
            .get(mnemonic)
            .map(|entry| entry.frequency)
            .unwrap_or(0)
    }

    /// Counted frequencies of all observed mnemonics, lexically ordered
    pub fn frequencies(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.frequency > 0)
            .map(|(mnemonic, entry)| (mnemonic.as_str(), entry.frequency))
    }

    /// The per-format execution counters
    pub fn tallies(&self) -> Tallies {
        self.tallies
    }

    /// Restrict counting to the given mnemonics
    pub fn set_filter(&mut self, mnemonics: impl IntoIterator<Item = String>) {
        self.filter = mnemonics.into_iter().collect();
    }

    /// Count every mnemonic again
    pub fn clear_filter(&mut self) {
        self.filter.clear();
    }

    /// The mnemonics counting is currently restricted to
    pub fn filter(&self) -> impl Iterator<Item = &str> {
        self.filter.iter().map(String::as_str)
    }

    /// Compute the current cycle attribution
    ///
    /// Mnemonics that were never counted are omitted. Rows are ordered
    /// lexically by mnemonic. With no cycles recorded at all, every usage
    /// share is reported as zero.
    pub fn snapshot(&self) -> Snapshot {
        let mut rows: Vec<Row> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.frequency > 0)
            .map(|(mnemonic, entry)| Row {
                mnemonic: mnemonic.clone(),
                frequency: entry.frequency,
                cpi: entry.cpi,
                total_cycles: entry.frequency as f64 * entry.cpi,
                usage: 0.0,
            })
            .collect();
        let total_cycles: f64 = rows.iter().map(|row| row.total_cycles).sum();
        if total_cycles > 0.0 {
            for row in &mut rows {
                row.usage = row.total_cycles / total_cycles;
            }
        }
        Snapshot { rows, total_cycles }
    }

    /// Forget all observations, cost overrides and the filter
    pub fn reset(&mut self) {
        self.entries.clear();
        self.tallies = Tallies::default();
        self.filter.clear();
    }
}

/// Renders the execution statistics as human readable text
impl fmt::Display for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total instructions executed: {}", self.tallies.total)?;
        writeln!(f, "R-type instructions executed: {}", self.tallies.r)?;
        writeln!(f, "I-type instructions executed: {}", self.tallies.i)?;
        writeln!(f, "J-type instructions executed: {}", self.tallies.j)?;
        writeln!(f, "Metrics by instruction:")?;
        self.frequencies()
            .try_for_each(|(mnemonic, frequency)| writeln!(f, "{mnemonic}: {frequency}"))
    }
}

/// One [`Snapshot`] row
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub mnemonic: String,
    pub frequency: u64,
    pub cpi: f64,
    /// Frequency multiplied by the current cost
    pub total_cycles: f64,
    /// Share of this row in the snapshot's grand total, in `0.0..=1.0`
    pub usage: f64,
}

/// Cycle attribution derived from a [`Ledger`] at one point in time
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub rows: Vec<Row>,
    pub total_cycles: f64,
}

/// Ledger input errors
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    /// Cycle costs must be finite and non-negative
    #[error("invalid CPI value {0}")]
    InvalidCpi(f64),
}
