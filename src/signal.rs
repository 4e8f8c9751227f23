// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Control unit signal tables
//!
//! A signal table is a declarative JSON resource: an array of rows, each
//! carrying a signal name and one value per instruction [`Format`]. A value
//! is either a literal signal level or the explicit don't-care marker for
//! formats where the signal has no meaning.
//!
//! Tables are loaded once and never mutated afterwards. Loading fails as a
//! whole on a malformed resource; there is no partially usable table. The
//! crate ships a [builtin][Table::builtin] table with the nine classic
//! single-cycle control signals plus a `Jump` signal.

#[cfg(test)]
mod tests;

use std::io;

use core::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::instruction::Format;

/// The signal table resource bundled with the crate
const BUILTIN: &str = include_str!("../data/signals.json");

/// A single control signal value
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Value {
    /// Signal level as declared in the table resource
    Level(String),
    /// The signal is not meaningful for the format
    DontCare,
}

/// The levels `x` and `X` denote the don't-care marker
impl From<String> for Value {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "x" | "X" => Self::DontCare,
            _ => Self::Level(raw),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Level(level) => f.write_str(level),
            Self::DontCare => f.write_str("x"),
        }
    }
}

/// A named signal with one [`Value`] per instruction format
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Row {
    pub name: String,
    #[serde(rename = "RType")]
    pub r_type: Value,
    #[serde(rename = "IType")]
    pub i_type: Value,
    #[serde(rename = "JType")]
    pub j_type: Value,
    #[serde(rename = "Branch")]
    pub branch: Value,
    #[serde(rename = "Load")]
    pub load: Value,
    #[serde(rename = "Store")]
    pub store: Value,
}

impl Row {
    /// Retrieve the value this signal takes for the given format
    pub fn value(&self, format: Format) -> &Value {
        match format {
            Format::R => &self.r_type,
            Format::I => &self.i_type,
            Format::Branch => &self.branch,
            Format::Load => &self.load,
            Format::Store => &self.store,
            Format::J => &self.j_type,
        }
    }
}

/// A fully loaded control signal table
///
/// Row order is the declaration order of the resource and is preserved by
/// every consumer of the table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    /// Load a table from a JSON file
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, Error> {
        Self::from_reader(std::fs::File::open(path)?)
    }

    /// Load a table from a JSON resource
    pub fn from_reader(reader: impl io::Read) -> Result<Self, Error> {
        Self::from_rows(serde_json::from_reader(reader)?)
    }

    /// Load a table from JSON text
    pub fn parse(json: &str) -> Result<Self, Error> {
        Self::from_rows(serde_json::from_str(json)?)
    }

    /// Construct a table from already deserialized rows
    ///
    /// A resource declaring the same signal name twice is inconsistent and
    /// is rejected rather than merged.
    pub fn from_rows(rows: Vec<Row>) -> Result<Self, Error> {
        for (checked, row) in rows.iter().enumerate() {
            if rows[..checked].iter().any(|r| r.name == row.name) {
                return Err(Error::DuplicateSignal(row.name.clone()));
            }
        }
        Ok(Self { rows })
    }

    /// The signal table bundled with the crate
    pub fn builtin() -> Self {
        // the bundled resource is covered by a unit test
        Self::parse(BUILTIN).expect("bundled signal table is well-formed")
    }

    /// Look up a signal value by name and instruction format
    pub fn lookup(&self, name: &str, format: Format) -> Option<&Value> {
        self.rows
            .iter()
            .find(|row| row.name == name)
            .map(|row| row.value(format))
    }

    /// All rows in declaration order
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Number of signals in the table
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Signal table loading errors
///
/// Any of these leaves the caller without a usable table; instructions must
/// not be annotated until a load succeeds.
#[derive(Debug, Error)]
pub enum Error {
    /// The table resource could not be read
    #[error("cannot read signal table")]
    Io(#[from] io::Error),
    /// The table resource is not a valid signal table
    #[error("malformed signal table")]
    Parse(#[from] serde_json::Error),
    /// A signal name is declared more than once
    #[error("duplicate signal `{0}` in table")]
    DuplicateSignal(String),
}
