// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Datapath annotation of executed instructions
//!
//! The [`Annotator`] turns one host [`Statement`] into one [`Annotated`]
//! record: it decodes the word's [`Fields`], classifies its [`Format`] and
//! resolves every signal of its [table][crate::signal::Table] for that
//! format, in table declaration order.
//!
//! Register slot substitution happens here as well. Branches and stores do
//! not write back and report the [`RegField::None`] sentinel in the write
//! slot; jumps additionally report it for both read slots. Downstream
//! rendering needs no format-specific logic because of this.


use core::fmt;

use crate::instruction::{Fields, Format, Register};
use crate::program::Statement;
use crate::signal;

/// A register slot of the datapath's register file
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RegField {
    /// A register designator
    Reg(Register),
    /// No register is wired to this slot
    None,
}

/// Renders the designator as five bits, or `XXXXX` for the empty slot
impl fmt::Display for RegField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reg(reg) => write!(f, "{reg:05b}"),
            Self::None => f.write_str("XXXXX"),
        }
    }
}

/// A single executed instruction with decoded fields and resolved signals
///
/// Created once per observed instruction and never mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotated {
    /// Structural format
    pub format: Format,
    /// Source line the instruction was assembled from
    pub source: String,
    /// Printable basic assembly statement
    pub basic: String,
    /// The executed 32bit word
    pub word: u32,
    /// Raw field partition of the word
    pub fields: Fields,
    /// First read register slot
    pub read1: RegField,
    /// Second read register slot
    pub read2: RegField,
    /// Write register slot
    pub write: RegField,
    signals: Vec<(String, signal::Value)>,
}

impl Annotated {
    /// Resolved value of a single named control signal
    pub fn signal(&self, name: &str) -> Option<&signal::Value> {
        self.signals
            .iter()
            .find(|(signal, _)| signal == name)
            .map(|(_, value)| value)
    }

    /// Resolved control signals in table declaration order
    pub fn signals(&self) -> impl Iterator<Item = (&str, &signal::Value)> {
        self.signals.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// The executed word as 32 characters of binary text
    pub fn code_text(&self) -> String {
        format!("{:032b}", self.word)
    }
}

/// Renders the analysis block shown for one instruction in the trace text
impl fmt::Display for Annotated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.format)?;
        writeln!(f, "-------Basic Instruction Info-------")?;
        writeln!(f, "Source: {}", self.source)?;
        writeln!(f, "Compiled assembly: {}", self.basic)?;
        writeln!(f, "Instruction code: {}", self.code_text())?;
        match self.format {
            Format::R => {
                writeln!(f, "-------R-Type Instruction Analysis-------")?;
                writeln!(f, "opcode: {:06b}", self.fields.opcode)?;
                writeln!(f, "rs: {:05b}", self.fields.rs)?;
                writeln!(f, "rt: {:05b}", self.fields.rt)?;
                writeln!(f, "rd: {:05b}", self.fields.rd)?;
                writeln!(f, "shamt: {:05b}", self.fields.shamt)?;
                writeln!(f, "funct: {:06b}", self.fields.funct)?;
            }
            Format::J => {
                writeln!(f, "-------J-Type Instruction Analysis-------")?;
                writeln!(f, "opcode: {:06b}", self.fields.opcode)?;
                writeln!(f, "address: {:026b}", self.fields.target)?;
            }
            _ => {
                writeln!(f, "-------I-Type Instruction Analysis-------")?;
                writeln!(f, "opcode: {:06b}", self.fields.opcode)?;
                writeln!(f, "rs: {:05b}", self.fields.rs)?;
                writeln!(f, "rt: {:05b}", self.fields.rt)?;
                writeln!(f, "Immediate: {:016b}", self.fields.immediate)?;
            }
        }
        writeln!(f, "-------Register File analytics-------")?;
        writeln!(f, "RegRead 1: {}", self.read1)?;
        writeln!(f, "RegRead 2: {}", self.read2)?;
        writeln!(f, "RegWrite: {}", self.write)?;
        writeln!(f, "-------Control Unit Signals-------")?;
        self.signals()
            .try_for_each(|(name, value)| writeln!(f, "{name}: {value}"))
    }
}

/// Produces [`Annotated`] records from host statements
///
/// An annotator owns a fully loaded signal table; it cannot exist without
/// one.
#[derive(Clone, Debug)]
pub struct Annotator {
    table: signal::Table,
}

impl Annotator {
    pub fn new(table: signal::Table) -> Self {
        Self { table }
    }

    /// The signal table this annotator resolves against
    pub fn table(&self) -> &signal::Table {
        &self.table
    }

    /// Annotate one executed statement
    pub fn annotate(&self, stmt: &Statement) -> Annotated {
        let fields = Fields::from(stmt.word);
        let format = Format::classify(fields.opcode, stmt.base);

        let (read1, read2) = match format {
            Format::J => (RegField::None, RegField::None),
            _ => (RegField::Reg(fields.rs), RegField::Reg(fields.rt)),
        };
        let write = if format.writes_register() {
            match format {
                Format::R => RegField::Reg(fields.rd),
                _ => RegField::Reg(fields.rt),
            }
        } else {
            RegField::None
        };

        let signals = self
            .table
            .rows()
            .map(|row| (row.name.clone(), row.value(format).clone()))
            .collect();

        Annotated {
            format,
            source: stmt.source.clone(),
            basic: stmt.basic.clone(),
            word: stmt.word,
            fields,
            read1,
            read2,
            write,
            signals,
        }
    }
}
