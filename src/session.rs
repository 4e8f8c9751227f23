// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Observation sessions
//!
//! A [`Session`] ties an [`Annotator`], a trace [`Recorder`] and a CPI
//! [`Ledger`] to one host [`Program`] and drives all of them from
//! instruction fetch events. It is the single caller-facing assembly of the
//! crate; host integrations invoke [`observe_fetch`][Session::observe_fetch]
//! once per fetch notification, strictly sequentially.
//!
//! A session is an ordinary single-writer value: all mutating operations
//! take `&mut self`, so concurrent producers have to serialize access
//! through a mutex of their choosing. None of the operations block or
//! suspend; only the CSV exports perform I/O, in their final write.
//!
//! # Example
//!
//! ```
//! use mips_dptrace::instruction::BaseFormat;
//! use mips_dptrace::program::{Listing, Statement};
//! use mips_dptrace::session;
//!
//! let program = Listing::new(vec![Statement {
//!     address: 0x0040_0000,
//!     word: 0x014b_4820,
//!     mnemonic: "add".into(),
//!     basic: "add $9,$10,$11".into(),
//!     source: "add $t1, $t2, $t3".into(),
//!     base: BaseFormat::R,
//! }]);
//! let mut session = session::builder()
//!     .with_program(program)
//!     .build()
//!     .unwrap();
//!
//! let record = session.observe_fetch(0x0040_0000).unwrap();
//! assert_eq!(record.write.to_string(), "01001");
//! assert_eq!(session.ledger().frequency("add"), 1);
//! ```

use std::io;

use thiserror::Error;

use crate::annotate::{Annotated, Annotator};
use crate::ledger::{self, Ledger, Snapshot};
use crate::program::{Program, Statement};
use crate::report;
use crate::signal;
use crate::trace::Recorder;

/// Create a new session [`Builder`]
pub fn builder<P>() -> Builder<P> {
    Builder::new()
}

/// Builder for [`Session`]s
///
/// A session needs a [`Program`] and a signal table. The table defaults to
/// the [builtin][signal::Table::builtin] one; pass a custom table through
/// [`with_signals`][Self::with_signals] after loading it, so that a
/// malformed resource surfaces before any instruction is annotated.
pub struct Builder<P> {
    program: Option<P>,
    table: Option<signal::Table>,
}

impl<P> Builder<P> {
    pub fn new() -> Self {
        Self {
            program: None,
            table: None,
        }
    }

    /// Use the given program for statement lookups
    pub fn with_program(self, program: P) -> Self {
        Self {
            program: Some(program),
            ..self
        }
    }

    /// Use the given signal table instead of the builtin one
    pub fn with_signals(self, table: signal::Table) -> Self {
        Self {
            table: Some(table),
            ..self
        }
    }

    /// Build the session
    pub fn build(self) -> Result<Session<P>, BuildError>
    where
        P: Program,
    {
        let program = self.program.ok_or(BuildError::NoProgram)?;
        let table = self.table.unwrap_or_else(signal::Table::builtin);
        Ok(Session {
            program,
            annotator: Annotator::new(table),
            recorder: Recorder::new(),
            ledger: Ledger::new(),
            last_address: None,
        })
    }
}

impl<P> Default for Builder<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// One instruction observation session
///
/// Created at the start of a host run, [`reset`][Self::reset] on explicit
/// user request and dropped at the end of the run.
pub struct Session<P> {
    program: P,
    annotator: Annotator,
    recorder: Recorder,
    ledger: Ledger,
    last_address: Option<u32>,
}

impl<P: Program> Session<P> {
    /// Process one instruction fetch at the given address
    ///
    /// A fetch of the same address as the immediately preceding event is a
    /// re-observation and is skipped, as is an address without a statement.
    /// A failing statement lookup drops the event, leaving trace and ledger
    /// untouched, and processing continues with the next fetch.
    pub fn observe_fetch(&mut self, address: u32) -> Option<&Annotated> {
        if self.last_address == Some(address) {
            return None;
        }
        self.last_address = Some(address);

        let stmt = match self.program.statement(address) {
            Ok(Some(stmt)) => stmt,
            Ok(None) => return None,
            Err(err) => {
                log::warn!("dropping observation at {address:#010x}: {err}");
                return None;
            }
        };
        Some(self.observe(&stmt))
    }

    /// Record one executed statement
    ///
    /// This is the synchronous per-event entry point: the statement is
    /// annotated, appended to the trace and fed to the ledger. Callers
    /// invoking it directly bypass the re-observation suppression of
    /// [`observe_fetch`][Self::observe_fetch] and are responsible for it
    /// themselves.
    pub fn observe(&mut self, stmt: &Statement) -> &Annotated {
        let record = self.annotator.annotate(stmt);
        self.ledger.observe(&stmt.mnemonic, record.format);
        self.recorder.append(record)
    }

    /// Change the cycle cost of a mnemonic
    pub fn set_cpi(&mut self, mnemonic: &str, cpi: f64) -> Result<(), ledger::Error> {
        self.ledger.set_cpi(mnemonic, cpi)
    }

    /// Restrict counting to the given mnemonics
    ///
    /// Every entry is validated against the program's mnemonic universe
    /// first. On the first unknown entry the update is aborted as a whole
    /// and the previous filter stays in effect.
    pub fn set_filter(
        &mut self,
        mnemonics: impl IntoIterator<Item = String>,
    ) -> Result<(), FilterError> {
        let mnemonics: Vec<String> = mnemonics.into_iter().collect();
        let universe = self.program.mnemonics();
        for mnemonic in &mnemonics {
            if !universe.iter().any(|known| known == mnemonic) {
                return Err(FilterError::UnknownMnemonic(mnemonic.clone()));
            }
        }
        self.ledger.set_filter(mnemonics);
        Ok(())
    }

    /// Restrict counting to a comma separated mnemonic list
    ///
    /// Accepts the forms `add,sub,jal` and `{add,sub,jal}`; whitespace
    /// around entries is ignored.
    pub fn set_filter_list(&mut self, list: &str) -> Result<(), FilterError> {
        let list = list.trim().trim_start_matches('{').trim_end_matches('}');
        self.set_filter(
            list.split(',')
                .map(|entry| entry.trim().to_string())
                .filter(|entry| !entry.is_empty()),
        )
    }

    /// Count every mnemonic again
    pub fn clear_filter(&mut self) {
        self.ledger.clear_filter();
    }

    /// Forget everything observed so far
    ///
    /// Clears the trace, the ledger including cost overrides and filter,
    /// and the re-observation suppression state.
    pub fn reset(&mut self) {
        self.recorder.reset();
        self.ledger.reset();
        self.last_address = None;
    }

    /// Current cycle attribution
    pub fn snapshot(&self) -> Snapshot {
        self.ledger.snapshot()
    }

    /// Human readable execution statistics
    pub fn stats_text(&self) -> String {
        self.ledger.to_string()
    }

    /// Human readable per-instruction analysis, in observation order
    pub fn trace_text(&self) -> String {
        self.recorder.to_string()
    }

    /// Write the ledger's cycle attribution as CSV
    pub fn export_cpi(&self, destination: impl io::Write) -> io::Result<()> {
        report::write_cpi_csv(&self.ledger, destination)
    }

    /// Write the recorded trace as CSV
    pub fn export_trace(&self, destination: impl io::Write) -> io::Result<()> {
        report::write_trace_csv(&self.recorder, destination)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    pub fn program(&self) -> &P {
        &self.program
    }
}

/// Session construction errors
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// No program was supplied
    #[error("no program supplied")]
    NoProgram,
}

/// Filter update errors
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    /// An entry is not a known mnemonic; the filter was left unchanged
    #[error("invalid instruction `{0}`")]
    UnknownMnemonic(String),
}
