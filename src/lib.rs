// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0

//! # Datapath signal tracing and CPI accounting for MIPS instruction streams
//!
//! This crate classifies and measures MIPS instructions that a host
//! simulator has already executed. It does not execute anything itself: the
//! host feeds it one "instruction fetched at address" event at a time and
//! supplies the assembled [`Statement`][program::Statement] at each address.
//!
//! For every observed instruction the crate decodes the raw 32bit word into
//! its [fields][instruction::Fields], classifies its structural
//! [format][instruction::Format] and resolves the control unit
//! [signals][signal] a single-cycle datapath would assert, appending the
//! [annotated record][annotate::Annotated] to an execution
//! [trace][trace::Recorder]. Independently, a cycle [ledger] tracks the
//! frequency of every mnemonic together with an editable CPI cost and
//! derives cycle totals and usage shares on demand. Both views render to
//! human readable text and export as CSV (see [report]).
//!
//! Timing is a per-mnemonic scalar multiplied by frequency; pipelined or
//! multi-cycle behavior is out of scope.
//!
//! # Example
//!
//! ```
//! use mips_dptrace::instruction::BaseFormat;
//! use mips_dptrace::program::{Listing, Statement};
//! use mips_dptrace::session;
//!
//! let program = Listing::new(vec![
//!     Statement {
//!         address: 0x0040_0000,
//!         word: 0x014b_4820,
//!         mnemonic: "add".into(),
//!         basic: "add $9,$10,$11".into(),
//!         source: "add $t1, $t2, $t3".into(),
//!         base: BaseFormat::R,
//!     },
//!     Statement {
//!         address: 0x0040_0004,
//!         word: 0x8fa8_0004,
//!         mnemonic: "lw".into(),
//!         basic: "lw $8,4($29)".into(),
//!         source: "lw $t0, 4($sp)".into(),
//!         base: BaseFormat::I,
//!     },
//! ]);
//!
//! let mut session = session::builder()
//!     .with_program(program)
//!     .build()
//!     .unwrap();
//!
//! for address in [0x0040_0000, 0x0040_0004, 0x0040_0004] {
//!     session.observe_fetch(address);
//! }
//!
//! // the re-observation of the second address was suppressed
//! assert_eq!(session.recorder().len(), 2);
//! assert_eq!(session.ledger().tallies().total, 2);
//!
//! let mut csv = Vec::new();
//! session.export_cpi(&mut csv).unwrap();
//! ```

pub mod annotate;
pub mod instruction;
pub mod ledger;
pub mod program;
pub mod report;
pub mod session;
pub mod signal;
pub mod trace;

#[cfg(test)]
mod tests;

pub use annotate::Annotated;
pub use instruction::Format;
pub use session::Session;
