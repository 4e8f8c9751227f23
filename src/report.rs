// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Tabular rendering of ledger and trace state
//!
//! Both serializers are pure with respect to the state they render: the
//! whole output is formatted into memory first and the destination is only
//! touched by one final write, so an I/O failure can only occur at that
//! point and never leaves formatting half done.
//!
//! An empty ledger or trace serializes to exactly the header row.


use std::io;

use crate::ledger::Ledger;
use crate::signal;
use crate::trace::Recorder;

/// The control signal columns of the trace CSV, in column order
pub const TRACE_SIGNALS: [&str; 9] = [
    "RegDst", "Branch", "MemRead", "MemtoReg", "ALUOp0", "ALUOp1", "MemWrite", "ALUSrc", "RegWrite",
];

const CPI_HEADER: &str = "Instruction Type,CPI,Frequency,CPI * Frequency,Usage Percentage";

const TRACE_HEADER: &str = "Instruction Type,Source,Basic,\
                            Read Register 1,Read Register 2,Write Register,\
                            RegDst,Branch,MemRead,MemtoReg,ALUOp0,ALUOp1,MemWrite,ALUSrc,RegWrite";

/// Write the ledger's cycle attribution as CSV
///
/// One row per counted mnemonic, numeric columns with three decimal places
/// and the usage share rendered as a percentage.
pub fn write_cpi_csv(ledger: &Ledger, mut destination: impl io::Write) -> io::Result<()> {
    let mut out = String::from(CPI_HEADER);
    out.push('\n');
    for row in ledger.snapshot().rows {
        out.push_str(&format!(
            "{},{:.3},{},{:.3},{:.3}%\n",
            row.mnemonic,
            row.cpi,
            row.frequency,
            row.total_cycles,
            row.usage * 100.0,
        ));
    }
    destination.write_all(out.as_bytes())?;
    destination.flush()
}

/// Write the recorded trace as CSV
///
/// One row per recorded instruction: the format label, the quoted text and
/// register fields and the nine [`TRACE_SIGNALS`] in column order. Signals
/// missing from the session's table render as don't-care.
pub fn write_trace_csv(recorder: &Recorder, mut destination: impl io::Write) -> io::Result<()> {
    let mut out = String::from(TRACE_HEADER);
    out.push('\n');
    for record in recorder.records() {
        out.push_str(&format!(
            "{},{},{},{},{},{}",
            record.format,
            quoted(&record.source),
            quoted(&record.basic),
            quoted(&record.read1.to_string()),
            quoted(&record.read2.to_string()),
            quoted(&record.write.to_string()),
        ));
        for name in TRACE_SIGNALS {
            let value = record.signal(name).cloned().unwrap_or(signal::Value::DontCare);
            out.push_str(&format!(",{value}"));
        }
        out.push('\n');
    }
    destination.write_all(out.as_bytes())?;
    destination.flush()
}

/// Quote a text field for CSV
fn quoted(field: &str) -> String {
    format!("\"{field}\"")
}
