// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! End-to-end tests driving a whole session

use crate::instruction::BaseFormat;
use crate::ledger::Tallies;
use crate::program::{Listing, Program, Statement};
use crate::session::{self, FilterError, Session};
use crate::signal::{Table, Value};

fn statement(address: u32, word: u32, mnemonic: &str, base: BaseFormat) -> Statement {
    Statement {
        address,
        word,
        mnemonic: mnemonic.to_string(),
        basic: format!("{mnemonic} (basic)"),
        source: format!("{mnemonic} (source)"),
        base,
    }
}

/// A countdown loop followed by a store, a load and a jump
fn program() -> Listing {
    Listing::new(vec![
        statement(0x0040_0000, 0x2008_0005, "addi", BaseFormat::I),
        statement(0x0040_0004, 0x0128_4820, "add", BaseFormat::R),
        statement(0x0040_0008, 0x2108_ffff, "addi", BaseFormat::I),
        statement(0x0040_000c, 0x1500_fffd, "bne", BaseFormat::IBranch),
        statement(0x0040_0010, 0xaf89_0000, "sw", BaseFormat::I),
        statement(0x0040_0014, 0x8f8a_0000, "lw", BaseFormat::I),
        statement(0x0040_0018, 0x0810_0008, "j", BaseFormat::J),
    ])
    .with_mnemonics(["sub".to_string(), "jal".to_string()])
}

fn session() -> Session<Listing> {
    session::builder()
        .with_program(program())
        .build()
        .expect("could not build session")
}

#[test]
fn fetch_stream_is_classified_and_tallied() {
    let mut session = session();

    // one loop iteration, then the tail of the program
    for address in [
        0x0040_0000u32,
        0x0040_0004,
        0x0040_0008,
        0x0040_000c,
        0x0040_0010,
        0x0040_0014,
        0x0040_0018,
    ] {
        assert!(session.observe_fetch(address).is_some());
    }

    assert_eq!(session.recorder().len(), 7);
    assert_eq!(
        session.ledger().tallies(),
        Tallies {
            total: 7,
            r: 1,
            i: 5,
            j: 1,
        },
    );

    let trace = session.recorder().records();
    assert_eq!(trace[0].format, crate::Format::I);
    assert_eq!(trace[1].format, crate::Format::R);
    assert_eq!(trace[3].format, crate::Format::Branch);
    assert_eq!(trace[4].format, crate::Format::Store);
    assert_eq!(trace[5].format, crate::Format::Load);
    assert_eq!(trace[6].format, crate::Format::J);

    let stats = session.stats_text();
    assert!(stats.contains("Total instructions executed: 7\n"));
    assert!(stats.contains("addi: 2\n"));

    let text = session.trace_text();
    assert!(text.contains("I-type LOAD instruction\n"));
    assert!(text.contains("J-type instruction\n"));
}

#[test]
fn re_observations_are_suppressed() {
    let mut session = session();

    assert!(session.observe_fetch(0x0040_0000).is_some());
    // the simulator re-reads the same fetch, e.g. while single-stepping
    assert!(session.observe_fetch(0x0040_0000).is_none());
    assert!(session.observe_fetch(0x0040_0004).is_some());
    // a non-adjacent revisit is a genuine execution
    assert!(session.observe_fetch(0x0040_0000).is_some());

    assert_eq!(session.recorder().len(), 3);
    assert_eq!(session.ledger().frequency("addi"), 2);
}

#[test]
fn unknown_addresses_are_skipped() {
    let mut session = session();

    assert!(session.observe_fetch(0x1000_0000).is_none());
    assert!(session.observe_fetch(0x0040_0000).is_some());
    assert_eq!(session.recorder().len(), 1);
}

struct FaultyBus {
    inner: Listing,
}

impl Program for FaultyBus {
    type Error = String;

    fn statement(&mut self, address: u32) -> Result<Option<Statement>, Self::Error> {
        if address >= 0x7fff_0000 {
            return Err(format!("address out of range: {address:#010x}"));
        }
        Ok(self.inner.statement(address).unwrap_or(None))
    }

    fn mnemonics(&self) -> Vec<String> {
        self.inner.mnemonics()
    }
}

#[test]
fn failing_lookups_drop_the_event() {
    let mut session = session::builder()
        .with_program(FaultyBus { inner: program() })
        .build()
        .expect("could not build session");

    assert!(session.observe_fetch(0x7fff_0000).is_none());
    // the failure is not fatal, observation continues
    assert!(session.observe_fetch(0x0040_0000).is_some());
    assert_eq!(session.recorder().len(), 1);
    assert_eq!(session.ledger().tallies().total, 1);
}

#[test]
fn filter_is_validated_against_the_universe() {
    let mut session = session();
    session.set_filter_list("{add,lw}").unwrap();

    session.observe_fetch(0x0040_0000); // addi, filtered out
    session.observe_fetch(0x0040_0004); // add, counted

    assert_eq!(session.ledger().frequency("addi"), 0);
    assert_eq!(session.ledger().frequency("add"), 1);
    // the trace is not subject to the filter
    assert_eq!(session.recorder().len(), 2);

    // an unknown mnemonic aborts the whole update
    assert_eq!(
        session.set_filter_list("add,frobnicate"),
        Err(FilterError::UnknownMnemonic("frobnicate".to_string())),
    );
    session.observe_fetch(0x0040_0008); // addi, still filtered out
    assert_eq!(session.ledger().frequency("addi"), 0);

    session.clear_filter();
    session.observe_fetch(0x0040_000c); // bne, counted again
    assert_eq!(session.ledger().frequency("bne"), 1);
}

#[test]
fn cpi_edits_flow_into_the_export() {
    let mut session = session();
    session.observe_fetch(0x0040_0000);
    session.observe_fetch(0x0040_0004);
    session.set_cpi("addi", 3.0).unwrap();

    let mut out = Vec::new();
    session.export_cpi(&mut out).unwrap();
    let csv = String::from_utf8(out).unwrap();
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines[1], "add,1.000,1,1.000,25.000%");
    assert_eq!(lines[2], "addi,3.000,1,3.000,75.000%");
}

#[test]
fn reset_produces_header_only_exports() {
    let mut session = session();
    session.observe_fetch(0x0040_0000);
    session.observe_fetch(0x0040_0004);
    session.set_cpi("add", 2.0).unwrap();
    session.set_filter_list("add").unwrap();

    session.reset();

    assert!(session.recorder().is_empty());
    assert_eq!(session.ledger().tallies(), Tallies::default());
    assert!(session.snapshot().rows.is_empty());

    let mut cpi = Vec::new();
    session.export_cpi(&mut cpi).unwrap();
    assert_eq!(cpi.iter().filter(|byte| **byte == b'\n').count(), 1);

    let mut trace = Vec::new();
    session.export_trace(&mut trace).unwrap();
    assert_eq!(trace.iter().filter(|byte| **byte == b'\n').count(), 1);

    // suppression state was cleared along with everything else
    assert!(session.observe_fetch(0x0040_0000).is_some());
}

#[test]
fn custom_signal_table() {
    let json = r#"[
        { "name": "RegWrite", "RType": "1", "IType": "1", "JType": "0",
          "Branch": "0", "Load": "1", "Store": "0" }
    ]"#;
    let mut session = session::builder()
        .with_program(program())
        .with_signals(Table::parse(json).unwrap())
        .build()
        .expect("could not build session");

    let record = session.observe_fetch(0x0040_0004).unwrap();
    assert_eq!(record.signals().count(), 1);
    assert_eq!(record.signal("RegWrite"), Some(&Value::Level("1".to_string())));
    assert_eq!(record.signal("RegDst"), None);
}

#[test]
fn direct_observation_bypasses_suppression() {
    let mut session = session();
    let stmt = statement(0x0040_0004, 0x0128_4820, "add", BaseFormat::R);

    session.observe(&stmt);
    session.observe(&stmt);

    assert_eq!(session.recorder().len(), 2);
    assert_eq!(session.ledger().frequency("add"), 2);
}
