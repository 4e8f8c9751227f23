// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Replay analyzer for a built-in demo program
//!
//! This program replays the fetch stream of a small countdown loop through
//! a full observation session and prints the execution statistics and the
//! per-instruction datapath analysis. Optionally, both the CPI table and
//! the datapath trace may be exported as CSV, per-mnemonic cycle costs may
//! be overridden and counting may be limited to a mnemonic list.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use mips_dptrace::instruction::BaseFormat;
use mips_dptrace::program::{Listing, Statement};
use mips_dptrace::session;

fn statement(address: u32, word: u32, mnemonic: &str, basic: &str, source: &str, base: BaseFormat) -> Statement {
    Statement {
        address,
        word,
        mnemonic: mnemonic.to_string(),
        basic: basic.to_string(),
        source: source.to_string(),
        base,
    }
}

/// A countdown loop summing into `$t1`, then spilling the result
fn demo_program() -> Listing {
    Listing::new(vec![
        statement(
            0x0040_0000,
            0x2008_0005,
            "addi",
            "addi $8,$0,5",
            "li   $t0, 5",
            BaseFormat::I,
        ),
        statement(
            0x0040_0004,
            0x2009_0000,
            "addi",
            "addi $9,$0,0",
            "li   $t1, 0",
            BaseFormat::I,
        ),
        statement(
            0x0040_0008,
            0x0128_4820,
            "add",
            "add $9,$9,$8",
            "loop: add  $t1, $t1, $t0",
            BaseFormat::R,
        ),
        statement(
            0x0040_000c,
            0x2108_ffff,
            "addi",
            "addi $8,$8,-1",
            "addi $t0, $t0, -1",
            BaseFormat::I,
        ),
        statement(
            0x0040_0010,
            0x1500_fffd,
            "bne",
            "bne $8,$0,-3",
            "bne  $t0, $zero, loop",
            BaseFormat::IBranch,
        ),
        statement(
            0x0040_0014,
            0xaf89_0000,
            "sw",
            "sw $9,0($28)",
            "sw   $t1, 0($gp)",
            BaseFormat::I,
        ),
        statement(
            0x0040_0018,
            0x8f8a_0000,
            "lw",
            "lw $10,0($28)",
            "lw   $t2, 0($gp)",
            BaseFormat::I,
        ),
        statement(
            0x0040_001c,
            0x0810_0008,
            "j",
            "j 0x00400020",
            "j    done",
            BaseFormat::J,
        ),
    ])
}

/// The fetch stream of one run of the demo program
fn fetch_stream() -> Vec<u32> {
    let mut fetches = vec![0x0040_0000, 0x0040_0004];
    for _ in 0..5 {
        fetches.extend([0x0040_0008, 0x0040_000c, 0x0040_0010]);
    }
    fetches.extend([0x0040_0014, 0x0040_0018, 0x0040_001c]);
    // the simulator re-reads the last fetch; the session suppresses it
    fetches.push(0x0040_001c);
    fetches
}

fn main() {
    let matches = clap::Command::new("Replay analyzer")
        .arg(
            clap::arg!(--cpi <MNEMONIC_COST> "Cycle cost override, e.g. 'lw=2.5'")
                .action(clap::ArgAction::Append)
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            clap::arg!(--only <LIST> "Count only the given mnemonics, e.g. '{add,addi}'")
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            clap::arg!(--"csv-cpi" <FILE> "Export the CPI table to this file")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            clap::arg!(--"csv-trace" <FILE> "Export the datapath trace to this file")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .get_matches();

    let mut session = session::builder()
        .with_program(demo_program())
        .build()
        .expect("could not build session");

    if let Some(list) = matches.get_one::<String>("only") {
        session
            .set_filter_list(list)
            .expect("invalid mnemonic list");
    }
    for cost in matches.get_many::<String>("cpi").unwrap_or_default() {
        let (mnemonic, cost) = cost
            .split_once('=')
            .expect("cost overrides take the form MNEMONIC=COST");
        let cost: f64 = cost.parse().expect("cost is not a number");
        session
            .set_cpi(mnemonic, cost)
            .expect("cost must be finite and non-negative");
    }

    for address in fetch_stream() {
        session.observe_fetch(address);
    }

    println!("{}", session.stats_text());
    println!("{}", session.trace_text());

    if let Some(path) = matches.get_one::<PathBuf>("csv-cpi") {
        let file = File::create(path).expect("could not create CPI CSV file");
        session
            .export_cpi(BufWriter::new(file))
            .expect("could not export the CPI table");
    }
    if let Some(path) = matches.get_one::<PathBuf>("csv-trace") {
        let file = File::create(path).expect("could not create trace CSV file");
        session
            .export_trace(BufWriter::new(file))
            .expect("could not export the trace");
    }
}
