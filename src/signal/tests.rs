// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
use super::*;

#[test]
fn value_from_raw() {
    assert_eq!(Value::from("x".to_string()), Value::DontCare);
    assert_eq!(Value::from("X".to_string()), Value::DontCare);
    assert_eq!(Value::from("1".to_string()), Value::Level("1".to_string()));
    assert_eq!(Value::from("0".to_string()), Value::Level("0".to_string()));
    assert_eq!(Value::DontCare.to_string(), "x");
    assert_eq!(Value::Level("1".to_string()).to_string(), "1");
}

#[test]
fn builtin_table() {
    let table = Table::builtin();
    assert_eq!(table.len(), 10);

    let names: Vec<_> = table.rows().map(|row| row.name.as_str()).collect();
    assert_eq!(names.first(), Some(&"RegDst"));
    assert_eq!(names.last(), Some(&"Jump"));

    assert_eq!(
        table.lookup("RegWrite", Format::R),
        Some(&Value::Level("1".to_string())),
    );
    assert_eq!(table.lookup("RegDst", Format::Store), Some(&Value::DontCare));
    assert_eq!(
        table.lookup("MemRead", Format::Load),
        Some(&Value::Level("1".to_string())),
    );
    assert_eq!(
        table.lookup("Jump", Format::J),
        Some(&Value::Level("1".to_string())),
    );
    assert_eq!(table.lookup("NoSuchSignal", Format::R), None);
}

#[test]
fn parse_rejects_duplicates() {
    let json = r#"[
        { "name": "RegDst", "RType": "1", "IType": "0", "JType": "x",
          "Branch": "x", "Load": "0", "Store": "x" },
        { "name": "RegDst", "RType": "0", "IType": "0", "JType": "x",
          "Branch": "x", "Load": "0", "Store": "x" }
    ]"#;
    assert!(matches!(
        Table::parse(json),
        Err(Error::DuplicateSignal(name)) if name == "RegDst",
    ));
}

#[test]
fn parse_rejects_malformed() {
    assert!(matches!(Table::parse("not json"), Err(Error::Parse(_))));
    assert!(matches!(
        Table::parse(r#"[{ "name": "RegDst" }]"#),
        Err(Error::Parse(_)),
    ));
}

#[test]
fn from_reader() {
    let json = br#"[
        { "name": "RegWrite", "RType": "1", "IType": "1", "JType": "0",
          "Branch": "0", "Load": "1", "Store": "0" }
    ]"#;
    let table = Table::from_reader(&json[..]).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(
        table.lookup("RegWrite", Format::J),
        Some(&Value::Level("0".to_string())),
    );
}
