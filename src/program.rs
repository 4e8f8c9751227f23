// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Access to the host simulator's assembled program
//!
//! Observation events carry nothing but an address; everything known about
//! the statement executed there comes from the host. This module defines
//! the [`Program`] trait a [`Session`][crate::session::Session] uses for
//! those lookups, along with [`Listing`], a simple implementation backed by
//! a list of statements that is convenient for tests and replay drivers.
//!
//! A `statement` lookup has three outcomes: a [`Statement`], `None` when no
//! instruction exists at the address (the host's signal to skip the event)
//! and an error when the address cannot be accessed at all. Sessions treat
//! the error case as a dropped event, never as a fatal condition.


use core::fmt;

use std::collections::BTreeSet;

use crate::instruction::BaseFormat;

/// A single statement of the host's assembled program
///
/// Captured once per address; the texts are rendered by the host assembler
/// and treated as opaque here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Statement {
    /// Text segment address the statement was assembled to
    pub address: u32,
    /// The 32bit machine word
    pub word: u32,
    /// Instruction mnemonic
    pub mnemonic: String,
    /// Printable basic assembly statement
    pub basic: String,
    /// Original source line
    pub source: String,
    /// Format category from the host's instruction metadata
    pub base: BaseFormat,
}

/// A program whose executed statements can be looked up by address
pub trait Program {
    /// Error type returned by [`statement`][Self::statement]
    type Error: fmt::Display;

    /// Retrieve the [`Statement`] at the given address
    ///
    /// Returns `Ok(None)` if there is no statement at that address.
    fn statement(&mut self, address: u32) -> Result<Option<Statement>, Self::Error>;

    /// The complete universe of valid mnemonics
    ///
    /// Used to validate user-supplied mnemonic lists before they take any
    /// effect.
    fn mnemonics(&self) -> Vec<String>;
}

impl<P: Program + ?Sized> Program for &mut P {
    type Error = P::Error;

    fn statement(&mut self, address: u32) -> Result<Option<Statement>, Self::Error> {
        P::statement(self, address)
    }

    fn mnemonics(&self) -> Vec<String> {
        P::mnemonics(self)
    }
}

/// A [`Program`] backed by a list of statements
///
/// Lookup is by exact address. The mnemonic universe is the set of
/// mnemonics occurring in the listing, optionally extended via
/// [`with_mnemonics`][Self::with_mnemonics] for hosts whose instruction set
/// is larger than the program at hand.
#[derive(Clone, Debug, Default)]
pub struct Listing {
    statements: Vec<Statement>,
    extra: BTreeSet<String>,
}

impl Listing {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self {
            statements,
            extra: BTreeSet::new(),
        }
    }

    /// Extend the mnemonic universe beyond the listed statements
    pub fn with_mnemonics(mut self, mnemonics: impl IntoIterator<Item = String>) -> Self {
        self.extra.extend(mnemonics);
        self
    }

    /// All statements in listing order
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }
}

impl FromIterator<Statement> for Listing {
    fn from_iter<I: IntoIterator<Item = Statement>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Program for Listing {
    type Error = core::convert::Infallible;

    fn statement(&mut self, address: u32) -> Result<Option<Statement>, Self::Error> {
        Ok(self
            .statements
            .iter()
            .find(|stmt| stmt.address == address)
            .cloned())
    }

    fn mnemonics(&self) -> Vec<String> {
        self.statements
            .iter()
            .map(|stmt| stmt.mnemonic.clone())
            .chain(self.extra.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
