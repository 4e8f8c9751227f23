// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Instruction formats and classification
//!
//! This module decides the structural shape of an executed instruction: how
//! its word partitions into fields, which register slots it reads and
//! writes and which column of a [signal table][crate::signal::Table]
//! applies to it.
//!
//! The host's instruction metadata only distinguishes the generic R, I,
//! branch and J categories ([`BaseFormat`]); loads and stores are folded
//! into the generic I category there. [`Format::classify`] recovers them
//! from the opcode before consulting the host category.

use core::fmt;

/// Structural format of an executed MIPS instruction
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// Register-register instructions
    R,
    /// Immediate instructions that are neither branches nor memory accesses
    I,
    /// Conditional branches
    Branch,
    /// Memory loads
    Load,
    /// Memory stores
    Store,
    /// Unconditional jumps
    J,
}

impl Format {
    /// Classify an instruction from its opcode and the host's format category
    ///
    /// Opcodes with the three highest-order bits `100` classify as [`Load`][Self::Load]
    /// and those with `101` as [`Store`][Self::Store], regardless of the
    /// reported [`BaseFormat`]. All remaining opcodes resolve through the
    /// host category.
    pub const fn classify(opcode: u8, base: BaseFormat) -> Self {
        match opcode >> 3 {
            0b100 => Self::Load,
            0b101 => Self::Store,
            _ => match base {
                BaseFormat::R => Self::R,
                BaseFormat::I => Self::I,
                BaseFormat::IBranch => Self::Branch,
                BaseFormat::J => Self::J,
            },
        }
    }

    /// Determine whether this format writes back to a register
    ///
    /// Branches, stores and jumps leave the register file untouched.
    pub const fn writes_register(self) -> bool {
        matches!(self, Self::R | Self::I | Self::Load)
    }

    /// Determine whether this format belongs to the I family
    ///
    /// The I family shares the 16bit immediate field partition. Loads,
    /// stores and branches are all I-shaped on the field level.
    pub const fn is_i_family(self) -> bool {
        matches!(self, Self::I | Self::Branch | Self::Load | Self::Store)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::R => write!(f, "R-type instruction"),
            Self::I => write!(f, "I-type instruction"),
            Self::Branch => write!(f, "I-type BRANCH instruction"),
            Self::Load => write!(f, "I-type LOAD instruction"),
            Self::Store => write!(f, "I-type STORE instruction"),
            Self::J => write!(f, "J-type instruction"),
        }
    }
}

/// Generic format category reported by the host's instruction metadata
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BaseFormat {
    /// Register-register format
    R,
    /// Immediate format, including loads and stores
    I,
    /// Branch flavour of the immediate format
    IBranch,
    /// Jump format
    J,
}
