// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Signal identifiers.
//!
//! A junction is monitored through four approaches, each identified by a
//! letter. The derived ordering is the capture sequence.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One monitored junction approach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SignalId {
    A,
    B,
    C,
    D,
}

impl SignalId {
    /// All signals in capture order.
    pub const ALL: [SignalId; 4] = [SignalId::A, SignalId::B, SignalId::C, SignalId::D];

    /// The signal that follows this one in the capture sequence.
    pub fn next(self) -> Option<SignalId> {
        match self {
            SignalId::A => Some(SignalId::B),
            SignalId::B => Some(SignalId::C),
            SignalId::C => Some(SignalId::D),
            SignalId::D => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            SignalId::A => 'A',
            SignalId::B => 'B',
            SignalId::C => 'C',
            SignalId::D => 'D',
        }
    }

    /// Parse a signal letter, case-insensitively.
    pub fn from_letter(letter: &str) -> Option<SignalId> {
        match letter.trim() {
            "A" | "a" => Some(SignalId::A),
            "B" | "b" => Some(SignalId::B),
            "C" | "c" => Some(SignalId::C),
            "D" | "d" => Some(SignalId::D),
            _ => None,
        }
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}
