//! # Sequence Labels
//!
//! Produces the Nth token of a label sequence, used to auto-number fields that are
//! appended at runtime.
//!
//! Two kinds exist:
//!
//! - **Numeric**: `1, 2, 3, ...` (the index is zero-based, the token is one-based).
//! - **Alphabetical**: bijective base-N numeration over an [`Alphabet`]
//!   (`a..z, aa..az, ba..`). There is no zero digit, so `z` is followed by `aa`.
//!
//! Tokens are computed from the index alone. Nothing here holds a counter, so any
//! token can be regenerated at any time and in any order.

use crate::error::{GridError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceKind {
    Numeric,
    Alphabetical,
    /// Any kind the host spelled in a way we don't recognize. Generates nothing.
    #[serde(other)]
    Disabled,
}

impl FromStr for SequenceKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "numeric" => SequenceKind::Numeric,
            "alphabetical" => SequenceKind::Alphabetical,
            _ => SequenceKind::Disabled,
        })
    }
}

impl fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SequenceKind::Numeric => "numeric",
            SequenceKind::Alphabetical => "alphabetical",
            SequenceKind::Disabled => "disabled",
        };
        write!(f, "{}", s)
    }
}

/// The digit set for alphabetical sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    digits: Vec<char>,
}

impl Alphabet {
    /// Builds an alphabet from a string of distinct characters.
    pub fn new(digits: &str) -> Result<Self> {
        let chars: Vec<char> = digits.chars().collect();
        if chars.is_empty() {
            return Err(GridError::Config("Alphabet cannot be empty".to_string()));
        }
        for (i, c) in chars.iter().enumerate() {
            if chars[..i].contains(c) {
                return Err(GridError::Config(format!(
                    "Alphabet contains '{}' more than once",
                    c
                )));
            }
        }
        Ok(Self { digits: chars })
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// Bijective numeration of `index + 1` over this alphabet.
    pub fn encode(&self, index: usize) -> String {
        let base = self.digits.len();
        let mut n = index + 1;
        let mut out = Vec::new();
        while n > 0 {
            n -= 1;
            out.push(self.digits[n % base]);
            n /= base;
        }
        out.iter().rev().collect()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self {
            digits: DEFAULT_ALPHABET.chars().collect(),
        }
    }
}

/// Token at `index` using the default alphabet.
pub fn generate(kind: SequenceKind, index: usize) -> Option<String> {
    generate_with(kind, index, &Alphabet::default())
}

pub fn generate_with(kind: SequenceKind, index: usize, alphabet: &Alphabet) -> Option<String> {
    match kind {
        SequenceKind::Numeric => Some((index + 1).to_string()),
        SequenceKind::Alphabetical => Some(alphabet.encode(index)),
        SequenceKind::Disabled => None,
    }
}
