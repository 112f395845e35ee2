use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LetterError {
    #[error("'{found}' is not an ASCII letter")]
    NotAsciiAlphabetic { found: char },

    #[error("option alphabet size must be between 1 and 26, got {size}")]
    InvalidAlphabetSize { size: u8 },
}

//
// ─── LETTER ────────────────────────────────────────────────────────────────────
//

/// A single uppercase letter identifying one choice within a question.
///
/// Letters are normalized to uppercase on construction, so `a` and `A` name
/// the same choice.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Letter(char);

impl Letter {
    /// Creates a `Letter` from any ASCII letter, normalizing to uppercase.
    ///
    /// # Errors
    ///
    /// Returns `LetterError::NotAsciiAlphabetic` for anything else.
    pub fn from_char(c: char) -> Result<Self, LetterError> {
        if !c.is_ascii_alphabetic() {
            return Err(LetterError::NotAsciiAlphabetic { found: c });
        }
        Ok(Self(c.to_ascii_uppercase()))
    }

    #[must_use]
    pub fn as_char(&self) -> char {
        self.0
    }

    /// Zero-based position in the alphabet (A = 0, B = 1, ...).
    #[must_use]
    pub fn index(&self) -> usize {
        (self.0 as u8 - b'A') as usize
    }
}

impl fmt::Debug for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Letter({})", self.0)
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── OPTION ALPHABET ───────────────────────────────────────────────────────────
//

/// Bound on the option-letter alphabet: letters `A` through `A + size - 1`.
///
/// The quiz format caps options at four per question by default, but the
/// bound is configuration, not a constant; any size up to the full Latin
/// alphabet is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionAlphabet {
    size: u8,
}

impl OptionAlphabet {
    pub const MAX_SIZE: u8 = 26;
    pub const DEFAULT_SIZE: u8 = 4;

    /// Creates an alphabet of the given size.
    ///
    /// # Errors
    ///
    /// Returns `LetterError::InvalidAlphabetSize` unless `1 <= size <= 26`.
    pub fn new(size: u8) -> Result<Self, LetterError> {
        if size == 0 || size > Self::MAX_SIZE {
            return Err(LetterError::InvalidAlphabetSize { size });
        }
        Ok(Self { size })
    }

    #[must_use]
    pub fn size(&self) -> u8 {
        self.size
    }

    /// The last letter of the alphabet (`D` for the default size).
    #[must_use]
    pub fn last(&self) -> Letter {
        Letter((b'A' + self.size - 1) as char)
    }

    #[must_use]
    pub fn contains(&self, letter: Letter) -> bool {
        letter.index() < usize::from(self.size)
    }

    /// The alphabet's letters in order, `A` first.
    pub fn letters(&self) -> impl Iterator<Item = Letter> + '_ {
        (0..self.size).map(|i| Letter((b'A' + i) as char))
    }
}

impl Default for OptionAlphabet {
    fn default() -> Self {
        Self {
            size: Self::DEFAULT_SIZE,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
