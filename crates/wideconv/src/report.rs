use alloc::vec::Vec;
use core::fmt;

use crate::WideString;

/// Why a replacement unit was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum MalformedKind {
    /// An ASCII byte arrived while a multi-byte sequence was still pending.
    InterruptedByAscii,
    /// A continuation byte (`0x80..=0xBF`) arrived with no sequence pending.
    OrphanContinuation,
    /// A byte in `0xF8..=0xFF`, which never starts a sequence.
    InvalidLead,
    /// The input ended in the middle of a multi-byte sequence.
    TruncatedAtEnd,
    /// A new lead byte replaced a pending sequence. Only reported when
    /// [`DecoderOptions::flag_abandoned_sequences`](crate::DecoderOptions) is
    /// set.
    Abandoned,
}

impl fmt::Display for MalformedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InterruptedByAscii => "sequence interrupted by ASCII byte",
            Self::OrphanContinuation => "orphan continuation byte",
            Self::InvalidLead => "invalid lead byte",
            Self::TruncatedAtEnd => "sequence truncated at end of input",
            Self::Abandoned => "sequence abandoned by new lead byte",
        })
    }
}

/// One replacement event.
///
/// `offset` is the index of the input byte that triggered the replacement.
/// For [`MalformedKind::TruncatedAtEnd`] it is the input length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Malformation {
    /// Byte index into the input.
    pub offset: usize,
    /// What went wrong.
    pub kind: MalformedKind,
}

impl fmt::Display for Malformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.kind, self.offset)
    }
}

/// Result of [`convert_reporting`](crate::convert_reporting).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Conversion {
    /// The converted string.
    pub wide: WideString,
    /// Replacement events in input order, one per replacement unit.
    pub malformations: Vec<Malformation>,
}

impl Conversion {
    /// Whether the input decoded without a single replacement.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.malformations.is_empty()
    }
}
