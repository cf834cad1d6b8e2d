use alloc::{string::String, vec, vec::Vec};
use core::{fmt, ops::Deref};

use crate::FromUnitsError;

/// An owned, null-terminated buffer of UTF-16 code units.
///
/// The terminator is always present in memory but never counted: [`len`]
/// and [`as_slice`] cover the content only, while [`as_slice_with_nul`] and
/// [`as_ptr`] expose the terminated buffer for handing to a wide-character
/// API. The buffer is released when the value is dropped.
///
/// Content may itself contain zero units when it was converted from a byte
/// slice holding NUL bytes. A C consumer stops at the first one. Buffers
/// taken over with [`from_vec_with_nul`] must not contain any.
///
/// [`len`]: WideString::len
/// [`as_slice`]: WideString::as_slice
/// [`as_slice_with_nul`]: WideString::as_slice_with_nul
/// [`as_ptr`]: WideString::as_ptr
/// [`from_vec_with_nul`]: WideString::from_vec_with_nul
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct WideString {
    // Invariant: non-empty, last element is 0.
    units: Vec<u16>,
}

impl WideString {
    /// Creates an empty string holding only the terminator.
    #[must_use]
    pub fn new() -> Self {
        Self { units: vec![0] }
    }

    /// Appends the terminator to `units`, which must not already contain it.
    pub(crate) fn from_units(mut units: Vec<u16>) -> Self {
        units.push(0);
        Self { units }
    }

    /// Takes ownership of a buffer whose only zero unit is the last one.
    ///
    /// # Errors
    ///
    /// Returns [`FromUnitsError::MissingTerminator`] if `units` is empty or
    /// does not end with `0`, and [`FromUnitsError::InteriorNul`] if a zero
    /// unit comes earlier.
    pub fn from_vec_with_nul(units: Vec<u16>) -> Result<Self, FromUnitsError> {
        let Some((&0, content)) = units.split_last() else {
            return Err(FromUnitsError::MissingTerminator);
        };
        if let Some(position) = content.iter().position(|&u| u == 0) {
            return Err(FromUnitsError::InteriorNul { position });
        }
        Ok(Self { units })
    }

    /// Number of code units, excluding the terminator.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len() - 1
    }

    /// Whether the string holds nothing but the terminator.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Content code units, without the terminator.
    #[must_use]
    pub fn as_slice(&self) -> &[u16] {
        &self.units[..self.len()]
    }

    /// Content code units followed by the terminator.
    #[must_use]
    pub fn as_slice_with_nul(&self) -> &[u16] {
        &self.units
    }

    /// Pointer to the first code unit of the null-terminated buffer.
    ///
    /// The pointer stays valid for as long as `self` is alive and unmodified.
    #[must_use]
    pub fn as_ptr(&self) -> *const u16 {
        self.units.as_ptr()
    }

    /// Gives up ownership of the terminated buffer.
    #[must_use]
    pub fn into_vec_with_nul(self) -> Vec<u16> {
        self.units
    }

    /// Decodes the content as UTF-16, replacing unpaired surrogates.
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        char::decode_utf16(self.as_slice().iter().copied())
            .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    }
}

impl Default for WideString {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for WideString {
    type Target = [u16];

    fn deref(&self) -> &[u16] {
        self.as_slice()
    }
}

impl AsRef<[u16]> for WideString {
    fn as_ref(&self) -> &[u16] {
        self.as_slice()
    }
}

impl fmt::Debug for WideString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.to_string_lossy(), f)
    }
}

impl TryFrom<Vec<u16>> for WideString {
    type Error = FromUnitsError;

    fn try_from(units: Vec<u16>) -> Result<Self, Self::Error> {
        Self::from_vec_with_nul(units)
    }
}
