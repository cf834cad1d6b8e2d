//! Narrow-to-wide string conversion for legacy wide-character APIs.
//!
//! The crate turns a byte string that is *believed* to be UTF-8 into a
//! null-terminated sequence of 16-bit code units. Decoding is best effort:
//! malformed input never produces an error, it degrades to a replacement unit
//! (`U+FFFD` by default) so that the result can always be handed to an API
//! that has no way of reporting decode failures itself.
//!
//! ```rust
//! let wide = wideconv::convert("héllo".as_bytes());
//! assert_eq!(wide.len(), 5);
//! assert_eq!(wide.as_slice_with_nul().last(), Some(&0));
//! assert_eq!(wide.to_string_lossy(), "héllo");
//! ```
//!
//! Each code point becomes exactly one code unit. Surrogate pairs are never
//! synthesized, so four-byte sequences (code points above `U+FFFF`) keep only
//! the low 16 bits of their value. See [`WideDecoder`] for the full state
//! machine.

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod decoder;
mod error;
mod options;
mod report;
mod wide;

#[cfg(test)]
mod tests;

pub use decoder::{
    Emit, REPLACEMENT, WideDecoder, convert, convert_cstr, convert_reporting, convert_with,
};
pub use error::FromUnitsError;
pub use options::DecoderOptions;
pub use report::{Conversion, MalformedKind, Malformation};
pub use wide::WideString;
