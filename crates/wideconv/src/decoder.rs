//! UTF-8 to UTF-16 byte-classification state machine.
//!
//! The decoder keeps two pieces of state between bytes: how many continuation
//! bytes the current sequence still expects (`pending`) and the bits collected
//! so far (`acc`). Every byte is classified by its value alone:
//!
//! | byte          | role                 | effect                                          |
//! |---------------|----------------------|-------------------------------------------------|
//! | `0x00..=0x7F` | ASCII                | replacement first if a sequence was pending     |
//! | `0x80..=0xBF` | continuation         | fold 6 bits, or replacement if nothing pending  |
//! | `0xC0..=0xDF` | 2-byte lead          | start sequence, 1 continuation, 5 payload bits  |
//! | `0xE0..=0xEF` | 3-byte lead          | start sequence, 2 continuations, 4 payload bits |
//! | `0xF0..=0xF7` | 4-byte lead          | start sequence, 3 continuations, 3 payload bits |
//! | `0xF8..=0xFF` | invalid              | replacement, pending sequence dropped           |
//!
//! A lead byte that arrives while another sequence is pending silently
//! replaces it, unless
//! [`DecoderOptions::flag_abandoned_sequences`](crate::DecoderOptions) asks
//! for a replacement. Input that ends mid-sequence gets one trailing
//! replacement from [`WideDecoder::finish`].
//!
//! Limitations
//! - Each completed sequence becomes exactly one code unit. Four-byte
//!   sequences decode to values above `0xFFFF`; only the low 16 bits are kept
//!   and no surrogate pair is produced.
//! - Overlong encodings and encoded surrogates are not rejected; their value
//!   is emitted as decoded.
use alloc::vec::Vec;
use core::ffi::CStr;

use bstr::ByteSlice;

use crate::{Conversion, DecoderOptions, MalformedKind, Malformation, WideString};

/// The Unicode replacement character, `U+FFFD`.
pub const REPLACEMENT: u16 = 0xFFFD;

/// Code units produced by a single [`WideDecoder::step`]: none, one, or two
/// (a replacement followed by an ASCII unit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Emit {
    buf: [u16; 2],
    len: u8,
}

impl Emit {
    const NOTHING: Self = Self {
        buf: [0; 2],
        len: 0,
    };

    fn one(unit: u16) -> Self {
        Self {
            buf: [unit, 0],
            len: 1,
        }
    }

    fn two(first: u16, second: u16) -> Self {
        Self {
            buf: [first, second],
            len: 2,
        }
    }

    /// The emitted units in output order.
    #[must_use]
    pub fn as_slice(&self) -> &[u16] {
        &self.buf[..usize::from(self.len)]
    }

    /// Whether the byte produced no output (a sequence is still pending).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends the emitted units to `out`.
    pub fn push_to(self, out: &mut Vec<u16>) {
        out.extend_from_slice(self.as_slice());
    }
}

/// Streaming UTF-8 decoder producing one UTF-16 code unit per code point.
///
/// Bytes may be fed in any chunking; the output is identical to a single
/// [`convert_with`] call over the concatenated input.
///
/// ```rust
/// use wideconv::{DecoderOptions, WideDecoder};
///
/// let mut decoder = WideDecoder::new(DecoderOptions::default());
/// let mut out = Vec::new();
/// decoder.decode_into(&[b'a', 0xE2, 0x82], &mut out);
/// assert!(decoder.is_pending());
/// decoder.decode_into(&[0xAC], &mut out);
/// decoder.finish().push_to(&mut out);
/// assert_eq!(out, [0x61, 0x20AC]);
/// ```
#[derive(Debug, Clone)]
pub struct WideDecoder {
    options: DecoderOptions,
    pending: u8,
    acc: u32,
    consumed: usize,
    malformations: Option<Vec<Malformation>>,
}

impl WideDecoder {
    /// Creates a decoder with no sequence pending.
    #[must_use]
    pub fn new(options: DecoderOptions) -> Self {
        Self {
            options,
            pending: 0,
            acc: 0,
            consumed: 0,
            malformations: None,
        }
    }

    /// Creates a decoder that records every replacement it emits.
    ///
    /// Recorded events are retrieved with [`take_malformations`].
    ///
    /// [`take_malformations`]: WideDecoder::take_malformations
    #[must_use]
    pub fn reporting(options: DecoderOptions) -> Self {
        Self {
            malformations: Some(Vec::new()),
            ..Self::new(options)
        }
    }

    /// Whether a multi-byte sequence has started but not completed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending > 0
    }

    /// Total number of bytes fed since creation or the last [`reset`].
    ///
    /// [`reset`]: WideDecoder::reset
    #[must_use]
    pub fn bytes_consumed(&self) -> usize {
        self.consumed
    }

    /// Drops any pending sequence and the byte count without emitting
    /// anything. Recorded malformations are kept.
    pub fn reset(&mut self) {
        self.clear_sequence();
        self.consumed = 0;
    }

    /// Returns the replacements recorded so far, leaving the record empty.
    ///
    /// Always empty for decoders built with [`WideDecoder::new`].
    pub fn take_malformations(&mut self) -> Vec<Malformation> {
        self.malformations
            .as_mut()
            .map(core::mem::take)
            .unwrap_or_default()
    }

    /// Processes a single byte.
    pub fn step(&mut self, byte: u8) -> Emit {
        let offset = self.consumed;
        self.consumed += 1;

        match byte {
            0x00..=0x7F => {
                if self.is_pending() {
                    self.clear_sequence();
                    self.record(offset, MalformedKind::InterruptedByAscii);
                    Emit::two(self.options.replacement, u16::from(byte))
                } else {
                    Emit::one(u16::from(byte))
                }
            }
            0x80..=0xBF => {
                if !self.is_pending() {
                    self.record(offset, MalformedKind::OrphanContinuation);
                    return Emit::one(self.options.replacement);
                }
                self.acc = (self.acc << 6) | u32::from(byte & 0x3F);
                self.pending -= 1;
                if self.pending > 0 {
                    return Emit::NOTHING;
                }
                // Values above the BMP keep their low 16 bits.
                #[allow(clippy::cast_possible_truncation)]
                let unit = (self.acc & 0xFFFF) as u16;
                self.acc = 0;
                Emit::one(unit)
            }
            0xC0..=0xDF => self.begin(offset, 1, byte & 0x1F),
            0xE0..=0xEF => self.begin(offset, 2, byte & 0x0F),
            0xF0..=0xF7 => self.begin(offset, 3, byte & 0x07),
            0xF8..=0xFF => {
                self.clear_sequence();
                self.record(offset, MalformedKind::InvalidLead);
                Emit::one(self.options.replacement)
            }
        }
    }

    /// Processes a chunk of bytes, appending the produced units to `out`.
    ///
    /// Runs of ASCII bytes outside a pending sequence are copied in bulk.
    pub fn decode_into(&mut self, bytes: &[u8], out: &mut Vec<u16>) {
        let mut rest = bytes;
        while !rest.is_empty() {
            if !self.is_pending() {
                let ascii = rest.find_non_ascii_byte().unwrap_or(rest.len());
                out.extend(rest[..ascii].iter().map(|&b| u16::from(b)));
                self.consumed += ascii;
                rest = &rest[ascii..];
            }
            let Some((&byte, tail)) = rest.split_first() else {
                break;
            };
            self.step(byte).push_to(out);
            rest = tail;
        }
    }

    /// Ends the input. Emits one replacement if a sequence is still pending,
    /// then leaves the decoder ready for a new input.
    pub fn finish(&mut self) -> Emit {
        let emit = if self.is_pending() {
            self.record(self.consumed, MalformedKind::TruncatedAtEnd);
            Emit::one(self.options.replacement)
        } else {
            Emit::NOTHING
        };
        self.reset();
        emit
    }

    fn begin(&mut self, offset: usize, continuations: u8, bits: u8) -> Emit {
        let abandoned = self.is_pending();
        self.pending = continuations;
        self.acc = u32::from(bits);
        if abandoned && self.options.flag_abandoned_sequences {
            self.record(offset, MalformedKind::Abandoned);
            Emit::one(self.options.replacement)
        } else {
            Emit::NOTHING
        }
    }

    fn clear_sequence(&mut self) {
        self.pending = 0;
        self.acc = 0;
    }

    fn record(&mut self, offset: usize, kind: MalformedKind) {
        if let Some(malformations) = self.malformations.as_mut() {
            malformations.push(Malformation { offset, kind });
        }
    }
}

impl Default for WideDecoder {
    fn default() -> Self {
        Self::new(DecoderOptions::default())
    }
}

/// Converts `bytes` to a null-terminated wide string with default options.
///
/// Never fails: malformed sequences become `U+FFFD`.
///
/// ```rust
/// let wide = wideconv::convert(&[0xC3, 0xA9]);
/// assert_eq!(wide.as_slice_with_nul(), &[0x00E9, 0]);
/// ```
#[must_use]
pub fn convert(bytes: &[u8]) -> WideString {
    convert_with(bytes, DecoderOptions::default())
}

/// Converts the bytes of `s` up to, not including, its NUL terminator.
#[must_use]
pub fn convert_cstr(s: &CStr) -> WideString {
    convert(s.to_bytes())
}

/// Converts `bytes` with explicit options.
#[must_use]
pub fn convert_with(bytes: &[u8], options: DecoderOptions) -> WideString {
    let mut decoder = WideDecoder::new(options);
    WideString::from_units(run(&mut decoder, bytes))
}

/// Converts `bytes` and records where every replacement came from.
#[must_use]
pub fn convert_reporting(bytes: &[u8], options: DecoderOptions) -> Conversion {
    let mut decoder = WideDecoder::reporting(options);
    let units = run(&mut decoder, bytes);
    Conversion {
        wide: WideString::from_units(units),
        malformations: decoder.take_malformations(),
    }
}

fn run(decoder: &mut WideDecoder, bytes: &[u8]) -> Vec<u16> {
    // Output never exceeds one unit per input byte; the extra slot is the
    // terminator.
    let mut units = Vec::with_capacity(bytes.len() + 1);
    decoder.decode_into(bytes, &mut units);
    decoder.finish().push_to(&mut units);
    units
}
