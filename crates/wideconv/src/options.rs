/// Configuration for [`WideDecoder`](crate::WideDecoder) and
/// [`convert_with`](crate::convert_with).
///
/// # Examples
///
/// ```rust
/// use wideconv::{DecoderOptions, convert_with};
///
/// let options = DecoderOptions {
///     replacement: u16::from(b'?'),
///     ..Default::default()
/// };
/// assert_eq!(convert_with(&[0xFF], options).as_slice(), &[0x3F]);
/// ```
///
/// # Default
///
/// The replacement unit is `U+FFFD` and abandoned sequences are not flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[cfg_attr(any(test, feature = "serde"), serde(default))]
pub struct DecoderOptions {
    /// Code unit emitted for every malformed event.
    ///
    /// # Default
    ///
    /// `0xFFFD`
    pub replacement: u16,

    /// Whether a lead byte that interrupts a pending multi-byte sequence
    /// emits a replacement for the abandoned sequence.
    ///
    /// When `false`, the interrupted sequence is dropped without a trace and
    /// only the new sequence is decoded. Consumers of the original narrow
    /// strings rely on this leniency, so it stays the default.
    ///
    /// # Default
    ///
    /// `false`
    pub flag_abandoned_sequences: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            replacement: crate::REPLACEMENT,
            flag_abandoned_sequences: false,
        }
    }
}
