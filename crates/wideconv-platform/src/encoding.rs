//! Per-target path encoding.
//!
//! Some audio and shell APIs only accept wide-character paths on Windows,
//! while every other target takes the narrow UTF-8 string directly. A
//! [`PathEncoder`] captures that choice once, so call sites never branch on
//! the target themselves. [`NativePaths`] is the encoder for the current
//! build target.
use std::ffi::CStr;

use wideconv::{DecoderOptions, WideString, convert_with};

/// Flag OR-ed into the legacy API's flags when the path argument is a wide
/// string.
pub const UNICODE: u32 = 0x8000_0000;

/// A path in the form the downstream API expects.
#[derive(Debug, Clone, Copy)]
pub enum PathArg<'a> {
    /// Null-terminated narrow string, passed through untouched.
    Narrow(&'a CStr),
    /// Null-terminated wide string, owned by the encoder for the call.
    Wide(&'a WideString),
}

impl PathArg<'_> {
    /// Pointer to the start of the null-terminated buffer, as the legacy API
    /// takes it.
    #[must_use]
    pub fn as_ptr(&self) -> *const std::ffi::c_void {
        match self {
            PathArg::Narrow(s) => s.as_ptr().cast(),
            PathArg::Wide(w) => w.as_ptr().cast(),
        }
    }
}

/// Strategy for handing a narrow path to a platform API.
pub trait PathEncoder {
    /// Bits to OR into the API flags for paths produced by this encoder.
    fn flags(&self) -> u32;

    /// Encodes `path`, calls `f` with the result and releases any buffer
    /// allocated for it before returning.
    fn with_path<R>(&self, path: &CStr, f: impl FnOnce(PathArg<'_>) -> R) -> R;
}

/// Passes narrow paths through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NarrowPaths;

impl PathEncoder for NarrowPaths {
    fn flags(&self) -> u32 {
        0
    }

    fn with_path<R>(&self, path: &CStr, f: impl FnOnce(PathArg<'_>) -> R) -> R {
        f(PathArg::Narrow(path))
    }
}

/// Converts narrow paths to wide strings and sets [`UNICODE`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WidePaths {
    /// Options for the UTF-8 conversion.
    pub options: DecoderOptions,
}

impl PathEncoder for WidePaths {
    fn flags(&self) -> u32 {
        UNICODE
    }

    fn with_path<R>(&self, path: &CStr, f: impl FnOnce(PathArg<'_>) -> R) -> R {
        let wide = convert_with(path.to_bytes(), self.options);
        f(PathArg::Wide(&wide))
    }
}

/// The encoder matching the build target.
#[cfg(windows)]
pub type NativePaths = WidePaths;

/// The encoder matching the build target.
#[cfg(not(windows))]
pub type NativePaths = NarrowPaths;
