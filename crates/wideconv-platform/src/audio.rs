//! Stream and sample loading through a legacy audio library.
//!
//! The library itself is linked elsewhere; [`AudioLibrary`] is the seam it
//! plugs into. [`AudioLoader`] owns the path handling: it encodes the
//! caller's narrow path with a [`PathEncoder`], adds the encoder's flag, and
//! turns a zero handle into an [`AudioError`].
use std::{ffi::CStr, fmt, num::NonZeroU32};

use bstr::BString;
use tracing::{debug, warn};

use crate::{
    AudioError,
    encoding::{NativePaths, PathArg, PathEncoder},
};

/// Flag asking the library to decode only, without playback.
pub const STREAM_DECODE: u32 = 0x0020_0000;
/// Flag asking the library to scan the whole file for an exact length.
pub const STREAM_PRESCAN: u32 = 0x0002_0000;
/// Flag asking the library to read the file asynchronously.
pub const ASYNC_FILE: u32 = 0x4000_0000;
/// Flag letting a new sample playback override the oldest one.
pub const SAMPLE_OVER_POS: u32 = 0x0002_0000;

/// Raw entry points of the audio library that take file paths.
///
/// Both calls return `0` on failure, after which [`error_code`] reports why.
///
/// [`error_code`]: AudioLibrary::error_code
pub trait AudioLibrary {
    /// Opens a file as a stream. `path` is narrow or wide as announced by
    /// `flags`.
    fn stream_create_file(&self, path: PathArg<'_>, flags: u32) -> u32;

    /// Loads a whole file as a sample with up to `max` simultaneous
    /// playbacks.
    fn sample_load(&self, path: PathArg<'_>, max: u32, flags: u32) -> u32;

    /// The error code of the most recent failed call on this thread.
    fn error_code(&self) -> ErrorCode;
}

/// Handle of an opened stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamHandle(pub NonZeroU32);

/// Handle of a loaded sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SampleHandle(pub NonZeroU32);

/// Error code reported by the audio library.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode(pub i32);

impl ErrorCode {
    /// No error.
    pub const OK: Self = Self(0);
    /// Out of memory.
    pub const MEM: Self = Self(1);
    /// The file could not be opened.
    pub const FILE_OPEN: Self = Self(2);
    /// No free or valid driver.
    pub const DRIVER: Self = Self(3);
    /// Invalid handle.
    pub const HANDLE: Self = Self(5);
    /// Unsupported sample format.
    pub const FORMAT: Self = Self(6);
    /// The library is not initialized.
    pub const INIT: Self = Self(8);
    /// Illegal type.
    pub const ILLEGAL_TYPE: Self = Self(19);
    /// Illegal parameter.
    pub const ILLEGAL_PARAM: Self = Self(20);
    /// Not a file stream.
    pub const NOT_FILE: Self = Self(27);
    /// Requested data is not available.
    pub const NOT_AVAILABLE: Self = Self(37);
    /// The channel is a decoding channel.
    pub const DECODE: Self = Self(38);
    /// Unsupported file format.
    pub const FILE_FORMAT: Self = Self(41);
    /// Codec not available.
    pub const CODEC: Self = Self(44);
    /// The device is busy.
    pub const BUSY: Self = Self(46);
    /// The file cannot be streamed.
    pub const UNSTREAMABLE: Self = Self(47);
    /// Unspecified failure.
    pub const UNKNOWN: Self = Self(-1);

    /// Human-readable description of the code.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::OK => "all is OK",
            Self::MEM => "memory error",
            Self::FILE_OPEN => "can't open the file",
            Self::DRIVER => "can't find a free/valid driver",
            Self::HANDLE => "invalid handle",
            Self::FORMAT => "unsupported sample format",
            Self::INIT => "the library has not been successfully initialized",
            Self::ILLEGAL_TYPE => "an illegal type was specified",
            Self::ILLEGAL_PARAM => "an illegal parameter was specified",
            Self::NOT_FILE => "the stream is not a file stream",
            Self::NOT_AVAILABLE => "requested data is not available",
            Self::DECODE => "the channel is a decoding channel",
            Self::FILE_FORMAT => "unsupported file format",
            Self::CODEC => "codec is not available/supported",
            Self::BUSY => "the device is busy",
            Self::UNSTREAMABLE => "the file is unstreamable",
            Self::UNKNOWN => "some other mystery error",
            _ => "unknown error code",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message(), self.0)
    }
}

impl fmt::Debug for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ErrorCode({})", self.0)
    }
}

/// Opens audio files by narrow path on any target.
#[derive(Debug)]
pub struct AudioLoader<L, E = NativePaths> {
    library: L,
    encoder: E,
}

impl<L: AudioLibrary> AudioLoader<L> {
    /// Creates a loader using the encoder for the build target.
    pub fn new(library: L) -> Self {
        Self::with_encoder(library, NativePaths::default())
    }
}

impl<L: AudioLibrary, E: PathEncoder> AudioLoader<L, E> {
    /// Creates a loader with an explicit path encoder.
    pub fn with_encoder(library: L, encoder: E) -> Self {
        Self { library, encoder }
    }

    /// The wrapped library.
    pub fn library(&self) -> &L {
        &self.library
    }

    /// Opens `path` as a stream.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::Library`] when the library hands back no
    /// handle.
    pub fn create_stream(&self, path: &CStr, flags: u32) -> Result<StreamHandle, AudioError> {
        let flags = flags | self.encoder.flags();
        let handle = self
            .encoder
            .with_path(path, |arg| self.library.stream_create_file(arg, flags));
        let handle =
            NonZeroU32::new(handle).ok_or_else(|| self.failure("create stream from", path))?;
        debug!(path = %path.to_string_lossy(), handle = handle.get(), "opened stream");
        Ok(StreamHandle(handle))
    }

    /// Loads `path` as a sample playable `max` times at once.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::Library`] when the library hands back no
    /// handle.
    pub fn load_sample(
        &self,
        path: &CStr,
        max: u32,
        flags: u32,
    ) -> Result<SampleHandle, AudioError> {
        let flags = flags | self.encoder.flags();
        let handle = self
            .encoder
            .with_path(path, |arg| self.library.sample_load(arg, max, flags));
        let handle =
            NonZeroU32::new(handle).ok_or_else(|| self.failure("load sample from", path))?;
        debug!(path = %path.to_string_lossy(), handle = handle.get(), "loaded sample");
        Ok(SampleHandle(handle))
    }

    fn failure(&self, operation: &'static str, path: &CStr) -> AudioError {
        let code = self.library.error_code();
        warn!(path = %path.to_string_lossy(), %code, "{operation} failed");
        AudioError::Library {
            operation,
            path: BString::from(path.to_bytes()),
            code,
        }
    }
}
