use bstr::BString;
use thiserror::Error;

use crate::audio::ErrorCode;

/// Failure reported by the audio library while opening a file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// The library returned a zero handle.
    #[error("failed to {operation} {path:?}: {code}")]
    Library {
        /// Which call failed, `"create stream from"` or `"load sample from"`.
        operation: &'static str,
        /// The narrow path as the caller supplied it.
        path: BString,
        /// The library's last error code.
        code: ErrorCode,
    },
}

/// Failure of a shell integration call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShellError {
    /// The shell could not build an item list for the path.
    #[error("no shell item for {0:?}")]
    ItemNotFound(BString),
    /// A shell API returned a failing `HRESULT`.
    #[error("{call} failed with HRESULT {hresult:#010x}")]
    Api {
        /// Name of the failing call.
        call: &'static str,
        /// The raw result code.
        hresult: i32,
    },
    /// The target has no known file manager.
    #[error("revealing files is not supported on this platform")]
    UnsupportedPlatform,
}
