//! Platform boundary adapters around [`wideconv`].
//!
//! Everything here is thin glue between narrow UTF-8 strings and native
//! APIs: loading audio files by path, taskbar progress and revealing files in
//! the file manager, a monotonic clock, and handing the process arguments to
//! an externally built core. Native libraries are reached through traits
//! ([`AudioLibrary`], [`ShellApi`]) so that the glue can be exercised without
//! them.

pub mod audio;
pub mod bootstrap;
pub mod encoding;
mod error;
pub mod shell;
pub mod timer;

pub use audio::{AudioLibrary, AudioLoader, ErrorCode, SampleHandle, StreamHandle};
pub use bootstrap::{ArgVector, RunMode};
pub use encoding::{NarrowPaths, NativePaths, PathArg, PathEncoder, WidePaths};
pub use error::{AudioError, ShellError};
pub use shell::{ShellApi, ShellContext, TaskbarState, WindowHandle};
pub use timer::Clock;
