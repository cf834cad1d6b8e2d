//! Hand-off of the process arguments to an externally built core.
//!
//! The core exports a single C entry point taking a run mode and the
//! argument list as a Go-style slice of Go-style strings. The structs below
//! match that layout exactly.
//!
//! Ownership
//! - [`ArgVector`] owns every argument buffer and the [`GoString`] array.
//! - [`ArgVector::as_go_slice`] lends them out; the pointers are valid until
//!   the `ArgVector` is dropped.
//! - The core must copy anything it keeps past the return of the entry
//!   point. Nothing crosses the boundary in the other direction.
use std::ffi::{OsString, c_char, c_void};

use tracing::debug;

/// Go's `int` on the target, as seen from C.
pub type GoInt = isize;

/// Go string header: pointer and byte length, not null-terminated.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct GoString {
    /// First byte of the string.
    pub p: *const c_char,
    /// Length in bytes.
    pub n: isize,
}

/// Go slice header, passed by value.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct GoSlice {
    /// First element.
    pub data: *mut c_void,
    /// Number of elements.
    pub len: GoInt,
    /// Allocated elements.
    pub cap: GoInt,
}

/// Signature of the core's entry point.
pub type CoreEntry = unsafe extern "C" fn(mode: GoInt, args: GoSlice);

/// Which front end the core starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum RunMode {
    /// Regular run driven by the command line.
    #[default]
    Normal = 0,
    /// Graphical launcher.
    Launcher = 1,
}

impl RunMode {
    /// The flag value passed to the entry point.
    #[must_use]
    pub fn flag(self) -> GoInt {
        GoInt::from(self as u8)
    }
}

/// Process arguments packaged for the core.
#[derive(Debug)]
pub struct ArgVector {
    args: Vec<Vec<u8>>,
    // Points into `args`; rebuilt only in the constructor.
    strings: Vec<GoString>,
}

impl ArgVector {
    /// Packages arguments given as narrow UTF-8 bytes.
    pub fn from_bytes<I, B>(args: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Vec<u8>>,
    {
        let args: Vec<Vec<u8>> = args.into_iter().map(Into::into).collect();
        let strings = args
            .iter()
            .map(|arg| GoString {
                p: arg.as_ptr().cast(),
                n: go_len(arg.len()),
            })
            .collect();
        Self { args, strings }
    }

    /// Packages the platform's arguments, converting each to narrow UTF-8.
    ///
    /// On Unix the raw bytes are kept as they are. On Windows the wide
    /// arguments go through the platform's UTF-16 to UTF-8 conversion, which
    /// replaces unpaired surrogates.
    pub fn from_args<I: IntoIterator<Item = OsString>>(args: I) -> Self {
        Self::from_bytes(args.into_iter().map(narrow))
    }

    /// Number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Whether there are no arguments at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// The bytes of argument `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        self.args.get(index).map(Vec::as_slice)
    }

    /// Slice header over the packaged strings, valid while `self` lives.
    #[must_use]
    pub fn as_go_slice(&self) -> GoSlice {
        GoSlice {
            data: self.strings.as_ptr().cast_mut().cast(),
            len: go_len(self.strings.len()),
            cap: go_len(self.strings.len()),
        }
    }
}

/// Calls the core's entry point with `args`.
///
/// # Safety
///
/// `entry` must be a valid function with the [`CoreEntry`] ABI that neither
/// writes through nor retains the pointers in its slice argument after it
/// returns.
pub unsafe fn launch(entry: CoreEntry, mode: RunMode, args: &ArgVector) {
    debug!(?mode, argc = args.len(), "entering core");
    // SAFETY: upheld by the caller; `args` outlives the call.
    unsafe { entry(mode.flag(), args.as_go_slice()) };
    debug!("core returned");
}

/// Hides the console window if this process created it.
///
/// A launcher started from Explorer gets a console of its own that only
/// shows log noise; a console inherited from a shell is left alone. Returns
/// whether a window was hidden. Always `false` off Windows.
pub fn hide_own_console() -> bool {
    #[cfg(windows)]
    {
        use winapi::um::{
            processthreadsapi::GetCurrentProcessId,
            wincon::GetConsoleWindow,
            winuser::{GetWindowThreadProcessId, SW_HIDE, ShowWindow},
        };

        // SAFETY: plain Win32 queries on the current process; a null window
        // is checked before it is used.
        unsafe {
            let window = GetConsoleWindow();
            if window.is_null() {
                return false;
            }
            let mut owner = 0;
            GetWindowThreadProcessId(window, &raw mut owner);
            if owner != GetCurrentProcessId() {
                debug!(owner, "console belongs to another process");
                return false;
            }
            ShowWindow(window, SW_HIDE);
            debug!("hid own console window");
            true
        }
    }
    #[cfg(not(windows))]
    {
        false
    }
}

#[allow(clippy::cast_possible_wrap)]
fn go_len(len: usize) -> isize {
    // Allocation sizes never exceed isize::MAX.
    len as isize
}

#[cfg(unix)]
fn narrow(arg: OsString) -> Vec<u8> {
    use std::os::unix::ffi::OsStringExt;
    arg.into_vec()
}

#[cfg(not(unix))]
fn narrow(arg: OsString) -> Vec<u8> {
    arg.into_string()
        .unwrap_or_else(|arg| arg.to_string_lossy().into_owned())
        .into_bytes()
}
