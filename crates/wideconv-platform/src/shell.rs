//! Taskbar progress, "reveal in file manager" and URL opening integration.
//!
//! [`ShellContext`] replaces the process-wide globals a shell integration
//! usually carries. It initializes COM at most once, creates the taskbar
//! object on first use, and retries creation on the next call if it failed.
//! All of it is guarded, so a context can be shared between threads whenever
//! the wrapped [`ShellApi`] allows it.
use std::{path::Path, process::Command};

use bstr::BString;
use parking_lot::{Mutex, Once};
use tracing::{debug, warn};
use wideconv::{WideString, convert};

use crate::ShellError;

/// Opaque native window handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub isize);

/// Progress indicator state of a taskbar button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum TaskbarState {
    /// No progress shown.
    NoProgress = 0,
    /// Pulsing indicator without a value.
    Indeterminate = 1,
    /// Regular progress.
    Normal = 2,
    /// Progress shown in the error color.
    Error = 4,
    /// Progress shown in the paused color.
    Paused = 8,
}

/// Native shell calls used by [`ShellContext`].
///
/// Result codes follow `HRESULT` conventions: negative values are failures.
pub trait ShellApi {
    /// The taskbar list object.
    type Taskbar;
    /// An absolute item id list; dropping it frees the list.
    type ItemList;

    /// Initializes COM for the calling process.
    fn initialize_com(&self) -> i32;

    /// Instantiates the taskbar list object.
    ///
    /// # Errors
    ///
    /// Returns the failing `HRESULT`.
    fn create_taskbar(&self) -> Result<Self::Taskbar, i32>;

    /// Sets the progress state of `window`'s taskbar button.
    fn set_progress_state(
        &self,
        taskbar: &Self::Taskbar,
        window: WindowHandle,
        state: TaskbarState,
    ) -> i32;

    /// Sets the progress value of `window`'s taskbar button.
    fn set_progress_value(
        &self,
        taskbar: &Self::Taskbar,
        window: WindowHandle,
        completed: u64,
        total: u64,
    ) -> i32;

    /// Resolves a null-terminated wide path into an item list.
    fn create_item_list(&self, path: &WideString) -> Option<Self::ItemList>;

    /// Opens the folder holding `items` with the item selected.
    fn open_folder_and_select(&self, items: &Self::ItemList) -> i32;
}

/// Lazily initialized shell state.
pub struct ShellContext<A: ShellApi> {
    api: A,
    com: Once,
    taskbar: Mutex<Option<A::Taskbar>>,
}

impl<A: ShellApi> ShellContext<A> {
    /// Wraps `api` without touching it; nothing is initialized until the
    /// first call.
    pub fn new(api: A) -> Self {
        Self {
            api,
            com: Once::new(),
            taskbar: Mutex::new(None),
        }
    }

    /// The wrapped API.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Sets the progress state of `window`'s taskbar button.
    ///
    /// # Errors
    ///
    /// Fails if the taskbar object cannot be created or the call fails.
    pub fn set_progress_state(
        &self,
        window: WindowHandle,
        state: TaskbarState,
    ) -> Result<(), ShellError> {
        let hr =
            self.with_taskbar(|taskbar| self.api.set_progress_state(taskbar, window, state))?;
        check("SetProgressState", hr)
    }

    /// Shows `completed` out of `total` on `window`'s taskbar button.
    ///
    /// # Errors
    ///
    /// Fails if the taskbar object cannot be created or the call fails.
    pub fn set_progress(
        &self,
        window: WindowHandle,
        completed: u64,
        total: u64,
    ) -> Result<(), ShellError> {
        let hr = self.with_taskbar(|taskbar| {
            self.api
                .set_progress_value(taskbar, window, completed, total)
        })?;
        check("SetProgressValue", hr)
    }

    /// Opens the file manager on the folder holding `path`, with the item
    /// selected. `path` is narrow UTF-8 and is converted before the call.
    ///
    /// # Errors
    ///
    /// [`ShellError::ItemNotFound`] if the shell cannot resolve the path,
    /// [`ShellError::Api`] if opening the folder fails.
    pub fn reveal_in_explorer(&self, path: &[u8]) -> Result<(), ShellError> {
        self.ensure_com();
        let wide = convert(path);
        let items = self
            .api
            .create_item_list(&wide)
            .ok_or_else(|| ShellError::ItemNotFound(BString::from(path)))?;
        check(
            "SHOpenFolderAndSelectItems",
            self.api.open_folder_and_select(&items),
        )
    }

    fn ensure_com(&self) {
        self.com.call_once(|| {
            let hr = self.api.initialize_com();
            debug!(hresult = hr, "initialized COM");
        });
    }

    fn with_taskbar<R>(&self, f: impl FnOnce(&A::Taskbar) -> R) -> Result<R, ShellError> {
        self.ensure_com();
        let mut slot = self.taskbar.lock();
        if let Some(taskbar) = slot.as_ref() {
            return Ok(f(taskbar));
        }
        match self.api.create_taskbar() {
            Ok(taskbar) => {
                debug!("created taskbar list");
                Ok(f(slot.insert(taskbar)))
            }
            Err(hresult) => {
                warn!(hresult, "could not create taskbar list");
                Err(ShellError::Api {
                    call: "CoCreateInstance",
                    hresult,
                })
            }
        }
    }
}

fn check(call: &'static str, hresult: i32) -> Result<(), ShellError> {
    if hresult < 0 {
        warn!(call, hresult, "shell call failed");
        return Err(ShellError::Api { call, hresult });
    }
    Ok(())
}

/// Builds the command that shows `path` in the platform's file manager.
///
/// On Linux there is no standard way to select a file, so the containing
/// directory is opened instead.
///
/// # Errors
///
/// [`ShellError::UnsupportedPlatform`] on targets without a known file
/// manager.
pub fn reveal_command(path: &Path) -> Result<Command, ShellError> {
    if cfg!(target_os = "linux") {
        let target = match path.metadata() {
            Ok(meta) if !meta.is_dir() => path.parent().unwrap_or(path),
            _ => path,
        };
        let mut command = Command::new("xdg-open");
        command.arg(target);
        Ok(command)
    } else if cfg!(windows) {
        let mut command = Command::new("explorer");
        command.arg("/select,").arg(path);
        Ok(command)
    } else if cfg!(target_os = "macos") {
        let mut command = Command::new("open");
        command.arg("-R").arg(path);
        Ok(command)
    } else {
        Err(ShellError::UnsupportedPlatform)
    }
}

/// Builds the command that opens `url` in the default handler, usually a
/// browser.
///
/// # Errors
///
/// [`ShellError::UnsupportedPlatform`] on targets without a known handler.
pub fn open_url_command(url: &str) -> Result<Command, ShellError> {
    let mut command = if cfg!(target_os = "linux") {
        Command::new("xdg-open")
    } else if cfg!(windows) {
        let mut command = Command::new("rundll32");
        command.arg("url.dll,FileProtocolHandler");
        command
    } else if cfg!(target_os = "macos") {
        Command::new("open")
    } else {
        return Err(ShellError::UnsupportedPlatform);
    };
    command.arg(url);
    Ok(command)
}
