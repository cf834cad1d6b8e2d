#![expect(missing_docs)]

use std::{
    cell::RefCell,
    ffi::CStr,
    num::NonZeroU32,
    sync::{
        Arc,
        atomic::{AtomicI32, AtomicU32, Ordering},
    },
    thread,
};

use bstr::BString;
use rstest::rstest;
use wideconv::{REPLACEMENT, WideString};
use wideconv_platform::{
    AudioError, AudioLibrary, AudioLoader, ErrorCode, NarrowPaths, PathArg, ShellApi, ShellContext,
    ShellError, TaskbarState, WidePaths, WindowHandle,
    audio::{STREAM_DECODE, STREAM_PRESCAN},
    encoding::UNICODE,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}

// ─────────────────────────────────────────────────────────────────────
// Audio loader
// ─────────────────────────────────────────────────────────────────────

/// What the fake library saw for one call.
#[derive(Debug, Clone, PartialEq)]
enum SeenPath {
    Narrow(Vec<u8>),
    Wide(Vec<u16>),
}

/// Reads the path back through the raw pointer, the way the native library
/// would, stopping at the terminator.
fn read_back(path: PathArg<'_>, flags: u32) -> SeenPath {
    let ptr = path.as_ptr();
    if flags & UNICODE != 0 {
        let ptr = ptr.cast::<u16>();
        let mut units = Vec::new();
        // SAFETY: wide paths are null-terminated and alive for the call.
        unsafe {
            let mut i = 0;
            while *ptr.add(i) != 0 {
                units.push(*ptr.add(i));
                i += 1;
            }
        }
        SeenPath::Wide(units)
    } else {
        // SAFETY: narrow paths are C strings alive for the call.
        let s = unsafe { CStr::from_ptr(ptr.cast()) };
        SeenPath::Narrow(s.to_bytes().to_vec())
    }
}

#[derive(Default)]
struct FakeAudio {
    next_handle: u32,
    error: i32,
    calls: RefCell<Vec<(SeenPath, u32)>>,
}

impl AudioLibrary for FakeAudio {
    fn stream_create_file(&self, path: PathArg<'_>, flags: u32) -> u32 {
        self.calls.borrow_mut().push((read_back(path, flags), flags));
        self.next_handle
    }

    fn sample_load(&self, path: PathArg<'_>, max: u32, flags: u32) -> u32 {
        assert_eq!(max, 32);
        self.calls.borrow_mut().push((read_back(path, flags), flags));
        self.next_handle
    }

    fn error_code(&self) -> ErrorCode {
        ErrorCode(self.error)
    }
}

fn opened(handle: u32) -> FakeAudio {
    FakeAudio {
        next_handle: handle,
        ..Default::default()
    }
}

const SONG: &CStr = c"C:\\Songs\\Caf\xC3\xA9 del Mar\\audio.mp3";

#[test]
fn wide_loader_converts_path_and_sets_flag() {
    init_tracing();
    let loader = AudioLoader::with_encoder(opened(7), WidePaths::default());
    let handle = loader
        .create_stream(SONG, STREAM_DECODE | STREAM_PRESCAN)
        .unwrap();
    assert_eq!(handle.0, NonZeroU32::new(7).unwrap());

    let calls = loader.library().calls.borrow();
    let expected: Vec<u16> = "C:\\Songs\\Café del Mar\\audio.mp3".encode_utf16().collect();
    assert_eq!(
        calls.as_slice(),
        [(
            SeenPath::Wide(expected),
            STREAM_DECODE | STREAM_PRESCAN | UNICODE
        )]
    );
}

#[test]
fn narrow_loader_bypasses_conversion() {
    init_tracing();
    let loader = AudioLoader::with_encoder(opened(3), NarrowPaths);
    loader.load_sample(SONG, 32, 0).unwrap();

    let calls = loader.library().calls.borrow();
    assert_eq!(
        calls.as_slice(),
        [(SeenPath::Narrow(SONG.to_bytes().to_vec()), 0)]
    );
}

#[test]
fn malformed_path_reaches_library_with_replacements() {
    let loader = AudioLoader::with_encoder(opened(1), WidePaths::default());
    loader.create_stream(c"a\x80b\xE2\x82", 0).unwrap();

    let calls = loader.library().calls.borrow();
    assert_eq!(
        calls[0].0,
        SeenPath::Wide(vec![0x61, REPLACEMENT, 0x62, REPLACEMENT])
    );
}

#[rstest]
#[case::file_open(2, "can't open the file (code 2)")]
#[case::file_format(41, "unsupported file format (code 41)")]
#[case::unknown(-1, "some other mystery error (code -1)")]
#[case::unlisted(9999, "unknown error code (code 9999)")]
fn zero_handle_surfaces_library_error(#[case] code: i32, #[case] message: &str) {
    init_tracing();
    let library = FakeAudio {
        error: code,
        ..Default::default()
    };
    let loader = AudioLoader::with_encoder(library, WidePaths::default());
    let err = loader.create_stream(c"missing.ogg", 0).unwrap_err();
    assert_eq!(
        err,
        AudioError::Library {
            operation: "create stream from",
            path: BString::from("missing.ogg"),
            code: ErrorCode(code),
        }
    );
    assert_eq!(
        err.to_string(),
        format!("failed to create stream from \"missing.ogg\": {message}")
    );
}

#[test]
fn error_message_escapes_invalid_utf8_paths() {
    let library = FakeAudio {
        error: ErrorCode::FILE_OPEN.0,
        ..Default::default()
    };
    let loader = AudioLoader::with_encoder(library, NarrowPaths);
    let err = loader.load_sample(c"bad\xFF.wav", 32, 0).unwrap_err();
    insta::assert_snapshot!(err, @r#"failed to load sample from "bad\xFF.wav": can't open the file (code 2)"#);
}

// ─────────────────────────────────────────────────────────────────────
// Shell context
// ─────────────────────────────────────────────────────────────────────

/// Shell that fails taskbar creation a fixed number of times.
#[derive(Default)]
struct FakeShell {
    com_inits: AtomicU32,
    creations: AtomicU32,
    failures_left: AtomicU32,
    last_progress: AtomicI32,
    state_result: i32,
    revealed: parking_lot::Mutex<Vec<Vec<u16>>>,
}

#[derive(Debug)]
struct FakeTaskbar(u32);

struct FakeItems(Vec<u16>);

impl ShellApi for FakeShell {
    type Taskbar = FakeTaskbar;
    type ItemList = FakeItems;

    fn initialize_com(&self) -> i32 {
        self.com_inits.fetch_add(1, Ordering::SeqCst);
        0
    }

    fn create_taskbar(&self) -> Result<FakeTaskbar, i32> {
        let attempt = self.creations.fetch_add(1, Ordering::SeqCst);
        if self.failures_left.load(Ordering::SeqCst) > 0 {
            self.failures_left.fetch_sub(1, Ordering::SeqCst);
            return Err(-2_147_221_164);
        }
        Ok(FakeTaskbar(attempt))
    }

    fn set_progress_state(&self, _: &FakeTaskbar, _: WindowHandle, _: TaskbarState) -> i32 {
        self.state_result
    }

    fn set_progress_value(
        &self,
        _: &FakeTaskbar,
        _: WindowHandle,
        completed: u64,
        total: u64,
    ) -> i32 {
        let percent = i32::try_from(completed * 100 / total).unwrap();
        self.last_progress.store(percent, Ordering::SeqCst);
        0
    }

    fn create_item_list(&self, path: &WideString) -> Option<FakeItems> {
        assert_eq!(path.as_slice_with_nul().last(), Some(&0));
        path.starts_with(&[u16::from(b'C')])
            .then(|| FakeItems(path.to_vec()))
    }

    fn open_folder_and_select(&self, items: &FakeItems) -> i32 {
        self.revealed.lock().push(items.0.clone());
        0
    }
}

#[test]
fn taskbar_creation_retried_after_failure() {
    init_tracing();
    let shell = ShellContext::new(FakeShell {
        failures_left: AtomicU32::new(1),
        ..Default::default()
    });
    let window = WindowHandle(0x1234);

    assert!(matches!(
        shell.set_progress(window, 1, 4),
        Err(ShellError::Api {
            call: "CoCreateInstance",
            ..
        })
    ));
    shell.set_progress(window, 1, 4).unwrap();
    shell.set_progress(window, 3, 4).unwrap();
    shell.set_progress_state(window, TaskbarState::Paused).unwrap();

    let api = shell.api();
    assert_eq!(api.creations.load(Ordering::SeqCst), 2);
    assert_eq!(api.com_inits.load(Ordering::SeqCst), 1);
    assert_eq!(api.last_progress.load(Ordering::SeqCst), 75);
}

#[test]
fn failing_progress_state_is_reported() {
    let shell = ShellContext::new(FakeShell {
        state_result: -1,
        ..Default::default()
    });
    let err = shell
        .set_progress_state(WindowHandle(1), TaskbarState::Error)
        .unwrap_err();
    insta::assert_snapshot!(err, @"SetProgressState failed with HRESULT 0xffffffff");
}

#[test]
fn reveal_converts_path_once_per_call() {
    let shell = ShellContext::new(FakeShell::default());
    shell
        .reveal_in_explorer("C:\\Replays\\Ünïcode.osr".as_bytes())
        .unwrap();
    assert_eq!(
        shell.api().revealed.lock().as_slice(),
        [
            "C:\\Replays\\Ünïcode.osr"
                .encode_utf16()
                .collect::<Vec<_>>()
        ]
    );

    assert_eq!(
        shell.reveal_in_explorer(b"D:\\gone.osr"),
        Err(ShellError::ItemNotFound(BString::from("D:\\gone.osr")))
    );
}

#[test]
fn shared_context_initializes_once_across_threads() {
    init_tracing();
    let shell = Arc::new(ShellContext::new(FakeShell::default()));
    let workers: Vec<_> = (0..8)
        .map(|i| {
            let shell = Arc::clone(&shell);
            thread::spawn(move || shell.set_progress(WindowHandle(i), 1, 2))
        })
        .collect();
    for worker in workers {
        worker.join().unwrap().unwrap();
    }

    assert_eq!(shell.api().com_inits.load(Ordering::SeqCst), 1);
    assert_eq!(shell.api().creations.load(Ordering::SeqCst), 1);
}
