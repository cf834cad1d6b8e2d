//! Process entry point for the externally built core.
//!
//! Packages `argv` and calls `core_main`, which must be supplied at link
//! time, e.g. `RUSTFLAGS="-L <dir> -l core"`. Log output goes to stderr and
//! is filtered with `RUST_LOG`. In launcher mode a console window opened
//! just for this process is hidden.

use std::{env, io};

use tracing_subscriber::EnvFilter;
use wideconv_platform::bootstrap::{
    ArgVector, GoInt, GoSlice, RunMode, hide_own_console, launch,
};

unsafe extern "C" {
    fn core_main(mode: GoInt, args: GoSlice);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mode = if cfg!(feature = "launcher") {
        hide_own_console();
        RunMode::Launcher
    } else {
        RunMode::Normal
    };
    let args = ArgVector::from_args(env::args_os());

    // SAFETY: `core_main` copies what it needs from the arguments before
    // returning, and `args` lives until the end of `main`.
    unsafe { launch(core_main, mode, &args) };
}
