//! # Command-Line Interface
//!
//! Entry point of the plugin executable.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `serve` | Speak the plugin protocol on stdin/stdout (default) |
//! | `capability` | Print the advertised capability |
//! | `macros` | List registered macros |
//! | `expand` | Dispatch one request read from a file |
//!
//! The compiler spawns the executable without arguments, so a bare
//! invocation runs `serve`.
//!
//! ## Output Formats
//!
//! The inspection commands support `--format`:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Logging
//!
//! Logs go to stderr. `--verbose` raises the level to `debug`; `RUST_LOG`
//! overrides both it and the configured level.

mod app;
mod expand;
mod inspect;
mod output;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
