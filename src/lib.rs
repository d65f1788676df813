//! compiler-plugin - A macro expansion plugin for the Swift compiler
//!
//! The compiler spawns the plugin as a child process and exchanges JSON
//! messages with it over stdin/stdout. The plugin negotiates a protocol
//! version, resolves each macro reference against its registry, runs the
//! implementation, and replies with the expanded source and diagnostics in
//! the shape the negotiated version expects.

pub mod cli;
pub mod config;
pub mod macros;
pub mod plugin;
pub mod protocol;

pub use config::Config;
pub use macros::{MacroExpansion, MacroRegistry};
pub use plugin::{MessageHandler, PluginSession};
pub use protocol::{HostToPluginMessage, PluginToHostMessage};
