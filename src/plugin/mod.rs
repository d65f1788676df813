//! # Plugin Runtime
//!
//! Serves the compiler plugin protocol over a byte stream.
//!
//! ## Overview
//!
//! The compiler spawns the plugin executable and talks to it over
//! stdin/stdout. Each request gets exactly one reply, in order.
//!
//! ```text
//! Compiler                        Plugin
//!  │                               │
//!  ├── Spawn: compiler-plugin      │
//!  │                               │
//!  ├── Stdin:  [len]{"getCapability": {...}}
//!  └── Stdout: [len]{"getCapabilityResult": {...}}
//! ```
//!
//! ## Reply Shapes
//!
//! | Negotiated version | Freestanding reply | Attached reply |
//! |--------------------|--------------------|----------------|
//! | < 5 | `expandFreestandingMacroResult` | `expandAttachedMacroResult` |
//! | >= 5 | `expandMacroResult` | `expandMacroResult` |
//!
//! ## Key Types
//!
//! - [`MessageHandler`] - Routes requests to macros and builds replies
//! - [`PluginSession`] - The sequential request/reply loop
//! - [`MessageReader`] / [`MessageWriter`] - Framing

mod handler;
mod session;
mod transport;

pub use handler::{HandlerOptions, MessageHandler, ResultShape};
pub use session::{serve_stdio, PluginSession, SessionStats};
pub use transport::{
    Framing, MessageReader, MessageWriter, TransportError, DEFAULT_MAX_FRAME_BYTES,
};
