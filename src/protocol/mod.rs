//! # Message Model
//!
//! Wire types for the compiler plugin protocol. These are plain data with no
//! behavior beyond (de)serialization.
//!
//! ## Message Flow
//!
//! ```text
//! Host (compiler)                         Plugin
//!  │                                        │
//!  ├── getCapability {protocolVersion} ───► │
//!  │ ◄─────── getCapabilityResult {…} ──────┤
//!  │                                        │
//!  ├── expandFreestandingMacro {…} ───────► │
//!  │ ◄── expandMacroResult / legacy ────────┤
//!  │                                        │
//!  ├── expandAttachedMacro {…} ───────────► │
//!  │ ◄── expandMacroResult / legacy ────────┤
//! ```
//!
//! ## Key Types
//!
//! - [`HostToPluginMessage`] / [`PluginToHostMessage`] - Request and reply envelopes
//! - [`Syntax`] - Opaque source fragment with kind and location
//! - [`Diagnostic`] - Message attached to an expansion reply
//! - [`CapabilityNegotiator`] - Version exchange

mod capability;
mod diagnostic;
mod messages;
mod syntax;

pub use capability::{
    CapabilityNegotiator, HostCapability, NegotiatedCapability, PluginCapability,
    EXPAND_MACRO_RESULT_VERSION, FEATURE_LOAD_PLUGIN_LIBRARY, PROTOCOL_VERSION_NUMBER,
};
pub use diagnostic::{Change, Diagnostic, FixIt, Note, Position, PositionRange, Severity};
pub use messages::{HostToPluginMessage, PluginToHostMessage};
pub use syntax::{MacroReference, MacroRole, SourceLocation, Syntax, SyntaxKind};
