//! # Macro Implementations
//!
//! The contract macro implementations fulfil, the registry that maps macro
//! references to them, and the example macros the plugin ships with.
//!
//! ## Shapes
//!
//! | Shape | Trait | Invoked for |
//! |-------|-------|-------------|
//! | Freestanding | [`FreestandingMacro`] | `expandFreestandingMacro` |
//! | Attached | [`AttachedMacro`] | `expandAttachedMacro` |
//!
//! An implementation's shape is chosen when it is registered
//! ([`MacroImplementation`]); a request for the other shape is reported as a
//! resolution failure.

pub mod builtin;
mod provider;
mod registry;

pub use provider::{
    AttachedExpansion, AttachedMacro, FreestandingExpansion, FreestandingMacro, MacroError,
    MacroExpansion, MacroImplementation, MacroShape,
};
pub use registry::{
    MacroProvider, MacroRegistry, MacroRegistryBuilder, RegistryEntry, RegistryError,
};
