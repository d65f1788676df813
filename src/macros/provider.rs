//! Macro implementation contract
//!
//! A macro implementation has exactly one shape, fixed when it is registered:
//! freestanding (`#name(...)`) or attached (`@Name`). The dispatcher never
//! probes an implementation at request time.

use std::fmt;

use thiserror::Error;

use crate::protocol::{Diagnostic, MacroReference, MacroRole, Syntax};

/// Failure inside a macro implementation.
///
/// The dispatcher turns any of these into a single error diagnostic; they
/// never end the session.
#[derive(Debug, Error)]
pub enum MacroError {
    #[error("{0}")]
    Expansion(String),

    #[error("cannot interpret `{source_text}`: {reason}")]
    MalformedSyntax { source_text: String, reason: String },
}

impl MacroError {
    pub fn expansion(message: impl Into<String>) -> Self {
        MacroError::Expansion(message.into())
    }

    pub fn malformed(syntax: &Syntax, reason: impl Into<String>) -> Self {
        MacroError::MalformedSyntax {
            source_text: syntax.source.clone(),
            reason: reason.into(),
        }
    }
}

/// What an implementation produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroExpansion {
    /// Replacement source text, or `None` when nothing was produced
    pub expanded_source: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl MacroExpansion {
    /// Expansion producing `source` with no diagnostics
    pub fn source(source: impl Into<String>) -> Self {
        Self {
            expanded_source: Some(source.into()),
            diagnostics: Vec::new(),
        }
    }

    /// Expansion that produced nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Absent expansion carrying a single diagnostic
    pub fn failure(diagnostic: Diagnostic) -> Self {
        Self {
            expanded_source: None,
            diagnostics: vec![diagnostic],
        }
    }

    pub fn with_diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostics.push(diagnostic);
        self
    }
}

/// Inputs to a freestanding expansion
#[derive(Debug, Clone, Copy)]
pub struct FreestandingExpansion<'a> {
    pub macro_ref: &'a MacroReference,
    pub macro_role: Option<MacroRole>,
    /// Opaque token unique to this expansion site; may seed generated names
    pub discriminator: &'a str,
    pub syntax: &'a Syntax,
}

/// Inputs to an attached expansion.
///
/// `parent_decl_syntax` is present only for roles nested in a container;
/// `extended_type_syntax` and `conformance_list_syntax` only for `extension`.
#[derive(Debug, Clone, Copy)]
pub struct AttachedExpansion<'a> {
    pub macro_ref: &'a MacroReference,
    pub macro_role: MacroRole,
    pub discriminator: &'a str,
    pub attribute_syntax: &'a Syntax,
    pub decl_syntax: &'a Syntax,
    pub parent_decl_syntax: Option<&'a Syntax>,
    pub extended_type_syntax: Option<&'a Syntax>,
    pub conformance_list_syntax: Option<&'a Syntax>,
}

/// A macro used as a standalone expression or declaration
pub trait FreestandingMacro: Send + Sync {
    fn expand(&self, request: &FreestandingExpansion<'_>) -> Result<MacroExpansion, MacroError>;
}

/// A macro applied to an existing declaration via attribute syntax
pub trait AttachedMacro: Send + Sync {
    fn expand(&self, request: &AttachedExpansion<'_>) -> Result<MacroExpansion, MacroError>;
}

/// Capability shape of an implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroShape {
    Freestanding,
    Attached,
}

impl MacroShape {
    pub fn as_str(self) -> &'static str {
        match self {
            MacroShape::Freestanding => "freestanding",
            MacroShape::Attached => "attached",
        }
    }
}

impl fmt::Display for MacroShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered implementation, tagged with its shape
pub enum MacroImplementation {
    Freestanding(Box<dyn FreestandingMacro>),
    Attached(Box<dyn AttachedMacro>),
}

impl MacroImplementation {
    pub fn freestanding(implementation: impl FreestandingMacro + 'static) -> Self {
        MacroImplementation::Freestanding(Box::new(implementation))
    }

    pub fn attached(implementation: impl AttachedMacro + 'static) -> Self {
        MacroImplementation::Attached(Box::new(implementation))
    }

    pub fn shape(&self) -> MacroShape {
        match self {
            MacroImplementation::Freestanding(_) => MacroShape::Freestanding,
            MacroImplementation::Attached(_) => MacroShape::Attached,
        }
    }
}

impl fmt::Debug for MacroImplementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MacroImplementation")
            .field(&self.shape())
            .finish()
    }
}
