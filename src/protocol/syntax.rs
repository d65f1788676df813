//! Source fragments, locations and macro identities carried by requests

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a syntax fragment came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    /// Module name plus file name without directories, as `#fileID` produces
    #[serde(rename = "fileID")]
    pub file_id: String,

    /// Full path of the file, as `#filePath` produces
    pub file_name: String,

    /// UTF-8 byte offset into the file contents
    pub offset: usize,

    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(
        file_id: impl Into<String>,
        file_name: impl Into<String>,
        offset: usize,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            file_id: file_id.into(),
            file_name: file_name.into(),
            offset,
            line,
            column,
        }
    }
}

/// Syntactic category of a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyntaxKind {
    Declaration,
    Statement,
    Expression,
    Type,
    Pattern,
    Attribute,
}

/// A fragment of source text as the host saw it.
///
/// The text is never parsed by the protocol layer; macros receive it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Syntax {
    pub kind: SyntaxKind,
    pub source: String,
    pub location: SourceLocation,
}

impl Syntax {
    pub fn new(kind: SyntaxKind, source: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            source: source.into(),
            location,
        }
    }
}

/// Identifies the implementation a macro declaration points at
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroReference {
    /// Module providing the implementation (registry key, part 1)
    pub module_name: String,

    /// Implementation type within the module (registry key, part 2)
    pub type_name: String,

    /// Name of the `macro` declaration the client used; diagnostics only
    #[serde(rename = "name")]
    pub declared_name: String,
}

impl MacroReference {
    pub fn new(
        module_name: impl Into<String>,
        type_name: impl Into<String>,
        declared_name: impl Into<String>,
    ) -> Self {
        Self {
            module_name: module_name.into(),
            type_name: type_name.into(),
            declared_name: declared_name.into(),
        }
    }
}

impl fmt::Display for MacroReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' (module '{}', type '{}')",
            self.declared_name, self.module_name, self.type_name
        )
    }
}

/// The role a macro expansion plays at its use site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MacroRole {
    Expression,
    Declaration,
    Accessor,
    MemberAttribute,
    Member,
    Peer,
    Conformance,
    CodeItem,
    Extension,
}

impl MacroRole {
    pub const ALL: [MacroRole; 9] = [
        MacroRole::Expression,
        MacroRole::Declaration,
        MacroRole::Accessor,
        MacroRole::MemberAttribute,
        MacroRole::Member,
        MacroRole::Peer,
        MacroRole::Conformance,
        MacroRole::CodeItem,
        MacroRole::Extension,
    ];

    /// Roles a freestanding (`#name(...)`) expansion may carry
    pub fn is_freestanding(self) -> bool {
        matches!(
            self,
            MacroRole::Expression | MacroRole::Declaration | MacroRole::CodeItem
        )
    }

    /// Roles an attached (`@Name`) expansion may carry
    pub fn is_attached(self) -> bool {
        !self.is_freestanding()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MacroRole::Expression => "expression",
            MacroRole::Declaration => "declaration",
            MacroRole::Accessor => "accessor",
            MacroRole::MemberAttribute => "memberAttribute",
            MacroRole::Member => "member",
            MacroRole::Peer => "peer",
            MacroRole::Conformance => "conformance",
            MacroRole::CodeItem => "codeItem",
            MacroRole::Extension => "extension",
        }
    }
}

impl fmt::Display for MacroRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
