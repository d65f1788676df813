//! Host ↔ plugin message envelopes
//!
//! Each message is a JSON object with a single key naming the case, e.g.
//!
//! ```text
//! {"getCapability": {"capability": {"protocolVersion": 7}}}
//! ```
//!
//! Unknown case names fail to decode. Unknown keys inside a case are ignored
//! so that newer hosts can add fields without breaking older plugins.

use serde::{Deserialize, Serialize};

use super::capability::{HostCapability, PluginCapability};
use super::diagnostic::Diagnostic;
use super::syntax::{MacroReference, MacroRole, Syntax};

/// A request sent by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum HostToPluginMessage {
    /// Send the host's capability and ask for the plugin's
    GetCapability {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        capability: Option<HostCapability>,
    },

    /// Expand a `#freestanding` macro
    ExpandFreestandingMacro {
        #[serde(rename = "macro")]
        macro_ref: MacroReference,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        macro_role: Option<MacroRole>,
        discriminator: String,
        syntax: Syntax,
    },

    /// Expand an `@attached` macro
    ExpandAttachedMacro {
        #[serde(rename = "macro")]
        macro_ref: MacroReference,
        macro_role: MacroRole,
        discriminator: String,
        attribute_syntax: Syntax,
        decl_syntax: Syntax,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_decl_syntax: Option<Syntax>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        extended_type_syntax: Option<Syntax>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        conformance_list_syntax: Option<Syntax>,
    },

    /// Load a dynamic library; `module_name` hints at the module it provides
    LoadPluginLibrary {
        library_path: String,
        module_name: String,
    },
}

impl HostToPluginMessage {
    /// Case name as it appears on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            HostToPluginMessage::GetCapability { .. } => "getCapability",
            HostToPluginMessage::ExpandFreestandingMacro { .. } => "expandFreestandingMacro",
            HostToPluginMessage::ExpandAttachedMacro { .. } => "expandAttachedMacro",
            HostToPluginMessage::LoadPluginLibrary { .. } => "loadPluginLibrary",
        }
    }
}

/// A reply sent by the plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PluginToHostMessage {
    GetCapabilityResult {
        capability: PluginCapability,
    },

    /// Unified expansion reply for hosts at protocol version 5 or later
    ExpandMacroResult {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expanded_source: Option<String>,
        diagnostics: Vec<Diagnostic>,
    },

    /// Legacy freestanding reply
    ExpandFreestandingMacroResult {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expanded_source: Option<String>,
        diagnostics: Vec<Diagnostic>,
    },

    /// Legacy attached reply carrying one fragment per expansion
    ExpandAttachedMacroResult {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expanded_sources: Option<Vec<String>>,
        diagnostics: Vec<Diagnostic>,
    },

    LoadPluginLibraryResult {
        loaded: bool,
        diagnostics: Vec<Diagnostic>,
    },
}

impl PluginToHostMessage {
    /// Case name as it appears on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            PluginToHostMessage::GetCapabilityResult { .. } => "getCapabilityResult",
            PluginToHostMessage::ExpandMacroResult { .. } => "expandMacroResult",
            PluginToHostMessage::ExpandFreestandingMacroResult { .. } => {
                "expandFreestandingMacroResult"
            }
            PluginToHostMessage::ExpandAttachedMacroResult { .. } => "expandAttachedMacroResult",
            PluginToHostMessage::LoadPluginLibraryResult { .. } => "loadPluginLibraryResult",
        }
    }

    /// Diagnostics carried by the reply, empty for capability results
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            PluginToHostMessage::GetCapabilityResult { .. } => &[],
            PluginToHostMessage::ExpandMacroResult { diagnostics, .. }
            | PluginToHostMessage::ExpandFreestandingMacroResult { diagnostics, .. }
            | PluginToHostMessage::ExpandAttachedMacroResult { diagnostics, .. }
            | PluginToHostMessage::LoadPluginLibraryResult { diagnostics, .. } => diagnostics,
        }
    }
}
