//! Capability descriptors and version negotiation
//!
//! The host announces its protocol version with `getCapability`; the plugin
//! answers with its own version and feature list. The plugin never lowers its
//! advertised version. Instead, the response shapes it emits are chosen from
//! the lower of the two versions ([`NegotiatedCapability`]).

use serde::{Deserialize, Serialize};

/// Protocol revision implemented by this crate.
///
/// 7: pass extension protocol list.
pub const PROTOCOL_VERSION_NUMBER: u32 = 7;

/// First revision in which `expandMacroResult` replaced the separate
/// freestanding and attached result messages.
pub const EXPAND_MACRO_RESULT_VERSION: u32 = 5;

/// Feature advertised by plugins that implement `loadPluginLibrary`
pub const FEATURE_LOAD_PLUGIN_LIBRARY: &str = "load-plugin-library";

/// Capability declared by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostCapability {
    pub protocol_version: u32,
}

impl HostCapability {
    pub fn new(protocol_version: u32) -> Self {
        Self { protocol_version }
    }
}

/// Capability declared by the plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginCapability {
    pub protocol_version: u32,

    /// Optional features this plugin provides, in the order sent. Open set;
    /// unknown entries are ignored by peers that don't understand them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

impl PluginCapability {
    pub fn new(protocol_version: u32) -> Self {
        Self {
            protocol_version,
            features: None,
        }
    }

    /// Adds an advertised feature
    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        let feature = feature.into();
        let features = self.features.get_or_insert_with(Vec::new);
        if !features.contains(&feature) {
            features.push(feature);
        }
        self
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.features
            .as_ref()
            .is_some_and(|features| features.iter().any(|f| f == feature))
    }
}

impl Default for PluginCapability {
    fn default() -> Self {
        Self::new(PROTOCOL_VERSION_NUMBER)
    }
}

/// The capability level both sides agreed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiatedCapability {
    pub host_version: u32,
    pub plugin_version: u32,
}

impl NegotiatedCapability {
    /// Capability assumed before (or without) a `getCapability` exchange
    pub fn legacy(plugin_version: u32) -> Self {
        Self {
            host_version: 0,
            plugin_version,
        }
    }

    /// The lower of the two declared versions
    pub fn protocol_version(&self) -> u32 {
        self.host_version.min(self.plugin_version)
    }

    /// Whether replies use the unified `expandMacroResult` message
    pub fn has_expand_macro_result(&self) -> bool {
        self.protocol_version() >= EXPAND_MACRO_RESULT_VERSION
    }
}

/// Answers `getCapability` and records what was agreed
#[derive(Debug, Clone)]
pub struct CapabilityNegotiator {
    capability: PluginCapability,
}

impl CapabilityNegotiator {
    pub fn new(capability: PluginCapability) -> Self {
        Self { capability }
    }

    /// The capability this plugin advertises
    pub fn capability(&self) -> &PluginCapability {
        &self.capability
    }

    /// Returns the plugin's own capability unchanged, whatever the host sent.
    ///
    /// An absent host capability is a legacy host at version 0.
    pub fn negotiate(
        &self,
        host: Option<HostCapability>,
    ) -> (PluginCapability, NegotiatedCapability) {
        let negotiated = NegotiatedCapability {
            host_version: host.map_or(0, |host| host.protocol_version),
            plugin_version: self.capability.protocol_version,
        };
        (self.capability.clone(), negotiated)
    }
}

impl Default for CapabilityNegotiator {
    fn default() -> Self {
        Self::new(PluginCapability::default())
    }
}
