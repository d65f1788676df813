//! Request dispatch
//!
//! [`MessageHandler`] turns one decoded host request into exactly one reply.
//! Macro failures of any kind (not found, wrong shape, `Err`, panic) become
//! diagnostics on the reply; nothing a macro does can end the session.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error, warn};

use crate::macros::{
    AttachedExpansion, FreestandingExpansion, MacroError, MacroExpansion, MacroImplementation,
    MacroRegistry, MacroShape,
};
use crate::protocol::{
    CapabilityNegotiator, Diagnostic, HostCapability, HostToPluginMessage, MacroReference,
    NegotiatedCapability, PluginCapability, PluginToHostMessage, Position, Syntax,
};

/// Handler behavior switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerOptions {
    /// Append a pretty-printed copy of the request to every expansion.
    /// Development aid only; hosts never expect it.
    pub echo_requests: bool,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            echo_requests: cfg!(feature = "request-echo"),
        }
    }
}

/// Which reply message carries an expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// `expandMacroResult`
    Unified,
    /// `expandFreestandingMacroResult`
    LegacyFreestanding,
    /// `expandAttachedMacroResult`
    LegacyAttached,
}

impl ResultShape {
    pub fn freestanding(capability: &NegotiatedCapability) -> Self {
        if capability.has_expand_macro_result() {
            ResultShape::Unified
        } else {
            ResultShape::LegacyFreestanding
        }
    }

    pub fn attached(capability: &NegotiatedCapability) -> Self {
        if capability.has_expand_macro_result() {
            ResultShape::Unified
        } else {
            ResultShape::LegacyAttached
        }
    }

    /// Encodes an expansion in this shape.
    ///
    /// The legacy attached reply carries a list; a present expansion becomes a
    /// one-element list and an absent one stays absent (never `[]`).
    pub fn encode(self, expansion: MacroExpansion) -> PluginToHostMessage {
        let MacroExpansion {
            expanded_source,
            diagnostics,
        } = expansion;

        match self {
            ResultShape::Unified => PluginToHostMessage::ExpandMacroResult {
                expanded_source,
                diagnostics,
            },
            ResultShape::LegacyFreestanding => PluginToHostMessage::ExpandFreestandingMacroResult {
                expanded_source,
                diagnostics,
            },
            ResultShape::LegacyAttached => PluginToHostMessage::ExpandAttachedMacroResult {
                expanded_sources: expanded_source.map(|source| vec![source]),
                diagnostics,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    AwaitingCapability,
    Negotiated(NegotiatedCapability),
}

/// Per-connection protocol state machine
pub struct MessageHandler {
    registry: MacroRegistry,
    negotiator: CapabilityNegotiator,
    options: HandlerOptions,
    state: SessionState,
}

impl MessageHandler {
    pub fn new(registry: MacroRegistry, capability: PluginCapability) -> Self {
        Self {
            registry,
            negotiator: CapabilityNegotiator::new(capability),
            options: HandlerOptions::default(),
            state: SessionState::AwaitingCapability,
        }
    }

    pub fn with_options(mut self, options: HandlerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &MacroRegistry {
        &self.registry
    }

    pub fn capability(&self) -> &PluginCapability {
        self.negotiator.capability()
    }

    /// Capability in effect; before `getCapability` the host counts as legacy
    pub fn negotiated(&self) -> NegotiatedCapability {
        match self.state {
            SessionState::AwaitingCapability => {
                NegotiatedCapability::legacy(self.capability().protocol_version)
            }
            SessionState::Negotiated(negotiated) => negotiated,
        }
    }

    pub fn is_negotiated(&self) -> bool {
        matches!(self.state, SessionState::Negotiated(_))
    }

    /// Handles one request and returns its reply
    pub fn handle(&mut self, message: &HostToPluginMessage) -> PluginToHostMessage {
        debug!(kind = message.kind(), "handling request");

        match message {
            HostToPluginMessage::GetCapability { capability } => self.get_capability(*capability),

            HostToPluginMessage::ExpandFreestandingMacro {
                macro_ref,
                macro_role,
                discriminator,
                syntax,
            } => self.expand_freestanding_macro(
                message,
                FreestandingExpansion {
                    macro_ref,
                    macro_role: *macro_role,
                    discriminator,
                    syntax,
                },
            ),

            HostToPluginMessage::ExpandAttachedMacro {
                macro_ref,
                macro_role,
                discriminator,
                attribute_syntax,
                decl_syntax,
                parent_decl_syntax,
                extended_type_syntax,
                conformance_list_syntax,
            } => self.expand_attached_macro(
                message,
                AttachedExpansion {
                    macro_ref,
                    macro_role: *macro_role,
                    discriminator,
                    attribute_syntax,
                    decl_syntax,
                    parent_decl_syntax: parent_decl_syntax.as_ref(),
                    extended_type_syntax: extended_type_syntax.as_ref(),
                    conformance_list_syntax: conformance_list_syntax.as_ref(),
                },
            ),

            HostToPluginMessage::LoadPluginLibrary {
                library_path,
                module_name,
            } => {
                debug!(%library_path, %module_name, "library loading is not supported");
                PluginToHostMessage::LoadPluginLibraryResult {
                    loaded: false,
                    diagnostics: Vec::new(),
                }
            }
        }
    }

    fn get_capability(&mut self, host: Option<HostCapability>) -> PluginToHostMessage {
        if self.is_negotiated() {
            debug!("host renegotiated capability");
        }

        let (capability, negotiated) = self.negotiator.negotiate(host);
        debug!(
            host_version = negotiated.host_version,
            plugin_version = negotiated.plugin_version,
            unified_result = negotiated.has_expand_macro_result(),
            "capability negotiated"
        );
        self.state = SessionState::Negotiated(negotiated);

        PluginToHostMessage::GetCapabilityResult { capability }
    }

    /// Expands `#name(...)`.
    ///
    /// An absent expansion that comes with diagnostics is replaced by an empty
    /// placeholder; an absent expansion without diagnostics is sent as absent.
    fn expand_freestanding_macro(
        &self,
        message: &HostToPluginMessage,
        request: FreestandingExpansion<'_>,
    ) -> PluginToHostMessage {
        if let Some(role) = request.macro_role.filter(|role| !role.is_freestanding()) {
            warn!(%role, "freestanding expansion requested with an attached role");
        }

        let mut expansion = match self.resolve(request.macro_ref) {
            Some(MacroImplementation::Freestanding(implementation)) => invoke(
                request.macro_ref,
                request.syntax,
                || implementation.expand(&request),
            ),
            Some(MacroImplementation::Attached(_)) => MacroExpansion::failure(shape_mismatch(
                request.macro_ref,
                request.syntax,
                MacroShape::Attached,
            )),
            None => MacroExpansion::failure(not_registered(request.macro_ref, request.syntax)),
        };

        expansion.expanded_source = match expansion.expanded_source.take() {
            Some(source) => Some(self.with_echo(source, message)),
            None if !expansion.diagnostics.is_empty() => Some(self.placeholder(message)),
            None => None,
        };

        ResultShape::freestanding(&self.negotiated()).encode(expansion)
    }

    /// Expands `@Name` attached to a declaration.
    ///
    /// Diagnostics about the macro itself are anchored at the attribute, not
    /// the declaration. An absent expansion stays absent.
    fn expand_attached_macro(
        &self,
        message: &HostToPluginMessage,
        request: AttachedExpansion<'_>,
    ) -> PluginToHostMessage {
        if request.macro_role.is_freestanding() {
            warn!(role = %request.macro_role, "attached expansion requested with a freestanding role");
        }

        let mut expansion = match self.resolve(request.macro_ref) {
            Some(MacroImplementation::Attached(implementation)) => invoke(
                request.macro_ref,
                request.attribute_syntax,
                || implementation.expand(&request),
            ),
            Some(MacroImplementation::Freestanding(_)) => MacroExpansion::failure(shape_mismatch(
                request.macro_ref,
                request.attribute_syntax,
                MacroShape::Freestanding,
            )),
            None => MacroExpansion::failure(not_registered(
                request.macro_ref,
                request.attribute_syntax,
            )),
        };

        expansion.expanded_source = expansion
            .expanded_source
            .take()
            .map(|source| self.with_echo(source, message));

        ResultShape::attached(&self.negotiated()).encode(expansion)
    }

    fn resolve(&self, macro_ref: &MacroReference) -> Option<&MacroImplementation> {
        let resolved = self
            .registry
            .resolve(&macro_ref.module_name, &macro_ref.type_name);
        if resolved.is_none() {
            warn!(macro_ref = %macro_ref, "macro is not registered");
        }
        resolved
    }

    fn with_echo(&self, mut source: String, message: &HostToPluginMessage) -> String {
        if self.options.echo_requests {
            source.push('\n');
            source.push_str(&echo_comment(message));
        }
        source
    }

    fn placeholder(&self, message: &HostToPluginMessage) -> String {
        if self.options.echo_requests {
            echo_comment(message)
        } else {
            String::new()
        }
    }
}

/// Runs an implementation, converting `Err` and panics into one diagnostic
fn invoke<F>(macro_ref: &MacroReference, anchor: &Syntax, expand: F) -> MacroExpansion
where
    F: FnOnce() -> Result<MacroExpansion, MacroError>,
{
    match panic::catch_unwind(AssertUnwindSafe(expand)) {
        Ok(Ok(expansion)) => expansion,
        Ok(Err(err)) => {
            warn!(macro_ref = %macro_ref, error = %err, "macro expansion failed");
            MacroExpansion::failure(Diagnostic::error(
                anchor,
                format!("macro {} failed to expand: {}", macro_ref, err),
            ))
        }
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(macro_ref = %macro_ref, %reason, "macro implementation panicked");
            MacroExpansion::failure(Diagnostic::error(
                anchor,
                format!("macro {} panicked during expansion: {}", macro_ref, reason),
            ))
        }
    }
}

fn not_registered(macro_ref: &MacroReference, anchor: &Syntax) -> Diagnostic {
    Diagnostic::error(
        anchor,
        format!(
            "macro {} is not provided by this plugin: no implementation for module '{}' type '{}'",
            macro_ref, macro_ref.module_name, macro_ref.type_name
        ),
    )
}

fn shape_mismatch(
    macro_ref: &MacroReference,
    anchor: &Syntax,
    registered: MacroShape,
) -> Diagnostic {
    let (requested, registered_as) = match registered {
        MacroShape::Attached => ("a freestanding macro", "an attached macro"),
        MacroShape::Freestanding => ("an attached macro", "a freestanding macro"),
    };

    // Registrations carry no source location
    Diagnostic::error(
        anchor,
        format!(
            "macro {} cannot be expanded as {}: module '{}' type '{}' implements a different role",
            macro_ref, requested, macro_ref.module_name, macro_ref.type_name
        ),
    )
    .with_note(
        Position::invalid(),
        format!("'{}' is registered as {}", macro_ref.type_name, registered_as),
    )
}

/// `/* <pretty JSON> */`. Block comments nest, so both `*/` and `/*` inside
/// the JSON are defused.
fn echo_comment(message: &HostToPluginMessage) -> String {
    let pretty =
        serde_json::to_string_pretty(message).unwrap_or_else(|_| format!("{:?}", message));
    let defused = pretty.replace("*/", "* /").replace("/*", "/ *");
    format!("/* {} */", defused)
}
