//! Property tests for the message encoding
//!
//! Every message decodes to what was encoded, across both framings.

use std::io::Cursor;

use compiler_plugin::plugin::{Framing, MessageReader, MessageWriter};
use compiler_plugin::protocol::{
    Diagnostic, HostCapability, HostToPluginMessage, MacroReference, MacroRole, PluginCapability,
    PluginToHostMessage, Position, Severity, SourceLocation, Syntax, SyntaxKind,
};
use proptest::option;
use proptest::prelude::*;

fn identifier() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_]{0,12}"
}

fn syntax() -> impl Strategy<Value = Syntax> {
    let kind = prop::sample::select(vec![
        SyntaxKind::Declaration,
        SyntaxKind::Statement,
        SyntaxKind::Expression,
        SyntaxKind::Type,
        SyntaxKind::Pattern,
        SyntaxKind::Attribute,
    ]);
    (kind, any::<String>(), identifier(), 0usize..10_000, 1usize..500, 1usize..120).prop_map(
        |(kind, source, file, offset, line, column)| {
            let location = SourceLocation::new(
                format!("App/{file}.swift"),
                format!("/src/App/{file}.swift"),
                offset,
                line,
                column,
            );
            Syntax::new(kind, source, location)
        },
    )
}

fn macro_ref() -> impl Strategy<Value = MacroReference> {
    (identifier(), identifier(), identifier())
        .prop_map(|(module, type_name, name)| MacroReference::new(module, type_name, name))
}

fn role() -> impl Strategy<Value = MacroRole> {
    prop::sample::select(MacroRole::ALL.to_vec())
}

fn diagnostic() -> impl Strategy<Value = Diagnostic> {
    let severity = prop::sample::select(vec![Severity::Error, Severity::Warning, Severity::Note]);
    (severity, any::<String>(), identifier(), 0usize..10_000).prop_map(
        |(severity, message, file, offset)| {
            Diagnostic::new(severity, message, Position::new(format!("/{file}.swift"), offset))
        },
    )
}

fn host_message() -> impl Strategy<Value = HostToPluginMessage> {
    prop_oneof![
        option::of(any::<u32>()).prop_map(|version| HostToPluginMessage::GetCapability {
            capability: version.map(HostCapability::new),
        }),
        (macro_ref(), option::of(role()), identifier(), syntax()).prop_map(
            |(macro_ref, macro_role, discriminator, syntax)| {
                HostToPluginMessage::ExpandFreestandingMacro {
                    macro_ref,
                    macro_role,
                    discriminator,
                    syntax,
                }
            }
        ),
        (
            macro_ref(),
            role(),
            identifier(),
            syntax(),
            syntax(),
            option::of(syntax()),
            option::of(syntax()),
            option::of(syntax()),
        )
            .prop_map(
                |(macro_ref, macro_role, discriminator, attribute, decl, parent, extended, list)| {
                    HostToPluginMessage::ExpandAttachedMacro {
                        macro_ref,
                        macro_role,
                        discriminator,
                        attribute_syntax: attribute,
                        decl_syntax: decl,
                        parent_decl_syntax: parent,
                        extended_type_syntax: extended,
                        conformance_list_syntax: list,
                    }
                }
            ),
        (any::<String>(), identifier()).prop_map(|(library_path, module_name)| {
            HostToPluginMessage::LoadPluginLibrary {
                library_path,
                module_name,
            }
        }),
    ]
}

fn plugin_message() -> impl Strategy<Value = PluginToHostMessage> {
    let diagnostics = || prop::collection::vec(diagnostic(), 0..3);
    prop_oneof![
        (any::<u32>(), prop::collection::btree_set(identifier(), 0..3)).prop_map(
            |(version, features)| PluginToHostMessage::GetCapabilityResult {
                capability: features
                    .into_iter()
                    .fold(PluginCapability::new(version), |capability, feature| {
                        capability.with_feature(feature)
                    }),
            }
        ),
        (option::of(any::<String>()), diagnostics()).prop_map(|(expanded_source, diagnostics)| {
            PluginToHostMessage::ExpandMacroResult {
                expanded_source,
                diagnostics,
            }
        }),
        (option::of(any::<String>()), diagnostics()).prop_map(|(expanded_source, diagnostics)| {
            PluginToHostMessage::ExpandFreestandingMacroResult {
                expanded_source,
                diagnostics,
            }
        }),
        (
            option::of(prop::collection::vec(any::<String>(), 0..3)),
            diagnostics()
        )
            .prop_map(|(expanded_sources, diagnostics)| {
                PluginToHostMessage::ExpandAttachedMacroResult {
                    expanded_sources,
                    diagnostics,
                }
            }),
        (any::<bool>(), diagnostics()).prop_map(|(loaded, diagnostics)| {
            PluginToHostMessage::LoadPluginLibraryResult {
                loaded,
                diagnostics,
            }
        }),
    ]
}

fn framings() -> impl Strategy<Value = Framing> {
    prop::sample::select(vec![Framing::LengthPrefixed, Framing::JsonLines])
}

proptest! {
    #[test]
    fn test_host_messages_survive_the_wire(message in host_message(), framing in framings()) {
        let mut writer = MessageWriter::new(Vec::new(), framing);
        writer.write(&message).unwrap();

        let mut reader = MessageReader::new(Cursor::new(writer.into_inner()), framing);
        prop_assert_eq!(reader.read::<HostToPluginMessage>().unwrap(), Some(message));
        prop_assert_eq!(reader.read::<HostToPluginMessage>().unwrap(), None);
    }

    #[test]
    fn test_plugin_messages_survive_the_wire(message in plugin_message(), framing in framings()) {
        let mut writer = MessageWriter::new(Vec::new(), framing);
        writer.write(&message).unwrap();

        let mut reader = MessageReader::new(Cursor::new(writer.into_inner()), framing);
        prop_assert_eq!(reader.read::<PluginToHostMessage>().unwrap(), Some(message));
    }
}
