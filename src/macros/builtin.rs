//! Built-in example macros
//!
//! Two providers ship with the plugin:
//!
//! | Module | Type | Shape | Expansion |
//! |--------|------|-------|-----------|
//! | `ExampleMacros` | `ExpressionMacro` | freestanding | `(arg, "arg")` |
//! | `ExampleMacros` | `DeclarationMacro` | freestanding | nothing, plus a warning |
//! | `ExampleMacros` | `PeerMacro` | attached | empty |
//! | `ExampleMacros` | `AccessorMacro` | attached | a getter/setter pair |
//! | `ExampleMacros` | `MemberAttributeMacro` | attached | empty |
//! | `ExampleMacros` | `MemberMacro` | attached | empty |
//! | `ExampleMacros` | `ExtensionMacro` | attached | `extension T: P {}` |
//! | `StringifyMacros` | `StringifyMacro` | freestanding | `(arg, "arg")` |

use crate::protocol::{Diagnostic, PositionRange, Syntax};

use super::provider::{
    AttachedExpansion, AttachedMacro, FreestandingExpansion, FreestandingMacro, MacroError,
    MacroExpansion,
};
use super::registry::{MacroProvider, MacroRegistry, MacroRegistryBuilder, RegistryError};

pub const EXAMPLE_MODULE: &str = "ExampleMacros";
pub const STRINGIFY_MODULE: &str = "StringifyMacros";

/// Registry containing every built-in provider
pub fn registry() -> Result<MacroRegistry, RegistryError> {
    let mut builder = MacroRegistry::builder();
    builder
        .provider(&ExampleMacros)?
        .provider(&StringifyMacros)?;
    Ok(builder.build())
}

/// The `ExampleMacros` module
pub struct ExampleMacros;

impl MacroProvider for ExampleMacros {
    fn module_name(&self) -> &str {
        EXAMPLE_MODULE
    }

    fn register(&self, builder: &mut MacroRegistryBuilder) -> Result<(), RegistryError> {
        let module = self.module_name();
        builder
            .register_freestanding(module, "ExpressionMacro", Stringify)?
            .register_freestanding(module, "DeclarationMacro", DeclarationMacro)?
            .register_attached(module, "PeerMacro", EmptyExpansion)?
            .register_attached(module, "AccessorMacro", AccessorMacro)?
            .register_attached(module, "MemberAttributeMacro", EmptyExpansion)?
            .register_attached(module, "MemberMacro", EmptyExpansion)?
            .register_attached(module, "ExtensionMacro", ExtensionMacro)?;
        Ok(())
    }
}

/// The `StringifyMacros` module
pub struct StringifyMacros;

impl MacroProvider for StringifyMacros {
    fn module_name(&self) -> &str {
        STRINGIFY_MODULE
    }

    fn register(&self, builder: &mut MacroRegistryBuilder) -> Result<(), RegistryError> {
        builder.register_freestanding(self.module_name(), "StringifyMacro", Stringify)?;
        Ok(())
    }
}

/// `#name(x + y)` expands to `(x + y, "x + y")`
pub struct Stringify;

impl FreestandingMacro for Stringify {
    fn expand(&self, request: &FreestandingExpansion<'_>) -> Result<MacroExpansion, MacroError> {
        let argument = call_argument(request.syntax)?;
        Ok(MacroExpansion::source(format!(
            "({}, {})",
            argument,
            string_literal(argument)
        )))
    }
}

/// `#name("message")` expands to nothing and reports the message as a warning
pub struct DeclarationMacro;

impl FreestandingMacro for DeclarationMacro {
    fn expand(&self, request: &FreestandingExpansion<'_>) -> Result<MacroExpansion, MacroError> {
        let argument = call_argument(request.syntax)?;
        let message = argument.trim().trim_matches('"');

        let mut expansion = MacroExpansion::source("");
        if !message.is_empty() {
            expansion = expansion.with_diagnostic(
                Diagnostic::warning(request.syntax, message)
                    .with_highlight(PositionRange::of(request.syntax)),
            );
        }
        Ok(expansion)
    }
}

/// Attached macro that contributes an empty expansion
pub struct EmptyExpansion;

impl AttachedMacro for EmptyExpansion {
    fn expand(&self, _request: &AttachedExpansion<'_>) -> Result<MacroExpansion, MacroError> {
        Ok(MacroExpansion::source(""))
    }
}

/// Replaces a stored property with a constant getter and a no-op setter
pub struct AccessorMacro;

impl AttachedMacro for AccessorMacro {
    fn expand(&self, _request: &AttachedExpansion<'_>) -> Result<MacroExpansion, MacroError> {
        Ok(MacroExpansion::source("get { \"some value\" } set {}"))
    }
}

/// Adds the requested conformances to the extended type
pub struct ExtensionMacro;

impl AttachedMacro for ExtensionMacro {
    fn expand(&self, request: &AttachedExpansion<'_>) -> Result<MacroExpansion, MacroError> {
        let (Some(extended_type), Some(conformances)) =
            (request.extended_type_syntax, request.conformance_list_syntax)
        else {
            return Ok(MacroExpansion::empty());
        };

        let conformances = conformances.source.trim();
        if conformances.is_empty() {
            return Ok(MacroExpansion::empty());
        }

        Ok(MacroExpansion::source(format!(
            "extension {}: {} {{}}",
            extended_type.source.trim(),
            conformances
        )))
    }
}

/// Text between the first `(` and the last `)` of a macro call
fn call_argument(syntax: &Syntax) -> Result<&str, MacroError> {
    let source = syntax.source.as_str();
    let open = source
        .find('(')
        .ok_or_else(|| MacroError::malformed(syntax, "expected an argument list"))?;
    let close = source
        .rfind(')')
        .filter(|&close| close > open)
        .ok_or_else(|| MacroError::malformed(syntax, "unterminated argument list"))?;

    Ok(&source[open + 1..close])
}

/// Quotes `text` as a string literal, switching to a raw literal when the
/// text itself contains quotes or backslashes.
///
/// A raw literal with `n` hashes ends at `"` and starts escapes at `\`, each
/// followed by `n` hashes, so neither sequence may occur in `text`.
fn string_literal(text: &str) -> String {
    if !text.contains(['"', '\\']) {
        return format!("\"{}\"", text);
    }

    let mut hashes = String::from("#");
    while text.contains(&format!("\"{}", hashes)) || text.contains(&format!("\\{}", hashes)) {
        hashes.push('#');
    }
    format!("{hashes}\"{text}\"{hashes}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{MacroReference, MacroRole, Severity, SourceLocation, SyntaxKind};

    fn syntax(kind: SyntaxKind, source: &str) -> Syntax {
        Syntax::new(
            kind,
            source,
            SourceLocation::new("App/main.swift", "/app/main.swift", 20, 2, 1),
        )
    }

    fn freestanding(macro_impl: &dyn FreestandingMacro, source: &str) -> Result<MacroExpansion, MacroError> {
        let macro_ref = MacroReference::new(EXAMPLE_MODULE, "ExpressionMacro", "ExpressionMacro");
        let syntax = syntax(SyntaxKind::Expression, source);
        macro_impl.expand(&FreestandingExpansion {
            macro_ref: &macro_ref,
            macro_role: Some(MacroRole::Expression),
            discriminator: "$s1",
            syntax: &syntax,
        })
    }

    #[test]
    fn stringify_expression() {
        let expansion = freestanding(&Stringify, "#ExpressionMacro(a + b)").unwrap();

        assert_eq!(expansion.expanded_source.as_deref(), Some("(a + b, \"a + b\")"));
        assert!(expansion.diagnostics.is_empty());
    }

    #[test]
    fn stringify_string_literal_uses_raw_string() {
        let expansion = freestanding(&Stringify, r#"#Example("Hello, \(name)")"#).unwrap();

        assert_eq!(
            expansion.expanded_source.as_deref(),
            Some(r###"("Hello, \(name)", #""Hello, \(name)""#)"###)
        );
    }

    #[test]
    fn raw_literal_grows_hashes_when_needed() {
        assert_eq!(string_literal(r##"a"#b"##), r###"##"a"#b"##"###);
    }

    #[test]
    fn raw_literal_grows_hashes_past_escapes() {
        assert_eq!(string_literal(r##"x\#(y)"##), r###"##"x\#(y)"##"###);
        assert_eq!(string_literal(r###"\##n "#"###), r####"###"\##n "#"###"####);
    }

    #[test]
    fn stringify_raw_string_argument() {
        let expansion = freestanding(&Stringify, r###"#Example(#"a\#(b)"#)"###).unwrap();

        assert_eq!(
            expansion.expanded_source.as_deref(),
            Some(r###"(#"a\#(b)"#, ##"#"a\#(b)"#"##)"###)
        );
    }

    #[test]
    fn stringify_without_arguments_fails() {
        let err = freestanding(&Stringify, "#stringify").unwrap_err();
        assert!(matches!(err, MacroError::MalformedSyntax { .. }));
    }

    #[test]
    fn declaration_macro_reports_warning() {
        let expansion =
            freestanding(&DeclarationMacro, r#"#DeclarationMacro("unsupported configuration")"#)
                .unwrap();

        assert_eq!(expansion.expanded_source.as_deref(), Some(""));
        assert_eq!(expansion.diagnostics.len(), 1);
        assert_eq!(expansion.diagnostics[0].severity, Severity::Warning);
        assert_eq!(expansion.diagnostics[0].message, "unsupported configuration");
    }

    #[test]
    fn extension_macro_tolerates_missing_spans() {
        let macro_ref = MacroReference::new(EXAMPLE_MODULE, "ExtensionMacro", "ExtensionMacro");
        let attribute = syntax(SyntaxKind::Attribute, "@ExtensionMacro<Int>");
        let decl = syntax(SyntaxKind::Declaration, "private struct B {}");
        let extended = syntax(SyntaxKind::Type, "User.B");
        let conformances = syntax(SyntaxKind::Type, "Codable");

        let mut request = AttachedExpansion {
            macro_ref: &macro_ref,
            macro_role: MacroRole::Extension,
            discriminator: "$s2",
            attribute_syntax: &attribute,
            decl_syntax: &decl,
            parent_decl_syntax: None,
            extended_type_syntax: None,
            conformance_list_syntax: None,
        };
        assert_eq!(ExtensionMacro.expand(&request).unwrap(), MacroExpansion::empty());

        request.extended_type_syntax = Some(&extended);
        request.conformance_list_syntax = Some(&conformances);
        assert_eq!(
            ExtensionMacro.expand(&request).unwrap().expanded_source.as_deref(),
            Some("extension User.B: Codable {}")
        );
    }

    #[test]
    fn builtin_registry_contents() {
        let registry = registry().unwrap();

        assert_eq!(registry.len(), 8);
        assert!(registry.contains(EXAMPLE_MODULE, "ExtensionMacro"));
        assert!(registry.contains(STRINGIFY_MODULE, "StringifyMacro"));
    }
}
