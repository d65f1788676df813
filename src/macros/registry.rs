//! Registry of macro implementations keyed by `(module, type)`
//!
//! The registry is assembled once with [`MacroRegistryBuilder`] before any
//! request is served and is read-only afterwards.

use std::collections::BTreeMap;

use thiserror::Error;

use super::provider::{AttachedMacro, FreestandingMacro, MacroImplementation, MacroShape};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Macro already registered: module '{module_name}', type '{type_name}'")]
    Duplicate {
        module_name: String,
        type_name: String,
    },
}

/// A bundle of macros a plugin ships, e.g. one Swift-side macro module
pub trait MacroProvider {
    /// Module name the provided macros are registered under
    fn module_name(&self) -> &str;

    /// Registers every macro this provider implements
    fn register(&self, builder: &mut MacroRegistryBuilder) -> Result<(), RegistryError>;
}

/// A registered macro as reported by [`MacroRegistry::entries`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryEntry<'a> {
    pub module_name: &'a str,
    pub type_name: &'a str,
    pub shape: MacroShape,
}

/// Immutable lookup table from `(module, type)` to implementation
#[derive(Debug, Default)]
pub struct MacroRegistry {
    modules: BTreeMap<String, BTreeMap<String, MacroImplementation>>,
}

impl MacroRegistry {
    pub fn builder() -> MacroRegistryBuilder {
        MacroRegistryBuilder::default()
    }

    /// Finds the implementation registered for exactly this key
    pub fn resolve(&self, module_name: &str, type_name: &str) -> Option<&MacroImplementation> {
        self.modules.get(module_name)?.get(type_name)
    }

    pub fn contains(&self, module_name: &str, type_name: &str) -> bool {
        self.resolve(module_name, type_name).is_some()
    }

    /// All registered macros, ordered by module then type
    pub fn entries(&self) -> impl Iterator<Item = RegistryEntry<'_>> + '_ {
        self.modules.iter().flat_map(|(module_name, types)| {
            types.iter().map(move |(type_name, implementation)| RegistryEntry {
                module_name,
                type_name,
                shape: implementation.shape(),
            })
        })
    }

    pub fn len(&self) -> usize {
        self.modules.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Collects registrations, rejecting duplicate keys
#[derive(Debug, Default)]
pub struct MacroRegistryBuilder {
    modules: BTreeMap<String, BTreeMap<String, MacroImplementation>>,
}

impl MacroRegistryBuilder {
    /// Registers an implementation under `(module_name, type_name)`
    pub fn register(
        &mut self,
        module_name: impl Into<String>,
        type_name: impl Into<String>,
        implementation: MacroImplementation,
    ) -> Result<&mut Self, RegistryError> {
        let module_name = module_name.into();
        let type_name = type_name.into();

        let types = self.modules.entry(module_name.clone()).or_default();
        if types.contains_key(&type_name) {
            return Err(RegistryError::Duplicate {
                module_name,
                type_name,
            });
        }

        types.insert(type_name, implementation);
        Ok(self)
    }

    pub fn register_freestanding(
        &mut self,
        module_name: impl Into<String>,
        type_name: impl Into<String>,
        implementation: impl FreestandingMacro + 'static,
    ) -> Result<&mut Self, RegistryError> {
        self.register(
            module_name,
            type_name,
            MacroImplementation::freestanding(implementation),
        )
    }

    pub fn register_attached(
        &mut self,
        module_name: impl Into<String>,
        type_name: impl Into<String>,
        implementation: impl AttachedMacro + 'static,
    ) -> Result<&mut Self, RegistryError> {
        self.register(
            module_name,
            type_name,
            MacroImplementation::attached(implementation),
        )
    }

    /// Registers everything a provider ships
    pub fn provider(&mut self, provider: &dyn MacroProvider) -> Result<&mut Self, RegistryError> {
        provider.register(self)?;
        Ok(self)
    }

    pub fn build(self) -> MacroRegistry {
        MacroRegistry {
            modules: self.modules,
        }
    }
}
