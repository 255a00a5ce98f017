//! Alias canonicalization, blacklist filtering and platform type substitution.

use crate::error::Error;
use crate::ir::{Entity, EntityKind};
use crate::registry::Registry;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Kind-scoped mapping from alias name to canonical name.
#[derive(Debug, Clone, Default)]
pub struct AliasMap {
    by_kind: BTreeMap<EntityKind, BTreeMap<String, String>>,
}

impl AliasMap {
    pub fn from_registry(registry: &Registry) -> Self {
        let mut by_kind: BTreeMap<EntityKind, BTreeMap<String, String>> = BTreeMap::new();
        for entity in registry.entities() {
            if let Some(target) = &entity.alias {
                by_kind
                    .entry(entity.kind)
                    .or_default()
                    .insert(entity.name.clone(), target.clone());
            }
        }
        Self { by_kind }
    }

    pub fn target(&self, kind: EntityKind, name: &str) -> Option<&str> {
        self.by_kind
            .get(&kind)
            .and_then(|aliases| aliases.get(name))
            .map(String::as_str)
    }

    /// Alias names of one kind, sorted.
    pub fn aliases_of(&self, kind: EntityKind) -> impl Iterator<Item = &str> {
        self.by_kind
            .get(&kind)
            .into_iter()
            .flat_map(|aliases| aliases.keys().map(String::as_str))
    }
}

/// Entity names excluded from all generation, regardless of kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklist {
    names: BTreeSet<String>,
}

impl Blacklist {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

/// Abstract type name -> platform -> concrete type token.
///
/// In `apigen.toml`:
/// ```toml
/// [platform_types.HWND]
/// win32 = "uint64_t"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlatformTypeOverrides {
    types: BTreeMap<String, BTreeMap<String, String>>,
}

impl PlatformTypeOverrides {
    pub fn insert(
        &mut self,
        abstract_type: impl Into<String>,
        platform: impl Into<String>,
        token: impl Into<String>,
    ) {
        self.types
            .entry(abstract_type.into())
            .or_default()
            .insert(platform.into(), token.into());
    }

    pub fn get(&self, abstract_type: &str, platform: &str) -> Option<&str> {
        self.types
            .get(abstract_type)
            .and_then(|by_platform| by_platform.get(platform))
            .map(String::as_str)
    }
}

/// Registry queries with aliases, blacklist and platform types applied.
#[derive(Debug, Clone)]
pub struct Resolver<'r> {
    registry: &'r Registry,
    aliases: AliasMap,
    blacklist: Blacklist,
    platform_types: PlatformTypeOverrides,
}

impl<'r> Resolver<'r> {
    pub fn new(
        registry: &'r Registry,
        blacklist: Blacklist,
        platform_types: PlatformTypeOverrides,
    ) -> Self {
        Self {
            registry,
            aliases: AliasMap::from_registry(registry),
            blacklist,
            platform_types,
        }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn aliases(&self) -> &AliasMap {
        &self.aliases
    }

    /// The canonical entity for `name`, following at most one alias hop.
    ///
    /// Fails with [`Error::BrokenAlias`] when the target is missing, of another
    /// kind, or itself an alias.
    pub fn canonical(&self, name: &str) -> Result<&'r Entity, Error> {
        let entity = self.registry.entity(name)?;
        let Some(target) = self.aliases.target(entity.kind, name) else {
            return Ok(entity);
        };
        match self.registry.get(target) {
            Some(canonical) if canonical.kind == entity.kind && !canonical.is_alias() => {
                Ok(canonical)
            }
            _ => Err(Error::BrokenAlias {
                kind: entity.kind,
                alias: name.to_string(),
                target: target.to_string(),
            }),
        }
    }

    pub fn resolve(&self, name: &str) -> Result<&'r str, Error> {
        self.canonical(name).map(|e| e.name.as_str())
    }

    pub fn is_blacklisted(&self, name: &str) -> bool {
        self.blacklist.contains(name)
    }

    /// True if `name` or the canonical entity it aliases is blacklisted.
    pub fn is_suppressed(&self, name: &str) -> Result<bool, Error> {
        if self.is_blacklisted(name) {
            return Ok(true);
        }
        Ok(self.is_blacklisted(self.resolve(name)?))
    }

    pub fn platform_type_for(&self, abstract_type: &str, platform: &str) -> Result<&str, Error> {
        self.platform_types
            .get(abstract_type, platform)
            .ok_or_else(|| Error::MissingPlatformMapping {
                type_name: abstract_type.to_string(),
                platform: platform.to_string(),
            })
    }
}
