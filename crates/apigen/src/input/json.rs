//! The JSON registry document.
//!
//! ```json
//! {
//!   "enums": [
//!     { "name": "Color", "values": [{ "name": "RED", "value": 0 }] },
//!     { "name": "Color2", "alias": "Color" }
//!   ],
//!   "commands": [
//!     { "name": "DoThing", "params": [{ "name": "color", "type": "Color" }] }
//!   ],
//!   "features": [{ "name": "v1", "ordinal": 1, "entities": ["Color"] }],
//!   "extensions": [
//!     { "name": "ext1", "requires": ["v1"], "protect": "EXT1_ENABLED",
//!       "entities": ["Color2", "DoThing"] }
//!   ],
//!   "platform_types": { "HWND": "win32" }
//! }
//! ```
//!
//! An entry with `alias` set is an alias of the same kind; its other fields
//! are ignored.

use crate::error::ParseError;
use crate::ir::{
    CommandDef, Definition, Entity, EntityKind, EnumDef, Extension, Feature, FlagsDef, HandleDef,
    StructDef,
};
use crate::registry::{Registry, RegistryBuilder};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RegistryDocument {
    commands: Vec<Entry<CommandDef>>,
    structs: Vec<Entry<StructDef>>,
    enums: Vec<Entry<EnumDef>>,
    flags: Vec<Entry<FlagsDef>>,
    handles: Vec<Entry<HandleDef>>,
    features: Vec<Feature>,
    extensions: Vec<Extension>,
    /// Platform-dependent type -> default platform.
    platform_types: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct Entry<D> {
    name: String,
    #[serde(default)]
    alias: Option<String>,
    #[serde(default)]
    platform: Option<String>,
    #[serde(flatten)]
    def: D,
}

impl<D> Entry<D> {
    fn into_entity(self, kind: EntityKind, wrap: fn(D) -> Definition) -> Entity {
        let def = match self.alias {
            Some(_) => None,
            None => Some(wrap(self.def)),
        };
        Entity {
            name: self.name,
            kind,
            owner: None,
            alias: self.alias,
            platform: self.platform,
            def,
        }
    }
}

fn add<D>(
    builder: RegistryBuilder,
    entries: Vec<Entry<D>>,
    kind: EntityKind,
    wrap: fn(D) -> Definition,
) -> RegistryBuilder {
    entries
        .into_iter()
        .fold(builder, |b, entry| b.entity(entry.into_entity(kind, wrap)))
}

/// Build a registry from a parsed JSON document.
pub fn parse_registry(document: &Value) -> Result<Registry, ParseError> {
    let doc = RegistryDocument::deserialize(document)?;

    let mut builder = Registry::builder();
    builder = add(builder, doc.commands, EntityKind::Command, Definition::Command);
    builder = add(builder, doc.structs, EntityKind::Struct, Definition::Struct);
    builder = add(builder, doc.enums, EntityKind::Enum, Definition::Enum);
    builder = add(builder, doc.flags, EntityKind::Flags, Definition::Flags);
    builder = add(builder, doc.handles, EntityKind::Handle, Definition::Handle);
    for (ty, platform) in &doc.platform_types {
        builder = builder.platform_type(ty, platform);
    }
    builder = doc.features.into_iter().fold(builder, RegistryBuilder::feature);
    builder = doc
        .extensions
        .into_iter()
        .fold(builder, RegistryBuilder::extension);

    let registry = builder.build()?;
    tracing::debug!(
        entities = registry.entities().count(),
        features = registry.features().len(),
        extensions = registry.extensions().count(),
        "parsed registry"
    );
    Ok(registry)
}

/// Build a registry from JSON text.
pub fn parse_registry_str(text: &str) -> Result<Registry, ParseError> {
    let document: Value = serde_json::from_str(text)?;
    parse_registry(&document)
}
