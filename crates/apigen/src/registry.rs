//! The read-only registry of features, extensions and entities.

use crate::error::{Error, ParseError};
use crate::ir::{
    CommandDef, Definition, Entity, EntityKind, EnumDef, EnumValue, Extension, Feature, FlagsDef,
    HandleDef, Member, StructDef,
};
use std::collections::{BTreeMap, BTreeSet};

/// An immutable, queryable API description.
///
/// Built once (via [`RegistryBuilder`] or [`crate::input::parse_registry`]) and
/// then shared by reference across generation runs. It holds no per-run state.
#[derive(Debug, Clone)]
pub struct Registry {
    entities: BTreeMap<String, Entity>,
    /// Sorted by ordinal.
    features: Vec<Feature>,
    extensions: BTreeMap<String, Extension>,
    /// Platform-dependent abstract type -> its default platform.
    platform_types: BTreeMap<String, String>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Look up an entity by name.
    pub fn entity(&self, name: &str) -> Result<&Entity, Error> {
        self.entities.get(name).ok_or_else(|| Error::unknown(name))
    }

    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    pub fn kind_of(&self, name: &str) -> Result<EntityKind, Error> {
        self.entity(name).map(|e| e.kind)
    }

    /// Entities a feature or extension introduces, in listing order.
    pub fn entities_for(&self, block: &str) -> Result<Vec<&Entity>, Error> {
        let names = if let Some(feature) = self.feature(block) {
            &feature.entities
        } else if let Some(extension) = self.extensions.get(block) {
            &extension.entities
        } else {
            return Err(Error::unknown(block));
        };
        names.iter().map(|name| self.entity(name)).collect()
    }

    /// Features in ordinal order.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn feature(&self, name: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.name == name)
    }

    /// Extensions sorted by name.
    pub fn extensions(&self) -> impl Iterator<Item = &Extension> {
        self.extensions.values()
    }

    pub fn extension(&self, name: &str) -> Option<&Extension> {
        self.extensions.get(name)
    }

    /// All entities sorted by name.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Default platform of a platform-dependent abstract type.
    pub fn platform_of_type(&self, ty: &str) -> Option<&str> {
        self.platform_types.get(ty).map(String::as_str)
    }
}

/// Programmatic construction of a [`Registry`].
///
/// ```
/// use apigen::ir::{EntityKind, Extension, Feature, Member};
/// use apigen::registry::Registry;
///
/// let registry = Registry::builder()
///     .enumeration("Color", &["RED", "GREEN"])
///     .command("DoThing", vec![Member::value("color", "Color")])
///     .alias(EntityKind::Enum, "Color2", "Color")
///     .feature(Feature::new("v1", 1, &["Color"]))
///     .extension(Extension::new("ext1", &["Color2", "DoThing"]).requires(&["v1"]))
///     .build()
///     .unwrap();
///
/// assert_eq!(registry.kind_of("Color2").unwrap(), EntityKind::Enum);
/// ```
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entities: Vec<Entity>,
    features: Vec<Feature>,
    extensions: Vec<Extension>,
    platform_types: BTreeMap<String, String>,
}

impl RegistryBuilder {
    fn define(mut self, name: &str, def: Definition) -> Self {
        self.entities.push(Entity {
            name: name.to_string(),
            kind: def.kind(),
            owner: None,
            alias: None,
            platform: None,
            def: Some(def),
        });
        self
    }

    pub fn entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn command(self, name: &str, params: Vec<Member>) -> Self {
        self.define(
            name,
            Definition::Command(CommandDef {
                params,
                return_type: None,
            }),
        )
    }

    pub fn command_def(self, name: &str, def: CommandDef) -> Self {
        self.define(name, Definition::Command(def))
    }

    pub fn structure(self, name: &str, members: Vec<Member>) -> Self {
        self.define(name, Definition::Struct(StructDef { members }))
    }

    /// An enum whose values are numbered from zero.
    pub fn enumeration(self, name: &str, values: &[&str]) -> Self {
        let values = values
            .iter()
            .zip(0..)
            .map(|(v, i)| EnumValue::new(*v, i))
            .collect();
        self.enum_def(name, EnumDef { values })
    }

    pub fn enum_def(self, name: &str, def: EnumDef) -> Self {
        self.define(name, Definition::Enum(def))
    }

    pub fn flags(self, name: &str, def: FlagsDef) -> Self {
        self.define(name, Definition::Flags(def))
    }

    pub fn handle(self, name: &str, def: HandleDef) -> Self {
        self.define(name, Definition::Handle(def))
    }

    pub fn alias(mut self, kind: EntityKind, name: &str, target: &str) -> Self {
        self.entities.push(Entity {
            name: name.to_string(),
            kind,
            owner: None,
            alias: Some(target.to_string()),
            platform: None,
            def: None,
        });
        self
    }

    /// Tag the most recently added entity with a platform.
    pub fn on_platform(mut self, platform: &str) -> Self {
        if let Some(last) = self.entities.last_mut() {
            last.platform = Some(platform.to_string());
        }
        self
    }

    /// Declare `ty` as platform-dependent, defaulting to `platform`.
    pub fn platform_type(mut self, ty: &str, platform: &str) -> Self {
        self.platform_types
            .insert(ty.to_string(), platform.to_string());
        self
    }

    pub fn feature(mut self, feature: Feature) -> Self {
        self.features.push(feature);
        self
    }

    pub fn extension(mut self, extension: Extension) -> Self {
        self.extensions.push(extension);
        self
    }

    /// Validate and freeze the registry.
    ///
    /// Assigns each entity its owning block (the first feature by ordinal, else
    /// the first extension by name, that lists it) and lets entities inherit
    /// the platform tag of an owning extension.
    pub fn build(self) -> Result<Registry, ParseError> {
        let mut entities = BTreeMap::new();
        for entity in self.entities {
            if entities.contains_key(&entity.name) {
                return Err(ParseError::DuplicateEntity(entity.name));
            }
            entities.insert(entity.name.clone(), entity);
        }

        let mut block_names = BTreeSet::new();
        for name in self
            .features
            .iter()
            .map(|f| &f.name)
            .chain(self.extensions.iter().map(|e| &e.name))
        {
            if !block_names.insert(name.clone()) {
                return Err(ParseError::DuplicateBlock(name.clone()));
            }
        }

        let mut features = self.features;
        features.sort_by_key(|f| f.ordinal);
        for pair in features.windows(2) {
            if pair[0].ordinal == pair[1].ordinal {
                return Err(ParseError::DuplicateOrdinal {
                    ordinal: pair[0].ordinal,
                    first: pair[0].name.clone(),
                    second: pair[1].name.clone(),
                });
            }
        }

        let extensions: BTreeMap<String, Extension> = self
            .extensions
            .into_iter()
            .map(|e| (e.name.clone(), e))
            .collect();

        let listings = features
            .iter()
            .map(|f| (&f.name, &f.entities, None))
            .chain(
                extensions
                    .values()
                    .map(|e| (&e.name, &e.entities, e.platform.as_ref())),
            );
        for (block, names, platform) in listings {
            for name in names {
                let entity =
                    entities
                        .get_mut(name)
                        .ok_or_else(|| ParseError::UnknownReference {
                            block: block.clone(),
                            name: name.clone(),
                        })?;
                if entity.owner.is_none() {
                    entity.owner = Some(block.clone());
                    if entity.platform.is_none() {
                        entity.platform = platform.cloned();
                    }
                }
            }
        }

        Ok(Registry {
            entities,
            features,
            extensions,
            platform_types: self.platform_types,
        })
    }
}
