//! Registry model types.
//!
//! Both the JSON loader ([`crate::input`]) and the programmatic
//! [`RegistryBuilder`](crate::registry::RegistryBuilder) normalize to these
//! types before a [`Registry`](crate::registry::Registry) is built. Backends
//! only ever read them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of an API entity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Command,
    Struct,
    Enum,
    /// A bitmask type backed by an enum of bit values.
    Flags,
    Handle,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Command,
        EntityKind::Struct,
        EntityKind::Enum,
        EntityKind::Flags,
        EntityKind::Handle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Command => "command",
            EntityKind::Struct => "struct",
            EntityKind::Enum => "enum",
            EntityKind::Flags => "flags",
            EntityKind::Handle => "handle",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A command parameter or struct member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    /// Base type name, without pointer or const qualifiers.
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub pointer: bool,
    #[serde(default, rename = "const")]
    pub is_const: bool,
    /// Name of the parameter/member holding the element count, for arrays.
    #[serde(default)]
    pub count: Option<String>,
}

impl Member {
    pub fn value(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            pointer: false,
            is_const: false,
            count: None,
        }
    }

    pub fn pointer(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            pointer: true,
            ..Self::value(name, ty)
        }
    }

    pub fn with_const(mut self) -> Self {
        self.is_const = true;
        self
    }

    pub fn with_count(mut self, count: impl Into<String>) -> Self {
        self.count = Some(count.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandDef {
    pub params: Vec<Member>,
    /// `None` (or `"void"`) when the command returns nothing.
    pub return_type: Option<String>,
}

impl CommandDef {
    /// The return type, if the command has a non-void one.
    pub fn returns(&self) -> Option<&str> {
        self.return_type.as_deref().filter(|ty| *ty != "void")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructDef {
    pub members: Vec<Member>,
}

/// A named enum value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumValue {
    pub name: String,
    pub value: Option<i64>,
    /// Bit position, for values of a flags' bits enum.
    pub bitpos: Option<u8>,
    /// Another value of the same enum this one aliases.
    pub alias: Option<String>,
}

impl EnumValue {
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
            ..Default::default()
        }
    }

    pub fn bit(name: impl Into<String>, bitpos: u8) -> Self {
        Self {
            name: name.into(),
            bitpos: Some(bitpos),
            ..Default::default()
        }
    }

    /// Highest bit position this value occupies, if it sets any bit.
    pub fn highest_bit(&self) -> Option<u32> {
        if let Some(pos) = self.bitpos {
            return Some(u32::from(pos));
        }
        match self.value {
            Some(v) if v != 0 => Some(63 - (v as u64).leading_zeros()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumDef {
    pub values: Vec<EnumValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagsDef {
    /// The enum whose values are this bitmask's bits.
    pub bits_enum: Option<String>,
    /// Underlying integer type (e.g. `VkFlags64`).
    pub base_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandleDef {
    pub parent: Option<String>,
    pub dispatchable: bool,
}

/// Bit width class of a flags type, derived from its bit values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlagWidth {
    Bits32,
    Bits64,
}

/// Kind-specific definition of a canonical (non-alias) entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Definition {
    Command(CommandDef),
    Struct(StructDef),
    Enum(EnumDef),
    Flags(FlagsDef),
    Handle(HandleDef),
}

impl Definition {
    pub fn kind(&self) -> EntityKind {
        match self {
            Definition::Command(_) => EntityKind::Command,
            Definition::Struct(_) => EntityKind::Struct,
            Definition::Enum(_) => EntityKind::Enum,
            Definition::Flags(_) => EntityKind::Flags,
            Definition::Handle(_) => EntityKind::Handle,
        }
    }
}

/// A command, struct, enum, flags type or handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub kind: EntityKind,
    /// First feature or extension that lists this entity.
    pub owner: Option<String>,
    /// Canonical entity this name aliases.
    pub alias: Option<String>,
    /// Platform tag, explicit or inherited from the owning extension.
    pub platform: Option<String>,
    /// `None` exactly when `alias` is set.
    pub def: Option<Definition>,
}

impl Entity {
    pub fn is_alias(&self) -> bool {
        self.alias.is_some()
    }

    pub fn as_command(&self) -> Option<&CommandDef> {
        match &self.def {
            Some(Definition::Command(def)) => Some(def),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructDef> {
        match &self.def {
            Some(Definition::Struct(def)) => Some(def),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumDef> {
        match &self.def {
            Some(Definition::Enum(def)) => Some(def),
            _ => None,
        }
    }

    pub fn as_flags(&self) -> Option<&FlagsDef> {
        match &self.def {
            Some(Definition::Flags(def)) => Some(def),
            _ => None,
        }
    }

    pub fn as_handle(&self) -> Option<&HandleDef> {
        match &self.def {
            Some(Definition::Handle(def)) => Some(def),
            _ => None,
        }
    }

    /// Parameters of a command or members of a struct; empty for other kinds.
    pub fn members(&self) -> &[Member] {
        match &self.def {
            Some(Definition::Command(def)) => &def.params,
            Some(Definition::Struct(def)) => &def.members,
            _ => &[],
        }
    }

    /// Every type name this entity's signature refers to.
    pub fn referenced_types(&self) -> impl Iterator<Item = &str> {
        let ret = self.as_command().and_then(CommandDef::returns);
        ret.into_iter()
            .chain(self.members().iter().map(|m| m.ty.as_str()))
    }
}

/// A core API version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub ordinal: u32,
    #[serde(default)]
    pub protect: Option<String>,
    #[serde(default)]
    pub entities: Vec<String>,
}

impl Feature {
    pub fn new(name: impl Into<String>, ordinal: u32, entities: &[&str]) -> Self {
        Self {
            name: name.into(),
            ordinal,
            protect: None,
            entities: entities.iter().map(|e| e.to_string()).collect(),
        }
    }

    pub fn with_protect(mut self, guard: impl Into<String>) -> Self {
        self.protect = Some(guard.into());
        self
    }
}

/// An optional, separately guarded addition to the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Extension {
    pub name: String,
    pub protect: Option<String>,
    /// Features and extensions that must be visited first.
    pub requires: Vec<String>,
    pub platform: Option<String>,
    pub entities: Vec<String>,
}

impl Extension {
    pub fn new(name: impl Into<String>, entities: &[&str]) -> Self {
        Self {
            name: name.into(),
            entities: entities.iter().map(|e| e.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_protect(mut self, guard: impl Into<String>) -> Self {
        self.protect = Some(guard.into());
        self
    }

    pub fn requires(mut self, names: &[&str]) -> Self {
        self.requires = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }
}
