//! Read-only domain queries shared by the traversal engine and every backend.

use crate::error::Error;
use crate::ir::{Entity, EntityKind, FlagWidth};
use crate::registry::Registry;
use crate::resolver::Resolver;
use std::collections::BTreeSet;

/// How a type name is classified for emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass {
    Handle,
    Struct,
    Enum,
    Flags,
    /// A type the registry does not define (scalars, platform types, `char`).
    Opaque,
}

/// The registry seen through a [`Resolver`].
///
/// This is the domain half of a generation run; the output shape is the
/// [`Backend`](crate::traits::Backend). A `Domain` holds no per-run state and
/// may be shared across concurrent runs.
#[derive(Debug, Clone)]
pub struct Domain<'r> {
    resolver: Resolver<'r>,
}

impl<'r> Domain<'r> {
    pub fn new(resolver: Resolver<'r>) -> Self {
        Self { resolver }
    }

    pub fn registry(&self) -> &'r Registry {
        self.resolver.registry()
    }

    pub fn resolver(&self) -> &Resolver<'r> {
        &self.resolver
    }

    /// The canonical entity a type name refers to, if the registry defines it.
    pub fn type_entity(&self, ty: &str) -> Result<Option<&'r Entity>, Error> {
        if self.registry().get(ty).is_none() {
            return Ok(None);
        }
        self.resolver.canonical(ty).map(Some)
    }

    pub fn classify(&self, ty: &str) -> Result<TypeClass, Error> {
        let class = match self.type_entity(ty)?.map(|e| e.kind) {
            Some(EntityKind::Handle) => TypeClass::Handle,
            Some(EntityKind::Struct) => TypeClass::Struct,
            Some(EntityKind::Enum) => TypeClass::Enum,
            Some(EntityKind::Flags) => TypeClass::Flags,
            Some(EntityKind::Command) | None => TypeClass::Opaque,
        };
        Ok(class)
    }

    /// The token to emit for `ty` when it appears in `owner`'s signature.
    ///
    /// Registry types become their canonical name; platform-dependent types
    /// are replaced by the override for the owner's platform (or the type's
    /// default platform when the owner has none).
    pub fn type_token(&self, owner: &Entity, ty: &str) -> Result<String, Error> {
        if let Some(entity) = self.type_entity(ty)? {
            return Ok(entity.name.clone());
        }
        match self.registry().platform_of_type(ty) {
            Some(default_platform) => {
                let platform = owner.platform.as_deref().unwrap_or(default_platform);
                self.resolver
                    .platform_type_for(ty, platform)
                    .map(str::to_string)
            }
            None => Ok(ty.to_string()),
        }
    }

    /// Resolve every platform type in `entity`'s signature.
    ///
    /// Returns whether any was found, so the composer knows to add the
    /// platform headers.
    pub fn check_platform_types(&self, entity: &Entity) -> Result<bool, Error> {
        let mut used = false;
        for ty in entity.referenced_types() {
            if self.registry().platform_of_type(ty).is_some() {
                self.type_token(entity, ty)?;
                used = true;
            }
        }
        Ok(used)
    }

    /// The first blacklisted name `entity`'s signature refers to, following
    /// struct members transitively.
    pub fn blacklisted_reference(&self, entity: &Entity) -> Result<Option<String>, Error> {
        let mut visited = BTreeSet::new();
        let mut pending = vec![entity];
        while let Some(current) = pending.pop() {
            for ty in current.referenced_types() {
                if self.registry().get(ty).is_none() {
                    continue;
                }
                if self.resolver.is_suppressed(ty)? {
                    return Ok(Some(ty.to_string()));
                }
                let target = self.resolver.canonical(ty)?;
                if target.kind == EntityKind::Struct && visited.insert(target.name.as_str()) {
                    pending.push(target);
                }
            }
        }
        Ok(None)
    }

    /// Whether a struct has handle members, directly or through nested structs.
    pub fn is_handle_bearing(&self, entity: &Entity) -> Result<bool, Error> {
        if entity.kind != EntityKind::Struct {
            return Ok(false);
        }
        let mut visited = BTreeSet::from([entity.name.as_str()]);
        let mut pending = vec![entity];
        while let Some(current) = pending.pop() {
            for member in current.members() {
                let Some(target) = self.type_entity(&member.ty)? else {
                    continue;
                };
                match target.kind {
                    EntityKind::Handle => return Ok(true),
                    EntityKind::Struct if visited.insert(target.name.as_str()) => {
                        pending.push(target)
                    }
                    _ => {}
                }
            }
        }
        Ok(false)
    }

    /// Width class of a flags type, from the highest bit its bits enum uses.
    pub fn flag_width(&self, flags: &Entity) -> Result<FlagWidth, Error> {
        let Some(bits_enum) = flags.as_flags().and_then(|f| f.bits_enum.as_deref()) else {
            return Ok(FlagWidth::Bits32);
        };
        let bits = self.resolver.canonical(bits_enum)?;
        let highest = bits
            .as_enum()
            .into_iter()
            .flat_map(|def| &def.values)
            .filter_map(|v| v.highest_bit())
            .max();
        Ok(match highest {
            Some(bit) if bit >= 32 => FlagWidth::Bits64,
            _ => FlagWidth::Bits32,
        })
    }

    /// Width class of an enum: the width of the flags type whose bits it
    /// lists, or [`FlagWidth::Bits32`] for enums no flags type refers to.
    pub fn bits_enum_width(&self, entity: &Entity) -> Result<FlagWidth, Error> {
        if entity.kind != EntityKind::Enum {
            return Ok(FlagWidth::Bits32);
        }
        for flags in self.registry().entities() {
            if flags.kind != EntityKind::Flags || flags.alias.is_some() {
                continue;
            }
            let Some(bits_enum) = flags.as_flags().and_then(|f| f.bits_enum.as_deref()) else {
                continue;
            };
            if self.resolver.canonical(bits_enum)?.name == entity.name {
                return self.flag_width(flags);
            }
        }
        Ok(FlagWidth::Bits32)
    }
}
