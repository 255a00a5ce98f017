//! `FieldToJson` serializer declarations for enums and flags.
//!
//! 64-bit flag types and their bits enums share their value type
//! (`VkFlags64`) with every other wide flag type, so each one gets an empty
//! marker struct `{Name}_t` and its overload takes the marker as a leading
//! parameter. 32-bit flags and ordinary enums are distinguished by their own
//! type names and never get a marker.

use super::ApiNaming;
use crate::compose::Include;
use crate::domain::Domain;
use crate::error::Error;
use crate::ir::{Entity, EntityKind, FlagWidth};
use crate::traits::{ArtifactKind, Backend, Block};
use std::collections::BTreeSet;

const OPTIONS_PARAM: &str = "const util::JsonOptions& options = util::JsonOptions()";

pub struct EnumJsonHeaderBackend {
    naming: ApiNaming,
    /// Marker types declared so far in this run.
    markers: BTreeSet<String>,
}

impl EnumJsonHeaderBackend {
    pub fn new(naming: ApiNaming) -> Self {
        Self {
            naming,
            markers: BTreeSet::new(),
        }
    }

    fn marker(&mut self, kind: EntityKind, name: &str) -> Result<String, Error> {
        if !self.markers.insert(name.to_string()) {
            return Err(Error::DuplicateEmission {
                kind,
                name: format!("{name}_t"),
            });
        }
        Ok(format!("struct {name}_t {{ }};\n"))
    }
}

impl Backend for EnumJsonHeaderBackend {
    fn name(&self) -> &'static str {
        "enum-to-json-header"
    }

    fn artifact_kind(&self) -> ArtifactKind {
        ArtifactKind::Header
    }

    fn file_stem(&self) -> String {
        format!("generated_{}_enum_to_json", self.naming.lower())
    }

    fn declared_headers(&self) -> Vec<Include> {
        vec![
            Include::local("format/platform_types.h"),
            Include::local("util/json_util.h"),
        ]
    }

    fn namespace_tokens(&self) -> Vec<String> {
        self.naming.namespaces_with("decode")
    }

    fn relevant_kinds(&self) -> &'static [EntityKind] {
        &[EntityKind::Enum, EntityKind::Flags]
    }

    fn emit(
        &mut self,
        domain: &Domain<'_>,
        _block: Block<'_>,
        entity: &Entity,
    ) -> Result<String, Error> {
        let name = &entity.name;
        if entity.kind == EntityKind::Enum {
            return match domain.bits_enum_width(entity)? {
                FlagWidth::Bits32 => Ok(format!(
                    "void FieldToJson(nlohmann::ordered_json& jdata, const {name}& value, \
                     {OPTIONS_PARAM});\n"
                )),
                FlagWidth::Bits64 => {
                    let marker = self.marker(EntityKind::Enum, name)?;
                    Ok(format!(
                        "{marker}void FieldToJson({name}_t, nlohmann::ordered_json& jdata, \
                         const {name}& value, {OPTIONS_PARAM});\n"
                    ))
                }
            };
        }

        match domain.flag_width(entity)? {
            FlagWidth::Bits32 => Ok(format!(
                "void FieldToJson(nlohmann::ordered_json& jdata, const {name} flags, \
                 {OPTIONS_PARAM});\n"
            )),
            FlagWidth::Bits64 => {
                let value_type = entity
                    .as_flags()
                    .and_then(|f| f.base_type.as_deref())
                    .unwrap_or(name.as_str());
                let marker = self.marker(EntityKind::Flags, name)?;
                Ok(format!(
                    "{marker}void FieldToJson({name}_t, nlohmann::ordered_json& jdata, \
                     const {value_type} flags, {OPTIONS_PARAM});\n"
                ))
            }
        }
    }

    fn entity_separator(&self) -> &'static str {
        ""
    }
}
