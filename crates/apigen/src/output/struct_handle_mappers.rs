//! `MapStructHandles` routines for structs that carry handles.

use super::ApiNaming;
use crate::compose::Include;
use crate::domain::{Domain, TypeClass};
use crate::error::Error;
use crate::ir::{Entity, EntityKind};
use crate::traits::{ArtifactKind, Backend, Block};
use std::fmt::Write;

pub struct StructHandleMappersBackend {
    naming: ApiNaming,
}

impl StructHandleMappersBackend {
    pub fn new(naming: ApiNaming) -> Self {
        Self { naming }
    }

    fn handle_lookup(&self, handle: &str) -> (String, String) {
        (
            self.naming.handle_info(handle),
            format!("&CommonObjectInfoTable::Get{handle}Info"),
        )
    }
}

impl Backend for StructHandleMappersBackend {
    fn name(&self) -> &'static str {
        "struct-handle-mappers-body"
    }

    fn artifact_kind(&self) -> ArtifactKind {
        ArtifactKind::Body
    }

    fn file_stem(&self) -> String {
        format!("generated_{}_struct_handle_mappers", self.naming.lower())
    }

    fn declared_headers(&self) -> Vec<Include> {
        let lower = self.naming.lower();
        vec![
            Include::local(format!("generated/{}.h", self.file_stem())),
            Include::local(format!("decode/custom_{lower}_struct_decoders.h")),
            Include::local("decode/handle_pointer_decoder.h"),
            Include::local(format!("decode/{lower}_handle_mapping_util.h")),
            Include::local(format!("generated/generated_{lower}_struct_decoders.h")),
            Include::system("algorithm"),
            Include::system("cassert"),
        ]
    }

    fn namespace_tokens(&self) -> Vec<String> {
        self.naming.namespaces_with("decode")
    }

    fn relevant_kinds(&self) -> &'static [EntityKind] {
        &[EntityKind::Struct]
    }

    fn is_relevant(&self, domain: &Domain<'_>, entity: &Entity) -> Result<bool, Error> {
        domain.is_handle_bearing(entity)
    }

    fn emit(
        &mut self,
        domain: &Domain<'_>,
        _block: Block<'_>,
        entity: &Entity,
    ) -> Result<String, Error> {
        let mut value_lines = String::new();
        let mut lines = String::new();
        for member in entity.members() {
            let m = &member.name;
            let Some(target) = domain.type_entity(&member.ty)? else {
                continue;
            };
            match (domain.classify(&member.ty)?, member.pointer) {
                (TypeClass::Handle, false) => {
                    let (info, getter) = self.handle_lookup(&target.name);
                    let _ = writeln!(
                        value_lines,
                        "        value->{m} = handle_mapping::MapHandle<{info}>(wrapper->{m}, \
                         object_info_table, {getter});"
                    );
                }
                (TypeClass::Handle, true) => {
                    let (info, getter) = self.handle_lookup(&target.name);
                    let _ = writeln!(
                        lines,
                        "        handle_mapping::MapHandleArray<{info}>(&wrapper->{m}, \
                         object_info_table, {getter});"
                    );
                }
                (TypeClass::Struct, false) if domain.is_handle_bearing(target)? => {
                    let _ = writeln!(
                        lines,
                        "        MapStructHandles(wrapper->{m}, object_info_table);"
                    );
                }
                (TypeClass::Struct, true) if domain.is_handle_bearing(target)? => {
                    let _ = writeln!(
                        lines,
                        "        MapStructArrayHandles(wrapper->{m}->GetMetaStructPointer(), \
                         wrapper->{m}->GetLength(), object_info_table);"
                    );
                }
                _ => {}
            }
        }

        let name = &entity.name;
        let mut out = format!(
            "void MapStructHandles(Decoded_{name}* wrapper, \
             const CommonObjectInfoTable& object_info_table)\n{{\n    \
             if (wrapper != nullptr)\n    {{\n"
        );
        if !value_lines.is_empty() {
            let _ = writeln!(out, "        {name}* value = wrapper->decoded_value;\n");
        }
        out.push_str(&value_lines);
        if !value_lines.is_empty() && !lines.is_empty() {
            out.push('\n');
        }
        out.push_str(&lines);
        out.push_str("    }\n}\n");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{HandleDef, Member};
    use crate::registry::Registry;
    use crate::resolver::Resolver;

    #[test]
    fn maps_handles_and_nested_structs() {
        let registry = Registry::builder()
            .handle("VkImage", HandleDef::default())
            .handle("VkSampler", HandleDef::default())
            .structure("VkSamplerInfo", vec![Member::value("sampler", "VkSampler")])
            .structure(
                "VkBinding",
                vec![
                    Member::value("image", "VkImage"),
                    Member::value("count", "uint32_t"),
                    Member::pointer("pSamplers", "VkSampler").with_const(),
                    Member::value("info", "VkSamplerInfo"),
                    Member::pointer("pInfos", "VkSamplerInfo").with_const(),
                ],
            )
            .structure("VkExtent", vec![Member::value("width", "uint32_t")])
            .build()
            .unwrap();
        let domain = Domain::new(Resolver::new(
            &registry,
            Default::default(),
            Default::default(),
        ));
        let mut backend = StructHandleMappersBackend::new(ApiNaming::default());

        let extent = registry.entity("VkExtent").unwrap();
        assert!(!backend.is_relevant(&domain, extent).unwrap());

        let binding = registry.entity("VkBinding").unwrap();
        assert!(backend.is_relevant(&domain, binding).unwrap());
        let block = Block {
            name: "v1",
            guard: None,
        };
        let text = backend.emit(&domain, block, binding).unwrap();
        assert_eq!(
            text,
            "void MapStructHandles(Decoded_VkBinding* wrapper, const CommonObjectInfoTable& object_info_table)\n\
             {\n    if (wrapper != nullptr)\n    {\n        \
             VkBinding* value = wrapper->decoded_value;\n\n        \
             value->image = handle_mapping::MapHandle<VulkanImageInfo>(wrapper->image, object_info_table, \
             &CommonObjectInfoTable::GetVkImageInfo);\n\n        \
             handle_mapping::MapHandleArray<VulkanSamplerInfo>(&wrapper->pSamplers, object_info_table, \
             &CommonObjectInfoTable::GetVkSamplerInfo);\n        \
             MapStructHandles(wrapper->info, object_info_table);\n        \
             MapStructArrayHandles(wrapper->pInfos->GetMetaStructPointer(), wrapper->pInfos->GetLength(), \
             object_info_table);\n    }\n}\n"
        );
    }
}
