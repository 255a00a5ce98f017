//! Capture-side `UnwrapStructHandles` prototypes for structs that carry
//! handles, plus the pointer and array helpers built on them.

use super::ApiNaming;
use crate::compose::Include;
use crate::domain::Domain;
use crate::error::Error;
use crate::ir::{Entity, EntityKind};
use crate::traits::{ArtifactKind, Backend, Block};

const UNWRAP_HELPERS: &str = "\
template <typename T>
T* MakeUnwrapStructs(const T* values, size_t len, HandleUnwrapMemory* unwrap_memory)
{
    assert((values != nullptr) && (len > 0));

    const uint8_t* bytes     = reinterpret_cast<const uint8_t*>(values);
    size_t         num_bytes = len * sizeof(T);

    return reinterpret_cast<T*>(unwrap_memory->GetFilledBuffer(bytes, num_bytes));
}

template <typename T>
const T* UnwrapStructPtrHandles(const T* value, HandleUnwrapMemory* unwrap_memory)
{
    T* unwrapped_struct = nullptr;

    if (value != nullptr)
    {
        unwrapped_struct = MakeUnwrapStructs(value, 1, unwrap_memory);
        UnwrapStructHandles(unwrapped_struct, unwrap_memory);
    }

    return unwrapped_struct;
}

template <typename T>
const T* UnwrapStructArrayHandles(const T* values, size_t len, HandleUnwrapMemory* unwrap_memory)
{
    if ((values != nullptr) && (len > 0))
    {
        auto unwrapped_structs = MakeUnwrapStructs(values, len, unwrap_memory);

        for (size_t i = 0; i < len; ++i)
        {
            UnwrapStructHandles(&unwrapped_structs[i], unwrap_memory);
        }

        return unwrapped_structs;
    }

    // Non-null pointer with a zero length keeps the caller's memory.
    return values;
}
";

pub struct StructHandleWrappersBackend {
    naming: ApiNaming,
}

impl StructHandleWrappersBackend {
    pub fn new(naming: ApiNaming) -> Self {
        Self { naming }
    }
}

impl Backend for StructHandleWrappersBackend {
    fn name(&self) -> &'static str {
        "struct-handle-wrappers-header"
    }

    fn artifact_kind(&self) -> ArtifactKind {
        ArtifactKind::Header
    }

    fn file_stem(&self) -> String {
        format!("generated_{}_struct_handle_wrappers", self.naming.lower())
    }

    fn declared_headers(&self) -> Vec<Include> {
        let lower = self.naming.lower();
        vec![
            Include::local(format!("encode/custom_{lower}_struct_handle_wrappers.h")),
            Include::local("encode/handle_unwrap_memory.h"),
            Include::local(format!("encode/{lower}_handle_wrapper_util.h")),
            Include::local("format/platform_types.h"),
            Include::local("util/defines.h"),
        ]
    }

    fn namespace_tokens(&self) -> Vec<String> {
        let mut namespaces = self.naming.namespaces_with("encode");
        namespaces.push(format!("{}_wrappers", self.naming.lower()));
        namespaces
    }

    fn relevant_kinds(&self) -> &'static [EntityKind] {
        &[EntityKind::Struct]
    }

    fn is_relevant(&self, domain: &Domain<'_>, entity: &Entity) -> Result<bool, Error> {
        domain.is_handle_bearing(entity)
    }

    fn emit(
        &mut self,
        _domain: &Domain<'_>,
        _block: Block<'_>,
        entity: &Entity,
    ) -> Result<String, Error> {
        Ok(format!(
            "void UnwrapStructHandles({}* value, HandleUnwrapMemory* unwrap_memory);\n",
            entity.name
        ))
    }

    fn entity_separator(&self) -> &'static str {
        ""
    }

    fn trailer(&mut self) -> String {
        UNWRAP_HELPERS.to_string()
    }
}
