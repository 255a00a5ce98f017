//! Typed object info table: per-handle accessors over one map per handle.

use super::{ApiNaming, lower_first};
use crate::compose::{Include, join_guarded};
use crate::domain::Domain;
use crate::error::Error;
use crate::ir::{Entity, EntityKind};
use crate::traits::{ArtifactKind, Backend, Block};

pub struct ObjectInfoTableBackend {
    naming: ApiNaming,
    /// Map member declarations, with the guard of the block that added them.
    maps: Vec<(Option<String>, String)>,
}

impl ObjectInfoTableBackend {
    pub fn new(naming: ApiNaming) -> Self {
        Self {
            naming,
            maps: Vec::new(),
        }
    }

    fn class_name(&self) -> String {
        format!("{}ObjectInfoTableBase2", self.naming.api_prefix)
    }
}

impl Backend for ObjectInfoTableBackend {
    fn name(&self) -> &'static str {
        "object-info-table-header"
    }

    fn artifact_kind(&self) -> ArtifactKind {
        ArtifactKind::Header
    }

    fn file_stem(&self) -> String {
        format!("generated_{}_object_info_table_base2", self.naming.lower())
    }

    fn declared_headers(&self) -> Vec<Include> {
        vec![Include::local(format!(
            "decode/{}_object_info_table_base.h",
            self.naming.lower()
        ))]
    }

    fn namespace_tokens(&self) -> Vec<String> {
        self.naming.namespaces_with("decode")
    }

    fn relevant_kinds(&self) -> &'static [EntityKind] {
        &[EntityKind::Handle]
    }

    fn emit(
        &mut self,
        _domain: &Domain<'_>,
        block: Block<'_>,
        entity: &Entity,
    ) -> Result<String, Error> {
        let handle = &entity.name;
        let info = self.naming.handle_info(handle);
        let map = format!("{}_map_", lower_first(self.naming.short_name(handle)));
        let tp = &self.naming.type_prefix;

        self.maps.push((
            block.guard.map(str::to_string),
            format!("    std::unordered_map<format::HandleId, {info}> {map};\n"),
        ));
        Ok(format!(
            "    void Add{handle}Info({info}&& info) {{ Add{tp}ObjectInfo(std::move(info), &{map}); }}\n\
             \x20   void Remove{handle}Info(format::HandleId id) {{ {map}.erase(id); }}\n\
             \x20   const {info}* Get{handle}Info(format::HandleId id) const {{ return Get{tp}ObjectInfo<{info}>(id, &{map}); }}\n\
             \x20   {info}* Get{handle}Info(format::HandleId id) {{ return Get{tp}ObjectInfo<{info}>(id, &{map}); }}\n\
             \x20   void Visit{handle}Info(std::function<void(const {info}*)> visitor) const \
             {{ for (const auto& entry : {map}) {{ visitor(&entry.second); }} }}\n"
        ))
    }

    fn body_prefix(&self) -> String {
        let class = self.class_name();
        format!(
            "class {class} : {api}ObjectInfoTableBase\n{{\n  public:\n    \
             {class}() {{}}\n    ~{class}() {{}}\n",
            api = self.naming.api_prefix
        )
    }

    fn trailer(&mut self) -> String {
        format!("  protected:\n{}}};\n", join_guarded(&self.maps))
    }
}
