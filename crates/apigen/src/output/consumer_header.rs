//! Consumer interface header: one `Process_*` method per command.

use super::params::params_of;
use super::{ApiNaming, snake_case};
use crate::compose::Include;
use crate::domain::Domain;
use crate::error::Error;
use crate::ir::{Entity, EntityKind};
use crate::traits::{ArtifactKind, Backend, Block};
use std::fmt::Write;

/// Consumer header options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerHeaderOptions {
    pub naming: ApiNaming,
    pub class_name: String,
    pub base_class: String,
    /// Header declaring `base_class`, relative to `decode/`.
    pub base_class_header: String,
    /// Declare `override` methods instead of empty-bodied virtuals.
    pub is_override: bool,
    pub constructor_args: String,
}

impl ConsumerHeaderOptions {
    pub fn new(naming: ApiNaming) -> Self {
        let lower = naming.lower();
        Self {
            class_name: format!("{}Consumer", naming.api_prefix),
            base_class: format!("{}ConsumerBase", naming.api_prefix),
            base_class_header: format!("{lower}_consumer_base.h"),
            is_override: false,
            constructor_args: String::new(),
            naming,
        }
    }
}

impl Default for ConsumerHeaderOptions {
    fn default() -> Self {
        Self::new(ApiNaming::default())
    }
}

pub struct ConsumerHeaderBackend {
    options: ConsumerHeaderOptions,
}

impl ConsumerHeaderBackend {
    pub fn new(options: ConsumerHeaderOptions) -> Self {
        Self { options }
    }
}

impl Backend for ConsumerHeaderBackend {
    fn name(&self) -> &'static str {
        "consumer-header"
    }

    fn artifact_kind(&self) -> ArtifactKind {
        ArtifactKind::Header
    }

    fn file_stem(&self) -> String {
        format!("generated_{}", snake_case(&self.options.class_name))
    }

    fn declared_headers(&self) -> Vec<Include> {
        vec![
            Include::local(format!("decode/{}", self.options.base_class_header)),
            Include::local("util/defines.h"),
        ]
    }

    fn namespace_tokens(&self) -> Vec<String> {
        self.options.naming.namespaces_with("decode")
    }

    fn relevant_kinds(&self) -> &'static [EntityKind] {
        &[EntityKind::Command]
    }

    fn emit(
        &mut self,
        domain: &Domain<'_>,
        _block: Block<'_>,
        entity: &Entity,
    ) -> Result<String, Error> {
        let mut out = format!(
            "    virtual void Process_{}(\n        const ApiCallInfo& call_info",
            entity.name
        );
        for param in params_of(domain, entity)? {
            let _ = write!(out, ",\n        {} {}", param.consumer_type(), param.name);
        }
        out.push_str(if self.options.is_override {
            ") override;\n"
        } else {
            ") {}\n"
        });
        Ok(out)
    }

    fn body_prefix(&self) -> String {
        let ConsumerHeaderOptions {
            class_name,
            base_class,
            constructor_args,
            is_override,
            ..
        } = &self.options;
        let destructor = if *is_override { " override" } else { "" };
        format!(
            "class {class_name} : public {base_class}\n\
             {{\n  \
             public:\n    \
             {class_name}({constructor_args}) {{}}\n\n    \
             virtual ~{class_name}(){destructor} {{}}\n"
        )
    }

    fn trailer(&mut self) -> String {
        "};\n".to_string()
    }
}
