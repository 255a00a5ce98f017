//! Catalog of the built-in backends.
//!
//! Backends carry per-run state, so the catalog hands out a fresh instance
//! for every run instead of shared references.

use crate::config::GeneratorConfig;
use crate::output::{
    ConsumerHeaderBackend, DecoderBodyBackend, EnumJsonHeaderBackend, ObjectInfoTableBackend,
    StructHandleMappersBackend, StructHandleWrappersBackend,
};
use crate::traits::Backend;
use std::fmt;

/// A built-in backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    ConsumerHeader,
    DecoderBody,
    EnumJsonHeader,
    StructHandleMappers,
    StructHandleWrappers,
    ObjectInfoTable,
}

impl BackendKind {
    pub const ALL: [BackendKind; 6] = [
        BackendKind::ConsumerHeader,
        BackendKind::DecoderBody,
        BackendKind::EnumJsonHeader,
        BackendKind::StructHandleMappers,
        BackendKind::StructHandleWrappers,
        BackendKind::ObjectInfoTable,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BackendKind::ConsumerHeader => "consumer-header",
            BackendKind::DecoderBody => "decoder-body",
            BackendKind::EnumJsonHeader => "enum-to-json-header",
            BackendKind::StructHandleMappers => "struct-handle-mappers-body",
            BackendKind::StructHandleWrappers => "struct-handle-wrappers-header",
            BackendKind::ObjectInfoTable => "object-info-table-header",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            BackendKind::ConsumerHeader => {
                "consumer interface with one Process_* method per command"
            }
            BackendKind::DecoderBody => "Decode_* routines and the DecodeFunctionCall dispatch",
            BackendKind::EnumJsonHeader => "FieldToJson declarations for enums and flags",
            BackendKind::StructHandleMappers => {
                "MapStructHandles routines for handle-bearing structs"
            }
            BackendKind::StructHandleWrappers => {
                "UnwrapStructHandles prototypes for handle-bearing structs"
            }
            BackendKind::ObjectInfoTable => "typed object info table accessors per handle",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// A fresh backend for one run.
    pub fn create(self, config: &GeneratorConfig) -> Box<dyn Backend> {
        match self {
            BackendKind::ConsumerHeader => {
                Box::new(ConsumerHeaderBackend::new(config.consumer_options()))
            }
            BackendKind::DecoderBody => Box::new(DecoderBodyBackend::new(config.decoder_options())),
            BackendKind::EnumJsonHeader => Box::new(EnumJsonHeaderBackend::new(config.naming())),
            BackendKind::StructHandleMappers => {
                Box::new(StructHandleMappersBackend::new(config.naming()))
            }
            BackendKind::StructHandleWrappers => {
                Box::new(StructHandleWrappersBackend::new(config.naming()))
            }
            BackendKind::ObjectInfoTable => Box::new(ObjectInfoTableBackend::new(config.naming())),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Get a fresh backend by name.
pub fn get_backend(name: &str, config: &GeneratorConfig) -> Option<Box<dyn Backend>> {
    BackendKind::from_name(name).map(|kind| kind.create(config))
}

/// List all backend names.
pub fn backend_names() -> Vec<&'static str> {
    BackendKind::ALL.into_iter().map(BackendKind::name).collect()
}
