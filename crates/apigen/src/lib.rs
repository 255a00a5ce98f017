//! Registry-driven C++ source generation.
//!
//! `apigen` walks an API registry (features, extensions, commands, structs,
//! enums, flags and handles) and emits one C++ artifact per backend: decoder
//! routines, consumer interfaces, enum serializers, handle mappers and
//! capture-side handle unwrapping.
//!
//! # Architecture
//!
//! ```text
//! Registry document        Domain                 Traversal           Backends
//! ─────────────────     ──────────────────     ─────────────────    ──────────────────────
//! JSON  ─┐                                                        ┌─> consumer-header
//!        ├─> Registry ──> Resolver ──────────> Generator ─────────┼─> decoder-body
//! Rust  ─┘   (ir.rs)     (aliases,            (features by        ├─> enum-to-json-header
//! builder                 blacklist,           ordinal, then      ├─> struct-handle-mappers-body
//!                         platform types)      extensions by      ├─> struct-handle-wrappers-header
//!                                              requires + name)   └─> object-info-table-header
//!                                                                       │
//!                                                                       v
//!                                                          compose: includes, namespaces,
//!                                                          guards -> Artifact
//! ```
//!
//! A run composes a read-only [`Domain`] with one fresh [`Backend`]. Aliases
//! resolve to their canonical entity, blacklisted names (and anything that
//! refers to them) are skipped, and each canonical entity reaches the backend
//! at most once. A run either produces a complete [`Artifact`] or fails with a
//! [`GenerateError`] naming the entity and block; nothing partial is returned.
//!
//! # Example
//!
//! ```
//! use apigen::{BackendKind, GeneratorConfig, generate, input::parse_registry_str};
//!
//! let registry = parse_registry_str(r#"{
//!     "enums": [
//!         { "name": "Color", "values": [{ "name": "RED", "value": 0 }] },
//!         { "name": "Color2", "alias": "Color" }
//!     ],
//!     "features": [{ "name": "v1", "ordinal": 1, "entities": ["Color"] }],
//!     "extensions": [{ "name": "ext1", "requires": ["v1"], "entities": ["Color2"] }]
//! }"#).unwrap();
//!
//! let config = GeneratorConfig::default();
//! let domain = config.domain(&registry);
//! let artifact = generate(
//!     &domain,
//!     BackendKind::EnumJsonHeader.create(&config),
//!     &config.output_options(),
//! )
//! .unwrap();
//!
//! assert_eq!(artifact.file_name, "generated_vulkan_enum_to_json.h");
//! assert_eq!(artifact.text.matches("FieldToJson(").count(), 1);
//! assert!(!artifact.text.contains("Color2"));
//! ```
//!
//! # Feature Flags
//!
//! - `parallel` (default) - [`generate_all`] runs backends on the rayon pool

pub mod catalog;
pub mod compose;
pub mod config;
pub mod domain;
pub mod error;
pub mod input;
pub mod ir;
pub mod output;
pub mod registry;
pub mod resolver;
pub mod traits;
pub mod traverse;

pub use catalog::{BackendKind, backend_names, get_backend};
pub use compose::{Artifact, Include, OutputOptions};
pub use config::{ConfigError, GeneratorConfig};
pub use domain::Domain;
pub use error::{Error, GenerateError, ParseError};
pub use registry::Registry;
pub use resolver::{Blacklist, PlatformTypeOverrides, Resolver};
pub use traits::{ArtifactKind, Backend};
pub use traverse::Generator;

/// Run one backend over the domain.
pub fn generate(
    domain: &Domain<'_>,
    backend: Box<dyn Backend>,
    options: &OutputOptions,
) -> Result<Artifact, GenerateError> {
    let name = backend.name();
    let artifact = Generator::new(domain, backend, options).run()?;
    tracing::debug!(
        backend = name,
        file = %artifact.file_name,
        bytes = artifact.text.len(),
        "generated"
    );
    Ok(artifact)
}

/// Run several backends over one domain, each with its own traversal state.
///
/// Results are in the order of `backends`.
#[cfg(feature = "parallel")]
pub fn generate_all(
    domain: &Domain<'_>,
    backends: Vec<Box<dyn Backend>>,
    options: &OutputOptions,
) -> Vec<Result<Artifact, GenerateError>> {
    use rayon::prelude::*;

    backends
        .into_par_iter()
        .map(|backend| generate(domain, backend, options))
        .collect()
}

/// Run several backends over one domain, each with its own traversal state.
///
/// Results are in the order of `backends`.
#[cfg(not(feature = "parallel"))]
pub fn generate_all(
    domain: &Domain<'_>,
    backends: Vec<Box<dyn Backend>>,
    options: &OutputOptions,
) -> Vec<Result<Artifact, GenerateError>> {
    backends
        .into_iter()
        .map(|backend| generate(domain, backend, options))
        .collect()
}
