//! The capability interface every output backend implements.

use crate::compose::Include;
use crate::domain::Domain;
use crate::error::Error;
use crate::ir::{Entity, EntityKind};
use serde::Serialize;

/// Which half of a header/implementation pair a backend produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Declarations (`.h`).
    Header,
    /// Definitions (`.cpp`).
    Body,
}

impl ArtifactKind {
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Header => "h",
            ArtifactKind::Body => "cpp",
        }
    }
}

/// The feature or extension an entity is emitted under.
#[derive(Debug, Clone, Copy)]
pub struct Block<'a> {
    pub name: &'a str,
    /// Conditional-compilation guard wrapped around this block's output, if any.
    pub guard: Option<&'a str>,
}

/// A code generation backend.
///
/// The traversal engine owns the order of emission and all filtering: a
/// backend only sees canonical, non-blacklisted entities, each exactly once
/// per run. A backend instance is constructed for one run and dropped after
/// the artifact is composed, so per-run bookkeeping (collected dispatch cases,
/// emitted marker types) lives in `&mut self`.
///
/// # Implementing Custom Backends
///
/// ```ignore
/// struct CommandList;
///
/// impl Backend for CommandList {
///     fn name(&self) -> &'static str { "command-list" }
///     fn artifact_kind(&self) -> ArtifactKind { ArtifactKind::Header }
///     fn file_stem(&self) -> String { "command_list".into() }
///     fn declared_headers(&self) -> Vec<Include> { vec![] }
///     fn namespace_tokens(&self) -> Vec<String> { vec![] }
///     fn relevant_kinds(&self) -> &'static [EntityKind] { &[EntityKind::Command] }
///     fn emit(&mut self, _: &Domain<'_>, _: Block<'_>, e: &Entity) -> Result<String, Error> {
///         Ok(format!("// {}\n", e.name))
///     }
/// }
/// ```
pub trait Backend: Send {
    /// Unique backend identifier (e.g. "decoder-body").
    fn name(&self) -> &'static str;

    fn artifact_kind(&self) -> ArtifactKind;

    /// Suggested output file name, without extension.
    fn file_stem(&self) -> String;

    /// Headers this backend's output needs, in include order.
    fn declared_headers(&self) -> Vec<Include>;

    /// Namespaces to open around the body, outermost first.
    fn namespace_tokens(&self) -> Vec<String>;

    /// Entity kinds this backend emits anything for.
    fn relevant_kinds(&self) -> &'static [EntityKind];

    /// Whether `entity` produces output. Backends that emit only a subset of
    /// a kind (e.g. handle-bearing structs) narrow this further.
    fn is_relevant(&self, _domain: &Domain<'_>, entity: &Entity) -> Result<bool, Error> {
        Ok(self.relevant_kinds().contains(&entity.kind))
    }

    /// Whether a block's filtered delta produces any output at all.
    ///
    /// When false the block is skipped entirely, guard included.
    fn should_emit(&self, domain: &Domain<'_>, delta: &[&Entity]) -> Result<bool, Error> {
        for entity in delta {
            if self.is_relevant(domain, entity)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Emit one self-contained declaration or definition, ending in a newline.
    fn emit(
        &mut self,
        domain: &Domain<'_>,
        block: Block<'_>,
        entity: &Entity,
    ) -> Result<String, Error>;

    /// Text placed between consecutive emissions within one block.
    fn entity_separator(&self) -> &'static str {
        "\n"
    }

    /// Text opening the body, inside the namespaces (e.g. a class head).
    fn body_prefix(&self) -> String {
        String::new()
    }

    /// Text closing the body, inside the namespaces, built from what the run
    /// collected.
    fn trailer(&mut self) -> String {
        String::new()
    }
}
