//! Error types.

use crate::ir::EntityKind;

/// A failure raised while resolving or emitting a single entity.
///
/// Every variant is fatal to the generation run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("unknown entity `{name}`")]
    UnknownEntity { name: String },

    #[error("{kind} alias `{alias}` points at `{target}`, which is not a canonical {kind}")]
    BrokenAlias {
        kind: EntityKind,
        alias: String,
        target: String,
    },

    #[error("no `{platform}` mapping for platform type `{type_name}`")]
    MissingPlatformMapping { type_name: String, platform: String },

    /// The same canonical entity reached a backend twice in one run.
    #[error("{kind} `{name}` emitted twice in one run")]
    DuplicateEmission { kind: EntityKind, name: String },

    #[error("extension requirements form a cycle through {}", .members.join(", "))]
    RequiresCycle { members: Vec<String> },
}

impl Error {
    pub(crate) fn unknown(name: impl Into<String>) -> Self {
        Error::UnknownEntity { name: name.into() }
    }
}

/// Whether a traversal block is a feature or an extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Feature,
    Extension,
}

impl BlockKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Feature => "feature",
            BlockKind::Extension => "extension",
        }
    }
}

/// A run-aborting [`Error`] with the context it occurred in.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "{} `{entity}` in {} `{block}`",
    .kind.map_or("entity", EntityKind::as_str),
    .block_kind.as_str()
)]
pub struct GenerateError {
    pub block_kind: BlockKind,
    pub block: String,
    pub entity: String,
    pub kind: Option<EntityKind>,
    #[source]
    pub source: Error,
}

/// A malformed registry document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid registry document")]
    Json(#[from] serde_json::Error),

    #[error("entity `{0}` is defined more than once")]
    DuplicateEntity(String),

    #[error("block `{0}` is defined more than once")]
    DuplicateBlock(String),

    #[error("features `{first}` and `{second}` share ordinal {ordinal}")]
    DuplicateOrdinal {
        ordinal: u32,
        first: String,
        second: String,
    },

    #[error("`{block}` lists `{name}`, which is not defined")]
    UnknownReference { block: String, name: String },
}
