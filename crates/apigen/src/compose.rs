//! File prologue/epilogue assembly around a backend's body.

use crate::traits::{ArtifactKind, Backend};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// An `#include` directive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Include {
    /// `#include "path"`
    Local(String),
    /// `#include <path>`
    System(String),
}

impl Include {
    /// Parse a configured header: `<cstddef>` is a system header, anything
    /// else is project-local.
    pub fn parse(header: &str) -> Self {
        match header
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
        {
            Some(path) => Include::System(path.to_string()),
            None => Include::Local(header.to_string()),
        }
    }

    pub fn local(path: impl Into<String>) -> Self {
        Include::Local(path.into())
    }

    pub fn system(path: impl Into<String>) -> Self {
        Include::System(path.into())
    }
}

impl fmt::Display for Include {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Include::Local(path) => write!(f, "#include \"{path}\""),
            Include::System(path) => write!(f, "#include <{path}>"),
        }
    }
}

/// File-level output options shared by every backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputOptions {
    /// Text placed verbatim at the top of the file (license banner).
    pub prefix_text: Option<String>,
    /// Wrap header artifacts in an include guard.
    pub protect_file: bool,
    /// Wrap feature/extension blocks in their protection guards.
    pub protect_feature: bool,
    /// Included first, by every backend.
    pub common_headers: Vec<Include>,
    /// Included after the backend's own headers.
    pub extra_headers: Vec<Include>,
    /// Included last, only when an emitted entity used a platform type.
    pub platform_headers: Vec<Include>,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            prefix_text: None,
            protect_file: false,
            protect_feature: true,
            common_headers: Vec::new(),
            extra_headers: Vec::new(),
            platform_headers: Vec::new(),
        }
    }
}

/// One complete generated file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub backend: &'static str,
    pub kind: ArtifactKind,
    /// Suggested file name, e.g. `generated_vulkan_decoder.cpp`.
    pub file_name: String,
    pub text: String,
}

pub(crate) fn guard_open(guard: &str) -> String {
    format!("#ifdef {guard}\n")
}

pub(crate) fn guard_close(guard: &str) -> String {
    format!("#endif // {guard}\n")
}

/// Concatenate items, wrapping each run of items that share a guard in one
/// `#ifdef`/`#endif` pair.
pub(crate) fn join_guarded(items: &[(Option<String>, String)]) -> String {
    let mut out = String::new();
    let mut open: Option<&str> = None;
    for (guard, text) in items {
        if open != guard.as_deref() {
            if let Some(g) = open {
                out.push_str(&guard_close(g));
            }
            if let Some(g) = guard {
                out.push_str(&guard_open(g));
            }
            open = guard.as_deref();
        }
        out.push_str(text);
    }
    if let Some(g) = open {
        out.push_str(&guard_close(g));
    }
    out
}

/// Include guard symbol for a file name: `generated_foo.h` -> `GENERATED_FOO_H`.
fn include_guard(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Assemble the complete file text around `body`.
///
/// Chunks (prefix, include guard, includes, namespace opens, backend prefix,
/// body, backend trailer, namespace closes, guard close) are separated by one
/// blank line; empty chunks are dropped. Namespaces are closed in reverse order
/// even when the body is empty.
pub(crate) fn compose(
    backend: &mut dyn Backend,
    options: &OutputOptions,
    body: &str,
    uses_platform_types: bool,
) -> Artifact {
    let kind = backend.artifact_kind();
    let file_name = format!("{}.{}", backend.file_stem(), kind.extension());
    let guard = (options.protect_file && kind == ArtifactKind::Header)
        .then(|| include_guard(&file_name));

    let platform_headers: &[Include] = if uses_platform_types {
        &options.platform_headers
    } else {
        &[]
    };
    let declared = backend.declared_headers();
    let mut seen = BTreeSet::new();
    let includes: String = options
        .common_headers
        .iter()
        .chain(&declared)
        .chain(&options.extra_headers)
        .chain(platform_headers)
        .filter(|include| seen.insert(*include))
        .map(|include| format!("{include}\n"))
        .collect();

    let namespaces = backend.namespace_tokens();
    let ns_open: String = namespaces
        .iter()
        .map(|ns| format!("namespace {ns} {{\n"))
        .collect();
    let ns_close: String = namespaces
        .iter()
        .rev()
        .map(|ns| format!("}} // namespace {ns}\n"))
        .collect();

    let prefix = options
        .prefix_text
        .as_deref()
        .map(|text| format!("{}\n", text.trim_end()))
        .unwrap_or_default();
    let (guard_start, guard_end) = match &guard {
        Some(g) => (format!("#ifndef {g}\n#define {g}\n"), format!("#endif // {g}\n")),
        None => (String::new(), String::new()),
    };

    let chunks = [
        prefix,
        guard_start,
        includes,
        ns_open,
        backend.body_prefix(),
        body.to_string(),
        backend.trailer(),
        ns_close,
        guard_end,
    ];
    let text = chunks
        .into_iter()
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    Artifact {
        backend: backend.name(),
        kind,
        file_name,
        text,
    }
}
