//! One generation run: features, then extensions, through one backend.

use crate::compose::{self, Artifact, OutputOptions, guard_close, guard_open};
use crate::domain::Domain;
use crate::error::{BlockKind, Error, GenerateError};
use crate::ir::{Entity, EntityKind, Extension};
use crate::registry::Registry;
use crate::traits::{Backend, Block};
use std::collections::{BTreeMap, BTreeSet};

/// Traversal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    VisitingFeatures,
    VisitingExtensions,
    Done,
}

/// Canonical names already handed to the backend in this run, per kind.
#[derive(Debug, Default)]
pub(crate) struct EmittedSet {
    by_kind: BTreeMap<EntityKind, BTreeSet<String>>,
}

impl EmittedSet {
    pub(crate) fn contains(&self, kind: EntityKind, name: &str) -> bool {
        self.by_kind
            .get(&kind)
            .is_some_and(|names| names.contains(name))
    }

    pub(crate) fn mark(&mut self, kind: EntityKind, name: &str) -> Result<(), Error> {
        if !self.by_kind.entry(kind).or_default().insert(name.to_string()) {
            return Err(Error::DuplicateEmission {
                kind,
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

/// Order extensions so each follows its prerequisites, ties broken by name.
///
/// Prerequisites naming features are already satisfied. Unknown prerequisite
/// names are [`Error::UnknownEntity`]; cycles are [`Error::RequiresCycle`].
pub fn extension_order(registry: &Registry) -> Result<Vec<&Extension>, GenerateError> {
    let mut waiting_on: BTreeMap<&str, usize> = BTreeMap::new();
    let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for ext in registry.extensions() {
        let mut count = 0;
        for req in &ext.requires {
            if registry.feature(req).is_some() {
                continue;
            }
            if registry.extension(req).is_none() {
                return Err(GenerateError {
                    block_kind: BlockKind::Extension,
                    block: ext.name.clone(),
                    entity: req.clone(),
                    kind: None,
                    source: Error::unknown(req.as_str()),
                });
            }
            count += 1;
            dependents.entry(req.as_str()).or_default().push(&ext.name);
        }
        waiting_on.insert(&ext.name, count);
    }

    let mut ready: BTreeSet<&str> = waiting_on
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(name, _)| *name)
        .collect();
    let mut order = Vec::with_capacity(waiting_on.len());

    while let Some(name) = ready.pop_first() {
        if let Some(ext) = registry.extension(name) {
            order.push(ext);
        }
        for dependent in dependents.get(name).into_iter().flatten() {
            if let Some(count) = waiting_on.get_mut(dependent) {
                *count -= 1;
                if *count == 0 {
                    ready.insert(*dependent);
                }
            }
        }
    }

    if order.len() < waiting_on.len() {
        let members: Vec<String> = waiting_on
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(name, _)| name.to_string())
            .collect();
        return Err(GenerateError {
            block_kind: BlockKind::Extension,
            block: members[0].clone(),
            entity: members[0].clone(),
            kind: None,
            source: Error::RequiresCycle { members },
        });
    }
    Ok(order)
}

/// A generation run: a [`Domain`] (what exists) composed with a [`Backend`]
/// (what the output looks like).
///
/// A generator is consumed by [`run`](Generator::run), so its emitted-set
/// bookkeeping can never leak into another run or another backend.
pub struct Generator<'d, 'r> {
    domain: &'d Domain<'r>,
    shape: Box<dyn Backend>,
    options: &'d OutputOptions,
    phase: Phase,
    emitted: EmittedSet,
    sections: Vec<String>,
    uses_platform_types: bool,
}

impl<'d, 'r> Generator<'d, 'r> {
    pub fn new(
        domain: &'d Domain<'r>,
        shape: Box<dyn Backend>,
        options: &'d OutputOptions,
    ) -> Self {
        Self {
            domain,
            shape,
            options,
            phase: Phase::Start,
            emitted: EmittedSet::default(),
            sections: Vec::new(),
            uses_platform_types: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn enter(&mut self, phase: Phase) {
        tracing::debug!(
            backend = self.shape.name(),
            from = ?self.phase,
            to = ?phase,
            "traversal phase"
        );
        self.phase = phase;
    }

    /// Run the traversal to completion and compose the artifact.
    ///
    /// Either the whole artifact is produced or nothing is.
    pub fn run(mut self) -> Result<Artifact, GenerateError> {
        let registry = self.domain.registry();

        self.enter(Phase::VisitingFeatures);
        for feature in registry.features() {
            self.visit_block(BlockKind::Feature, &feature.name, feature.protect.as_deref())?;
        }

        self.enter(Phase::VisitingExtensions);
        for extension in extension_order(registry)? {
            self.visit_block(
                BlockKind::Extension,
                &extension.name,
                extension.protect.as_deref(),
            )?;
        }

        self.enter(Phase::Done);
        let body = self.sections.join("\n");
        Ok(compose::compose(
            self.shape.as_mut(),
            self.options,
            &body,
            self.uses_platform_types,
        ))
    }

    fn visit_block(
        &mut self,
        block_kind: BlockKind,
        name: &str,
        guard: Option<&str>,
    ) -> Result<(), GenerateError> {
        let fail = |entity: &str, kind: Option<EntityKind>, source: Error| GenerateError {
            block_kind,
            block: name.to_string(),
            entity: entity.to_string(),
            kind,
            source,
        };

        let entities = self
            .domain
            .registry()
            .entities_for(name)
            .map_err(|e| fail(name, None, e))?;

        let mut delta: Vec<&'r Entity> = Vec::new();
        for entity in entities {
            match self.admit(entity, &delta) {
                Ok(Some(canonical)) => delta.push(canonical),
                Ok(None) => {}
                Err(e) => return Err(fail(&entity.name, Some(entity.kind), e)),
            }
        }

        let domain = self.domain;
        let relevant = self
            .shape
            .should_emit(domain, &delta)
            .map_err(|e| fail(name, None, e))?;

        let guard = guard.filter(|_| self.options.protect_feature);
        let block = Block { name, guard };
        let mut texts = Vec::new();
        for entity in &delta {
            let on_entity = |e| fail(&entity.name, Some(entity.kind), e);
            self.emitted
                .mark(entity.kind, &entity.name)
                .map_err(on_entity)?;
            if !relevant || !self.shape.is_relevant(domain, entity).map_err(on_entity)? {
                continue;
            }
            self.uses_platform_types |= domain.check_platform_types(entity).map_err(on_entity)?;
            let text = self.shape.emit(domain, block, entity).map_err(on_entity)?;
            tracing::trace!(block = name, entity = %entity.name, "emitted");
            texts.push(text);
        }

        if texts.is_empty() {
            tracing::debug!(
                backend = self.shape.name(),
                block = name,
                "no relevant entities, block skipped"
            );
            return Ok(());
        }

        let mut section = String::new();
        if let Some(g) = guard {
            section.push_str(&guard_open(g));
        }
        section.push_str(&texts.join(self.shape.entity_separator()));
        if let Some(g) = guard {
            section.push_str(&guard_close(g));
        }
        tracing::debug!(
            backend = self.shape.name(),
            block = name,
            entities = texts.len(),
            "block emitted"
        );
        self.sections.push(section);
        Ok(())
    }

    /// Filter one listed entity down to the canonical entity the backend
    /// should see, or `None` if it is excluded or already emitted.
    fn admit(&self, entity: &Entity, delta: &[&'r Entity]) -> Result<Option<&'r Entity>, Error> {
        let resolver = self.domain.resolver();
        if resolver.is_suppressed(&entity.name)? {
            tracing::trace!(entity = %entity.name, "blacklisted");
            return Ok(None);
        }
        let canonical = resolver.canonical(&entity.name)?;
        if self.emitted.contains(canonical.kind, &canonical.name)
            || delta.iter().any(|e| e.name == canonical.name)
        {
            return Ok(None);
        }
        if let Some(reference) = self.domain.blacklisted_reference(canonical)? {
            tracing::warn!(
                entity = %canonical.name,
                reference = %reference,
                "excluded: refers to a blacklisted entity"
            );
            return Ok(None);
        }
        Ok(Some(canonical))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Feature;

    fn ext(name: &str, requires: &[&str]) -> Extension {
        Extension::new(name, &[]).requires(requires)
    }

    fn names<'a>(order: &[&'a Extension]) -> Vec<&'a str> {
        order.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn prerequisites_first_then_by_name() {
        let registry = Registry::builder()
            .feature(Feature::new("v1", 1, &[]))
            .extension(ext("extB", &["extA"]))
            .extension(ext("extC", &["v1"]))
            .extension(ext("extA", &[]))
            .extension(ext("extAA", &["extB"]))
            .build()
            .unwrap();
        let order = extension_order(&registry).unwrap();
        assert_eq!(names(&order), ["extA", "extB", "extAA", "extC"]);
    }

    #[test]
    fn unknown_prerequisite() {
        let registry = Registry::builder()
            .extension(ext("extA", &["extZ"]))
            .build()
            .unwrap();
        let err = extension_order(&registry).unwrap_err();
        assert_eq!(err.block, "extA");
        assert!(matches!(err.source, Error::UnknownEntity { ref name } if name == "extZ"));
    }

    #[test]
    fn requires_cycle() {
        let registry = Registry::builder()
            .extension(ext("extA", &["extB"]))
            .extension(ext("extB", &["extA"]))
            .extension(ext("extC", &[]))
            .build()
            .unwrap();
        let err = extension_order(&registry).unwrap_err();
        assert_eq!(
            err.source,
            Error::RequiresCycle {
                members: vec!["extA".into(), "extB".into()]
            }
        );
    }

    #[test]
    fn emitted_set_rejects_duplicates() {
        let mut emitted = EmittedSet::default();
        emitted.mark(EntityKind::Enum, "Color").unwrap();
        assert!(emitted.contains(EntityKind::Enum, "Color"));
        assert!(!emitted.contains(EntityKind::Struct, "Color"));
        assert_eq!(
            emitted.mark(EntityKind::Enum, "Color"),
            Err(Error::DuplicateEmission {
                kind: EntityKind::Enum,
                name: "Color".into()
            })
        );
    }
}
