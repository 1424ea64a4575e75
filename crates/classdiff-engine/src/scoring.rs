//! Acceptance rules for candidate operation pairs.
//!
//! Every rule is a small predicate over one body mapper and the current
//! `removed`/`added` pools. [`Scorer::evaluate`] combines them in a fixed
//! short-circuit order; changing that order changes which pairs are found.

use std::ptr;

use classdiff_config::MatchingConfig;
use classdiff_mapper::{BodyMapper, BodyMapperFactory, CodeMapping, ReplacementKind};
use classdiff_model::{AnonymousClass, ClassModel, Invocation, Operation};
use indexmap::IndexSet;

use crate::class_diff::ClassDiff;
use crate::consistency::ConsistentRenames;
use crate::DiffError;

/// Read-only view over one class diff while candidates for a single driving
/// operation are scored.
pub(crate) struct Scorer<'d, 'a> {
    original: &'a ClassModel,
    next: &'a ClassModel,
    pub(crate) removed: &'d [&'a Operation],
    pub(crate) added: &'d [&'a Operation],
    added_anonymous_classes: &'d [&'a AnonymousClass],
    pub(crate) renames: &'d ConsistentRenames,
    config: &'d MatchingConfig,
}

impl<'d, 'a> Scorer<'d, 'a> {
    pub(crate) fn new(diff: &'d ClassDiff<'a>, config: &'d MatchingConfig) -> Self {
        Self {
            original: diff.original,
            next: diff.next,
            removed: &diff.removed_operations,
            added: &diff.added_operations,
            added_anonymous_classes: &diff.added_anonymous_classes,
            renames: &diff.consistent_renames,
            config,
        }
    }

    /// Largest positional distance tolerated for the pair.
    ///
    /// Test methods are reordered freely, so they only get the size
    /// difference of the pools.
    pub(crate) fn max_position_distance(&self, removed: &Operation, added: &Operation) -> usize {
        let annotations = &self.config.test_annotations;
        if removed.has_test_annotation(annotations) && added.has_test_annotation(annotations) {
            self.removed.len().abs_diff(self.added.len())
        } else {
            self.removed.len().max(self.added.len())
        }
    }

    /// Scores `removed` against `added` and against every operation of the
    /// anonymous classes newly declared inside `added`.
    pub(crate) fn collect_candidates<F>(
        &self,
        factory: &F,
        removed: &'a Operation,
        added: &'a Operation,
        candidates: &mut CandidateSet<'a>,
    ) -> Result<(), DiffError>
    where
        F: BodyMapperFactory + ?Sized,
    {
        let max_distance = self.max_position_distance(removed, added);
        if let Some(mapper) = self.evaluate(factory, removed, added, max_distance)? {
            candidates.insert(mapper);
        }
        for nested in added.operations_inside_anonymous_classes(self.added_anonymous_classes) {
            if let Some(mapper) =
                self.evaluate_nested(factory, removed, nested, added, max_distance)?
            {
                candidates.insert(mapper);
            }
        }
        Ok(())
    }

    /// Builds the mapper for the pair and keeps it if any acceptance rule holds.
    pub(crate) fn evaluate<F>(
        &self,
        factory: &F,
        removed: &'a Operation,
        added: &'a Operation,
        max_distance: usize,
    ) -> Result<Option<BodyMapper<'a>>, DiffError>
    where
        F: BodyMapperFactory + ?Sized,
    {
        let mapper = factory.map_operations(removed, added)?;
        let mappings = mapper.mappings_without_blocks();

        let mut accepted = if mappings > 0 {
            let distance = self.position_distance(removed, added)?;
            self.accepts_mapped(&mapper, removed, added, mappings, distance, max_distance)
        } else {
            self.renames.explains(removed, added)
        };

        if !accepted && !mapper.mappings().is_empty() {
            let distance = self.position_distance(removed, added)?;
            accepted = self.single_unmatched_statement_calls_added_operation(&mapper)
                && distance <= max_distance
                && self.compatible_signatures(removed, added, distance);
        }

        if !accepted {
            tracing::trace!(
                removed = %removed,
                added = %added,
                mappings,
                non_mapped_t1 = mapper.non_mapped_elements_t1(),
                non_mapped_t2 = mapper.non_mapped_elements_t2(),
                "candidate rejected"
            );
        }
        Ok(accepted.then_some(mapper))
    }

    /// Like [`Scorer::evaluate`] for an operation of an anonymous class
    /// declared in `outer`. Position, signature and extract/inline evidence
    /// are taken from `outer`.
    fn evaluate_nested<F>(
        &self,
        factory: &F,
        removed: &'a Operation,
        nested: &'a Operation,
        outer: &'a Operation,
        max_distance: usize,
    ) -> Result<Option<BodyMapper<'a>>, DiffError>
    where
        F: BodyMapperFactory + ?Sized,
    {
        let mapper = factory.map_operations(removed, nested)?;
        let mappings = mapper.mappings_without_blocks();
        if mappings == 0 {
            return Ok(None);
        }
        let distance = self.position_distance(removed, outer)?;
        let accepted =
            self.accepts_mapped(&mapper, removed, outer, mappings, distance, max_distance);
        if accepted {
            tracing::trace!(
                removed = %removed,
                nested = %nested,
                outer = %outer,
                "anonymous class candidate accepted"
            );
        }
        Ok(accepted.then_some(mapper))
    }

    fn accepts_mapped(
        &self,
        mapper: &BodyMapper<'a>,
        removed: &'a Operation,
        added: &'a Operation,
        mappings: usize,
        distance: usize,
        max_distance: usize,
    ) -> bool {
        if mapper.non_mapped_elements_t1() == 0
            && mapper.non_mapped_elements_t2() == 0
            && all_mappings_are_exact_matches(mapper, mappings)
        {
            return true;
        }
        let within_distance = distance <= max_distance;
        (mapped_elements_more_than_non_mapped_t1_and_t2(mapper, mappings)
            && within_distance
            && self.compatible_signatures(removed, added, distance))
            || (self.mapped_elements_more_than_non_mapped_t2(mapper, mappings)
                && within_distance
                && self.is_part_of_method_extracted(removed, added))
            || (self.mapped_elements_more_than_non_mapped_t1(mapper, mappings)
                && within_distance
                && self.is_part_of_method_inlined(removed, added))
    }

    /// Absolute difference of the declaration indexes of the two operations.
    pub(crate) fn position_distance(
        &self,
        removed: &Operation,
        added: &Operation,
    ) -> Result<usize, DiffError> {
        let before = position_in(self.original, removed)?;
        let after = position_in(self.next, added)?;
        Ok(before.abs_diff(after))
    }

    /// Unmapped new-side statements that only call another added operation
    /// do not count against the pair.
    fn mapped_elements_more_than_non_mapped_t2(
        &self,
        mapper: &BodyMapper<'_>,
        mappings: usize,
    ) -> bool {
        let non_mapped = mapper.non_mapped_elements_t2();
        let calling = mapper.non_mapped_elements_t2_calling(self.added);
        more_than_non_mapped(mappings, non_mapped, calling)
    }

    fn mapped_elements_more_than_non_mapped_t1(
        &self,
        mapper: &BodyMapper<'_>,
        mappings: usize,
    ) -> bool {
        let non_mapped = mapper.non_mapped_elements_t1();
        let calling = mapper.non_mapped_elements_t1_calling(self.removed);
        more_than_non_mapped(mappings, non_mapped, calling)
    }

    pub(crate) fn compatible_signatures(
        &self,
        removed: &Operation,
        added: &Operation,
        distance: usize,
    ) -> bool {
        added.compatible_signature(removed)
            || ((distance == 0 || self.operations_before_and_after_match(removed, added))
                && (added.equal_parameter_types(removed)
                    || added.normalized_name_distance(removed)
                        <= self.config.max_operation_name_distance))
    }

    fn operations_before_and_after_match(&self, removed: &Operation, added: &Operation) -> bool {
        let (before1, after1) = self.original.neighbours_of(removed);
        let (before2, after2) = self.next.neighbours_of(added);
        let same = |a: Option<&Operation>, b: Option<&Operation>| match (a, b) {
            (Some(a), Some(b)) => a.equal_parameter_types(b) && a.name == b.name,
            _ => false,
        };
        same(before1, before2) || same(after1, after2)
    }

    /// Evidence that `added` keeps part of `removed` and the rest moved into
    /// other added operations that `added` calls.
    pub(crate) fn is_part_of_method_extracted(
        &self,
        removed: &'a Operation,
        added: &'a Operation,
    ) -> bool {
        let removed_invocations = removed.all_invocations();
        let added_invocations = added.all_invocations();
        let intersection: IndexSet<&Invocation> = removed_invocations
            .intersection(&added_invocations)
            .copied()
            .collect();
        let missing = removed_invocations.len() - intersection.len();

        let called = invocations_in_called_operations(
            &added_invocations,
            &intersection,
            added,
            self.added,
        );
        let new_intersection: IndexSet<&Invocation> =
            removed_invocations.intersection(&called).copied().collect();

        let remaining = removed_invocations
            .iter()
            .filter(|invocation| {
                !intersection.contains(*invocation) && !new_intersection.contains(*invocation)
            })
            .filter(|invocation| !self.config.is_getter(&invocation.name))
            .count();

        let found = new_intersection.len() as isize;
        let missing_without_found = missing as isize - found;
        found > missing_without_found || found > remaining as isize
    }

    /// Evidence that `removed` absorbed the bodies of other removed
    /// operations it used to call.
    pub(crate) fn is_part_of_method_inlined(
        &self,
        removed: &'a Operation,
        added: &'a Operation,
    ) -> bool {
        let removed_invocations = removed.all_invocations();
        let added_invocations = added.all_invocations();
        let intersection: IndexSet<&Invocation> = removed_invocations
            .intersection(&added_invocations)
            .copied()
            .collect();
        let missing = added_invocations.len() - intersection.len();

        let called = invocations_in_called_operations(
            &removed_invocations,
            &intersection,
            removed,
            self.removed,
        );
        let new_intersection = added_invocations.intersection(&called).count();

        let found = new_intersection as isize;
        found > missing as isize - found
    }

    /// Exactly one unmatched leaf per side: the new one calls an added
    /// operation whose body makes the call the old leaf made.
    fn single_unmatched_statement_calls_added_operation(&self, mapper: &BodyMapper<'_>) -> bool {
        let ([statement1], [statement2]) =
            (mapper.non_mapped_leaves_t1(), mapper.non_mapped_leaves_t2())
        else {
            return false;
        };
        let Some(invocation2) = statement2.invocation_covering_entire_fragment() else {
            return false;
        };
        let invocation1 = statement1.invocation_covering_entire_fragment();
        self.added.iter().any(|operation| {
            invocation2.matches_operation(operation)
                && invocation1
                    .is_some_and(|invocation| operation.all_invocations().contains(invocation))
        })
    }
}

/// Candidate mappers for one driving operation, best first.
///
/// Equal-ranked mappers are all kept, in insertion order, where a set ordered
/// by rank alone would keep only the first of them. A second mapper for an
/// already present pair is ignored.
#[derive(Debug, Default)]
pub(crate) struct CandidateSet<'a> {
    mappers: Vec<BodyMapper<'a>>,
}

impl<'a> CandidateSet<'a> {
    pub(crate) fn insert(&mut self, mapper: BodyMapper<'a>) {
        if self
            .mappers
            .iter()
            .any(|existing| existing.pairs(mapper.operation1(), mapper.operation2()))
        {
            return;
        }
        let at = self
            .mappers
            .iter()
            .position(|existing| existing.rank_cmp(&mapper).is_gt())
            .unwrap_or(self.mappers.len());
        self.mappers.insert(at, mapper);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }

    pub(crate) fn into_vec(self) -> Vec<BodyMapper<'a>> {
        self.mappers
    }
}

fn position_in(class: &ClassModel, operation: &Operation) -> Result<usize, DiffError> {
    class
        .operation_position(operation)
        .ok_or_else(|| DiffError::UnknownOperation {
            class: class.name.clone(),
            signature: operation.signature(),
        })
}

/// Invocations made by the bodies of the `pool` operations (other than
/// `caller`) that `caller` calls outside `intersection`.
fn invocations_in_called_operations<'a>(
    caller_invocations: &IndexSet<&'a Invocation>,
    intersection: &IndexSet<&'a Invocation>,
    caller: &Operation,
    pool: &[&'a Operation],
) -> IndexSet<&'a Invocation> {
    let mut called = IndexSet::new();
    for invocation in caller_invocations {
        if intersection.contains(invocation) {
            continue;
        }
        for operation in pool.iter().copied() {
            if !ptr::eq(operation, caller)
                && operation.body.is_some()
                && invocation.matches_operation(operation)
            {
                called.extend(operation.all_invocations());
            }
        }
    }
    called
}

pub(crate) fn all_mappings_are_exact_matches(mapper: &BodyMapper<'_>, mappings: usize) -> bool {
    let exact = mapper.exact_match_count();
    if mappings == exact {
        return true;
    }
    let with_type_replacement = mapper
        .mappings()
        .iter()
        .filter(|mapping| mapping.contains_replacement(ReplacementKind::Type))
        .count();
    mappings == exact + with_type_replacement && mappings > with_type_replacement
}

pub(crate) fn mapped_elements_more_than_non_mapped_t1_and_t2(
    mapper: &BodyMapper<'_>,
    mappings: usize,
) -> bool {
    let t1 = mapper.non_mapped_elements_t1();
    let t2 = mapper.non_mapped_elements_t2();
    (mappings > t1 && mappings > t2)
        || (t1 == 0 && mappings > t2 / 2)
        || (mappings == 1
            && t1 + t2 == 1
            && mapper.operation1().name == mapper.operation2().name)
}

fn more_than_non_mapped(mappings: usize, non_mapped: usize, calling: usize) -> bool {
    let without_calling = non_mapped as isize - calling as isize;
    mappings > non_mapped
        || (mappings as isize >= without_calling && calling as isize >= without_calling)
}

/// Shared tail of the inline and extract acceptance rules: enough exact
/// matches relative to what stayed unmapped.
pub(crate) fn exact_matches_outweigh(
    exact_matches: &[&CodeMapping<'_>],
    non_mapped: usize,
    config: &MatchingConfig,
) -> bool {
    match exact_matches {
        [] => false,
        [only] => {
            !only.fragment1.throws_new_exception()
                && non_mapped < 1 + config.single_exact_match_limit
        }
        many => non_mapped < many.len() + config.multiple_exact_match_limit,
    }
}
