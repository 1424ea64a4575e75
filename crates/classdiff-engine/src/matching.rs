//! Pairing of the operations left in the `removed`/`added` pools after the
//! same-signature pass.

use std::ptr;

use classdiff_config::MatchingConfig;
use classdiff_mapper::{BodyMapper, BodyMapperFactory};
use classdiff_model::{Invocation, Operation};
use indexmap::IndexSet;

use crate::class_diff::ClassDiff;
use crate::consistency::ConsistentRenames;
use crate::operation_diff::OperationDiff;
use crate::refactoring::Refactoring;
use crate::scoring::{CandidateSet, Scorer};
use crate::DiffError;

/// Matches removed against added operations and records renames.
///
/// The smaller pool drives. For every driving operation the candidates are
/// scored against the pools as they are at that moment, then the chosen pair
/// (if any) is committed before the next driving operation is looked at.
pub(crate) fn check_for_operation_signature_changes<'a, F>(
    diff: &mut ClassDiff<'a>,
    factory: &F,
    config: &MatchingConfig,
) -> Result<(), DiffError>
where
    F: BodyMapperFactory + ?Sized,
{
    diff.consistent_renames = ConsistentRenames::from_mappers(&diff.mappers);
    tracing::debug!(
        class = %diff.original.name,
        consistent_renames = diff.consistent_renames.len(),
        removed = diff.removed_operations.len(),
        added = diff.added_operations.len(),
        "matching changed signatures"
    );

    let driving_removed = diff.removed_operations.len() <= diff.added_operations.len();
    let driving: Vec<&'a Operation> = if driving_removed {
        diff.removed_operations.clone()
    } else {
        diff.added_operations.clone()
    };

    for operation in driving {
        let best = {
            let scorer = Scorer::new(diff, config);
            let mut candidates = CandidateSet::default();
            if driving_removed {
                for &added in scorer.added {
                    scorer.collect_candidates(factory, operation, added, &mut candidates)?;
                }
            } else {
                for &removed in scorer.removed {
                    scorer.collect_candidates(factory, removed, operation, &mut candidates)?;
                }
            }
            if candidates.is_empty() {
                None
            } else {
                find_best_mapper(&scorer, candidates.into_vec())
            }
        };
        if let Some(mapper) = best {
            commit(diff, operation, mapper, driving_removed);
        }
    }
    Ok(())
}

/// Picks one mapper out of the ranked candidates, or none when the pick
/// contradicts a consistent invocation rename.
pub(crate) fn find_best_mapper<'a>(
    scorer: &Scorer<'_, 'a>,
    mut candidates: Vec<BodyMapper<'a>>,
) -> Option<BodyMapper<'a>> {
    let first = candidates.first()?;
    let (operation1, operation2) = (first.operation1(), first.operation2());
    if operation1.equal_return_type(operation2)
        && operation1.name == operation2.name
        && !operation1.common_parameter_types(operation2).is_empty()
    {
        return Some(candidates.swap_remove(0));
    }

    let mut best = 0;
    for (idx, candidate) in candidates.iter().enumerate().skip(1) {
        let another_calls_operation2 =
            calls_one_but_not_other(candidate.operation2(), operation2, operation1, scorer.removed);
        let another_calls_operation1 =
            calls_one_but_not_other(candidate.operation1(), operation1, operation2, scorer.added);

        if scorer.renames.mismatches(first) && scorer.renames.matches(candidate) {
            best = idx;
            break;
        }
        if another_calls_operation2 || another_calls_operation1 {
            best = idx;
            break;
        }
    }

    let chosen = candidates.swap_remove(best);
    if scorer.renames.mismatches(&chosen) {
        tracing::trace!(mapper = %chosen, "best candidate contradicts a consistent rename");
        return None;
    }
    Some(chosen)
}

/// `caller` invokes `callee` through a call that does not also resolve to
/// `other` and that no operation of `pool` explains by shared arguments.
fn calls_one_but_not_other(
    caller: &Operation,
    callee: &Operation,
    other: &Operation,
    pool: &[&Operation],
) -> bool {
    caller.all_invocations().iter().any(|invocation| {
        invocation.matches_operation(callee)
            && !invocation.matches_operation(other)
            && !contains_invocation_with_same_name_and_common_arguments(invocation, pool)
    })
}

/// Some operation of `pool` makes a call sharing arguments with `invocation`:
/// under the same name, or covering every argument of `invocation`.
fn contains_invocation_with_same_name_and_common_arguments(
    invocation: &Invocation,
    pool: &[&Operation],
) -> bool {
    pool.iter()
        .copied()
        .flat_map(Operation::all_invocations)
        .any(|candidate| {
            let common: IndexSet<&String> = candidate
                .arguments
                .iter()
                .filter(|argument| invocation.arguments.contains(argument))
                .collect();
            (candidate.name == invocation.name && !common.is_empty())
                || (!common.is_empty() && common.len() == invocation.arguments.len())
        })
}

fn commit<'a>(
    diff: &mut ClassDiff<'a>,
    driving: &'a Operation,
    mapper: BodyMapper<'a>,
    driving_removed: bool,
) {
    let removed = mapper.operation1();
    let added = mapper.operation2();
    if driving_removed {
        // an operation of an anonymous class is never pooled; its outer
        // operation stays in `added`
        diff.added_operations.retain(|operation| !ptr::eq(*operation, added));
        diff.removed_operations.retain(|operation| !ptr::eq(*operation, driving));
    } else {
        diff.removed_operations.retain(|operation| !ptr::eq(*operation, removed));
        diff.added_operations.retain(|operation| !ptr::eq(*operation, driving));
    }

    diff.operation_diffs.push(OperationDiff::new(removed, added));
    if removed.name != added.name && !(removed.is_constructor && added.is_constructor) {
        tracing::debug!(
            class = %diff.original.name,
            original = %removed,
            renamed = %added,
            "operation renamed"
        );
        diff.refactorings.push(Refactoring::RenameOperation {
            original: removed,
            renamed: added,
            mapper: mapper.clone(),
        });
    } else {
        tracing::debug!(class = %diff.original.name, mapper = %mapper, "operation matched");
    }
    diff.mappers.push(mapper);
}
