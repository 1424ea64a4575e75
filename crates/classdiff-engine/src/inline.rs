use std::ptr;

use classdiff_config::MatchingConfig;
use classdiff_mapper::{BodyMapper, BodyMapperFactory, ParameterMap};
use classdiff_model::{Invocation, Operation};

use crate::class_diff::ClassDiff;
use crate::refactoring::Refactoring;
use crate::scoring::exact_matches_outweigh;
use crate::DiffError;

/// Explains removed operations whose bodies now live inside a matched
/// operation that used to call them.
///
/// An operation may be found inlined into several matched operations; it
/// leaves the `removed` pool once the whole pass is over.
pub(crate) fn check_for_inlined_operations<'a, F>(
    diff: &mut ClassDiff<'a>,
    factory: &F,
    config: &MatchingConfig,
) -> Result<(), DiffError>
where
    F: BodyMapperFactory + ?Sized,
{
    let mut inlined: Vec<&'a Operation> = Vec::new();
    let candidates = diff.removed_operations.clone();

    for removed in candidates {
        if removed.body.is_none() {
            continue;
        }
        for idx in 0..diff.mappers.len() {
            let found = {
                let mapper = &diff.mappers[idx];
                if !has_new_side_leftovers(mapper) {
                    continue;
                }
                let Some(invocation) = mapper
                    .operation1()
                    .all_invocations()
                    .into_iter()
                    .find(|invocation| invocation.matches_operation(removed))
                else {
                    continue;
                };
                if invocation_matches_added_operation(
                    invocation,
                    mapper.operation2(),
                    &diff.added_operations,
                ) {
                    continue;
                }

                let parameter_map = parameter_to_argument(removed, invocation);
                let synthetic = factory.map_inlined_operation(removed, mapper, &parameter_map)?;
                if inline_match_condition(&synthetic, config) {
                    Some((invocation, synthetic))
                } else {
                    tracing::trace!(
                        inlined = %removed,
                        target = %mapper.operation2(),
                        mappings = synthetic.mappings_without_blocks(),
                        "inline candidate rejected"
                    );
                    None
                }
            };

            if let Some((invocation, synthetic)) = found {
                let mapper = &mut diff.mappers[idx];
                tracing::debug!(
                    class = %diff.original.name,
                    inlined = %removed,
                    target = %mapper.operation2(),
                    "operation inlined"
                );
                diff.refactorings.push(Refactoring::InlineOperation {
                    inlined: removed,
                    target_before: mapper.operation1(),
                    target_after: mapper.operation2(),
                    invocation,
                    mapper: synthetic.clone(),
                });
                mapper.add_additional_mapper(synthetic);
                inlined.push(removed);
            }
        }
    }

    diff.removed_operations
        .retain(|operation| !inlined.iter().any(|done| ptr::eq(*done, *operation)));
    Ok(())
}

fn has_new_side_leftovers(mapper: &BodyMapper<'_>) -> bool {
    mapper.non_mapped_elements_t2() > 0
        || !mapper.replacements_involving_method_invocation().is_empty()
}

/// The call survives unchanged in the new body and resolves to an added
/// operation, so it is not evidence of inlining.
fn invocation_matches_added_operation(
    invocation: &Invocation,
    operation2: &Operation,
    added: &[&Operation],
) -> bool {
    operation2.all_invocations().contains(invocation)
        && added
            .iter()
            .any(|operation| invocation.matches_operation(operation))
}

/// Positional parameter -> argument pairs. A varargs parameter without an
/// argument is left out.
pub(crate) fn parameter_to_argument(operation: &Operation, invocation: &Invocation) -> ParameterMap {
    operation
        .parameters
        .iter()
        .zip(&invocation.arguments)
        .map(|(parameter, argument)| (parameter.name.clone(), argument.clone()))
        .collect()
}

fn inline_match_condition(mapper: &BodyMapper<'_>, config: &MatchingConfig) -> bool {
    let mappings = mapper.mappings_without_blocks();
    let non_mapped = mapper.non_mapped_elements_t1();
    mappings > 0
        && (mappings > non_mapped
            || exact_matches_outweigh(&mapper.exact_matches(), non_mapped, config))
}
