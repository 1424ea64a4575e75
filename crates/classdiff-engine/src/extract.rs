use std::ptr;

use classdiff_config::MatchingConfig;
use classdiff_mapper::{BodyMapper, BodyMapperFactory, ParameterMap, ReplacementKind};
use classdiff_model::{Invocation, Operation, Parameter};
use indexmap::IndexMap;

use crate::class_diff::ClassDiff;
use crate::inline::parameter_to_argument;
use crate::refactoring::Refactoring;
use crate::scoring::exact_matches_outweigh;
use crate::DiffError;

/// Explains added operations made of statements that a matched operation
/// used to contain and now calls out to.
pub(crate) fn check_for_extracted_operations<'a, F>(
    diff: &mut ClassDiff<'a>,
    factory: &F,
    config: &MatchingConfig,
) -> Result<(), DiffError>
where
    F: BodyMapperFactory + ?Sized,
{
    let mut extracted: Vec<&'a Operation> = Vec::new();
    let candidates = diff.added_operations.clone();

    for added in candidates {
        for idx in 0..diff.mappers.len() {
            let found = {
                let mapper = &diff.mappers[idx];
                if !has_old_side_leftovers(mapper) {
                    continue;
                }
                let Some(invocation) = mapper
                    .operation2()
                    .all_invocations()
                    .into_iter()
                    .find(|invocation| invocation.matches_operation(added))
                else {
                    continue;
                };

                let passed =
                    parameters_passed_as_arguments(mapper.operation1(), added, invocation);
                if !parameter_types_match(&passed) {
                    tracing::trace!(
                        extracted = %added,
                        source = %mapper.operation1(),
                        "arguments do not match the parameter types"
                    );
                    continue;
                }

                let delegate =
                    find_delegate_method(added, mapper, invocation, &diff.added_operations);
                let target = delegate.unwrap_or(added);
                if target.body.is_none() {
                    continue;
                }
                let parameter_map = parameter_to_argument(added, invocation);
                let synthetic = factory.map_extracted_operation(
                    mapper,
                    target,
                    &ParameterMap::new(),
                    &parameter_map,
                )?;
                if extract_match_condition(&synthetic, config) {
                    Some((invocation, delegate, synthetic))
                } else {
                    tracing::trace!(
                        extracted = %added,
                        source = %mapper.operation1(),
                        mappings = synthetic.mappings_without_blocks(),
                        "extract candidate rejected"
                    );
                    None
                }
            };

            if let Some((invocation, delegate, synthetic)) = found {
                let mapper = &mut diff.mappers[idx];
                tracing::debug!(
                    class = %diff.original.name,
                    extracted = %added,
                    source = %mapper.operation1(),
                    delegate = delegate.is_some(),
                    "operation extracted"
                );
                diff.refactorings.push(Refactoring::ExtractOperation {
                    extracted: added,
                    source_before: mapper.operation1(),
                    source_after: mapper.operation2(),
                    invocation,
                    delegate_target: delegate,
                    mapper: synthetic.clone(),
                });
                mapper.add_additional_mapper(synthetic);
                extracted.push(added);
            }
        }
    }

    diff.added_operations
        .retain(|operation| !extracted.iter().any(|done| ptr::eq(*done, *operation)));
    Ok(())
}

fn has_old_side_leftovers(mapper: &BodyMapper<'_>) -> bool {
    mapper.non_mapped_elements_t1() > 0
        || !mapper.replacements_involving_method_invocation().is_empty()
}

/// Parameters of `source` handed straight to `called`, keyed by the source
/// parameter name, with the parameter of `called` receiving them.
fn parameters_passed_as_arguments<'a>(
    source: &'a Operation,
    called: &'a Operation,
    invocation: &Invocation,
) -> IndexMap<&'a str, (&'a Parameter, &'a Parameter)> {
    let mut passed = IndexMap::new();
    for (argument, parameter) in invocation.arguments.iter().zip(&called.parameters) {
        for original in &source.parameters {
            if &original.name == argument {
                passed.insert(original.name.as_str(), (original, parameter));
            }
        }
    }
    passed
}

fn parameter_types_match(passed: &IndexMap<&str, (&Parameter, &Parameter)>) -> bool {
    passed.values().all(|(original, called)| {
        original.ty == called.ty || original.ty.equals_with_sub_type(&called.ty)
    })
}

/// The added operation the extracted one forwards to, when the extracted
/// operation is a one-line delegate the source never called before.
fn find_delegate_method<'a>(
    added: &'a Operation,
    mapper: &BodyMapper<'a>,
    invocation: &Invocation,
    pool: &[&'a Operation],
) -> Option<&'a Operation> {
    let delegated = added.is_delegate()?;
    let source = mapper.operation1();
    if source.is_delegate().is_some() || source.all_invocations().contains(invocation) {
        return None;
    }
    pool.iter()
        .copied()
        .find(|operation| delegated.matches_operation(operation))
}

fn extract_match_condition(mapper: &BodyMapper<'_>, config: &MatchingConfig) -> bool {
    let mappings = mapper.mappings_without_blocks();
    let non_mapped = mapper.non_mapped_elements_t2();
    (mappings > 0
        && (mappings > non_mapped
            || exact_matches_outweigh(&mapper.exact_matches(), non_mapped, config)
            || (mappings == 1 && mappings > mapper.non_mapped_leaf_elements_t2())))
        || argument_extracted_with_default_return_added(mapper)
}

/// `consume(arg);` became `return arg;` inside the extracted operation, which
/// also gained a guard and a default return:
///
/// ```text
/// if (arg == null) {
///     return fallback;
/// }
/// return arg;
/// ```
fn argument_extracted_with_default_return_added(mapper: &BodyMapper<'_>) -> bool {
    let inner_nodes: Vec<_> = mapper
        .non_mapped_inner_nodes_t2()
        .iter()
        .filter(|node| !node.is_block())
        .collect();
    matches!(
        mapper.mappings(),
        [only] if only.contains_replacement(ReplacementKind::ArgumentReplacedWithReturnExpression)
    ) && matches!(inner_nodes.as_slice(), [node] if node.text.starts_with("if"))
        && matches!(mapper.non_mapped_leaves_t2(), [leaf] if leaf.text.starts_with("return "))
}
