use std::cmp::Ordering;
use std::fmt;

use classdiff_model::{levenshtein_distance, Operation, Statement};
use indexmap::IndexSet;

use crate::{MethodInvocationRename, Replacement, ReplacementKind};

/// One aligned pair of statements.
#[derive(Debug, Clone)]
pub struct CodeMapping<'a> {
    pub fragment1: &'a Statement,
    pub fragment2: &'a Statement,
    pub replacements: Vec<Replacement>,
}

impl<'a> CodeMapping<'a> {
    pub fn new(fragment1: &'a Statement, fragment2: &'a Statement) -> Self {
        Self {
            fragment1,
            fragment2,
            replacements: Vec::new(),
        }
    }

    pub fn with_replacement(mut self, replacement: Replacement) -> Self {
        self.replacements.push(replacement);
        self
    }

    pub fn is_exact(&self) -> bool {
        self.replacements.is_empty()
    }

    pub fn is_block(&self) -> bool {
        self.fragment1.is_block()
    }

    pub fn contains_replacement(&self, kind: ReplacementKind) -> bool {
        self.replacements.iter().any(|r| r.kind == kind)
    }
}

/// The alignment of two operation bodies.
///
/// Immutable once built, apart from the additional mappers attached when an
/// inlined or extracted operation is explained through this mapper.
#[derive(Debug, Clone)]
pub struct BodyMapper<'a> {
    operation1: &'a Operation,
    operation2: &'a Operation,
    mappings: Vec<CodeMapping<'a>>,
    non_mapped_leaves_t1: Vec<&'a Statement>,
    non_mapped_inner_nodes_t1: Vec<&'a Statement>,
    non_mapped_leaves_t2: Vec<&'a Statement>,
    non_mapped_inner_nodes_t2: Vec<&'a Statement>,
    additional_mappers: Vec<BodyMapper<'a>>,
}

impl<'a> BodyMapper<'a> {
    pub fn new(operation1: &'a Operation, operation2: &'a Operation) -> Self {
        Self {
            operation1,
            operation2,
            mappings: Vec::new(),
            non_mapped_leaves_t1: Vec::new(),
            non_mapped_inner_nodes_t1: Vec::new(),
            non_mapped_leaves_t2: Vec::new(),
            non_mapped_inner_nodes_t2: Vec::new(),
            additional_mappers: Vec::new(),
        }
    }

    pub fn push_mapping(&mut self, mapping: CodeMapping<'a>) {
        self.mappings.push(mapping);
    }

    pub fn push_non_mapped_t1(&mut self, statement: &'a Statement) {
        if statement.is_leaf() {
            self.non_mapped_leaves_t1.push(statement);
        } else {
            self.non_mapped_inner_nodes_t1.push(statement);
        }
    }

    pub fn push_non_mapped_t2(&mut self, statement: &'a Statement) {
        if statement.is_leaf() {
            self.non_mapped_leaves_t2.push(statement);
        } else {
            self.non_mapped_inner_nodes_t2.push(statement);
        }
    }

    pub fn operation1(&self) -> &'a Operation {
        self.operation1
    }

    pub fn operation2(&self) -> &'a Operation {
        self.operation2
    }

    pub fn mappings(&self) -> &[CodeMapping<'a>] {
        &self.mappings
    }

    pub fn mappings_without_blocks(&self) -> usize {
        self.mappings.iter().filter(|m| !m.is_block()).count()
    }

    pub fn exact_matches(&self) -> Vec<&CodeMapping<'a>> {
        self.mappings
            .iter()
            .filter(|m| m.is_exact() && !m.is_block())
            .collect()
    }

    pub fn exact_match_count(&self) -> usize {
        self.exact_matches().len()
    }

    pub fn non_mapped_leaves_t1(&self) -> &[&'a Statement] {
        &self.non_mapped_leaves_t1
    }

    pub fn non_mapped_inner_nodes_t1(&self) -> &[&'a Statement] {
        &self.non_mapped_inner_nodes_t1
    }

    pub fn non_mapped_leaves_t2(&self) -> &[&'a Statement] {
        &self.non_mapped_leaves_t2
    }

    pub fn non_mapped_inner_nodes_t2(&self) -> &[&'a Statement] {
        &self.non_mapped_inner_nodes_t2
    }

    /// Unmapped old-side statements, blocks excluded.
    pub fn non_mapped_elements_t1(&self) -> usize {
        count_countable(&self.non_mapped_leaves_t1, &self.non_mapped_inner_nodes_t1)
    }

    /// Unmapped new-side statements, blocks excluded.
    pub fn non_mapped_elements_t2(&self) -> usize {
        count_countable(&self.non_mapped_leaves_t2, &self.non_mapped_inner_nodes_t2)
    }

    pub fn non_mapped_leaf_elements_t2(&self) -> usize {
        self.non_mapped_leaves_t2.len()
    }

    /// Invocations inside unmapped new-side statements that resolve to one of
    /// `operations`, counted once per invocation.
    pub fn non_mapped_elements_t2_calling(&self, operations: &[&Operation]) -> usize {
        count_calls(self.non_mapped_statements_t2(), operations)
    }

    /// Invocations inside unmapped old-side statements that resolve to one of
    /// `operations`, counted once per invocation.
    pub fn non_mapped_elements_t1_calling(&self, operations: &[&Operation]) -> usize {
        count_calls(self.non_mapped_statements_t1(), operations)
    }

    /// Unmapped old-side statements followed by unmapped old-side inner nodes.
    pub fn non_mapped_statements_t1(&self) -> impl Iterator<Item = &'a Statement> + '_ {
        self.non_mapped_leaves_t1
            .iter()
            .chain(&self.non_mapped_inner_nodes_t1)
            .copied()
    }

    pub fn non_mapped_statements_t2(&self) -> impl Iterator<Item = &'a Statement> + '_ {
        self.non_mapped_leaves_t2
            .iter()
            .chain(&self.non_mapped_inner_nodes_t2)
            .copied()
    }

    pub fn replacements(&self) -> Vec<&Replacement> {
        self.mappings
            .iter()
            .flat_map(|m| m.replacements.iter())
            .collect()
    }

    pub fn replacements_involving_method_invocation(&self) -> Vec<&Replacement> {
        self.replacements()
            .into_iter()
            .filter(|r| r.involves_method_invocation())
            .collect()
    }

    /// Invocation renames induced by this mapper, in mapping order.
    pub fn method_invocation_renames(&self) -> IndexSet<MethodInvocationRename> {
        let mut renames = IndexSet::new();
        for mapping in &self.mappings {
            for replacement in &mapping.replacements {
                if replacement.kind != ReplacementKind::MethodInvocationName {
                    continue;
                }
                let before = mapping
                    .fragment1
                    .invocations
                    .iter()
                    .find(|i| i.name == replacement.before);
                let after = mapping
                    .fragment2
                    .invocations
                    .iter()
                    .find(|i| i.name == replacement.after);
                if let (Some(before), Some(after)) = (before, after) {
                    renames.insert(MethodInvocationRename::new(before.clone(), after.clone()));
                }
            }
        }
        renames
    }

    pub fn additional_mappers(&self) -> &[BodyMapper<'a>] {
        &self.additional_mappers
    }

    pub fn add_additional_mapper(&mut self, mapper: BodyMapper<'a>) {
        self.additional_mappers.push(mapper);
    }

    pub fn operation_name_edit_distance(&self) -> usize {
        levenshtein_distance(&self.operation1.name, &self.operation2.name)
    }

    /// Candidate ranking, best first: more exact matches, then fewer unmapped
    /// statements, then more mappings, then closer operation names.
    pub fn rank_cmp(&self, other: &BodyMapper<'_>) -> Ordering {
        other
            .exact_match_count()
            .cmp(&self.exact_match_count())
            .then_with(|| {
                let ours = self.non_mapped_elements_t1() + self.non_mapped_elements_t2();
                let theirs = other.non_mapped_elements_t1() + other.non_mapped_elements_t2();
                ours.cmp(&theirs)
            })
            .then_with(|| {
                other
                    .mappings_without_blocks()
                    .cmp(&self.mappings_without_blocks())
            })
            .then_with(|| {
                self.operation_name_edit_distance()
                    .cmp(&other.operation_name_edit_distance())
            })
    }

    /// Whether this mapper pairs exactly these two operations.
    pub fn pairs(&self, operation1: &Operation, operation2: &Operation) -> bool {
        std::ptr::eq(self.operation1, operation1) && std::ptr::eq(self.operation2, operation2)
    }
}

fn count_calls<'s>(
    statements: impl Iterator<Item = &'s Statement>,
    operations: &[&Operation],
) -> usize {
    statements
        .filter(|statement| statement.is_countable())
        .flat_map(|statement| statement.invocations.iter())
        .filter(|invocation| operations.iter().any(|op| invocation.matches_operation(op)))
        .count()
}

fn count_countable(leaves: &[&Statement], inner_nodes: &[&Statement]) -> usize {
    leaves.len() + inner_nodes.iter().filter(|s| s.is_countable()).count()
}

impl fmt::Display for BodyMapper<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.operation1, self.operation2)
    }
}
