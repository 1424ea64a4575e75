use classdiff_mapper::{BodyMapper, MethodInvocationRename};
use classdiff_model::Operation;
use indexmap::IndexSet;

/// Invocation renames observed across the confirmed mappers of one class pair
/// that no other observed rename contradicts.
///
/// Iteration follows first-seen order: mappers in confirmation order, renames
/// in mapping order within each mapper.
#[derive(Debug, Clone, Default)]
pub struct ConsistentRenames {
    renames: IndexSet<MethodInvocationRename>,
}

impl ConsistentRenames {
    pub fn from_mappers<'m, 'a: 'm>(mappers: impl IntoIterator<Item = &'m BodyMapper<'a>>) -> Self {
        let mut consistent: IndexSet<MethodInvocationRename> = IndexSet::new();
        let mut inconsistent: IndexSet<MethodInvocationRename> = IndexSet::new();

        for mapper in mappers {
            for rename in mapper.method_invocation_renames() {
                let conflicts: Vec<MethodInvocationRename> = consistent
                    .iter()
                    .filter(|existing| existing.conflicts_with(&rename))
                    .cloned()
                    .collect();
                if conflicts.is_empty() {
                    consistent.insert(rename);
                } else {
                    tracing::trace!(
                        rename = %rename,
                        conflicts = conflicts.len(),
                        "invocation rename contradicts an earlier one"
                    );
                    inconsistent.extend(conflicts);
                    inconsistent.insert(rename);
                }
            }
        }

        consistent.retain(|rename| !inconsistent.contains(rename));
        Self { renames: consistent }
    }

    pub fn iter(&self) -> impl Iterator<Item = &MethodInvocationRename> {
        self.renames.iter()
    }

    pub fn len(&self) -> usize {
        self.renames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }

    pub fn contains(&self, before: &str, after: &str) -> bool {
        self.renames
            .iter()
            .any(|rename| rename.before == before && rename.after == after)
    }

    /// The pair's names follow one of the renames.
    pub fn matches(&self, mapper: &BodyMapper<'_>) -> bool {
        let (name1, name2) = operation_names(mapper);
        self.renames
            .iter()
            .any(|rename| rename.before == name1 && rename.after == name2)
    }

    /// The pair agrees with a rename on exactly one side.
    pub fn mismatches(&self, mapper: &BodyMapper<'_>) -> bool {
        let (name1, name2) = operation_names(mapper);
        self.renames
            .iter()
            .any(|rename| (rename.before == name1) != (rename.after == name2))
    }

    /// Some rename's invocations resolve to `removed` before and to `added` after.
    pub fn explains(&self, removed: &Operation, added: &Operation) -> bool {
        self.renames.iter().any(|rename| {
            rename.invoked_before.matches_operation(removed)
                && rename.invoked_after.matches_operation(added)
        })
    }
}

fn operation_names<'m>(mapper: &'m BodyMapper<'_>) -> (&'m str, &'m str) {
    (&mapper.operation1().name, &mapper.operation2().name)
}
