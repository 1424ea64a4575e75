use classdiff_config::MatchingConfig;
use classdiff_mapper::{BodyMapperFactory, TextualMapper};
use classdiff_model::ClassModel;

use crate::class_diff::ClassDiff;
use crate::{extract, inline, matching, DiffError};

/// Diffs pairs of class versions with one body mapper and one configuration.
///
/// A differ holds no per-class state; the same instance can diff any number
/// of class pairs, from any number of threads when `F: Sync`.
#[derive(Debug, Clone)]
pub struct ClassDiffer<'f, F: BodyMapperFactory + ?Sized> {
    factory: &'f F,
    config: MatchingConfig,
}

impl<'f, F: BodyMapperFactory + ?Sized> ClassDiffer<'f, F> {
    pub fn new(factory: &'f F, config: MatchingConfig) -> Self {
        Self { factory, config }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Runs every stage, in order, over one class pair.
    ///
    /// Stages share the `removed`/`added` pools: same-signature pairing,
    /// then renames, then inlined and finally extracted operations each
    /// take out what they explain.
    pub fn diff<'a>(
        &self,
        original: &'a ClassModel,
        next: &'a ClassModel,
    ) -> Result<ClassDiff<'a>, DiffError> {
        let span = tracing::debug_span!("class_diff", class = %original.name);
        let _guard = span.enter();

        let mut diff = ClassDiff::new(original, next);
        diff.process_inheritance();
        diff.process_attributes();
        diff.process_operations(self.factory)?;
        diff.process_anonymous_classes();
        tracing::debug!(
            removed = diff.removed_operations.len(),
            added = diff.added_operations.len(),
            mappers = diff.mappers.len(),
            "same-signature pairing done"
        );

        matching::check_for_operation_signature_changes(&mut diff, self.factory, &self.config)?;
        inline::check_for_inlined_operations(&mut diff, self.factory, &self.config)?;
        extract::check_for_extracted_operations(&mut diff, self.factory, &self.config)?;

        tracing::debug!(
            refactorings = diff.refactorings.len(),
            removed = diff.removed_operations.len(),
            added = diff.added_operations.len(),
            "class diff done"
        );
        Ok(diff)
    }
}

/// Diffs two class versions with the token-based [`TextualMapper`].
pub fn diff_classes<'a>(
    original: &'a ClassModel,
    next: &'a ClassModel,
    config: &MatchingConfig,
) -> Result<ClassDiff<'a>, DiffError> {
    ClassDiffer::new(&TextualMapper, config.clone()).diff(original, next)
}
