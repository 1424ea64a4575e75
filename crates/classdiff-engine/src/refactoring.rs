use std::fmt;

use classdiff_mapper::BodyMapper;
use classdiff_model::{Invocation, Operation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefactoringKind {
    RenameOperation,
    ExtractOperation,
    ExtractAndMoveDelegate,
    InlineOperation,
}

impl fmt::Display for RefactoringKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RefactoringKind::RenameOperation => "Rename Method",
            RefactoringKind::ExtractOperation => "Extract Method",
            RefactoringKind::ExtractAndMoveDelegate => "Extract Method (delegate)",
            RefactoringKind::InlineOperation => "Inline Method",
        })
    }
}

/// A refactoring explaining part of the difference between two class versions.
#[derive(Debug, Clone)]
pub enum Refactoring<'a> {
    /// A removed operation reappears under another name.
    RenameOperation {
        original: &'a Operation,
        renamed: &'a Operation,
        mapper: BodyMapper<'a>,
    },
    /// The body of a removed operation now lives inside `target_after`, which
    /// used to call it through `invocation`.
    InlineOperation {
        inlined: &'a Operation,
        target_before: &'a Operation,
        target_after: &'a Operation,
        invocation: &'a Invocation,
        mapper: BodyMapper<'a>,
    },
    /// Statements of `source_before` moved into the added `extracted`
    /// operation, which `source_after` calls through `invocation`.
    ///
    /// With `delegate_target` set, `extracted` only forwards to another added
    /// operation holding the moved statements.
    ExtractOperation {
        extracted: &'a Operation,
        source_before: &'a Operation,
        source_after: &'a Operation,
        invocation: &'a Invocation,
        delegate_target: Option<&'a Operation>,
        mapper: BodyMapper<'a>,
    },
}

impl<'a> Refactoring<'a> {
    pub fn kind(&self) -> RefactoringKind {
        match self {
            Refactoring::RenameOperation { .. } => RefactoringKind::RenameOperation,
            Refactoring::InlineOperation { .. } => RefactoringKind::InlineOperation,
            Refactoring::ExtractOperation {
                delegate_target: None,
                ..
            } => RefactoringKind::ExtractOperation,
            Refactoring::ExtractOperation {
                delegate_target: Some(_),
                ..
            } => RefactoringKind::ExtractAndMoveDelegate,
        }
    }

    /// The mapper backing the refactoring (a synthetic one for inline/extract).
    pub fn mapper(&self) -> &BodyMapper<'a> {
        match self {
            Refactoring::RenameOperation { mapper, .. }
            | Refactoring::InlineOperation { mapper, .. }
            | Refactoring::ExtractOperation { mapper, .. } => mapper,
        }
    }

    /// The added or removed operation this refactoring accounts for.
    pub fn subject(&self) -> &'a Operation {
        match self {
            Refactoring::RenameOperation { original, .. } => original,
            Refactoring::InlineOperation { inlined, .. } => inlined,
            Refactoring::ExtractOperation { extracted, .. } => extracted,
        }
    }
}

impl fmt::Display for Refactoring<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t", self.kind())?;
        match self {
            Refactoring::RenameOperation {
                original, renamed, ..
            } => write!(
                f,
                "{original} renamed to {renamed} in class {}",
                renamed.class_name
            ),
            Refactoring::InlineOperation {
                inlined,
                target_after,
                ..
            } => write!(
                f,
                "{inlined} inlined to {target_after} in class {}",
                target_after.class_name
            ),
            Refactoring::ExtractOperation {
                extracted,
                source_before,
                delegate_target,
                ..
            } => {
                write!(f, "{extracted} extracted from {source_before}")?;
                if let Some(target) = delegate_target {
                    write!(f, " delegating to {target}")?;
                }
                write!(f, " in class {}", source_before.class_name)
            }
        }
    }
}
