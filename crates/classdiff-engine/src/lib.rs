//! Operation matching and refactoring classification between two versions of
//! a class.
//!
//! [`ClassDiffer::diff`] runs, in this order:
//! - inheritance, attribute and same-signature operation pairing
//! - anonymous class pairing
//! - rename detection over the remaining removed/added operations, kept
//!   consistent with the invocation renames seen in already matched bodies
//! - inline detection for removed operations
//! - extract detection for added operations
//!
//! Statement alignment is delegated to a [`BodyMapperFactory`].
//!
//! ```
//! use classdiff_config::MatchingConfig;
//! use classdiff_engine::{diff_classes, RefactoringKind};
//! use classdiff_test_utils::{class, method, stmt};
//!
//! let before = class("shop.Cart")
//!     .method(method("int total(int tax)").body(vec![
//!         stmt("int sum = subtotal();"),
//!         stmt("sum = sum + tax;"),
//!         stmt("return sum;"),
//!     ]))
//!     .build();
//! let after = class("shop.Cart")
//!     .method(method("int grandTotal(int tax)").body(vec![
//!         stmt("int sum = subtotal();"),
//!         stmt("sum = sum + tax;"),
//!         stmt("return sum;"),
//!     ]))
//!     .build();
//!
//! let diff = diff_classes(&before, &after, &MatchingConfig::default()).unwrap();
//! assert_eq!(diff.refactorings()[0].kind(), RefactoringKind::RenameOperation);
//! assert!(diff.removed_operations().is_empty());
//! ```

#![forbid(unsafe_code)]

mod class_diff;
mod consistency;
mod differ;
mod error;
mod extract;
mod inline;
mod matching;
mod operation_diff;
mod refactoring;
mod scoring;

pub use class_diff::ClassDiff;
pub use consistency::ConsistentRenames;
pub use differ::{diff_classes, ClassDiffer};
pub use error::DiffError;
pub use operation_diff::{AttributeDiff, OperationDiff};
pub use refactoring::{Refactoring, RefactoringKind};

pub use classdiff_mapper::{BodyMapper, BodyMapperFactory, TextualMapper};
