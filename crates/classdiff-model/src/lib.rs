//! Structural model of one class version, as seen by the class differ.
//!
//! The model is produced elsewhere (from source text or bytecode); this crate only
//! describes its shape and the lookups the differ needs:
//! - signature lookups that tolerate changed parameter types (`ClassModel`)
//! - invocation/operation matching (`Invocation::matches_operation`)
//! - statement trees with their invocations (`Statement`, `OperationBody`)

#![forbid(unsafe_code)]

mod class;
mod operation;
mod statement;
mod text;
mod types;

pub use class::{AnonymousClass, Attribute, ClassModel};
pub use operation::{Operation, Parameter};
pub use statement::{Invocation, OperationBody, Statement, StatementKind, VariableDeclaration};
pub use text::{levenshtein_distance, tokenize};
pub use types::{TypeRef, Visibility};
