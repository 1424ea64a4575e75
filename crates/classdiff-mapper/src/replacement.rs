use std::fmt;
use std::hash::{Hash, Hasher};

use classdiff_model::Invocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplacementKind {
    /// A declared type changed (`int x = 0;` -> `long x = 0;`).
    Type,
    VariableName,
    Literal,
    /// The called method changed name (`load(x);` -> `fetch(x);`).
    MethodInvocationName,
    /// An argument of a call became the returned expression of the other side
    /// (`consume(value);` -> `return value;`).
    ArgumentReplacedWithReturnExpression,
    /// A returned expression became the value assigned on the other side
    /// (`return n / 2;` -> `int half = n / 2;`).
    ReturnValueAssigned,
}

/// A typed edit inside an otherwise matched statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Replacement {
    pub before: String,
    pub after: String,
    pub kind: ReplacementKind,
}

impl Replacement {
    pub fn new(before: impl Into<String>, after: impl Into<String>, kind: ReplacementKind) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
            kind,
        }
    }

    pub fn involves_method_invocation(&self) -> bool {
        self.kind == ReplacementKind::MethodInvocationName
    }
}

impl fmt::Display for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({:?})", self.before, self.after, self.kind)
    }
}

/// A method-name rename inferred from one matched statement.
///
/// Identity is the `(before, after)` name pair; the invocations are kept as
/// evidence for arity checks against candidate operations.
#[derive(Debug, Clone)]
pub struct MethodInvocationRename {
    pub before: String,
    pub after: String,
    pub invoked_before: Invocation,
    pub invoked_after: Invocation,
}

impl MethodInvocationRename {
    pub fn new(invoked_before: Invocation, invoked_after: Invocation) -> Self {
        Self {
            before: invoked_before.name.clone(),
            after: invoked_after.name.clone(),
            invoked_before,
            invoked_after,
        }
    }

    /// Two renames conflict when they agree on exactly one side.
    pub fn conflicts_with(&self, other: &MethodInvocationRename) -> bool {
        (self.before == other.before) != (self.after == other.after)
    }
}

impl PartialEq for MethodInvocationRename {
    fn eq(&self, other: &Self) -> bool {
        self.before == other.before && self.after == other.after
    }
}

impl Eq for MethodInvocationRename {}

impl Hash for MethodInvocationRename {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.before.hash(state);
        self.after.hash(state);
    }
}

impl fmt::Display for MethodInvocationRename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.before, self.after)
    }
}
