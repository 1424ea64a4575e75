use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Operation, TypeRef, Visibility};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub ty: TypeRef,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub initializer: Option<String>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            visibility: Visibility::Private,
            is_static: false,
            is_final: false,
            initializer: None,
        }
    }

    pub fn equals_ignoring_changed_visibility(&self, other: &Attribute) -> bool {
        self.name == other.name
            && self.ty == other.ty
            && self.is_static == other.is_static
            && self.is_final == other.is_final
            && self.initializer == other.initializer
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} : {}", self.visibility, self.name, self.ty)
    }
}

impl Ord for Attribute {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_string()
            .cmp(&other.to_string())
            .then_with(|| self.initializer.cmp(&other.initializer))
    }
}

impl PartialOrd for Attribute {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymousClass {
    /// Binary-style name, e.g. `Foo$1`.
    pub name: String,
    /// Signature (see [`Operation::signature`]) of the operation declaring this class.
    #[serde(default)]
    pub enclosing_operation: Option<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl AnonymousClass {
    pub fn same_attributes_and_operations(&self, other: &AnonymousClass) -> bool {
        self.attributes == other.attributes
            && self.operations.len() == other.operations.len()
            && self
                .operations
                .iter()
                .all(|op| other.operations.iter().any(|candidate| candidate.equal_signature(op)))
    }
}

/// One version of a class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassModel {
    /// Fully qualified name.
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_interface: bool,
    #[serde(default)]
    pub superclass: Option<TypeRef>,
    #[serde(default)]
    pub implemented_interfaces: Vec<TypeRef>,
    /// Declaration order.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Declaration order.
    #[serde(default)]
    pub operations: Vec<Operation>,
    #[serde(default)]
    pub anonymous_classes: Vec<AnonymousClass>,
}

impl ClassModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            is_abstract: false,
            is_interface: false,
            superclass: None,
            implemented_interfaces: Vec::new(),
            attributes: Vec::new(),
            operations: Vec::new(),
            anonymous_classes: Vec::new(),
        }
    }

    /// The counterpart of `operation` in this class, tolerating changed parameter types.
    ///
    /// An operation with an identical signature always wins; otherwise a
    /// type-insensitive match is only returned when it is unambiguous.
    pub fn operation_with_same_signature_ignoring_changed_types(
        &self,
        operation: &Operation,
    ) -> Option<&Operation> {
        let candidates: Vec<&Operation> = self
            .operations
            .iter()
            .filter(|candidate| candidate.equal_signature_ignoring_changed_types(operation))
            .collect();
        if let Some(exact) = candidates
            .iter()
            .copied()
            .find(|candidate| candidate.equal_signature(operation))
        {
            return Some(exact);
        }
        match candidates.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    pub fn attribute_with_same_name_ignoring_changed_type(
        &self,
        attribute: &Attribute,
    ) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|candidate| candidate.name == attribute.name)
    }

    pub fn contains_anonymous_with_same_attributes_and_operations(
        &self,
        anonymous: &AnonymousClass,
    ) -> bool {
        self.anonymous_classes
            .iter()
            .any(|candidate| candidate.same_attributes_and_operations(anonymous))
    }

    /// Declaration index of `operation` within this class.
    pub fn operation_position(&self, operation: &Operation) -> Option<usize> {
        self.operations
            .iter()
            .position(|candidate| std::ptr::eq(candidate, operation))
            .or_else(|| self.operations.iter().position(|candidate| candidate == operation))
    }

    /// Declared operations immediately before and after `operation`.
    pub fn neighbours_of(&self, operation: &Operation) -> (Option<&Operation>, Option<&Operation>) {
        let Some(idx) = self.operation_position(operation) else {
            return (None, None);
        };
        let before = idx.checked_sub(1).and_then(|i| self.operations.get(i));
        (before, self.operations.get(idx + 1))
    }
}
