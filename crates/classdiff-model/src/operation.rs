use std::cmp::Ordering;
use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::text::levenshtein_distance;
use crate::{AnonymousClass, Invocation, OperationBody, Statement, TypeRef, Visibility};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeRef,
    #[serde(default)]
    pub varargs: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            varargs: false,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.ty)?;
        if self.varargs {
            f.write_str("...")?;
        }
        Ok(())
    }
}

/// A method or constructor of a class model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub class_name: String,
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_constructor: bool,
    #[serde(default)]
    pub is_static: bool,
    /// `None` for constructors.
    #[serde(default)]
    pub return_type: Option<TypeRef>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub annotations: Vec<String>,
    /// `None` for abstract/native operations.
    #[serde(default)]
    pub body: Option<OperationBody>,
}

impl Operation {
    /// `name(T1, T2)`; unique within a class.
    pub fn signature(&self) -> String {
        let types: Vec<String> = self
            .parameters
            .iter()
            .map(|p| {
                if p.varargs {
                    format!("{}...", p.ty)
                } else {
                    p.ty.to_string()
                }
            })
            .collect();
        format!("{}({})", self.name, types.join(", "))
    }

    pub fn parameter_types(&self) -> Vec<&TypeRef> {
        self.parameters.iter().map(|p| &p.ty).collect()
    }

    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn has_test_annotation(&self, test_annotations: &[String]) -> bool {
        self.annotations.iter().any(|annotation| {
            let annotation = annotation.trim_start_matches('@');
            test_annotations.iter().any(|name| name == annotation)
        })
    }

    fn equivalent_name(&self, other: &Operation) -> bool {
        self.name == other.name || (self.is_constructor && other.is_constructor)
    }

    pub fn equal_parameter_types(&self, other: &Operation) -> bool {
        self.parameter_types() == other.parameter_types()
    }

    pub fn equal_return_type(&self, other: &Operation) -> bool {
        self.return_type == other.return_type
    }

    pub fn equal_signature(&self, other: &Operation) -> bool {
        self.equivalent_name(other) && self.equal_parameter_types(other)
    }

    /// Same name and parameter positions; at every position either the type or
    /// the parameter name must still agree.
    pub fn equal_signature_ignoring_changed_types(&self, other: &Operation) -> bool {
        self.equivalent_name(other)
            && self.is_abstract == other.is_abstract
            && self.parameters.len() == other.parameters.len()
            && self
                .parameters
                .iter()
                .zip(&other.parameters)
                .all(|(a, b)| a.ty == b.ty || a.name == b.name)
    }

    /// Parameter types declared by both operations, in `self`'s order.
    pub fn common_parameter_types<'a>(&'a self, other: &Operation) -> Vec<&'a TypeRef> {
        let theirs = other.parameter_types();
        let mut common: Vec<&TypeRef> = Vec::new();
        for ty in self.parameter_types() {
            if theirs.contains(&ty) && !common.contains(&ty) {
                common.push(ty);
            }
        }
        common
    }

    /// Whether `self` could replace `removed` at its call sites.
    pub fn compatible_signature(&self, removed: &Operation) -> bool {
        let ours = self.parameter_types();
        let theirs = removed.parameter_types();
        if ours == theirs {
            return true;
        }
        if ours.len() == theirs.len()
            && ours
                .iter()
                .zip(&theirs)
                .all(|(a, b)| a == b || a.equals_with_sub_type(b))
        {
            return true;
        }
        let (shorter, longer) = if ours.len() < theirs.len() {
            (&ours, &theirs)
        } else {
            (&theirs, &ours)
        };
        if !shorter.is_empty() && is_subsequence(shorter, longer) {
            return true;
        }
        let names = self.parameter_names();
        !names.is_empty() && names == removed.parameter_names()
    }

    /// Edit distance of the names, normalized by the longer name.
    pub fn normalized_name_distance(&self, other: &Operation) -> f64 {
        let max_len = self.name.chars().count().max(other.name.chars().count());
        if max_len == 0 {
            return 0.0;
        }
        levenshtein_distance(&self.name, &other.name) as f64 / max_len as f64
    }

    /// The forwarded call when the whole body is a single call statement.
    pub fn is_delegate(&self) -> Option<&Invocation> {
        let body = self.body.as_ref()?;
        match body.statements.as_slice() {
            [only] if only.is_leaf() => only.invocation_covering_entire_fragment(),
            _ => None,
        }
    }

    pub fn all_invocations(&self) -> IndexSet<&Invocation> {
        self.body
            .as_ref()
            .map(OperationBody::all_invocations)
            .unwrap_or_default()
    }

    pub fn leaves(&self) -> Vec<&Statement> {
        self.body
            .as_ref()
            .map(OperationBody::leaves)
            .unwrap_or_default()
    }

    pub fn inner_nodes(&self) -> Vec<&Statement> {
        self.body
            .as_ref()
            .map(OperationBody::inner_nodes)
            .unwrap_or_default()
    }

    /// Operations of the anonymous classes declared inside this operation.
    pub fn operations_inside_anonymous_classes<'a>(
        &self,
        anonymous_classes: &[&'a AnonymousClass],
    ) -> Vec<&'a Operation> {
        let signature = self.signature();
        anonymous_classes
            .iter()
            .copied()
            .filter(|class| class.enclosing_operation.as_deref() == Some(signature.as_str()))
            .flat_map(|class| class.operations.iter())
            .collect()
    }
}

fn is_subsequence(needle: &[&TypeRef], haystack: &[&TypeRef]) -> bool {
    let mut remaining = haystack.iter();
    needle
        .iter()
        .all(|wanted| remaining.any(|candidate| candidate == wanted))
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.visibility)?;
        if self.is_abstract {
            f.write_str("abstract ")?;
        }
        let params: Vec<String> = self.parameters.iter().map(ToString::to_string).collect();
        write!(f, "{}({})", self.name, params.join(", "))?;
        if let Some(return_type) = &self.return_type {
            write!(f, " : {return_type}")?;
        }
        Ok(())
    }
}

/// Natural ordering is by rendered text, as used for sorted reports.
impl Ord for Operation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_string()
            .cmp(&other.to_string())
            .then_with(|| self.class_name.cmp(&other.class_name))
            .then_with(|| self.signature().cmp(&other.signature()))
    }
}

impl PartialOrd for Operation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
