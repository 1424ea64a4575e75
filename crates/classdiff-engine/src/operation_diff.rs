use std::fmt;

use classdiff_model::{Attribute, Operation, Parameter};

/// What changed between the two versions of a matched operation.
#[derive(Debug, Clone)]
pub struct OperationDiff<'a> {
    removed: &'a Operation,
    added: &'a Operation,
    pub renamed: bool,
    pub visibility_changed: bool,
    pub abstraction_changed: bool,
    pub return_type_changed: bool,
    pub added_parameters: Vec<&'a Parameter>,
    pub removed_parameters: Vec<&'a Parameter>,
    /// Same-name parameters whose type or varargs flag changed.
    pub parameter_type_changes: Vec<(&'a Parameter, &'a Parameter)>,
}

impl<'a> OperationDiff<'a> {
    pub fn new(removed: &'a Operation, added: &'a Operation) -> Self {
        let mut removed_parameters = Vec::new();
        let mut parameter_type_changes = Vec::new();
        for before in &removed.parameters {
            match added.parameters.iter().find(|p| p.name == before.name) {
                None => removed_parameters.push(before),
                Some(after) if after.ty != before.ty || after.varargs != before.varargs => {
                    parameter_type_changes.push((before, after));
                }
                Some(_) => {}
            }
        }
        let added_parameters = added
            .parameters
            .iter()
            .filter(|after| !removed.parameters.iter().any(|p| p.name == after.name))
            .collect();

        Self {
            removed,
            added,
            renamed: removed.name != added.name,
            visibility_changed: removed.visibility != added.visibility,
            abstraction_changed: removed.is_abstract != added.is_abstract,
            return_type_changed: !removed.equal_return_type(added),
            added_parameters,
            removed_parameters,
            parameter_type_changes,
        }
    }

    pub fn removed_operation(&self) -> &'a Operation {
        self.removed
    }

    pub fn added_operation(&self) -> &'a Operation {
        self.added
    }

    pub fn is_empty(&self) -> bool {
        !self.renamed
            && !self.visibility_changed
            && !self.abstraction_changed
            && !self.return_type_changed
            && self.added_parameters.is_empty()
            && self.removed_parameters.is_empty()
            && self.parameter_type_changes.is_empty()
    }
}

fn abstraction(is_abstract: bool) -> &'static str {
    if is_abstract {
        "abstract"
    } else {
        "concrete"
    }
}

impl fmt::Display for OperationDiff<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        writeln!(f, "\t{}", self.removed)?;
        if self.renamed {
            writeln!(f, "\trenamed from {} to {}", self.removed.name, self.added.name)?;
        }
        if self.visibility_changed {
            writeln!(
                f,
                "\tvisibility changed from {} to {}",
                self.removed.visibility, self.added.visibility
            )?;
        }
        if self.abstraction_changed {
            writeln!(
                f,
                "\tabstraction changed from {} to {}",
                abstraction(self.removed.is_abstract),
                abstraction(self.added.is_abstract)
            )?;
        }
        if self.return_type_changed {
            let render = |op: &Operation| {
                op.return_type
                    .as_ref()
                    .map_or_else(|| "none".to_owned(), ToString::to_string)
            };
            writeln!(
                f,
                "\treturn type changed from {} to {}",
                render(self.removed),
                render(self.added)
            )?;
        }
        for parameter in &self.removed_parameters {
            writeln!(f, "\tparameter {parameter} removed")?;
        }
        for parameter in &self.added_parameters {
            writeln!(f, "\tparameter {parameter} added")?;
        }
        for (before, after) in &self.parameter_type_changes {
            writeln!(
                f,
                "\t\tparameter {}: type changed from {} to {}",
                before.name, before.ty, after.ty
            )?;
        }
        Ok(())
    }
}

/// What changed between two same-name attributes.
#[derive(Debug, Clone)]
pub struct AttributeDiff<'a> {
    removed: &'a Attribute,
    added: &'a Attribute,
    pub visibility_changed: bool,
    pub type_changed: bool,
    pub static_changed: bool,
    pub final_changed: bool,
    pub initializer_changed: bool,
}

impl<'a> AttributeDiff<'a> {
    pub fn new(removed: &'a Attribute, added: &'a Attribute) -> Self {
        Self {
            removed,
            added,
            visibility_changed: removed.visibility != added.visibility,
            type_changed: removed.ty != added.ty,
            static_changed: removed.is_static != added.is_static,
            final_changed: removed.is_final != added.is_final,
            initializer_changed: removed.initializer != added.initializer,
        }
    }

    pub fn removed_attribute(&self) -> &'a Attribute {
        self.removed
    }

    pub fn added_attribute(&self) -> &'a Attribute {
        self.added
    }

    pub fn is_empty(&self) -> bool {
        !self.visibility_changed
            && !self.type_changed
            && !self.static_changed
            && !self.final_changed
            && !self.initializer_changed
    }
}

impl fmt::Display for AttributeDiff<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        writeln!(f, "\t{}", self.removed)?;
        if self.visibility_changed {
            writeln!(
                f,
                "\tvisibility changed from {} to {}",
                self.removed.visibility, self.added.visibility
            )?;
        }
        if self.type_changed {
            writeln!(f, "\ttype changed from {} to {}", self.removed.ty, self.added.ty)?;
        }
        if self.static_changed {
            let word = if self.added.is_static { "added" } else { "removed" };
            writeln!(f, "\tmodifier static {word}")?;
        }
        if self.final_changed {
            let word = if self.added.is_final { "added" } else { "removed" };
            writeln!(f, "\tmodifier final {word}")?;
        }
        if self.initializer_changed {
            let render = |value: &Option<String>| value.clone().unwrap_or_else(|| "none".to_owned());
            writeln!(
                f,
                "\tinitializer changed from {} to {}",
                render(&self.removed.initializer),
                render(&self.added.initializer)
            )?;
        }
        Ok(())
    }
}
