use std::fmt;
use std::ptr;

use classdiff_mapper::{BodyMapper, BodyMapperFactory};
use classdiff_model::{AnonymousClass, Attribute, ClassModel, Operation, TypeRef, Visibility};

use crate::consistency::ConsistentRenames;
use crate::operation_diff::{AttributeDiff, OperationDiff};
use crate::refactoring::Refactoring;
use crate::DiffError;

/// The difference between two versions of one class.
///
/// Built by [`crate::ClassDiffer::diff`]. The `removed`/`added` pools only
/// hold what no stage could explain: same-signature pairs, renames, inlined
/// and extracted operations have all been taken out of them.
#[derive(Debug)]
pub struct ClassDiff<'a> {
    pub(crate) original: &'a ClassModel,
    pub(crate) next: &'a ClassModel,
    visibility_change: Option<(Visibility, Visibility)>,
    abstraction_change: Option<(bool, bool)>,
    superclass_changed: bool,
    old_superclass: Option<&'a TypeRef>,
    new_superclass: Option<&'a TypeRef>,
    added_interfaces: Vec<&'a TypeRef>,
    removed_interfaces: Vec<&'a TypeRef>,
    pub(crate) removed_operations: Vec<&'a Operation>,
    pub(crate) added_operations: Vec<&'a Operation>,
    removed_attributes: Vec<&'a Attribute>,
    added_attributes: Vec<&'a Attribute>,
    removed_anonymous_classes: Vec<&'a AnonymousClass>,
    pub(crate) added_anonymous_classes: Vec<&'a AnonymousClass>,
    pub(crate) operation_diffs: Vec<OperationDiff<'a>>,
    attribute_diffs: Vec<AttributeDiff<'a>>,
    pub(crate) mappers: Vec<BodyMapper<'a>>,
    pub(crate) refactorings: Vec<Refactoring<'a>>,
    pub(crate) consistent_renames: ConsistentRenames,
}

impl<'a> ClassDiff<'a> {
    pub(crate) fn new(original: &'a ClassModel, next: &'a ClassModel) -> Self {
        Self {
            original,
            next,
            visibility_change: None,
            abstraction_change: None,
            superclass_changed: false,
            old_superclass: None,
            new_superclass: None,
            added_interfaces: Vec::new(),
            removed_interfaces: Vec::new(),
            removed_operations: Vec::new(),
            added_operations: Vec::new(),
            removed_attributes: Vec::new(),
            added_attributes: Vec::new(),
            removed_anonymous_classes: Vec::new(),
            added_anonymous_classes: Vec::new(),
            operation_diffs: Vec::new(),
            attribute_diffs: Vec::new(),
            mappers: Vec::new(),
            refactorings: Vec::new(),
            consistent_renames: ConsistentRenames::default(),
        }
    }

    pub(crate) fn process_inheritance(&mut self) {
        let (original, next) = (self.original, self.next);
        if original.visibility != next.visibility {
            self.visibility_change = Some((original.visibility, next.visibility));
        }
        if !original.is_interface && !next.is_interface && original.is_abstract != next.is_abstract
        {
            self.abstraction_change = Some((original.is_abstract, next.is_abstract));
        }

        self.superclass_changed = match (&original.superclass, &next.superclass) {
            (Some(before), Some(after)) => before != after,
            (None, None) => false,
            _ => true,
        };
        self.old_superclass = original.superclass.as_ref();
        self.new_superclass = next.superclass.as_ref();

        self.removed_interfaces = original
            .implemented_interfaces
            .iter()
            .filter(|ty| !next.implemented_interfaces.contains(ty))
            .collect();
        self.added_interfaces = next
            .implemented_interfaces
            .iter()
            .filter(|ty| !original.implemented_interfaces.contains(ty))
            .collect();
    }

    pub(crate) fn process_attributes(&mut self) {
        let (original, next) = (self.original, self.next);
        for attribute in &original.attributes {
            match next.attribute_with_same_name_ignoring_changed_type(attribute) {
                None => self.removed_attributes.push(attribute),
                Some(same) => self.push_attribute_diff(attribute, same),
            }
        }
        for attribute in &next.attributes {
            match original.attribute_with_same_name_ignoring_changed_type(attribute) {
                None => self.added_attributes.push(attribute),
                Some(same) => self.push_attribute_diff(same, attribute),
            }
        }
    }

    fn push_attribute_diff(&mut self, removed: &'a Attribute, added: &'a Attribute) {
        let known = self.attribute_diffs.iter().any(|diff| {
            ptr::eq(diff.removed_attribute(), removed) || ptr::eq(diff.added_attribute(), added)
        });
        if removed != added && !known {
            self.attribute_diffs.push(AttributeDiff::new(removed, added));
        }
    }

    /// Pairs operations whose signatures agree up to changed parameter types.
    /// These pairs are trusted without scoring.
    pub(crate) fn process_operations<F>(&mut self, factory: &F) -> Result<(), DiffError>
    where
        F: BodyMapperFactory + ?Sized,
    {
        let (original, next) = (self.original, self.next);
        for operation in &original.operations {
            match next.operation_with_same_signature_ignoring_changed_types(operation) {
                None => self.removed_operations.push(operation),
                Some(same) => self.map_same_signature(factory, operation, same)?,
            }
        }
        for operation in &next.operations {
            match original.operation_with_same_signature_ignoring_changed_types(operation) {
                None => self.added_operations.push(operation),
                Some(same) => self.map_same_signature(factory, same, operation)?,
            }
        }
        Ok(())
    }

    fn map_same_signature<F>(
        &mut self,
        factory: &F,
        operation1: &'a Operation,
        operation2: &'a Operation,
    ) -> Result<(), DiffError>
    where
        F: BodyMapperFactory + ?Sized,
    {
        let covered = self.mappers.iter().any(|mapper| {
            ptr::eq(mapper.operation1(), operation1) || ptr::eq(mapper.operation2(), operation2)
        });
        if covered {
            return Ok(());
        }
        let mapper = factory.map_operations(operation1, operation2)?;
        let diff = OperationDiff::new(operation1, operation2);
        if !diff.is_empty() {
            self.operation_diffs.push(diff);
        }
        self.mappers.push(mapper);
        Ok(())
    }

    pub(crate) fn process_anonymous_classes(&mut self) {
        let (original, next) = (self.original, self.next);
        self.removed_anonymous_classes.extend(
            original
                .anonymous_classes
                .iter()
                .filter(|class| !next.contains_anonymous_with_same_attributes_and_operations(class)),
        );
        self.added_anonymous_classes.extend(
            next.anonymous_classes
                .iter()
                .filter(|class| !original.contains_anonymous_with_same_attributes_and_operations(class)),
        );
    }

    /// Whether either version of the class is named `class_name`.
    pub fn matches(&self, class_name: &str) -> bool {
        self.original.name == class_name || self.next.name == class_name
    }

    pub fn original_class(&self) -> &'a ClassModel {
        self.original
    }

    pub fn next_class(&self) -> &'a ClassModel {
        self.next
    }

    pub fn original_class_name(&self) -> &'a str {
        &self.original.name
    }

    pub fn next_class_name(&self) -> &'a str {
        &self.next.name
    }

    pub fn visibility_change(&self) -> Option<(Visibility, Visibility)> {
        self.visibility_change
    }

    pub fn abstraction_change(&self) -> Option<(bool, bool)> {
        self.abstraction_change
    }

    pub fn superclass_changed(&self) -> bool {
        self.superclass_changed
    }

    /// The superclass shared by both versions, if it did not change.
    pub fn superclass(&self) -> Option<&'a TypeRef> {
        match (self.old_superclass, self.new_superclass) {
            (Some(before), Some(_)) if !self.superclass_changed => Some(before),
            _ => None,
        }
    }

    pub fn old_superclass(&self) -> Option<&'a TypeRef> {
        self.old_superclass
    }

    pub fn new_superclass(&self) -> Option<&'a TypeRef> {
        self.new_superclass
    }

    pub fn added_implemented_interfaces(&self) -> &[&'a TypeRef] {
        &self.added_interfaces
    }

    pub fn removed_implemented_interfaces(&self) -> &[&'a TypeRef] {
        &self.removed_interfaces
    }

    pub fn removed_operations(&self) -> &[&'a Operation] {
        &self.removed_operations
    }

    pub fn added_operations(&self) -> &[&'a Operation] {
        &self.added_operations
    }

    pub fn removed_attributes(&self) -> &[&'a Attribute] {
        &self.removed_attributes
    }

    pub fn added_attributes(&self) -> &[&'a Attribute] {
        &self.added_attributes
    }

    pub fn removed_anonymous_classes(&self) -> &[&'a AnonymousClass] {
        &self.removed_anonymous_classes
    }

    pub fn added_anonymous_classes(&self) -> &[&'a AnonymousClass] {
        &self.added_anonymous_classes
    }

    pub fn operation_diffs(&self) -> &[OperationDiff<'a>] {
        &self.operation_diffs
    }

    pub fn attribute_diffs(&self) -> &[AttributeDiff<'a>] {
        &self.attribute_diffs
    }

    /// Confirmed mappers in confirmation order.
    pub fn operation_body_mappers(&self) -> &[BodyMapper<'a>] {
        &self.mappers
    }

    pub fn refactorings(&self) -> &[Refactoring<'a>] {
        &self.refactorings
    }

    /// Invocation renames the rename pass was run against.
    pub fn consistent_renames(&self) -> &ConsistentRenames {
        &self.consistent_renames
    }

    /// Some operation of the original class has the same signature as `operation`.
    pub fn contains_operation_with_same_signature(&self, operation: &Operation) -> bool {
        self.original
            .operations
            .iter()
            .any(|candidate| candidate.equal_signature(operation))
    }

    pub fn contains_removed_operation_with_same_signature(
        &self,
        operation: &Operation,
    ) -> Option<&'a Operation> {
        self.removed_operations
            .iter()
            .copied()
            .find(|removed| removed.equal_signature(operation))
    }

    pub fn contains_removed_attribute_with_same_signature(
        &self,
        attribute: &Attribute,
    ) -> Option<&'a Attribute> {
        self.removed_attributes
            .iter()
            .copied()
            .find(|removed| removed.equals_ignoring_changed_visibility(attribute))
    }

    pub fn add_operation_body_mapper(&mut self, mapper: BodyMapper<'a>) {
        self.mappers.push(mapper);
    }

    pub fn report_added_anonymous_class(&mut self, class: &'a AnonymousClass) {
        self.added_anonymous_classes.push(class);
    }

    pub fn report_removed_anonymous_class(&mut self, class: &'a AnonymousClass) {
        self.removed_anonymous_classes.push(class);
    }

    /// Nothing left to report for this class.
    ///
    /// Superclass and implemented-interface changes alone do not make a diff
    /// non-empty.
    pub fn is_empty(&self) -> bool {
        self.added_operations.is_empty()
            && self.removed_operations.is_empty()
            && self.added_attributes.is_empty()
            && self.removed_attributes.is_empty()
            && self.operation_diffs.is_empty()
            && self.attribute_diffs.is_empty()
            && self.mappers.is_empty()
            && self.visibility_change.is_none()
            && self.abstraction_change.is_none()
    }
}

fn abstraction(is_abstract: bool) -> &'static str {
    if is_abstract {
        "abstract"
    } else {
        "concrete"
    }
}

impl fmt::Display for ClassDiff<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_empty() {
            writeln!(f, "{}:", self.original.name)?;
        }
        if let Some((before, after)) = self.visibility_change {
            writeln!(f, "\tvisibility changed from {before} to {after}")?;
        }
        if let Some((before, after)) = self.abstraction_change {
            writeln!(
                f,
                "\tabstraction changed from {} to {}",
                abstraction(before),
                abstraction(after)
            )?;
        }

        let mut removed = self.removed_operations.clone();
        removed.sort();
        for operation in removed {
            writeln!(f, "operation {operation} removed")?;
        }
        let mut added = self.added_operations.clone();
        added.sort();
        for operation in added {
            writeln!(f, "operation {operation} added")?;
        }
        let mut removed = self.removed_attributes.clone();
        removed.sort();
        for attribute in removed {
            writeln!(f, "attribute {attribute} removed")?;
        }
        let mut added = self.added_attributes.clone();
        added.sort();
        for attribute in added {
            writeln!(f, "attribute {attribute} added")?;
        }

        for diff in &self.operation_diffs {
            write!(f, "{diff}")?;
        }
        for diff in &self.attribute_diffs {
            write!(f, "{diff}")?;
        }
        for mapper in &self.mappers {
            writeln!(f, "{mapper}")?;
        }
        Ok(())
    }
}
