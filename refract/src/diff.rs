//! Entity-level diff between two snapshots.

use crate::model::{Attribute, Class, Operation, Snapshot};
use crate::refactoring::Refactoring;
use stemma::BodyMapping;

/// How a class pair was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassMatchKind {
    /// Same qualified name.
    Same,
    /// Same package, different simple name.
    Rename,
    /// Same simple name, different package.
    Move,
    /// Both package and simple name differ.
    MoveRename,
}

/// Why two attributes were paired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeEvidence {
    /// Same name and type.
    Exact,
    /// Same name, different type.
    TypeChanged,
    /// Different names, consistently substituted in mapped statements.
    Usage,
}

/// Two attributes judged to be the same field.
#[derive(Debug, Clone, Copy)]
pub struct AttributePair<'a> {
    /// Before side.
    pub before: &'a Attribute,
    /// After side.
    pub after: &'a Attribute,
    /// Pairing evidence.
    pub evidence: AttributeEvidence,
}

/// Two operations judged to be the same method, with their statement mapping.
#[derive(Debug, Clone)]
pub struct OperationPair<'a> {
    /// Before side.
    pub before: &'a Operation,
    /// After side.
    pub after: &'a Operation,
    /// Whether the signatures were identical.
    pub exact_signature: bool,
    /// Statement mapping of the two bodies.
    pub mapping: BodyMapping,
}

/// A committed class pair and the diff of its members.
#[derive(Debug, Clone)]
pub struct ClassDiff<'a> {
    /// Before side.
    pub before: &'a Class,
    /// After side.
    pub after: &'a Class,
    /// How the pair was established.
    pub kind: ClassMatchKind,
    /// Pairing score; 1.0 for same-name pairs.
    pub score: f64,
    /// Paired operations, in before declaration order.
    pub operation_pairs: Vec<OperationPair<'a>>,
    /// Paired attributes, in before declaration order.
    pub attribute_pairs: Vec<AttributePair<'a>>,
    /// Operations only in the after class.
    pub added_operations: Vec<&'a Operation>,
    /// Operations only in the before class.
    pub removed_operations: Vec<&'a Operation>,
    /// Attributes only in the after class.
    pub added_attributes: Vec<&'a Attribute>,
    /// Attributes only in the before class.
    pub removed_attributes: Vec<&'a Attribute>,
}

/// The result of diffing two snapshots.
#[derive(Debug)]
pub struct ModelDiff<'a> {
    /// The before snapshot.
    pub before: &'a Snapshot,
    /// The after snapshot.
    pub after: &'a Snapshot,
    /// Class pairs, in before declaration order.
    pub class_diffs: Vec<ClassDiff<'a>>,
    /// Classes only in the after snapshot.
    pub added_classes: Vec<&'a Class>,
    /// Classes only in the before snapshot.
    pub removed_classes: Vec<&'a Class>,
    pub(crate) refactorings: Vec<Refactoring>,
}

impl<'a> ModelDiff<'a> {
    /// Detected refactorings, ordered and deduplicated.
    pub fn refactorings(&self) -> &[Refactoring] {
        &self.refactorings
    }

    /// Take ownership of the detected refactorings.
    pub fn into_refactorings(self) -> Vec<Refactoring> {
        self.refactorings
    }

    /// The class diff whose before class has this qualified name.
    pub fn class_diff(&self, before_qualified_name: &str) -> Option<&ClassDiff<'a>> {
        self.class_diffs
            .iter()
            .find(|d| d.before.qualified_name == before_qualified_name)
    }

    /// Every operation pair with its class diff.
    pub fn operation_pairs(&self) -> impl Iterator<Item = (&ClassDiff<'a>, &OperationPair<'a>)> {
        self.class_diffs
            .iter()
            .flat_map(|d| d.operation_pairs.iter().map(move |p| (d, p)))
    }

    /// Removed operations of paired classes, then all operations of removed
    /// classes, each with its owning class.
    pub fn removed_operations(&self) -> Vec<(&'a Class, &'a Operation)> {
        self.class_diffs
            .iter()
            .flat_map(|d| d.removed_operations.iter().map(move |&o| (d.before, o)))
            .chain(
                self.removed_classes
                    .iter()
                    .flat_map(|&c| c.operations.iter().map(move |o| (c, o))),
            )
            .collect()
    }

    /// Added operations of paired classes, then all operations of added
    /// classes, each with its owning class.
    pub fn added_operations(&self) -> Vec<(&'a Class, &'a Operation)> {
        self.class_diffs
            .iter()
            .flat_map(|d| d.added_operations.iter().map(move |&o| (d.after, o)))
            .chain(
                self.added_classes
                    .iter()
                    .flat_map(|&c| c.operations.iter().map(move |o| (c, o))),
            )
            .collect()
    }

    /// Removed attributes of paired and removed classes.
    pub fn removed_attributes(&self) -> Vec<(&'a Class, &'a Attribute)> {
        self.class_diffs
            .iter()
            .flat_map(|d| d.removed_attributes.iter().map(move |&a| (d.before, a)))
            .chain(
                self.removed_classes
                    .iter()
                    .flat_map(|&c| c.attributes.iter().map(move |a| (c, a))),
            )
            .collect()
    }

    /// Added attributes of paired and added classes.
    pub fn added_attributes(&self) -> Vec<(&'a Class, &'a Attribute)> {
        self.class_diffs
            .iter()
            .flat_map(|d| d.added_attributes.iter().map(move |&a| (d.after, a)))
            .chain(
                self.added_classes
                    .iter()
                    .flat_map(|&c| c.attributes.iter().map(move |a| (c, a))),
            )
            .collect()
    }
}
