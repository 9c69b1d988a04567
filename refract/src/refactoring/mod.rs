//! Refactoring records.
//!
//! [`Refactoring`] is a closed tagged union; each variant carries a record
//! shaped for its kind of change, and every record implements
//! [`RefactoringRecord`], the uniform view used for ordering, deduplication,
//! grouping and reporting.

mod kinds;
mod report;

pub use kinds::*;
pub use report::{LocationReport, RefactoringReport, reports_to_json};

use crate::location::{CodeElementType, CodeRange};
use crate::model::{Annotation, Attribute, Class, Operation};
use core::fmt;
use indexmap::IndexMap;
use rapidhash::RapidHashSet as HashSet;
use stemma::{SourceRange, Statement};

/// Closed enumeration of detected refactoring types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RefactoringType {
    RenameClass,
    MoveClass,
    MoveRenameClass,
    RenameAttribute,
    ChangeAttributeType,
    MoveAttribute,
    RenameMethod,
    ChangeReturnType,
    AddParameter,
    RemoveParameter,
    ChangeParameterType,
    RenameParameter,
    AddMethodAnnotation,
    RemoveMethodAnnotation,
    ModifyMethodAnnotation,
    RenameVariable,
    ReplaceExpectedWithAssertThrows,
    ReplaceTryFailWithRule,
    ExtractOperation,
    InlineOperation,
    MoveOperation,
}

impl RefactoringType {
    /// Stable upper-case tag.
    pub fn tag(self) -> &'static str {
        match self {
            RefactoringType::RenameClass => "RENAME_CLASS",
            RefactoringType::MoveClass => "MOVE_CLASS",
            RefactoringType::MoveRenameClass => "MOVE_RENAME_CLASS",
            RefactoringType::RenameAttribute => "RENAME_ATTRIBUTE",
            RefactoringType::ChangeAttributeType => "CHANGE_ATTRIBUTE_TYPE",
            RefactoringType::MoveAttribute => "MOVE_ATTRIBUTE",
            RefactoringType::RenameMethod => "RENAME_METHOD",
            RefactoringType::ChangeReturnType => "CHANGE_RETURN_TYPE",
            RefactoringType::AddParameter => "ADD_PARAMETER",
            RefactoringType::RemoveParameter => "REMOVE_PARAMETER",
            RefactoringType::ChangeParameterType => "CHANGE_PARAMETER_TYPE",
            RefactoringType::RenameParameter => "RENAME_PARAMETER",
            RefactoringType::AddMethodAnnotation => "ADD_METHOD_ANNOTATION",
            RefactoringType::RemoveMethodAnnotation => "REMOVE_METHOD_ANNOTATION",
            RefactoringType::ModifyMethodAnnotation => "MODIFY_METHOD_ANNOTATION",
            RefactoringType::RenameVariable => "RENAME_VARIABLE",
            RefactoringType::ReplaceExpectedWithAssertThrows => {
                "REPLACE_EXPECTED_WITH_ASSERT_THROWS"
            }
            RefactoringType::ReplaceTryFailWithRule => "REPLACE_TRY_FAIL_WITH_RULE",
            RefactoringType::ExtractOperation => "EXTRACT_OPERATION",
            RefactoringType::InlineOperation => "INLINE_OPERATION",
            RefactoringType::MoveOperation => "MOVE_OPERATION",
        }
    }

    /// Human-readable name that starts every description.
    pub fn display_name(self) -> &'static str {
        match self {
            RefactoringType::RenameClass => "Rename Class",
            RefactoringType::MoveClass => "Move Class",
            RefactoringType::MoveRenameClass => "Move And Rename Class",
            RefactoringType::RenameAttribute => "Rename Attribute",
            RefactoringType::ChangeAttributeType => "Change Attribute Type",
            RefactoringType::MoveAttribute => "Move Attribute",
            RefactoringType::RenameMethod => "Rename Method",
            RefactoringType::ChangeReturnType => "Change Return Type",
            RefactoringType::AddParameter => "Add Parameter",
            RefactoringType::RemoveParameter => "Remove Parameter",
            RefactoringType::ChangeParameterType => "Change Parameter Type",
            RefactoringType::RenameParameter => "Rename Parameter",
            RefactoringType::AddMethodAnnotation => "Add Method Annotation",
            RefactoringType::RemoveMethodAnnotation => "Remove Method Annotation",
            RefactoringType::ModifyMethodAnnotation => "Modify Method Annotation",
            RefactoringType::RenameVariable => "Rename Variable",
            RefactoringType::ReplaceExpectedWithAssertThrows => {
                "Replace Expect Annotation With Assert Throws"
            }
            RefactoringType::ReplaceTryFailWithRule => "Replace Try And Fail With Rule",
            RefactoringType::ExtractOperation => "Extract Method",
            RefactoringType::InlineOperation => "Inline Method",
            RefactoringType::MoveOperation => "Move Method",
        }
    }
}

impl fmt::Display for RefactoringType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A class, by file and qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassRef {
    pub file: String,
    pub qualified_name: String,
}

impl ClassRef {
    pub fn of(class: &Class) -> Self {
        Self {
            file: class.file.clone(),
            qualified_name: class.qualified_name.clone(),
        }
    }
}

/// An operation, by owning class and rendered signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationRef {
    pub class: ClassRef,
    pub name: String,
    /// `public name(p Type) : ret`
    pub signature: String,
    pub range: SourceRange,
}

impl OperationRef {
    pub fn of(class: &Class, operation: &Operation) -> Self {
        Self {
            class: ClassRef::of(class),
            name: operation.name.clone(),
            signature: operation.to_string(),
            range: operation.range,
        }
    }

    /// Declaration range with the given role.
    pub fn declaration(&self, description: &str) -> CodeRange {
        CodeRange::new(
            &self.class.file,
            self.range,
            CodeElementType::MethodDeclaration,
            description,
        )
        .with_code(self.signature.clone())
    }

    pub fn key(&self) -> MemberKey {
        MemberKey::Operation {
            class: self.class.qualified_name.clone(),
            signature: self.signature.clone(),
        }
    }
}

/// An attribute, by owning class, name and type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeRef {
    pub class: ClassRef,
    pub name: String,
    pub type_name: String,
    pub range: SourceRange,
}

impl AttributeRef {
    pub fn of(class: &Class, attribute: &Attribute) -> Self {
        Self {
            class: ClassRef::of(class),
            name: attribute.name.clone(),
            type_name: attribute.type_name.clone(),
            range: attribute.range,
        }
    }

    pub fn declaration(&self, description: &str) -> CodeRange {
        CodeRange::new(
            &self.class.file,
            self.range,
            CodeElementType::FieldDeclaration,
            description,
        )
        .with_code(self.to_string())
    }

    pub fn key(&self) -> MemberKey {
        MemberKey::Attribute {
            class: self.class.qualified_name.clone(),
            name: self.name.clone(),
        }
    }
}

impl fmt::Display for AttributeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.name, self.type_name)
    }
}

/// A rendered fragment (statement, annotation, parameter) with its location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fragment {
    pub text: String,
    pub range: SourceRange,
}

impl Fragment {
    pub fn of_statement(statement: &Statement) -> Self {
        Self {
            text: statement.text.clone(),
            range: statement.range,
        }
    }

    pub fn of_annotation(annotation: &Annotation) -> Self {
        Self {
            text: annotation.to_string(),
            range: annotation.range,
        }
    }

    pub fn at(&self, file: &str, element_type: CodeElementType, description: &str) -> CodeRange {
        CodeRange::new(file, self.range, element_type, description).with_code(self.text.clone())
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// The member a refactoring is about. Never null: every refactoring names at
/// least one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MemberKey {
    Class { qualified_name: String },
    Operation { class: String, signature: String },
    Attribute { class: String, name: String },
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKey::Class { qualified_name } => f.write_str(qualified_name),
            MemberKey::Operation { class, signature } => write!(f, "{class}#{signature}"),
            MemberKey::Attribute { class, name } => write!(f, "{class}#{name}"),
        }
    }
}

/// Uniform accessors over every refactoring record.
pub trait RefactoringRecord {
    /// Type tag.
    fn refactoring_type(&self) -> RefactoringType;

    /// Description text after the display name and tab.
    fn detail(&self) -> String;

    /// Before-side code ranges, in a fixed order.
    fn left_side(&self) -> Vec<CodeRange>;

    /// After-side code ranges, in a fixed order.
    fn right_side(&self) -> Vec<CodeRange>;

    /// Classes touched in the before snapshot.
    fn classes_before(&self) -> Vec<ClassRef>;

    /// Classes touched in the after snapshot.
    fn classes_after(&self) -> Vec<ClassRef>;

    /// Members the refactoring is filed under; never empty.
    fn members(&self) -> Vec<MemberKey>;

    /// `"<Display Name>\t<detail>"`
    fn description(&self) -> String {
        format!(
            "{}\t{}",
            self.refactoring_type().display_name(),
            self.detail()
        )
    }
}

/// A detected refactoring.
#[derive(Debug, Clone, PartialEq)]
pub enum Refactoring {
    Class(ClassChange),
    Attribute(AttributeChange),
    Operation(OperationChange),
    ReturnType(ReturnTypeChange),
    Parameter(ParameterChange),
    Annotation(AnnotationChange),
    Variable(VariableRename),
    AssertThrows(AssertThrowsMigration),
    TryFailRule(TryFailRuleMigration),
    Extract(ExtractOperation),
    Inline(InlineOperation),
}

macro_rules! dispatch {
    ($self:expr, $r:ident => $body:expr) => {
        match $self {
            Refactoring::Class($r) => $body,
            Refactoring::Attribute($r) => $body,
            Refactoring::Operation($r) => $body,
            Refactoring::ReturnType($r) => $body,
            Refactoring::Parameter($r) => $body,
            Refactoring::Annotation($r) => $body,
            Refactoring::Variable($r) => $body,
            Refactoring::AssertThrows($r) => $body,
            Refactoring::TryFailRule($r) => $body,
            Refactoring::Extract($r) => $body,
            Refactoring::Inline($r) => $body,
        }
    };
}

impl RefactoringRecord for Refactoring {
    fn refactoring_type(&self) -> RefactoringType {
        dispatch!(self, r => r.refactoring_type())
    }

    fn detail(&self) -> String {
        dispatch!(self, r => r.detail())
    }

    fn left_side(&self) -> Vec<CodeRange> {
        dispatch!(self, r => r.left_side())
    }

    fn right_side(&self) -> Vec<CodeRange> {
        dispatch!(self, r => r.right_side())
    }

    fn classes_before(&self) -> Vec<ClassRef> {
        dispatch!(self, r => r.classes_before())
    }

    fn classes_after(&self) -> Vec<ClassRef> {
        dispatch!(self, r => r.classes_after())
    }

    fn members(&self) -> Vec<MemberKey> {
        dispatch!(self, r => r.members())
    }
}

impl Refactoring {
    /// The serialisable form.
    pub fn to_report(&self) -> RefactoringReport {
        RefactoringReport::of(self)
    }
}

impl fmt::Display for Refactoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// Drop exact repeats (same type, description and ranges), keeping the first.
pub(crate) fn dedup(refactorings: Vec<Refactoring>) -> Vec<Refactoring> {
    let mut seen: HashSet<(RefactoringType, String, Vec<CodeRange>, Vec<CodeRange>)> =
        HashSet::default();
    refactorings
        .into_iter()
        .filter(|r| {
            seen.insert((
                r.refactoring_type(),
                r.description(),
                r.left_side(),
                r.right_side(),
            ))
        })
        .collect()
}

/// Group refactorings under every member they reference, in first-seen order.
pub fn group_by_member(refactorings: &[Refactoring]) -> IndexMap<MemberKey, Vec<&Refactoring>> {
    let mut groups: IndexMap<MemberKey, Vec<&Refactoring>> = IndexMap::new();
    for r in refactorings {
        for key in r.members() {
            let group = groups.entry(key).or_default();
            if !group.iter().any(|g| core::ptr::eq(*g, r)) {
                group.push(r);
            }
        }
    }
    groups
}
