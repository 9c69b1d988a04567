//! One record shape per kind of change.

use super::{
    AttributeRef, ClassRef, Fragment, MemberKey, OperationRef, RefactoringRecord, RefactoringType,
};
use crate::location::{CodeElementType, CodeRange};
use stemma::SourceRange;

/// Rename, move, or move-and-rename of a class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassChange {
    pub ty: RefactoringType,
    pub before: ClassRef,
    pub after: ClassRef,
    pub before_range: SourceRange,
    pub after_range: SourceRange,
}

impl RefactoringRecord for ClassChange {
    fn refactoring_type(&self) -> RefactoringType {
        self.ty
    }

    fn detail(&self) -> String {
        let verb = match self.ty {
            RefactoringType::MoveClass => "moved to",
            RefactoringType::MoveRenameClass => "moved and renamed to",
            _ => "renamed to",
        };
        format!(
            "{} {verb} {}",
            self.before.qualified_name, self.after.qualified_name
        )
    }

    fn left_side(&self) -> Vec<CodeRange> {
        vec![
            CodeRange::new(
                &self.before.file,
                self.before_range,
                CodeElementType::TypeDeclaration,
                "original type declaration",
            )
            .with_code(self.before.qualified_name.clone()),
        ]
    }

    fn right_side(&self) -> Vec<CodeRange> {
        let role = match self.ty {
            RefactoringType::MoveClass => "moved type declaration",
            RefactoringType::MoveRenameClass => "moved and renamed type declaration",
            _ => "renamed type declaration",
        };
        vec![
            CodeRange::new(
                &self.after.file,
                self.after_range,
                CodeElementType::TypeDeclaration,
                role,
            )
            .with_code(self.after.qualified_name.clone()),
        ]
    }

    fn classes_before(&self) -> Vec<ClassRef> {
        vec![self.before.clone()]
    }

    fn classes_after(&self) -> Vec<ClassRef> {
        vec![self.after.clone()]
    }

    fn members(&self) -> Vec<MemberKey> {
        vec![MemberKey::Class {
            qualified_name: self.before.qualified_name.clone(),
        }]
    }
}

/// Rename, type change, or move of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeChange {
    pub ty: RefactoringType,
    pub before: AttributeRef,
    pub after: AttributeRef,
}

impl RefactoringRecord for AttributeChange {
    fn refactoring_type(&self) -> RefactoringType {
        self.ty
    }

    fn detail(&self) -> String {
        match self.ty {
            RefactoringType::MoveAttribute => format!(
                "{} from class {} to {} from class {}",
                self.before,
                self.before.class.qualified_name,
                self.after,
                self.after.class.qualified_name
            ),
            _ => format!(
                "{} to {} in class {}",
                self.before, self.after, self.after.class.qualified_name
            ),
        }
    }

    fn left_side(&self) -> Vec<CodeRange> {
        let role = match self.ty {
            RefactoringType::ChangeAttributeType => {
                "original attribute declaration before type change"
            }
            _ => "original attribute declaration",
        };
        vec![self.before.declaration(role)]
    }

    fn right_side(&self) -> Vec<CodeRange> {
        let role = match self.ty {
            RefactoringType::RenameAttribute => "renamed attribute declaration",
            RefactoringType::MoveAttribute => "moved attribute declaration",
            _ => "changed-type attribute declaration",
        };
        vec![self.after.declaration(role)]
    }

    fn classes_before(&self) -> Vec<ClassRef> {
        vec![self.before.class.clone()]
    }

    fn classes_after(&self) -> Vec<ClassRef> {
        vec![self.after.class.clone()]
    }

    fn members(&self) -> Vec<MemberKey> {
        vec![self.before.key(), self.after.key()]
    }
}

/// Rename or move of an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationChange {
    pub ty: RefactoringType,
    pub before: OperationRef,
    pub after: OperationRef,
}

impl RefactoringRecord for OperationChange {
    fn refactoring_type(&self) -> RefactoringType {
        self.ty
    }

    fn detail(&self) -> String {
        match self.ty {
            RefactoringType::MoveOperation => format!(
                "{} from class {} to {} from class {}",
                self.before.signature,
                self.before.class.qualified_name,
                self.after.signature,
                self.after.class.qualified_name
            ),
            _ => format!(
                "{} renamed to {} in class {}",
                self.before.signature, self.after.signature, self.after.class.qualified_name
            ),
        }
    }

    fn left_side(&self) -> Vec<CodeRange> {
        vec![self.before.declaration("original method declaration")]
    }

    fn right_side(&self) -> Vec<CodeRange> {
        let role = match self.ty {
            RefactoringType::MoveOperation => "moved method declaration",
            _ => "renamed method declaration",
        };
        vec![self.after.declaration(role)]
    }

    fn classes_before(&self) -> Vec<ClassRef> {
        vec![self.before.class.clone()]
    }

    fn classes_after(&self) -> Vec<ClassRef> {
        vec![self.after.class.clone()]
    }

    fn members(&self) -> Vec<MemberKey> {
        vec![self.before.key(), self.after.key()]
    }
}

/// A changed return type.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnTypeChange {
    pub before_type: String,
    pub after_type: String,
    pub before: OperationRef,
    pub after: OperationRef,
}

impl RefactoringRecord for ReturnTypeChange {
    fn refactoring_type(&self) -> RefactoringType {
        RefactoringType::ChangeReturnType
    }

    fn detail(&self) -> String {
        format!(
            "{} to {} in method {} from class {}",
            self.before_type,
            self.after_type,
            self.after.signature,
            self.after.class.qualified_name
        )
    }

    fn left_side(&self) -> Vec<CodeRange> {
        vec![
            CodeRange::new(
                &self.before.class.file,
                self.before.range,
                CodeElementType::Type,
                "original return type",
            )
            .with_code(self.before_type.clone()),
            self.before.declaration("original method declaration"),
        ]
    }

    fn right_side(&self) -> Vec<CodeRange> {
        vec![
            CodeRange::new(
                &self.after.class.file,
                self.after.range,
                CodeElementType::Type,
                "changed return type",
            )
            .with_code(self.after_type.clone()),
            self.after.declaration("method declaration with changed return type"),
        ]
    }

    fn classes_before(&self) -> Vec<ClassRef> {
        vec![self.before.class.clone()]
    }

    fn classes_after(&self) -> Vec<ClassRef> {
        vec![self.after.class.clone()]
    }

    fn members(&self) -> Vec<MemberKey> {
        vec![self.before.key(), self.after.key()]
    }
}

/// Added, removed, retyped or renamed parameter. Parameters render as
/// `name Type`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterChange {
    pub ty: RefactoringType,
    pub before_parameter: Option<String>,
    pub after_parameter: Option<String>,
    pub before: OperationRef,
    pub after: OperationRef,
}

impl RefactoringRecord for ParameterChange {
    fn refactoring_type(&self) -> RefactoringType {
        self.ty
    }

    fn detail(&self) -> String {
        match (&self.before_parameter, &self.after_parameter) {
            (Some(b), Some(a)) => format!(
                "{b} to {a} in method {} from class {}",
                self.after.signature, self.after.class.qualified_name
            ),
            (None, Some(a)) => format!(
                "{a} in method {} from class {}",
                self.after.signature, self.after.class.qualified_name
            ),
            (Some(b), None) => format!(
                "{b} in method {} from class {}",
                self.before.signature, self.before.class.qualified_name
            ),
            (None, None) => format!(
                "in method {} from class {}",
                self.after.signature, self.after.class.qualified_name
            ),
        }
    }

    fn left_side(&self) -> Vec<CodeRange> {
        let mut ranges = Vec::new();
        if let Some(b) = &self.before_parameter {
            ranges.push(
                CodeRange::new(
                    &self.before.class.file,
                    self.before.range,
                    CodeElementType::SingleVariableDeclaration,
                    match self.ty {
                        RefactoringType::RemoveParameter => "removed parameter",
                        _ => "original parameter",
                    },
                )
                .with_code(b.clone()),
            );
        }
        ranges.push(self.before.declaration("original method declaration"));
        ranges
    }

    fn right_side(&self) -> Vec<CodeRange> {
        let mut ranges = Vec::new();
        if let Some(a) = &self.after_parameter {
            ranges.push(
                CodeRange::new(
                    &self.after.class.file,
                    self.after.range,
                    CodeElementType::SingleVariableDeclaration,
                    match self.ty {
                        RefactoringType::AddParameter => "added parameter",
                        RefactoringType::RenameParameter => "renamed parameter",
                        _ => "changed-type parameter",
                    },
                )
                .with_code(a.clone()),
            );
        }
        ranges.push(self.after.declaration("method declaration with changed parameters"));
        ranges
    }

    fn classes_before(&self) -> Vec<ClassRef> {
        vec![self.before.class.clone()]
    }

    fn classes_after(&self) -> Vec<ClassRef> {
        vec![self.after.class.clone()]
    }

    fn members(&self) -> Vec<MemberKey> {
        vec![self.before.key(), self.after.key()]
    }
}

/// Added, removed or modified method annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationChange {
    pub ty: RefactoringType,
    pub before_annotation: Option<Fragment>,
    pub after_annotation: Option<Fragment>,
    pub before: OperationRef,
    pub after: OperationRef,
}

impl RefactoringRecord for AnnotationChange {
    fn refactoring_type(&self) -> RefactoringType {
        self.ty
    }

    fn detail(&self) -> String {
        match (&self.before_annotation, &self.after_annotation) {
            (Some(b), Some(a)) => format!(
                "{b} to {a} in method {} from class {}",
                self.after.signature, self.after.class.qualified_name
            ),
            (None, Some(a)) => format!(
                "{a} in method {} from class {}",
                self.after.signature, self.after.class.qualified_name
            ),
            (Some(b), None) => format!(
                "{b} in method {} from class {}",
                self.before.signature, self.before.class.qualified_name
            ),
            (None, None) => format!(
                "in method {} from class {}",
                self.after.signature, self.after.class.qualified_name
            ),
        }
    }

    fn left_side(&self) -> Vec<CodeRange> {
        let mut ranges = Vec::new();
        if let Some(b) = &self.before_annotation {
            let role = match self.ty {
                RefactoringType::RemoveMethodAnnotation => "removed annotation",
                _ => "original annotation",
            };
            ranges.push(b.at(&self.before.class.file, CodeElementType::Annotation, role));
        }
        ranges.push(self.before.declaration("original method declaration"));
        ranges
    }

    fn right_side(&self) -> Vec<CodeRange> {
        let mut ranges = Vec::new();
        if let Some(a) = &self.after_annotation {
            let role = match self.ty {
                RefactoringType::AddMethodAnnotation => "added annotation",
                _ => "modified annotation",
            };
            ranges.push(a.at(&self.after.class.file, CodeElementType::Annotation, role));
        }
        let role = match self.ty {
            RefactoringType::AddMethodAnnotation => "method declaration with added annotation",
            RefactoringType::RemoveMethodAnnotation => "method declaration with removed annotation",
            _ => "method declaration with modified annotation",
        };
        ranges.push(self.after.declaration(role));
        ranges
    }

    fn classes_before(&self) -> Vec<ClassRef> {
        vec![self.before.class.clone()]
    }

    fn classes_after(&self) -> Vec<ClassRef> {
        vec![self.after.class.clone()]
    }

    fn members(&self) -> Vec<MemberKey> {
        vec![self.before.key(), self.after.key()]
    }
}

/// A renamed local variable. Variables render as `name : Type`.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableRename {
    pub before_variable: Fragment,
    pub after_variable: Fragment,
    pub before: OperationRef,
    pub after: OperationRef,
}

impl RefactoringRecord for VariableRename {
    fn refactoring_type(&self) -> RefactoringType {
        RefactoringType::RenameVariable
    }

    fn detail(&self) -> String {
        format!(
            "{} to {} in method {} from class {}",
            self.before_variable,
            self.after_variable,
            self.after.signature,
            self.after.class.qualified_name
        )
    }

    fn left_side(&self) -> Vec<CodeRange> {
        vec![
            self.before_variable.at(
                &self.before.class.file,
                CodeElementType::VariableDeclarationStatement,
                "original variable declaration",
            ),
            self.before.declaration("original method declaration"),
        ]
    }

    fn right_side(&self) -> Vec<CodeRange> {
        vec![
            self.after_variable.at(
                &self.after.class.file,
                CodeElementType::VariableDeclarationStatement,
                "renamed variable declaration",
            ),
            self.after.declaration("method declaration with renamed variable"),
        ]
    }

    fn classes_before(&self) -> Vec<ClassRef> {
        vec![self.before.class.clone()]
    }

    fn classes_after(&self) -> Vec<ClassRef> {
        vec![self.after.class.clone()]
    }

    fn members(&self) -> Vec<MemberKey> {
        vec![self.before.key(), self.after.key()]
    }
}

/// `@Test(expected = X.class)` replaced by an `assertThrows(X.class, () -> ..)`
/// call wrapping the old body.
#[derive(Debug, Clone, PartialEq)]
pub struct AssertThrowsMigration {
    /// `X.class`
    pub exception: String,
    pub before: OperationRef,
    pub after: OperationRef,
    pub before_annotations: Vec<Fragment>,
    pub after_annotations: Vec<Fragment>,
    pub assert_throws: Fragment,
    pub lambda: Fragment,
}

impl RefactoringRecord for AssertThrowsMigration {
    fn refactoring_type(&self) -> RefactoringType {
        RefactoringType::ReplaceExpectedWithAssertThrows
    }

    fn detail(&self) -> String {
        format!(
            "{} from method {} in class {}",
            self.exception, self.before.signature, self.before.class.qualified_name
        )
    }

    fn left_side(&self) -> Vec<CodeRange> {
        let file = &self.before.class.file;
        let mut ranges = vec![
            self.before
                .declaration("source method declaration before migration"),
        ];
        ranges.extend(self.before_annotations.iter().map(|a| {
            a.at(
                file,
                CodeElementType::Annotation,
                "source method's annotations before migration",
            )
        }));
        ranges
    }

    fn right_side(&self) -> Vec<CodeRange> {
        let file = &self.after.class.file;
        let mut ranges = vec![self.after.declaration("method declaration after migration")];
        ranges.extend(self.after_annotations.iter().map(|a| {
            a.at(
                file,
                CodeElementType::Annotation,
                "method's annotations after migration",
            )
        }));
        ranges.push(self.assert_throws.at(
            file,
            CodeElementType::MethodInvocation,
            "added Assert.assertThrows call",
        ));
        ranges.push(self.lambda.at(
            file,
            CodeElementType::LambdaExpression,
            "extracted lambda from method's body",
        ));
        ranges
    }

    fn classes_before(&self) -> Vec<ClassRef> {
        vec![self.before.class.clone()]
    }

    fn classes_after(&self) -> Vec<ClassRef> {
        vec![self.after.class.clone()]
    }

    fn members(&self) -> Vec<MemberKey> {
        vec![self.before.key(), self.after.key()]
    }
}

/// `try { ..; fail(..); } catch (X e) {}` replaced by an `ExpectedException`
/// rule field and an `expect(X.class)` call.
#[derive(Debug, Clone, PartialEq)]
pub struct TryFailRuleMigration {
    /// `X.class`
    pub exception: String,
    pub before: OperationRef,
    pub after: OperationRef,
    pub try_statement: Fragment,
    pub catch_clause: Fragment,
    pub fail_invocation: Fragment,
    pub rule_field: AttributeRef,
    pub expect_invocation: Fragment,
}

impl RefactoringRecord for TryFailRuleMigration {
    fn refactoring_type(&self) -> RefactoringType {
        RefactoringType::ReplaceTryFailWithRule
    }

    fn detail(&self) -> String {
        format!(
            "{} from method {} in class {}",
            self.exception, self.before.signature, self.before.class.qualified_name
        )
    }

    fn left_side(&self) -> Vec<CodeRange> {
        let file = &self.before.class.file;
        vec![
            self.before
                .declaration("source method declaration before migration"),
            self.try_statement.at(
                file,
                CodeElementType::TryStatement,
                "source method's try-statement",
            ),
            self.catch_clause.at(
                file,
                CodeElementType::CatchClause,
                "source method's catch clause capturing the expected exception",
            ),
            self.fail_invocation.at(
                file,
                CodeElementType::MethodInvocation,
                "source method's assertFail invocation from the try-statement before migration",
            ),
        ]
    }

    fn right_side(&self) -> Vec<CodeRange> {
        vec![
            self.after.declaration("method declaration after migration"),
            self.rule_field
                .declaration("ExpectedException field annotated with @Rule"),
            self.expect_invocation.at(
                &self.after.class.file,
                CodeElementType::Statement,
                "method's statement invoking ExpectedException's expect method",
            ),
        ]
    }

    fn classes_before(&self) -> Vec<ClassRef> {
        vec![self.before.class.clone()]
    }

    fn classes_after(&self) -> Vec<ClassRef> {
        vec![self.after.class.clone()]
    }

    fn members(&self) -> Vec<MemberKey> {
        vec![self.before.key(), self.after.key(), self.rule_field.key()]
    }
}

/// Statements of an existing operation moved into a new operation that it
/// now calls.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOperation {
    pub extracted: OperationRef,
    pub source_before: OperationRef,
    pub source_after: OperationRef,
    pub extracted_statements: Vec<Fragment>,
    pub invocation: Fragment,
}

impl RefactoringRecord for ExtractOperation {
    fn refactoring_type(&self) -> RefactoringType {
        RefactoringType::ExtractOperation
    }

    fn detail(&self) -> String {
        format!(
            "{} extracted from {} in class {}",
            self.extracted.signature,
            self.source_before.signature,
            self.source_after.class.qualified_name
        )
    }

    fn left_side(&self) -> Vec<CodeRange> {
        let file = &self.source_before.class.file;
        let mut ranges = vec![
            self.source_before
                .declaration("source method declaration before extraction"),
        ];
        ranges.extend(self.extracted_statements.iter().map(|s| {
            s.at(
                file,
                CodeElementType::Statement,
                "extracted code from source method declaration",
            )
        }));
        ranges
    }

    fn right_side(&self) -> Vec<CodeRange> {
        vec![
            self.extracted.declaration("extracted method declaration"),
            self.source_after
                .declaration("source method declaration after extraction"),
            self.invocation.at(
                &self.source_after.class.file,
                CodeElementType::MethodInvocation,
                "extracted method invocation",
            ),
        ]
    }

    fn classes_before(&self) -> Vec<ClassRef> {
        vec![self.source_before.class.clone()]
    }

    fn classes_after(&self) -> Vec<ClassRef> {
        let mut classes = vec![self.source_after.class.clone()];
        if self.extracted.class != self.source_after.class {
            classes.push(self.extracted.class.clone());
        }
        classes
    }

    fn members(&self) -> Vec<MemberKey> {
        vec![
            self.source_before.key(),
            self.source_after.key(),
            self.extracted.key(),
        ]
    }
}

/// A removed operation whose statements now live in its former caller.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineOperation {
    pub inlined: OperationRef,
    pub target_before: OperationRef,
    pub target_after: OperationRef,
    pub inlined_statements: Vec<Fragment>,
    pub invocation: Fragment,
}

impl RefactoringRecord for InlineOperation {
    fn refactoring_type(&self) -> RefactoringType {
        RefactoringType::InlineOperation
    }

    fn detail(&self) -> String {
        format!(
            "{} inlined to {} in class {}",
            self.inlined.signature,
            self.target_after.signature,
            self.target_after.class.qualified_name
        )
    }

    fn left_side(&self) -> Vec<CodeRange> {
        vec![
            self.inlined.declaration("inlined method declaration"),
            self.target_before
                .declaration("target method declaration before inline"),
            self.invocation.at(
                &self.target_before.class.file,
                CodeElementType::MethodInvocation,
                "inlined method invocation",
            ),
        ]
    }

    fn right_side(&self) -> Vec<CodeRange> {
        let file = &self.target_after.class.file;
        let mut ranges = vec![
            self.target_after
                .declaration("target method declaration after inline"),
        ];
        ranges.extend(self.inlined_statements.iter().map(|s| {
            s.at(
                file,
                CodeElementType::Statement,
                "inlined code in target method declaration",
            )
        }));
        ranges
    }

    fn classes_before(&self) -> Vec<ClassRef> {
        let mut classes = vec![self.target_before.class.clone()];
        if self.inlined.class != self.target_before.class {
            classes.push(self.inlined.class.clone());
        }
        classes
    }

    fn classes_after(&self) -> Vec<ClassRef> {
        vec![self.target_after.class.clone()]
    }

    fn members(&self) -> Vec<MemberKey> {
        vec![
            self.target_before.key(),
            self.target_after.key(),
            self.inlined.key(),
        ]
    }
}
