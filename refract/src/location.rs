//! Source-located code ranges attached to refactorings.

use stemma::SourceRange;

/// The syntactic element a [`CodeRange`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CodeElementType {
    /// A type declaration.
    TypeDeclaration,
    /// A field declaration.
    FieldDeclaration,
    /// A method or constructor declaration.
    MethodDeclaration,
    /// A method parameter.
    SingleVariableDeclaration,
    /// A local variable declaration.
    VariableDeclarationStatement,
    /// An annotation.
    Annotation,
    /// A method invocation.
    MethodInvocation,
    /// A lambda expression.
    LambdaExpression,
    /// A `try` statement.
    TryStatement,
    /// A `catch` clause.
    CatchClause,
    /// A type reference.
    Type,
    /// Any other statement.
    Statement,
}

impl CodeElementType {
    /// Upper-case name used in reports.
    pub fn name(self) -> &'static str {
        match self {
            CodeElementType::TypeDeclaration => "TYPE_DECLARATION",
            CodeElementType::FieldDeclaration => "FIELD_DECLARATION",
            CodeElementType::MethodDeclaration => "METHOD_DECLARATION",
            CodeElementType::SingleVariableDeclaration => "SINGLE_VARIABLE_DECLARATION",
            CodeElementType::VariableDeclarationStatement => "VARIABLE_DECLARATION_STATEMENT",
            CodeElementType::Annotation => "ANNOTATION",
            CodeElementType::MethodInvocation => "METHOD_INVOCATION",
            CodeElementType::LambdaExpression => "LAMBDA_EXPRESSION",
            CodeElementType::TryStatement => "TRY_STATEMENT",
            CodeElementType::CatchClause => "CATCH_CLAUSE",
            CodeElementType::Type => "TYPE",
            CodeElementType::Statement => "STATEMENT",
        }
    }
}

/// One side of a refactoring: where, what kind of element, and its role.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CodeRange {
    /// Logical file identifier.
    pub file: String,
    /// Position within the file.
    pub range: SourceRange,
    /// Role of the element in the refactoring.
    pub description: String,
    /// Element kind.
    pub element_type: CodeElementType,
    /// The element's text, when it is short enough to be useful.
    pub code_element: Option<String>,
}

impl CodeRange {
    /// Create a range without element text.
    pub fn new(
        file: &str,
        range: SourceRange,
        element_type: CodeElementType,
        description: &str,
    ) -> Self {
        Self {
            file: file.to_string(),
            range,
            description: description.to_string(),
            element_type,
            code_element: None,
        }
    }

    /// Attach the element text.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code_element = Some(code.into());
        self
    }
}
