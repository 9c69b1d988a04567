//! The code model: immutable snapshots of one program version.
//!
//! A [`Snapshot`] owns its classes, a class owns its attributes and
//! operations, an operation owns its body [`StatementTree`]. Nothing is
//! shared between snapshots; cross-version identity is established only by
//! the entity matcher.

mod builder;
mod source;

pub use builder::SnapshotBuilder;
pub use source::{BuildOutput, ModelBuilder, SourceSet, Unresolved};

use core::fmt;
use indexmap::IndexMap;
use std::sync::LazyLock;
use stemma::{SourceRange, StatementTree};

static EMPTY_BODY: LazyLock<StatementTree> = LazyLock::new(StatementTree::new);

/// Kind of type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// `class`
    Class,
    /// `interface`
    Interface,
    /// `enum`
    Enum,
    /// `record`
    Record,
    /// `@interface`
    Annotation,
}

/// Declared visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// `public`
    #[default]
    Public,
    /// `protected`
    Protected,
    /// No modifier.
    Package,
    /// `private`
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Package => "package",
            Visibility::Private => "private",
        })
    }
}

/// Arguments of an annotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnnotationArgs {
    /// `@Name`
    Marker,
    /// `@Name(value)`
    Single(String),
    /// `@Name(key = value, ...)`, in source order.
    Normal(Vec<(String, String)>),
}

/// An annotation on a class, member or parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Annotation {
    /// Simple or qualified type name, without `@`.
    pub type_name: String,
    /// Arguments.
    pub args: AnnotationArgs,
    /// Source location.
    pub range: SourceRange,
}

impl Annotation {
    /// `@name`
    pub fn marker(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            args: AnnotationArgs::Marker,
            range: SourceRange::default(),
        }
    }

    /// `@name(value)`
    pub fn single(type_name: &str, value: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            args: AnnotationArgs::Single(stemma::normalize(value)),
            range: SourceRange::default(),
        }
    }

    /// `@name(k = v, ...)`
    pub fn normal(type_name: &str, pairs: &[(&str, &str)]) -> Self {
        Self {
            type_name: type_name.to_string(),
            args: AnnotationArgs::Normal(
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), stemma::normalize(v)))
                    .collect(),
            ),
            range: SourceRange::default(),
        }
    }

    /// Set the source range.
    pub fn with_range(mut self, range: SourceRange) -> Self {
        self.range = range;
        self
    }

    /// Value of member `key`; a single-value annotation answers to `value`.
    pub fn member(&self, key: &str) -> Option<&str> {
        match &self.args {
            AnnotationArgs::Marker => None,
            AnnotationArgs::Single(v) => (key == "value").then_some(v.as_str()),
            AnnotationArgs::Normal(pairs) => pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
        }
    }

    /// Simple name, for qualified annotation types.
    pub fn simple_name(&self) -> &str {
        self.type_name.rsplit('.').next().unwrap_or(&self.type_name)
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.type_name)?;
        match &self.args {
            AnnotationArgs::Marker => Ok(()),
            AnnotationArgs::Single(v) => write!(f, "({v})"),
            AnnotationArgs::Normal(pairs) => {
                f.write_str("(")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k} = {v}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// A field.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Field name.
    pub name: String,
    /// Declared type.
    pub type_name: String,
    /// Visibility.
    pub visibility: Visibility,
    /// Other modifiers (`static`, `final`, ...).
    pub modifiers: Vec<String>,
    /// Annotations.
    pub annotations: Vec<Annotation>,
    /// Normalised initializer.
    pub initializer: Option<String>,
    /// Source location.
    pub range: SourceRange,
}

impl Attribute {
    /// A public field with no modifiers.
    pub fn new(name: &str, type_name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_name: stemma::normalize(type_name),
            visibility: Visibility::default(),
            modifiers: Vec::new(),
            annotations: Vec::new(),
            initializer: None,
            range: SourceRange::default(),
        }
    }

    /// Set the visibility.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Add an annotation.
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Set the initializer.
    pub fn with_initializer(mut self, initializer: &str) -> Self {
        self.initializer = Some(stemma::normalize(initializer));
        self
    }

    /// Set the source range.
    pub fn with_range(mut self, range: SourceRange) -> Self {
        self.range = range;
        self
    }

    /// Whether the field carries an annotation with this simple name.
    pub fn has_annotation(&self, simple_name: &str) -> bool {
        self.annotations.iter().any(|a| a.simple_name() == simple_name)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.name, self.type_name)
    }
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Declared type.
    pub type_name: String,
    /// Annotations.
    pub annotations: Vec<Annotation>,
    /// `Type... name`
    pub varargs: bool,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.type_name)?;
        if self.varargs {
            f.write_str("...")?;
        }
        Ok(())
    }
}

/// Name, parameter types and return type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Operation name.
    pub name: String,
    /// Parameter types in order.
    pub parameter_types: Vec<String>,
    /// Return type; `None` for constructors.
    pub return_type: Option<String>,
}

/// A method or constructor.
#[derive(Debug, Clone)]
pub struct Operation {
    /// Simple name.
    pub name: String,
    /// Parameters in order.
    pub parameters: Vec<Parameter>,
    /// Return type; `None` for constructors.
    pub return_type: Option<String>,
    /// Visibility.
    pub visibility: Visibility,
    /// Other modifiers.
    pub modifiers: Vec<String>,
    /// Annotations in source order.
    pub annotations: Vec<Annotation>,
    /// Declared thrown types.
    pub thrown: Vec<String>,
    /// Whether this is a constructor.
    pub constructor: bool,
    /// Statement tree of the body; `None` for abstract and interface methods.
    pub body: Option<StatementTree>,
    /// Source location of the whole declaration.
    pub range: SourceRange,
}

impl Operation {
    /// A public `void` method with no parameters and no body.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parameters: Vec::new(),
            return_type: Some("void".to_string()),
            visibility: Visibility::default(),
            modifiers: Vec::new(),
            annotations: Vec::new(),
            thrown: Vec::new(),
            constructor: false,
            body: None,
            range: SourceRange::default(),
        }
    }

    /// A public constructor.
    pub fn constructor(class_name: &str) -> Self {
        Self {
            return_type: None,
            constructor: true,
            ..Self::new(class_name)
        }
    }

    /// Append a parameter.
    pub fn with_parameter(mut self, name: &str, type_name: &str) -> Self {
        self.parameters.push(Parameter {
            name: name.to_string(),
            type_name: stemma::normalize(type_name),
            annotations: Vec::new(),
            varargs: false,
        });
        self
    }

    /// Set the return type.
    pub fn returning(mut self, type_name: &str) -> Self {
        self.return_type = Some(stemma::normalize(type_name));
        self
    }

    /// Set the visibility.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Add a modifier.
    pub fn with_modifier(mut self, modifier: &str) -> Self {
        self.modifiers.push(modifier.to_string());
        self
    }

    /// Add an annotation.
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Add a declared thrown type.
    pub fn throwing(mut self, type_name: &str) -> Self {
        self.thrown.push(type_name.to_string());
        self
    }

    /// Set the body.
    pub fn with_body(mut self, body: StatementTree) -> Self {
        self.body = Some(body);
        self
    }

    /// Set the source range.
    pub fn with_range(mut self, range: SourceRange) -> Self {
        self.range = range;
        self
    }

    /// The body, or an empty tree for bodiless operations.
    pub fn body(&self) -> &StatementTree {
        self.body.as_ref().unwrap_or(&EMPTY_BODY)
    }

    /// Whether the operation has a body.
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Name, parameter types and return type.
    pub fn signature(&self) -> Signature {
        Signature {
            name: self.name.clone(),
            parameter_types: self.parameters.iter().map(|p| p.type_name.clone()).collect(),
            return_type: self.return_type.clone(),
        }
    }

    /// The annotation with this simple name, if present.
    pub fn annotation(&self, simple_name: &str) -> Option<&Annotation> {
        self.annotations
            .iter()
            .find(|a| a.simple_name() == simple_name)
    }

    /// Whether the operation is `abstract`.
    pub fn is_abstract(&self) -> bool {
        self.modifiers.iter().any(|m| m == "abstract")
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.visibility)?;
        if self.is_abstract() {
            f.write_str("abstract ")?;
        }
        write!(f, "{}(", self.name)?;
        for (i, p) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{p}")?;
        }
        f.write_str(")")?;
        if let Some(ret) = &self.return_type {
            write!(f, " : {ret}")?;
        }
        Ok(())
    }
}

/// A type declaration.
#[derive(Debug, Clone)]
pub struct Class {
    /// Logical file identifier.
    pub file: String,
    /// Fully qualified name.
    pub qualified_name: String,
    /// Package, possibly empty.
    pub package: String,
    /// Simple name (nested classes keep their outer prefix).
    pub name: String,
    /// Kind of declaration.
    pub kind: ClassKind,
    /// Visibility.
    pub visibility: Visibility,
    /// Other modifiers.
    pub modifiers: Vec<String>,
    /// Annotations.
    pub annotations: Vec<Annotation>,
    /// Superclass name, if declared.
    pub superclass: Option<String>,
    /// Fields in declaration order.
    pub attributes: Vec<Attribute>,
    /// Methods and constructors in declaration order.
    pub operations: Vec<Operation>,
    /// Source location.
    pub range: SourceRange,
}

impl Class {
    /// A public class. The package is everything before the last `.` of
    /// `qualified_name`.
    pub fn new(file: &str, qualified_name: &str) -> Self {
        let (package, name) = match qualified_name.rsplit_once('.') {
            Some((p, n)) => (p.to_string(), n.to_string()),
            None => (String::new(), qualified_name.to_string()),
        };
        Self {
            file: file.to_string(),
            qualified_name: qualified_name.to_string(),
            package,
            name,
            kind: ClassKind::Class,
            visibility: Visibility::default(),
            modifiers: Vec::new(),
            annotations: Vec::new(),
            superclass: None,
            attributes: Vec::new(),
            operations: Vec::new(),
            range: SourceRange::default(),
        }
    }

    /// Set the declaration kind.
    pub fn with_kind(mut self, kind: ClassKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the superclass.
    pub fn extending(mut self, superclass: &str) -> Self {
        self.superclass = Some(superclass.to_string());
        self
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Add an operation.
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    /// Set the source range.
    pub fn with_range(mut self, range: SourceRange) -> Self {
        self.range = range;
        self
    }

    /// The attribute with this name, if any.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Operations with this name, in declaration order.
    pub fn operations_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Operation> {
        self.operations.iter().filter(move |o| o.name == name)
    }
}

/// All classes of one program version.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    classes: Vec<Class>,
    by_name: IndexMap<String, usize>,
}

impl Snapshot {
    /// Classes in declaration order.
    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    /// Look up a class by qualified name.
    pub fn class(&self, qualified_name: &str) -> Option<&Class> {
        self.by_name
            .get(qualified_name)
            .map(|&i| &self.classes[i])
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the snapshot has no classes.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Total number of statements across all operation bodies.
    pub fn statement_count(&self) -> usize {
        self.classes
            .iter()
            .flat_map(|c| &c.operations)
            .map(|o| o.body().len())
            .sum()
    }

    /// A copy with the given elements removed. An element is a class's
    /// qualified name, or `Class#member` for an attribute or operation.
    pub fn without(&self, elements: &[&str]) -> Snapshot {
        let mut builder = SnapshotBuilder::new();
        for class in &self.classes {
            if elements.contains(&class.qualified_name.as_str()) {
                continue;
            }
            let mut class = class.clone();
            let dropped = |member: &str| {
                elements.contains(&format!("{}#{member}", class.qualified_name).as_str())
            };
            let attributes: Vec<Attribute> = class
                .attributes
                .iter()
                .filter(|a| !dropped(&a.name))
                .cloned()
                .collect();
            let operations: Vec<Operation> = class
                .operations
                .iter()
                .filter(|o| !dropped(&o.name))
                .cloned()
                .collect();
            class.attributes = attributes;
            class.operations = operations;
            builder.push_unchecked(class);
        }
        builder.finish()
    }

    pub(crate) fn from_parts(classes: Vec<Class>, by_name: IndexMap<String, usize>) -> Self {
        Self { classes, by_name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn test_operation_display() {
        let op = Operation::new("testExampleMethod_WrongGuess");
        assert_eq!(op.to_string(), "public testExampleMethod_WrongGuess() : void");

        let op = Operation::new("setName")
            .with_parameter("name", "String")
            .with_parameter("force", "boolean")
            .with_visibility(Visibility::Private);
        assert_eq!(op.to_string(), "private setName(name String, force boolean) : void");

        let ctor = Operation::constructor("Widget").with_parameter("id", "int");
        assert_eq!(ctor.to_string(), "public Widget(id int)");
    }

    #[test]
    fn test_annotation_display_and_members() {
        let a = Annotation::normal("Test", &[("expected", "IllegalArgumentException.class")]);
        assert_eq!(a.to_string(), "@Test(expected = IllegalArgumentException.class)");
        assert_eq!(a.member("expected"), Some("IllegalArgumentException.class"));
        assert_eq!(Annotation::marker("Test").to_string(), "@Test");

        let s = Annotation::single("org.junit.Rule", "\"x\"");
        assert_eq!(s.simple_name(), "Rule");
        assert_eq!(s.member("value"), Some("\"x\""));
    }

    #[test]
    fn test_class_name_parts() {
        let c = Class::new("src/a/b/C.java", "a.b.C");
        assert_eq!(c.package, "a.b");
        assert_eq!(c.name, "C");
        let d = Class::new("D.java", "D");
        assert_eq!(d.package, "");
    }

    #[test]
    fn test_without_drops_members() {
        let snapshot = SnapshotBuilder::new()
            .class(
                Class::new("A.java", "p.A")
                    .with_attribute(Attribute::new("x", "int"))
                    .with_operation(Operation::new("run")),
            )
            .class(Class::new("B.java", "p.B"))
            .build()
            .expect("unique classes");

        let trimmed = snapshot.without(&["p.B", "p.A#x"]);
        assert_eq!(trimmed.len(), 1);
        let a = trimmed.class("p.A").expect("kept");
        assert!(a.attributes.is_empty());
        assert_eq!(a.operations.len(), 1);
    }
}
