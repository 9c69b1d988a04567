//! Refactoring detection between two versions of a code model.
//!
//! refract provides:
//! - **Code model**: snapshots of classes, attributes and operations, with
//!   operation bodies as [`stemma`] statement trees
//! - **Entity matching**: classes, attributes and operations paired across
//!   versions, renamed and moved ones included
//! - **Detection**: typed, located refactoring records built from the entity
//!   diff and the statement mappings of every paired operation
//! - **Reports**: a serialisable form of each record
//!
//! # Example
//!
//! ```rust
//! use refract::{
//!     Class, DiffConfig, Operation, RefactoringRecord, RefactoringType, SnapshotBuilder,
//! };
//! use stemma::{LeafKind, Statement, StatementTree};
//!
//! let mut body = StatementTree::new();
//! body.add_child(body.root, Statement::leaf(LeafKind::Expression, "connection.open();"));
//! body.add_child(body.root, Statement::leaf(LeafKind::Expression, "connection.send(payload);"));
//!
//! let before = SnapshotBuilder::new()
//!     .class(Class::new("Client.java", "net.Client").with_operation(
//!         Operation::new("push").with_body(body.clone()),
//!     ))
//!     .build()?;
//! let after = SnapshotBuilder::new()
//!     .class(Class::new("Client.java", "net.Client").with_operation(
//!         Operation::new("publish").with_body(body),
//!     ))
//!     .build()?;
//!
//! let diff = before.diff(&after, &DiffConfig::default())?;
//! let found = diff.refactorings();
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].refactoring_type(), RefactoringType::RenameMethod);
//! assert_eq!(
//!     found[0].description(),
//!     "Rename Method\tpublic push() : void renamed to public publish() : void in class net.Client"
//! );
//! # Ok::<(), refract::DiffError>(())
//! ```

mod tracing_macros;
pub(crate) use tracing_macros::{debug, trace, warn};

pub mod config;
mod deadline;
mod detect;
pub mod diff;
mod engine;
pub mod error;
pub mod location;
mod matcher;
pub mod model;
pub mod refactoring;

pub use config::{DiffConfig, InputOptions};
pub use deadline::Deadline;
pub use diff::{
    AttributeEvidence, AttributePair, ClassDiff, ClassMatchKind, ModelDiff, OperationPair,
};
pub use engine::diff_sources;
pub use error::DiffError;
pub use location::{CodeElementType, CodeRange};
pub use matcher::match_snapshots;
pub use model::{
    Annotation, AnnotationArgs, Attribute, BuildOutput, Class, ClassKind, ModelBuilder,
    Operation, Parameter, Signature, Snapshot, SnapshotBuilder, SourceSet, Unresolved, Visibility,
};
pub use refactoring::{
    MemberKey, Refactoring, RefactoringRecord, RefactoringReport, RefactoringType,
    group_by_member, reports_to_json,
};
