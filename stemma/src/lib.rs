//! # Stemma
//!
//! Statement-level mapping between two versions of a method body.
//!
//! A body is a [`StatementTree`]: composite statements (`if`, loops, `try`,
//! lambdas with block bodies, ...) holding leaf statements, all stored in an
//! arena and addressed by [`NodeId`](indextree::NodeId). [`map_statements`]
//! pairs the statements of two trees and explains each textual difference
//! with a list of [`Replacement`]s.
//!
//! ## Passes
//!
//! 1. **Identical**: subtrees with equal Merkle hashes, then leaves with
//!    equal normalised text
//! 2. **Structure**: composites by header and Dice coefficient of their
//!    already-mapped descendants
//! 3. **Similarity**: leaves within a bounded edit distance, searched only
//!    near their nearest mapped ancestor
//! 4. **Replacements**: token alignment of every mapped pair
//!
//! ```
//! use stemma::{LeafKind, MapperConfig, Statement, StatementTree, map_statements};
//!
//! let mut before = StatementTree::new();
//! before.add_child(before.root, Statement::leaf(LeafKind::Expression, "log(count);"));
//! let mut after = StatementTree::new();
//! after.add_child(after.root, Statement::leaf(LeafKind::Expression, "log(total);"));
//!
//! let mapping = map_statements(&before, &after, &MapperConfig::default());
//! assert_eq!(mapping.len(), 1);
//! assert_eq!(mapping.entries[0].replacements[0].after, "total");
//! ```

#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]

pub use indextree;

mod tracing_macros;
pub(crate) use tracing_macros::{debug, trace};

/// Statement mapping passes
pub mod mapper;
/// Replacement extraction
pub mod replacement;
/// Edit distances
pub mod similarity;
/// Mapping bookkeeping
pub mod state;
/// Tokenizer and normaliser
pub mod token;
/// Statement trees
pub mod tree;

pub use mapper::{BodyMapping, EntryKind, MapperConfig, MappingEntry, map_statements};
pub use replacement::{Replacement, ReplacementKind};
pub use state::{MappingState, MatchOrigin};
pub use token::{Token, TokenKind, normalize};
pub use tree::{
    Invocation, InvocationKind, LeafKind, SourceRange, Statement, StatementKind, StatementTree,
    VariableDeclaration,
};
