//! The seam to the language front end that turns source text into a model.

use super::Snapshot;
use crate::config::InputOptions;
use crate::error::DiffError;
use indexmap::IndexMap;

/// Named source texts of one program version, in a stable order.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    files: IndexMap<String, String>,
}

impl SourceSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file, builder style.
    pub fn file(mut self, name: &str, text: &str) -> Self {
        self.insert(name, text);
        self
    }

    /// Add or replace a file.
    pub fn insert(&mut self, name: &str, text: &str) {
        self.files.insert(name.to_string(), text.to_string());
    }

    /// Files in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the set has no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// An element the front end could not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    /// File the element was referenced from.
    pub file: String,
    /// Qualified class name, or `Class#member`.
    pub element: String,
}

/// What a front end produces for one [`SourceSet`].
#[derive(Debug, Default)]
pub struct BuildOutput {
    /// The model, possibly containing best-effort placeholders for
    /// unresolved elements.
    pub snapshot: Snapshot,
    /// Elements whose types could not be resolved.
    pub unresolved: Vec<Unresolved>,
}

/// A language front end.
pub trait ModelBuilder: Sync {
    /// Parse and resolve `sources` into a snapshot.
    fn build(&self, sources: &SourceSet, options: &InputOptions) -> Result<BuildOutput, DiffError>;
}
