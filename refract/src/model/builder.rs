use super::{Class, Snapshot};
use crate::error::DiffError;
use indexmap::IndexMap;

/// Assembles a [`Snapshot`] from classes produced by a front end or by hand.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    classes: Vec<Class>,
}

impl SnapshotBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class, builder style.
    pub fn class(mut self, class: Class) -> Self {
        self.classes.push(class);
        self
    }

    /// Add a class.
    pub fn add_class(&mut self, class: Class) {
        self.classes.push(class);
    }

    pub(crate) fn push_unchecked(&mut self, class: Class) {
        self.classes.push(class);
    }

    /// Freeze the snapshot. Two classes with the same qualified name are a
    /// front-end error.
    pub fn build(self) -> Result<Snapshot, DiffError> {
        let mut by_name = IndexMap::with_capacity(self.classes.len());
        for (i, class) in self.classes.iter().enumerate() {
            if by_name.insert(class.qualified_name.clone(), i).is_some() {
                return Err(DiffError::FrontEnd {
                    message: format!("class {} is declared twice", class.qualified_name),
                });
            }
        }
        Ok(Snapshot::from_parts(self.classes, by_name))
    }

    /// Freeze a snapshot whose names are already known to be unique.
    pub(crate) fn finish(self) -> Snapshot {
        let by_name = self
            .classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.qualified_name.clone(), i))
            .collect();
        Snapshot::from_parts(self.classes, by_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn test_duplicate_class_is_rejected() {
        let err = SnapshotBuilder::new()
            .class(Class::new("A.java", "p.A"))
            .class(Class::new("A2.java", "p.A"))
            .build()
            .unwrap_err();
        assert!(matches!(err, DiffError::FrontEnd { .. }));
    }

    #[test]
    fn test_lookup_by_name() {
        let snapshot = SnapshotBuilder::new()
            .class(Class::new("A.java", "p.A"))
            .class(Class::new("B.java", "q.B"))
            .build()
            .expect("unique classes");
        assert_eq!(snapshot.class("q.B").map(|c| c.file.as_str()), Some("B.java"));
        assert!(snapshot.class("B").is_none());
    }
}
