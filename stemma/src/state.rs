//! Bookkeeping for an in-progress statement mapping.

use indextree::NodeId;

/// Which pass produced a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchOrigin {
    /// Root blocks, always paired.
    Root,
    /// Identical subtree.
    Identical,
    /// Same normalised text.
    Exact,
    /// Composite paired by header and matched descendants.
    Structure,
    /// Near-identical leaf.
    Similar,
}

/// A bidirectional, injective mapping between two statement trees.
///
/// Lookups are O(1) vectors indexed by `NodeId`. The state is threaded by
/// value through the mapper passes and consumed when the mapping is built.
#[derive(Debug)]
pub struct MappingState {
    before_to_after: Vec<Option<NodeId>>,
    after_to_before: Vec<Option<NodeId>>,
    pairs: Vec<(NodeId, NodeId, MatchOrigin)>,
}

impl MappingState {
    /// Create an empty state sized for the two trees.
    pub fn with_capacity(max_before: usize, max_after: usize) -> Self {
        Self {
            before_to_after: vec![None; max_before],
            after_to_before: vec![None; max_after],
            pairs: Vec::new(),
        }
    }

    /// Record that `before` maps to `after`.
    ///
    /// # Panics
    ///
    /// Panics if either statement is already mapped.
    pub fn add(&mut self, before: NodeId, after: NodeId, origin: MatchOrigin) {
        assert!(
            !self.contains_before(before),
            "statement {before:?} is already mapped to {:?}",
            self.after_of(before)
        );
        assert!(
            !self.contains_after(after),
            "statement {after:?} is already mapped from {:?}",
            self.before_of(after)
        );

        let b = usize::from(before);
        let a = usize::from(after);
        if b >= self.before_to_after.len() {
            self.before_to_after.resize(b + 1, None);
        }
        if a >= self.after_to_before.len() {
            self.after_to_before.resize(a + 1, None);
        }
        self.before_to_after[b] = Some(after);
        self.after_to_before[a] = Some(before);
        self.pairs.push((before, after, origin));
    }

    /// Whether a before-side statement is mapped.
    #[inline(always)]
    pub fn contains_before(&self, before: NodeId) -> bool {
        self.after_of(before).is_some()
    }

    /// Whether an after-side statement is mapped.
    #[inline(always)]
    pub fn contains_after(&self, after: NodeId) -> bool {
        self.before_of(after).is_some()
    }

    /// The after-side partner of a before-side statement.
    #[inline(always)]
    pub fn after_of(&self, before: NodeId) -> Option<NodeId> {
        self.before_to_after
            .get(usize::from(before))
            .copied()
            .flatten()
    }

    /// The before-side partner of an after-side statement.
    #[inline(always)]
    pub fn before_of(&self, after: NodeId) -> Option<NodeId> {
        self.after_to_before
            .get(usize::from(after))
            .copied()
            .flatten()
    }

    /// All pairs in the order they were added.
    pub fn pairs(&self) -> impl Iterator<Item = (NodeId, NodeId, MatchOrigin)> + '_ {
        self.pairs.iter().copied()
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether nothing is mapped yet.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;
    use indextree::Arena;

    fn ids(n: usize) -> Vec<NodeId> {
        let mut arena = Arena::new();
        (0..n).map(|i| arena.new_node(i)).collect()
    }

    #[test]
    fn test_lookups_are_bidirectional() {
        let a = ids(3);
        let b = ids(3);
        let mut state = MappingState::with_capacity(0, 0);
        state.add(a[0], b[2], MatchOrigin::Exact);
        assert_eq!(state.after_of(a[0]), Some(b[2]));
        assert_eq!(state.before_of(b[2]), Some(a[0]));
        assert!(!state.contains_before(a[1]));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_double_mapping_panics() {
        let a = ids(2);
        let b = ids(2);
        let mut state = MappingState::with_capacity(4, 4);
        state.add(a[0], b[0], MatchOrigin::Exact);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            state.add(a[1], b[0], MatchOrigin::Exact);
        }));
        assert!(result.is_err(), "mapping an after statement twice must panic");
    }
}
