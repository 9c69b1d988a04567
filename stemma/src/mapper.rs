//! Statement mapping between two method bodies.
//!
//! Runs a fixed sequence of passes over a shared [`MappingState`]:
//! 1. Identical subtrees, by Merkle hash, then exact-text leaves
//! 2. Composites, by header and the Dice coefficient of their matched
//!    descendants, pulling along trivial leaves under each new pair
//! 3. Near-identical leaves in the neighbourhood of their mapped ancestors,
//!    then a second composite sweep
//! 4. Replacement extraction for every mapped pair

use crate::replacement::{self, Replacement};
use crate::similarity;
use crate::state::{MappingState, MatchOrigin};
use crate::tree::{StatementKind, StatementTree};
use crate::{debug, trace};
use core::cmp::Ordering;
use core::hash::{Hash, Hasher};
use indextree::NodeId;
use rapidhash::{RapidHashMap as HashMap, RapidHasher};

/// Tuning for the statement mapper.
#[derive(Debug, Clone, PartialEq)]
pub struct MapperConfig {
    /// Highest normalised token distance at which two leaves may map.
    pub max_leaf_cost: f64,
    /// Minimum Dice coefficient for pairing composites without equal headers.
    pub composite_threshold: f64,
    /// Leaves with at most this many tokens are only mapped locally.
    pub trivial_leaf_tokens: usize,
    /// How many levels around a mapped ancestor the similarity pass searches.
    pub neighborhood_depth: usize,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            max_leaf_cost: 0.5,
            composite_threshold: 0.5,
            trivial_leaf_tokens: 2,
            neighborhood_depth: 1,
        }
    }
}

/// Whether a mapping pairs leaves or composites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Two leaf statements.
    Leaf,
    /// Two composite statements.
    Composite,
}

/// One mapped statement pair.
#[derive(Debug, Clone)]
pub struct MappingEntry {
    /// Statement in the before body.
    pub before: NodeId,
    /// Statement in the after body.
    pub after: NodeId,
    /// Leaf or composite pair.
    pub kind: EntryKind,
    /// Pass that produced the pair.
    pub origin: MatchOrigin,
    /// Normalised token distance, 0.0 for identical text.
    pub cost: f64,
    /// Substitutions explaining the textual difference.
    pub replacements: Vec<Replacement>,
}

/// The result of mapping two bodies.
///
/// Every non-root statement of either body appears exactly once: in an entry
/// or in one of the unmatched lists. Unmatched lists are in pre-order.
#[derive(Debug, Clone)]
pub struct BodyMapping {
    /// Mapped pairs, ordered by the before statement's pre-order position.
    pub entries: Vec<MappingEntry>,
    /// Before-side leaves with no partner.
    pub unmatched_leaves_before: Vec<NodeId>,
    /// After-side leaves with no partner.
    pub unmatched_leaves_after: Vec<NodeId>,
    /// Before-side composites with no partner.
    pub unmatched_composites_before: Vec<NodeId>,
    /// After-side composites with no partner.
    pub unmatched_composites_after: Vec<NodeId>,
    before_len: usize,
    after_len: usize,
    entry_of_before: Vec<Option<u32>>,
    entry_of_after: Vec<Option<u32>>,
}

impl BodyMapping {
    /// The entry whose before statement is `before`.
    pub fn entry_for_before(&self, before: NodeId) -> Option<&MappingEntry> {
        let idx = self.entry_of_before.get(usize::from(before)).copied()??;
        self.entries.get(idx as usize)
    }

    /// The entry whose after statement is `after`.
    pub fn entry_for_after(&self, after: NodeId) -> Option<&MappingEntry> {
        let idx = self.entry_of_after.get(usize::from(after)).copied()??;
        self.entries.get(idx as usize)
    }

    /// After-side partner of a before statement.
    pub fn mapped_after(&self, before: NodeId) -> Option<NodeId> {
        self.entry_for_before(before).map(|e| e.after)
    }

    /// Before-side partner of an after statement.
    pub fn mapped_before(&self, after: NodeId) -> Option<NodeId> {
        self.entry_for_after(after).map(|e| e.before)
    }

    /// Number of mapped pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Statements in the before body.
    pub fn before_len(&self) -> usize {
        self.before_len
    }

    /// Statements in the after body.
    pub fn after_len(&self) -> usize {
        self.after_len
    }

    /// Entries that are leaf pairs.
    pub fn leaf_entries(&self) -> impl Iterator<Item = &MappingEntry> + '_ {
        self.entries.iter().filter(|e| e.kind == EntryKind::Leaf)
    }

    /// Dice-style similarity of the two bodies, 1.0 when both are empty.
    pub fn similarity(&self) -> f64 {
        if self.before_len + self.after_len == 0 {
            return 1.0;
        }
        similarity::dice(self.entries.len(), self.before_len, self.after_len)
    }

    /// Every statement mapped with no replacements on either side.
    pub fn is_identity(&self) -> bool {
        self.entries.len() == self.before_len
            && self.entries.len() == self.after_len
            && self.entries.iter().all(|e| e.replacements.is_empty())
    }

    /// All replacements, in entry order.
    pub fn replacements(&self) -> impl Iterator<Item = (&MappingEntry, &Replacement)> + '_ {
        self.entries
            .iter()
            .flat_map(|e| e.replacements.iter().map(move |r| (e, r)))
    }

    /// Every statement is accounted for exactly once.
    pub fn check_accounting(&self) -> bool {
        self.entries.len()
            + self.unmatched_leaves_before.len()
            + self.unmatched_composites_before.len()
            == self.before_len
            && self.entries.len()
                + self.unmatched_leaves_after.len()
                + self.unmatched_composites_after.len()
                == self.after_len
    }
}

/// Per-tree facts computed once per mapping.
struct TreeIndex {
    /// Pre-order position, indexed by `usize::from(NodeId)`.
    order: Vec<u32>,
    depth: Vec<u32>,
    /// Number of strict descendants.
    size: Vec<u32>,
    hash: Vec<u64>,
}

impl TreeIndex {
    fn build(tree: &StatementTree) -> Self {
        let cap = tree.capacity();
        let mut index = Self {
            order: vec![0; cap],
            depth: vec![0; cap],
            size: vec![0; cap],
            hash: vec![0; cap],
        };
        let preorder: Vec<NodeId> = core::iter::once(tree.root).chain(tree.statements()).collect();
        for (pos, &id) in preorder.iter().enumerate() {
            index.order[usize::from(id)] = pos as u32;
            if let Some(parent) = tree.parent(id) {
                index.depth[usize::from(id)] = index.depth[usize::from(parent)] + 1;
            }
        }
        // children before parents
        for &id in preorder.iter().rev() {
            let stmt = tree.get(id);
            let mut hasher = RapidHasher::default();
            stmt.kind.tag().hash(&mut hasher);
            stmt.text.hash(&mut hasher);
            let mut size = 0;
            for child in tree.children(id) {
                index.hash[usize::from(child)].hash(&mut hasher);
                size += index.size[usize::from(child)] + 1;
            }
            index.hash[usize::from(id)] = hasher.finish();
            index.size[usize::from(id)] = size;
        }
        index
    }

    #[inline]
    fn order(&self, id: NodeId) -> u32 {
        self.order[usize::from(id)]
    }

    #[inline]
    fn depth(&self, id: NodeId) -> u32 {
        self.depth[usize::from(id)]
    }

    #[inline]
    fn size(&self, id: NodeId) -> u32 {
        self.size[usize::from(id)]
    }

    #[inline]
    fn hash(&self, id: NodeId) -> u64 {
        self.hash[usize::from(id)]
    }
}

/// A scored pairing candidate. Lower sorts first.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    after: NodeId,
    /// 0 when the parents are already mapped to each other.
    parents: u8,
    dice: f64,
    cost: f64,
    depth_diff: u32,
    distance: u32,
    order: u32,
}

fn by_locality(x: &Candidate, y: &Candidate) -> Ordering {
    x.parents
        .cmp(&y.parents)
        .then(y.dice.total_cmp(&x.dice))
        .then(x.depth_diff.cmp(&y.depth_diff))
        .then(x.distance.cmp(&y.distance))
        .then(x.order.cmp(&y.order))
}

fn by_similarity(x: &Candidate, y: &Candidate) -> Ordering {
    y.dice
        .total_cmp(&x.dice)
        .then(x.cost.total_cmp(&y.cost))
        .then(x.parents.cmp(&y.parents))
        .then(x.distance.cmp(&y.distance))
        .then(x.order.cmp(&y.order))
}

struct Mapper<'t> {
    before: &'t StatementTree,
    after: &'t StatementTree,
    bi: TreeIndex,
    ai: TreeIndex,
    config: &'t MapperConfig,
}

/// Map the statements of `before` onto those of `after`.
///
/// The result is injective, total over both bodies and deterministic for
/// identical inputs.
pub fn map_statements(
    before: &StatementTree,
    after: &StatementTree,
    config: &MapperConfig,
) -> BodyMapping {
    let mapper = Mapper {
        before,
        after,
        bi: TreeIndex::build(before),
        ai: TreeIndex::build(after),
        config,
    };

    let mut state = MappingState::with_capacity(before.capacity(), after.capacity());
    state.add(before.root, after.root, MatchOrigin::Root);

    let state = mapper.identical_subtrees(state);
    let state = mapper.exact_leaves(state);
    let state = mapper.composites(state);
    let state = mapper.similar_leaves(state);
    let state = mapper.composites(state);

    debug!(
        pairs = state.len() - 1,
        before = before.len(),
        after = after.len(),
        "statement mapping complete"
    );
    mapper.finish(state)
}

impl<'t> Mapper<'t> {
    fn candidate(&self, state: &MappingState, a: NodeId, b: NodeId) -> Candidate {
        let parents = match (self.before.parent(a), self.after.parent(b)) {
            (Some(pa), Some(pb)) if state.after_of(pa) == Some(pb) => 0,
            _ => 1,
        };
        Candidate {
            after: b,
            parents,
            dice: 0.0,
            cost: 0.0,
            depth_diff: self.bi.depth(a).abs_diff(self.ai.depth(b)),
            distance: self.bi.order(a).abs_diff(self.ai.order(b)),
            order: self.ai.order(b),
        }
    }

    /// Dice coefficient over the descendants of `a` and `b`.
    fn dice(&self, state: &MappingState, a: NodeId, b: NodeId) -> f64 {
        let common = self
            .before
            .descendants(a)
            .filter(|&d| {
                state
                    .after_of(d)
                    .is_some_and(|m| self.after.is_ancestor(b, m))
            })
            .count();
        similarity::dice(
            common,
            self.bi.size(a) as usize,
            self.ai.size(b) as usize,
        )
    }

    fn subtree_free(&self, state: &MappingState, b: NodeId) -> bool {
        !state.contains_after(b) && self.after.descendants(b).all(|d| !state.contains_after(d))
    }

    fn match_subtrees(&self, state: &mut MappingState, a: NodeId, b: NodeId) {
        state.add(a, b, MatchOrigin::Identical);
        let pairs: Vec<_> = self.before.children(a).zip(self.after.children(b)).collect();
        for (ca, cb) in pairs {
            self.match_subtrees(state, ca, cb);
        }
    }

    /// Pass 1a: identical subtrees of at least two statements.
    fn identical_subtrees(&self, mut state: MappingState) -> MappingState {
        let mut by_hash: HashMap<u64, Vec<NodeId>> = HashMap::default();
        for b in self.after.statements() {
            if self.ai.size(b) > 0 {
                by_hash.entry(self.ai.hash(b)).or_default().push(b);
            }
        }

        for a in self.before.statements() {
            if state.contains_before(a) || self.bi.size(a) == 0 {
                continue;
            }
            let Some(bucket) = by_hash.get(&self.bi.hash(a)) else {
                continue;
            };
            let tag = self.before.get(a).kind.tag();
            let best = bucket
                .iter()
                .filter(|&&b| {
                    self.after.get(b).kind.tag() == tag
                        && self.ai.size(b) == self.bi.size(a)
                        && self.subtree_free(&state, b)
                })
                .map(|&b| self.candidate(&state, a, b))
                .min_by(by_locality);
            if let Some(c) = best {
                trace!(?a, b = ?c.after, "identical subtree");
                self.match_subtrees(&mut state, a, c.after);
            }
        }
        state
    }

    /// Pass 1b: non-trivial leaves with equal text.
    fn exact_leaves(&self, mut state: MappingState) -> MappingState {
        let trivial = self.config.trivial_leaf_tokens;
        let mut by_text: HashMap<&str, Vec<NodeId>> = HashMap::default();
        for b in self.after.leaves() {
            let stmt = self.after.get(b);
            if !state.contains_after(b) && !stmt.is_trivial(trivial) {
                by_text.entry(stmt.text.as_str()).or_default().push(b);
            }
        }

        for a in self.before.leaves() {
            let stmt = self.before.get(a);
            if state.contains_before(a) || stmt.is_trivial(trivial) {
                continue;
            }
            let Some(bucket) = by_text.get(stmt.text.as_str()) else {
                continue;
            };
            let best = bucket
                .iter()
                .filter(|&&b| !state.contains_after(b) && self.after.get(b).kind == stmt.kind)
                .map(|&b| self.candidate(&state, a, b))
                .min_by(by_locality);
            if let Some(c) = best {
                trace!(?a, b = ?c.after, "exact leaf");
                state.add(a, c.after, MatchOrigin::Exact);
            }
        }
        state
    }

    /// Pass 2: composites by header and descendant overlap.
    fn composites(&self, mut state: MappingState) -> MappingState {
        self.trivial_children(&mut state, self.before.root, self.after.root);

        let before: Vec<NodeId> = self.before.composites().collect();
        let after: Vec<NodeId> = self.after.composites().collect();
        for a in before {
            if state.contains_before(a) {
                continue;
            }
            let sa = self.before.get(a);
            let tag = sa.kind.tag();
            let weak_header = sa.text.is_empty()
                || matches!(
                    sa.kind,
                    StatementKind::Block
                        | StatementKind::Try { .. }
                        | StatementKind::Finally
                        | StatementKind::Lambda { .. }
                );

            let mut exact = Vec::new();
            let mut fuzzy = Vec::new();
            for &b in &after {
                let sb = self.after.get(b);
                if state.contains_after(b) || sb.kind.tag() != tag {
                    continue;
                }
                let mut c = self.candidate(&state, a, b);
                c.dice = self.dice(&state, a, b);
                if sb.text == sa.text {
                    let both_empty = self.bi.size(a) == 0 && self.ai.size(b) == 0;
                    if !weak_header
                        || both_empty
                        || c.parents == 0
                        || c.dice >= self.config.composite_threshold
                    {
                        exact.push(c);
                    }
                } else {
                    c.cost = similarity::normalized_distance(&sa.tokens, &sb.tokens);
                    let local = c.parents == 0 && c.cost <= self.config.max_leaf_cost;
                    if (local && (c.dice > 0.0 || self.bi.size(a) == 0))
                        || c.dice >= self.config.composite_threshold
                    {
                        fuzzy.push(c);
                    }
                }
            }

            let best = exact
                .into_iter()
                .min_by(by_locality)
                .or_else(|| fuzzy.into_iter().min_by(by_similarity));
            if let Some(c) = best {
                trace!(?a, b = ?c.after, dice = c.dice, "composite");
                state.add(a, c.after, MatchOrigin::Structure);
                self.trivial_children(&mut state, a, c.after);
            }
        }
        state
    }

    /// Pair equal trivial leaves directly under two mapped composites.
    fn trivial_children(&self, state: &mut MappingState, a: NodeId, b: NodeId) {
        let trivial = self.config.trivial_leaf_tokens;
        let after: Vec<NodeId> = self
            .after
            .children(b)
            .filter(|&c| self.after.get(c).is_trivial(trivial))
            .collect();
        let before: Vec<NodeId> = self
            .before
            .children(a)
            .filter(|&c| self.before.get(c).is_trivial(trivial))
            .collect();
        for ca in before {
            if state.contains_before(ca) {
                continue;
            }
            let text = &self.before.get(ca).text;
            if let Some(&cb) = after
                .iter()
                .find(|&&cb| !state.contains_after(cb) && &self.after.get(cb).text == text)
            {
                state.add(ca, cb, MatchOrigin::Exact);
            }
        }
    }

    fn anchor_before(&self, state: &MappingState, id: NodeId) -> NodeId {
        let mut cur = id;
        while let Some(p) = self.before.parent(cur) {
            if state.contains_before(p) {
                return p;
            }
            cur = p;
        }
        self.before.root
    }

    fn anchor_after(&self, state: &MappingState, id: NodeId) -> NodeId {
        let mut cur = id;
        while let Some(p) = self.after.parent(cur) {
            if state.contains_after(p) {
                return p;
            }
            cur = p;
        }
        self.after.root
    }

    /// After-side nodes near `m`: ancestors and their composite children up
    /// to `neighborhood_depth` levels, and composites below `m` as deep.
    fn neighborhood(&self, m: NodeId) -> Vec<NodeId> {
        let tree = self.after;
        let composite_children =
            move |n: NodeId| tree.children(n).filter(move |&c| !tree.get(c).is_leaf());
        let mut out = vec![m];
        let mut up = m;
        for _ in 0..self.config.neighborhood_depth {
            let Some(p) = self.after.parent(up) else {
                break;
            };
            out.push(p);
            out.extend(composite_children(p));
            up = p;
        }
        let mut frontier = vec![m];
        for _ in 0..self.config.neighborhood_depth {
            let next: Vec<NodeId> = frontier.iter().flat_map(|&n| composite_children(n)).collect();
            out.extend(next.iter().copied());
            frontier = next;
        }
        out.sort_by_key(|&n| self.ai.order(n));
        out.dedup();
        out
    }

    /// Pass 3: near-identical leaves, best global cost first.
    fn similar_leaves(&self, mut state: MappingState) -> MappingState {
        let trivial = self.config.trivial_leaf_tokens;
        let mut by_anchor: HashMap<NodeId, Vec<NodeId>> = HashMap::default();
        for b in self.after.leaves() {
            if !state.contains_after(b) && !self.after.get(b).is_trivial(trivial) {
                by_anchor
                    .entry(self.anchor_after(&state, b))
                    .or_default()
                    .push(b);
            }
        }

        struct Scored {
            cost: f64,
            lines: u32,
            a_order: u32,
            b_order: u32,
            a: NodeId,
            b: NodeId,
        }
        let mut scored = Vec::new();
        for a in self.before.leaves() {
            let sa = self.before.get(a);
            if state.contains_before(a) || sa.is_trivial(trivial) {
                continue;
            }
            let Some(m) = state.after_of(self.anchor_before(&state, a)) else {
                continue;
            };
            for n in self.neighborhood(m) {
                for &b in by_anchor.get(&n).into_iter().flatten() {
                    let sb = self.after.get(b);
                    let ta: Vec<&str> = sa.tokens.iter().map(|t| t.text.as_str()).collect();
                    let tb: Vec<&str> = sb.tokens.iter().map(|t| t.text.as_str()).collect();
                    let cost = similarity::normalized_distance(&ta, &tb);
                    if cost <= self.config.max_leaf_cost {
                        scored.push(Scored {
                            cost,
                            lines: sa.range.start_line.abs_diff(sb.range.start_line),
                            a_order: self.bi.order(a),
                            b_order: self.ai.order(b),
                            a,
                            b,
                        });
                    }
                }
            }
        }

        scored.sort_by(|x, y| {
            x.cost
                .total_cmp(&y.cost)
                .then(x.lines.cmp(&y.lines))
                .then(x.a_order.cmp(&y.a_order))
                .then(x.b_order.cmp(&y.b_order))
        });
        for s in scored {
            if !state.contains_before(s.a) && !state.contains_after(s.b) {
                trace!(a = ?s.a, b = ?s.b, cost = s.cost, "similar leaf");
                state.add(s.a, s.b, MatchOrigin::Similar);
            }
        }
        state
    }

    /// Pass 4: entries, replacements and the unmatched lists.
    fn finish(&self, state: MappingState) -> BodyMapping {
        let mut pairs: Vec<_> = state
            .pairs()
            .filter(|&(_, _, origin)| origin != MatchOrigin::Root)
            .collect();
        pairs.sort_by_key(|&(a, _, _)| self.bi.order(a));

        let mut entry_of_before = vec![None; self.before.capacity()];
        let mut entry_of_after = vec![None; self.after.capacity()];
        let entries: Vec<MappingEntry> = pairs
            .into_iter()
            .enumerate()
            .map(|(i, (a, b, origin))| {
                let (sa, sb) = (self.before.get(a), self.after.get(b));
                entry_of_before[usize::from(a)] = Some(i as u32);
                entry_of_after[usize::from(b)] = Some(i as u32);
                let ta: Vec<&str> = sa.tokens.iter().map(|t| t.text.as_str()).collect();
                let tb: Vec<&str> = sb.tokens.iter().map(|t| t.text.as_str()).collect();
                MappingEntry {
                    before: a,
                    after: b,
                    kind: if sa.is_leaf() {
                        EntryKind::Leaf
                    } else {
                        EntryKind::Composite
                    },
                    origin,
                    cost: similarity::normalized_distance(&ta, &tb),
                    replacements: replacement::extract(&sa.tokens, &sb.tokens),
                }
            })
            .collect();

        let (unmatched_leaves_before, unmatched_composites_before): (Vec<NodeId>, Vec<NodeId>) =
            self.before
                .statements()
                .filter(|&id| !state.contains_before(id))
                .partition(|&id| self.before.get(id).is_leaf());
        let (unmatched_leaves_after, unmatched_composites_after): (Vec<NodeId>, Vec<NodeId>) =
            self.after
                .statements()
                .filter(|&id| !state.contains_after(id))
                .partition(|&id| self.after.get(id).is_leaf());

        let mapping = BodyMapping {
            entries,
            unmatched_leaves_before,
            unmatched_leaves_after,
            unmatched_composites_before,
            unmatched_composites_after,
            before_len: self.before.len(),
            after_len: self.after.len(),
            entry_of_before,
            entry_of_after,
        };
        debug_assert!(mapping.check_accounting(), "statement accounting is broken");
        mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{LeafKind, Statement};
    use facet_testhelpers::test;

    fn leaf(tree: &mut StatementTree, parent: NodeId, text: &str) -> NodeId {
        tree.add_child(parent, Statement::leaf(LeafKind::Expression, text))
    }

    fn if_stmt(tree: &mut StatementTree, parent: NodeId, cond: &str) -> NodeId {
        tree.add_child(
            parent,
            Statement::composite(StatementKind::If {
                condition: cond.into(),
            }),
        )
    }

    fn map(a: &StatementTree, b: &StatementTree) -> BodyMapping {
        map_statements(a, b, &MapperConfig::default())
    }

    #[test]
    fn test_identical_bodies() {
        let mut a = StatementTree::new();
        let i = if_stmt(&mut a, a.root, "x > 0");
        leaf(&mut a, i, "run(x);");
        leaf(&mut a, a.root, "done();");
        let b = a.clone();

        let m = map(&a, &b);
        assert_eq!(m.len(), 3);
        assert!(m.is_identity());
        assert_eq!(m.similarity(), 1.0);
        assert!(m.check_accounting());
    }

    #[test]
    fn test_empty_bodies() {
        let m = map(&StatementTree::new(), &StatementTree::new());
        assert!(m.is_empty());
        assert!(m.check_accounting());
        assert_eq!(m.similarity(), 1.0);
    }

    #[test]
    fn test_one_side_empty() {
        let mut a = StatementTree::new();
        leaf(&mut a, a.root, "run();");
        let m = map(&a, &StatementTree::new());
        assert!(m.is_empty());
        assert_eq!(m.unmatched_leaves_before.len(), 1);
        assert!(m.check_accounting());
    }

    #[test]
    fn test_renamed_variable_maps_with_replacement() {
        let mut a = StatementTree::new();
        leaf(&mut a, a.root, "count = count + step;");
        leaf(&mut a, a.root, "log(count);");
        let mut b = StatementTree::new();
        leaf(&mut b, b.root, "total = total + step;");
        leaf(&mut b, b.root, "log(total);");

        let m = map(&a, &b);
        assert_eq!(m.len(), 2);
        let e = &m.entries[1];
        assert_eq!(
            e.replacements,
            [Replacement::new(
                crate::replacement::ReplacementKind::VariableName,
                "count",
                "total"
            )]
        );
        assert!(e.cost > 0.0);
        assert!(!m.is_identity());
    }

    #[test]
    fn test_duplicate_leaves_prefer_same_parent() {
        let mut a = StatementTree::new();
        let ia = if_stmt(&mut a, a.root, "ready");
        let inner_a = leaf(&mut a, ia, "step();");
        let top_a = leaf(&mut a, a.root, "step();");

        let mut b = StatementTree::new();
        let top_b = leaf(&mut b, b.root, "step();");
        let ib = if_stmt(&mut b, b.root, "ready");
        let inner_b = leaf(&mut b, ib, "step();");

        let m = map(&a, &b);
        assert_eq!(m.mapped_after(inner_a), Some(inner_b));
        assert_eq!(m.mapped_after(top_a), Some(top_b));
    }

    #[test]
    fn test_statement_moved_into_lambda() {
        let mut a = StatementTree::new();
        let call_a = leaf(&mut a, a.root, "service.process(0);");

        let mut b = StatementTree::new();
        let holder = leaf(
            &mut b,
            b.root,
            "Assert.assertThrows(IllegalStateException.class, () -> { service.process(0); });",
        );
        let lambda = b.add_child(
            holder,
            Statement::composite(StatementKind::Lambda { parameters: vec![] }),
        );
        let call_b = leaf(&mut b, lambda, "service.process(0);");

        let m = map(&a, &b);
        assert_eq!(m.mapped_after(call_a), Some(call_b));
        assert_eq!(m.unmatched_leaves_after, [holder]);
        assert_eq!(m.unmatched_composites_after, [lambda]);
        assert!(m.check_accounting());
    }

    #[test]
    fn test_trivial_leaves_only_map_locally() {
        let mut a = StatementTree::new();
        let wa = a.add_child(
            a.root,
            Statement::composite(StatementKind::While {
                condition: "it.hasNext()".into(),
            }),
        );
        leaf(&mut a, wa, "consume(it.next());");
        let brk_a = a.add_child(wa, Statement::leaf(LeafKind::Break, "break;"));

        let mut b = StatementTree::new();
        let wb = b.add_child(
            b.root,
            Statement::composite(StatementKind::While {
                condition: "it.hasNext()".into(),
            }),
        );
        leaf(&mut b, wb, "consume(it.next(), true);");
        let brk_b = b.add_child(wb, Statement::leaf(LeafKind::Break, "break;"));
        let stray = b.add_child(b.root, Statement::leaf(LeafKind::Break, "break;"));

        let m = map(&a, &b);
        assert_eq!(m.mapped_after(wa), Some(wb));
        assert_eq!(m.mapped_after(brk_a), Some(brk_b));
        assert!(m.unmatched_leaves_after.contains(&stray));
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let mut a = StatementTree::new();
        for i in 0..5 {
            let c = if_stmt(&mut a, a.root, &format!("i == {i}"));
            leaf(&mut a, c, &format!("handle({i});"));
            leaf(&mut a, c, "flush();");
        }
        let mut b = StatementTree::new();
        for i in (0..5).rev() {
            let c = if_stmt(&mut b, b.root, &format!("i == {i}"));
            leaf(&mut b, c, &format!("handle({i}, ctx);"));
            leaf(&mut b, c, "flush();");
        }

        let first = map(&a, &b);
        let second = map(&a, &b);
        let pairs = |m: &BodyMapping| {
            m.entries
                .iter()
                .map(|e| (e.before, e.after))
                .collect::<Vec<_>>()
        };
        assert_eq!(pairs(&first), pairs(&second));
        assert!(first.check_accounting());
        assert_eq!(first.len(), 15);
    }

    /// `record` sits at the root before and two guards deep after.
    fn guarded_move() -> (StatementTree, StatementTree, NodeId, NodeId) {
        let mut a = StatementTree::new();
        let record_a = leaf(&mut a, a.root, "audit.record(user, action);");
        let enabled_a = if_stmt(&mut a, a.root, "enabled");
        let verbose_a = if_stmt(&mut a, enabled_a, "verbose");
        leaf(&mut a, verbose_a, "logger.flush();");

        let mut b = StatementTree::new();
        let enabled_b = if_stmt(&mut b, b.root, "enabled");
        let verbose_b = if_stmt(&mut b, enabled_b, "verbose");
        leaf(&mut b, verbose_b, "logger.flush();");
        let record_b = leaf(&mut b, verbose_b, "audit.record(user, action, now);");
        (a, b, record_a, record_b)
    }

    #[test]
    fn test_similar_leaves_stay_within_the_neighborhood() {
        let (a, b, record_a, record_b) = guarded_move();
        let m = map(&a, &b);
        assert_eq!(m.len(), 3);
        assert_eq!(m.mapped_after(record_a), None);
        assert!(m.unmatched_leaves_after.contains(&record_b));
        assert!(m.check_accounting());
    }

    #[test]
    fn test_deeper_neighborhood_reaches_nested_leaves() {
        let (a, b, record_a, record_b) = guarded_move();
        let config = MapperConfig {
            neighborhood_depth: 2,
            ..MapperConfig::default()
        };
        let m = map_statements(&a, &b, &config);
        assert_eq!(m.len(), 4);
        assert_eq!(m.mapped_after(record_a), Some(record_b));
        assert_eq!(m.entries[0].origin, MatchOrigin::Similar);
    }

    #[test]
    fn test_empty_composites_match_on_header() {
        let mut a = StatementTree::new();
        let ia = if_stmt(&mut a, a.root, "a > 0");
        let block_a = a.add_child(ia, Statement::composite(StatementKind::Block));

        let mut b = StatementTree::new();
        let ib = if_stmt(&mut b, b.root, "count > limit");
        let block_b = b.add_child(ib, Statement::composite(StatementKind::Block));

        let m = map(&a, &b);
        assert_eq!(m.mapped_after(block_a), Some(block_b));
        assert!(m.check_accounting());
    }
}
