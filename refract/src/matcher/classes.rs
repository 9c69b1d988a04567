//! Class pairing across snapshots.

use crate::config::DiffConfig;
use crate::deadline::Deadline;
use crate::diff::ClassMatchKind;
use crate::error::DiffError;
use crate::model::{Class, Snapshot};
use crate::{debug, trace};
use rapidhash::RapidHashSet as HashSet;
use stemma::{MapperConfig, map_statements, similarity};

/// A committed class pair before member matching.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ClassCandidate<'a> {
    pub before: &'a Class,
    pub after: &'a Class,
    pub kind: ClassMatchKind,
    pub score: f64,
    pub before_index: usize,
}

/// Committed pairs in before declaration order, plus the leftovers.
#[derive(Debug)]
pub(crate) struct ClassPairing<'a> {
    pub pairs: Vec<ClassCandidate<'a>>,
    pub added: Vec<&'a Class>,
    pub removed: Vec<&'a Class>,
}

/// Pair classes by qualified name, then greedily by similarity score.
pub(crate) fn pair_classes<'a>(
    before: &'a Snapshot,
    after: &'a Snapshot,
    config: &DiffConfig,
    mapper: &MapperConfig,
    deadline: &Deadline,
) -> Result<ClassPairing<'a>, DiffError> {
    let mut pairs = Vec::new();
    let mut after_used = vec![false; after.len()];
    let mut before_left = Vec::new();

    for (i, class) in before.classes().iter().enumerate() {
        match after
            .classes()
            .iter()
            .position(|c| c.qualified_name == class.qualified_name)
        {
            Some(j) => {
                after_used[j] = true;
                pairs.push(ClassCandidate {
                    before: class,
                    after: &after.classes()[j],
                    kind: ClassMatchKind::Same,
                    score: 1.0,
                    before_index: i,
                });
            }
            None => before_left.push(i),
        }
    }
    let after_left: Vec<usize> = (0..after.len()).filter(|&j| !after_used[j]).collect();

    // (score, before index, after index)
    let mut scored: Vec<(f64, usize, usize)> = Vec::new();
    for &i in &before_left {
        for &j in &after_left {
            deadline.check()?;
            let (b, a) = (&before.classes()[i], &after.classes()[j]);
            let score = class_score(b, a, config, mapper);
            trace!(before = %b.qualified_name, after = %a.qualified_name, score, "class candidate");
            if score >= config.class_threshold {
                scored.push((score, i, j));
            }
        }
    }
    scored.sort_by(|x, y| y.0.total_cmp(&x.0).then(x.1.cmp(&y.1)).then(x.2.cmp(&y.2)));

    let mut before_taken = vec![false; before.len()];
    for (score, i, j) in scored {
        if before_taken[i] || after_used[j] {
            continue;
        }
        before_taken[i] = true;
        after_used[j] = true;
        let (b, a) = (&before.classes()[i], &after.classes()[j]);
        let kind = classify(b, a);
        debug!(before = %b.qualified_name, after = %a.qualified_name, ?kind, score, "class paired");
        pairs.push(ClassCandidate {
            before: b,
            after: a,
            kind,
            score,
            before_index: i,
        });
    }
    pairs.sort_by_key(|p| p.before_index);

    Ok(ClassPairing {
        pairs,
        added: after_left
            .iter()
            .filter(|&&j| !after_used[j])
            .map(|&j| &after.classes()[j])
            .collect(),
        removed: before_left
            .iter()
            .filter(|&&i| !before_taken[i])
            .map(|&i| &before.classes()[i])
            .collect(),
    })
}

fn classify(before: &Class, after: &Class) -> ClassMatchKind {
    if before.package == after.package {
        ClassMatchKind::Rename
    } else if before.name == after.name {
        ClassMatchKind::Move
    } else {
        ClassMatchKind::MoveRename
    }
}

/// Weighted combination of shared member names, highly similar bodies and
/// package similarity, normalised by the total weight.
pub(crate) fn class_score(
    before: &Class,
    after: &Class,
    config: &DiffConfig,
    mapper: &MapperConfig,
) -> f64 {
    let member = member_overlap(before, after);

    let op_total = before.operations.len().max(after.operations.len());
    let body = if op_total == 0 {
        0.0
    } else {
        let similar = before
            .operations
            .iter()
            .filter(|op| op.has_body())
            .filter(|op| {
                let signature = op.signature();
                after
                    .operations
                    .iter()
                    .find(|o| o.has_body() && o.signature() == signature)
                    .is_some_and(|o| {
                        map_statements(op.body(), o.body(), mapper).similarity()
                            >= config.similar_body_threshold
                    })
            })
            .count();
        similar as f64 / op_total as f64
    };

    let package = 1.0 - similarity::string_distance(&before.package, &after.package);

    let weights =
        config.class_member_weight + config.class_body_weight + config.class_package_weight;
    (config.class_member_weight * member
        + config.class_body_weight * body
        + config.class_package_weight * package)
        / weights
}

fn member_overlap(before: &Class, after: &Class) -> f64 {
    let names = |c: &Class| -> Vec<String> {
        c.attributes
            .iter()
            .map(|a| format!("a:{}", a.name))
            .chain(c.operations.iter().filter(|o| !o.constructor).map(|o| {
                format!("o:{}({})", o.name, o.signature().parameter_types.join(","))
            }))
            .collect()
    };
    let b = names(before);
    let a = names(after);
    let total = b.len().max(a.len());
    if total == 0 {
        return 0.0;
    }
    let after_set: HashSet<&str> = a.iter().map(String::as_str).collect();
    let shared = b.iter().filter(|n| after_set.contains(n.as_str())).count();
    shared as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attribute, Operation, SnapshotBuilder};
    use facet_testhelpers::test;
    use stemma::{LeafKind, Statement, StatementTree};

    fn body(lines: &[&str]) -> StatementTree {
        let mut tree = StatementTree::new();
        for line in lines {
            tree.add_child(tree.root, Statement::leaf(LeafKind::Expression, line));
        }
        tree
    }

    fn service(qualified_name: &str) -> Class {
        Class::new("Service.java", qualified_name)
            .with_attribute(Attribute::new("cache", "Map<String,Object>"))
            .with_operation(
                Operation::new("load")
                    .with_parameter("key", "String")
                    .with_body(body(&["cache.get(key);", "audit(key);"])),
            )
            .with_operation(Operation::new("clear").with_body(body(&["cache.clear();"])))
    }

    #[test]
    fn test_moved_class_is_paired() {
        let before = SnapshotBuilder::new()
            .class(service("com.acme.Service"))
            .build()
            .unwrap();
        let after = SnapshotBuilder::new()
            .class(service("com.acme.core.Service"))
            .build()
            .unwrap();

        let pairing = pair_classes(
            &before,
            &after,
            &DiffConfig::default(),
            &MapperConfig::default(),
            &Deadline::unlimited(),
        )
        .unwrap();
        assert_eq!(pairing.pairs.len(), 1);
        assert_eq!(pairing.pairs[0].kind, ClassMatchKind::Move);
        assert!(pairing.added.is_empty() && pairing.removed.is_empty());
    }

    #[test]
    fn test_unrelated_classes_stay_unpaired() {
        let before = SnapshotBuilder::new()
            .class(service("com.acme.Service"))
            .build()
            .unwrap();
        let after = SnapshotBuilder::new()
            .class(
                Class::new("Report.java", "org.other.Report")
                    .with_operation(Operation::new("render").with_body(body(&["out.flush();"]))),
            )
            .build()
            .unwrap();

        let pairing = pair_classes(
            &before,
            &after,
            &DiffConfig::default(),
            &MapperConfig::default(),
            &Deadline::unlimited(),
        )
        .unwrap();
        assert!(pairing.pairs.is_empty());
        assert_eq!(pairing.added.len(), 1);
        assert_eq!(pairing.removed.len(), 1);
    }

    #[test]
    fn test_renamed_class_scores_high() {
        let b = service("com.acme.Service");
        let a = service("com.acme.CacheService");
        let score = class_score(&b, &a, &DiffConfig::default(), &MapperConfig::default());
        assert!(score > 0.9, "score was {score}");
        assert_eq!(classify(&b, &a), ClassMatchKind::Rename);
    }
}
