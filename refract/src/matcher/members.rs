//! Attribute and operation pairing within one class pair.

use super::classes::ClassCandidate;
use crate::config::DiffConfig;
use crate::deadline::Deadline;
use crate::diff::{AttributeEvidence, AttributePair, ClassDiff, OperationPair};
use crate::error::DiffError;
use crate::model::{Attribute, Operation};
use crate::{debug, trace};
use stemma::{BodyMapping, MapperConfig, ReplacementKind, map_statements};

/// Pair the members of one committed class pair and map every paired body.
pub(crate) fn diff_members<'a>(
    candidate: &ClassCandidate<'a>,
    config: &DiffConfig,
    mapper: &MapperConfig,
    deadline: &Deadline,
) -> Result<ClassDiff<'a>, DiffError> {
    let before = candidate.before;
    let after = candidate.after;

    // exact signatures
    let mut after_used = vec![false; after.operations.len()];
    let mut paired: Vec<(usize, usize, bool, Option<BodyMapping>)> = Vec::new();
    let mut before_left = Vec::new();
    for (i, op) in before.operations.iter().enumerate() {
        let signature = op.signature();
        match (0..after.operations.len())
            .find(|&j| !after_used[j] && after.operations[j].signature() == signature)
        {
            Some(j) => {
                after_used[j] = true;
                paired.push((i, j, true, None));
            }
            None => before_left.push(i),
        }
    }

    // body-similarity fallback
    let after_left: Vec<usize> = (0..after.operations.len()).filter(|&j| !after_used[j]).collect();
    let mut scored: Vec<(f64, usize, usize, Option<BodyMapping>)> = Vec::new();
    for &i in &before_left {
        for &j in &after_left {
            deadline.check()?;
            let (b, a) = (&before.operations[i], &after.operations[j]);
            if let Some((score, mapping)) = operation_score(b, a, config, mapper)
                && score >= config.operation_threshold
            {
                trace!(before = %b, after = %a, score, "operation candidate");
                scored.push((score, i, j, mapping));
            }
        }
    }
    scored.sort_by(|x, y| y.0.total_cmp(&x.0).then(x.1.cmp(&y.1)).then(x.2.cmp(&y.2)));
    let mut before_taken = vec![false; before.operations.len()];
    for (_, i, j, mapping) in scored {
        if before_taken[i] || after_used[j] {
            continue;
        }
        before_taken[i] = true;
        after_used[j] = true;
        debug!(
            class = %before.qualified_name,
            before = %before.operations[i],
            after = %after.operations[j],
            "operation paired by body"
        );
        paired.push((i, j, false, mapping));
    }
    paired.sort_by_key(|p| p.0);

    let mut operation_pairs = Vec::with_capacity(paired.len());
    for (i, j, exact_signature, mapping) in paired {
        let (b, a) = (&before.operations[i], &after.operations[j]);
        let mapping = match mapping {
            Some(m) => m,
            None => {
                deadline.check()?;
                let m = map_statements(b.body(), a.body(), mapper);
                deadline.check()?;
                m
            }
        };
        operation_pairs.push(OperationPair {
            before: b,
            after: a,
            exact_signature,
            mapping,
        });
    }

    let removed_operations = before
        .operations
        .iter()
        .enumerate()
        .filter(|&(i, _)| before_left.contains(&i) && !before_taken[i])
        .map(|(_, o)| o)
        .collect();
    let added_operations = after
        .operations
        .iter()
        .enumerate()
        .filter(|&(j, _)| !after_used[j])
        .map(|(_, o)| o)
        .collect();

    let (attribute_pairs, removed_attributes, added_attributes) =
        pair_attributes(candidate, &operation_pairs);

    Ok(ClassDiff {
        before,
        after,
        kind: candidate.kind,
        score: candidate.score,
        operation_pairs,
        attribute_pairs,
        added_operations,
        removed_operations,
        added_attributes,
        removed_attributes,
    })
}

/// Score two operations whose signatures differ. Bodiless operations are
/// compared by name and parameter count only; a body never pairs with a
/// missing body. Two empty bodies carry no evidence, so they pair only on a
/// shared name or shared annotations.
fn operation_score(
    before: &Operation,
    after: &Operation,
    config: &DiffConfig,
    mapper: &MapperConfig,
) -> Option<(f64, Option<BodyMapping>)> {
    if before.constructor != after.constructor {
        return None;
    }
    let same_name = before.name == after.name;
    match (before.has_body(), after.has_body()) {
        (true, true) => {
            let mapping = map_statements(before.body(), after.body(), mapper);
            if mapping.is_empty() {
                let both_empty = before.body().is_empty() && after.body().is_empty();
                let same_annotations = !before.annotations.is_empty()
                    && before.annotations.len() == after.annotations.len()
                    && before
                        .annotations
                        .iter()
                        .zip(&after.annotations)
                        .all(|(b, a)| b.type_name == a.type_name && b.args == a.args);
                if !both_empty || !(same_name || same_annotations) {
                    return None;
                }
            }
            let bonus = if same_name { config.same_name_bonus } else { 0.0 };
            Some((mapping.similarity() + bonus, Some(mapping)))
        }
        (false, false) if same_name => {
            let score = if before.parameters.len() == after.parameters.len() {
                1.0
            } else {
                0.75
            };
            Some((score, None))
        }
        _ => None,
    }
}

type AttributeSplit<'a> = (Vec<AttributePair<'a>>, Vec<&'a Attribute>, Vec<&'a Attribute>);

/// Pair attributes by name and type, then by name, then by consistent
/// renames observed in the mapped operation bodies.
fn pair_attributes<'a>(
    candidate: &ClassCandidate<'a>,
    operation_pairs: &[OperationPair<'a>],
) -> AttributeSplit<'a> {
    let before = &candidate.before.attributes;
    let after = &candidate.after.attributes;
    let mut before_used = vec![false; before.len()];
    let mut after_used = vec![false; after.len()];
    let mut pairs: Vec<(usize, AttributePair<'a>)> = Vec::new();

    for (i, b) in before.iter().enumerate() {
        if let Some(j) = (0..after.len()).find(|&j| {
            !after_used[j] && after[j].name == b.name && after[j].type_name == b.type_name
        }) {
            before_used[i] = true;
            after_used[j] = true;
            pairs.push((
                i,
                AttributePair {
                    before: b,
                    after: &after[j],
                    evidence: AttributeEvidence::Exact,
                },
            ));
        }
    }
    for (i, b) in before.iter().enumerate() {
        if before_used[i] {
            continue;
        }
        if let Some(j) = (0..after.len()).find(|&j| !after_used[j] && after[j].name == b.name) {
            before_used[i] = true;
            after_used[j] = true;
            pairs.push((
                i,
                AttributePair {
                    before: b,
                    after: &after[j],
                    evidence: AttributeEvidence::TypeChanged,
                },
            ));
        }
    }

    // (occurrences, before index, after index)
    let mut usage: Vec<(usize, usize, usize)> = Vec::new();
    for (i, b) in before.iter().enumerate() {
        if before_used[i] {
            continue;
        }
        for (j, a) in after.iter().enumerate() {
            if after_used[j] || a.type_name != b.type_name {
                continue;
            }
            let count = operation_pairs
                .iter()
                .flat_map(|p| p.mapping.replacements())
                .filter(|(_, r)| {
                    r.kind == ReplacementKind::VariableName
                        && r.before == b.name
                        && r.after == a.name
                })
                .count();
            if count > 0 {
                usage.push((count, i, j));
            }
        }
    }
    usage.sort_by(|x, y| y.0.cmp(&x.0).then(x.1.cmp(&y.1)).then(x.2.cmp(&y.2)));
    for (_, i, j) in usage {
        if before_used[i] || after_used[j] {
            continue;
        }
        before_used[i] = true;
        after_used[j] = true;
        pairs.push((
            i,
            AttributePair {
                before: &before[i],
                after: &after[j],
                evidence: AttributeEvidence::Usage,
            },
        ));
    }

    pairs.sort_by_key(|(i, _)| *i);
    let removed = before
        .iter()
        .enumerate()
        .filter(|&(i, _)| !before_used[i])
        .map(|(_, a)| a)
        .collect();
    let added = after
        .iter()
        .enumerate()
        .filter(|&(j, _)| !after_used[j])
        .map(|(_, a)| a)
        .collect();
    (pairs.into_iter().map(|(_, p)| p).collect(), removed, added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::ClassMatchKind;
    use crate::model::{Annotation, Class};
    use facet_testhelpers::test;
    use stemma::{LeafKind, Statement, StatementTree};

    fn body(lines: &[&str]) -> StatementTree {
        let mut tree = StatementTree::new();
        for line in lines {
            tree.add_child(tree.root, Statement::leaf(LeafKind::Expression, line));
        }
        tree
    }

    fn diff<'a>(before: &'a Class, after: &'a Class) -> ClassDiff<'a> {
        let candidate = ClassCandidate {
            before,
            after,
            kind: ClassMatchKind::Same,
            score: 1.0,
            before_index: 0,
        };
        let config = DiffConfig::default();
        diff_members(&candidate, &config, &config.mapper(), &Deadline::unlimited()).unwrap()
    }

    #[test]
    fn test_renamed_operation_is_paired_by_body() {
        let steps = ["open();", "write(buffer);", "close();"];
        let before = Class::new("A.java", "p.A")
            .with_operation(Operation::new("save").with_body(body(&steps)));
        let after = Class::new("A.java", "p.A")
            .with_operation(Operation::new("persist").with_body(body(&steps)));

        let d = diff(&before, &after);
        assert_eq!(d.operation_pairs.len(), 1);
        assert!(!d.operation_pairs[0].exact_signature);
        assert!(d.added_operations.is_empty() && d.removed_operations.is_empty());
    }

    #[test]
    fn test_overloads_pair_by_signature() {
        let before = Class::new("A.java", "p.A")
            .with_operation(
                Operation::new("put")
                    .with_parameter("k", "String")
                    .with_body(body(&["a();"])),
            )
            .with_operation(
                Operation::new("put")
                    .with_parameter("k", "int")
                    .with_body(body(&["b();"])),
            );
        let after = before.clone();

        let d = diff(&before, &after);
        assert_eq!(d.operation_pairs.len(), 2);
        assert!(
            d.operation_pairs
                .iter()
                .all(|p| p.exact_signature && p.mapping.is_identity())
        );
    }

    #[test]
    fn test_unrelated_bodies_stay_unpaired() {
        let before = Class::new("A.java", "p.A")
            .with_operation(Operation::new("alpha").with_body(body(&["compute(x, y);"])));
        let after = Class::new("A.java", "p.A")
            .with_operation(Operation::new("beta").with_body(body(&["render(page);"])));

        let d = diff(&before, &after);
        assert!(d.operation_pairs.is_empty());
        assert_eq!(d.added_operations.len(), 1);
        assert_eq!(d.removed_operations.len(), 1);
    }

    #[test]
    fn test_attribute_renamed_by_usage() {
        let before = Class::new("A.java", "p.A")
            .with_attribute(Attribute::new("count", "int"))
            .with_operation(
                Operation::new("inc").with_body(body(&["this.count = this.count + 1;"])),
            );
        let after = Class::new("A.java", "p.A")
            .with_attribute(Attribute::new("total", "int"))
            .with_operation(
                Operation::new("inc").with_body(body(&["this.total = this.total + 1;"])),
            );

        let d = diff(&before, &after);
        assert_eq!(d.attribute_pairs.len(), 1);
        assert_eq!(d.attribute_pairs[0].evidence, AttributeEvidence::Usage);
    }

    #[test]
    fn test_attribute_type_change() {
        let before = Class::new("A.java", "p.A").with_attribute(Attribute::new("id", "int"));
        let after = Class::new("A.java", "p.A").with_attribute(Attribute::new("id", "long"));
        let d = diff(&before, &after);
        assert_eq!(d.attribute_pairs[0].evidence, AttributeEvidence::TypeChanged);
    }

    #[test]
    fn test_empty_bodies_with_different_names_stay_unpaired() {
        let before = Class::new("A.java", "p.A")
            .with_operation(Operation::new("onStart").with_body(StatementTree::new()));
        let after = Class::new("A.java", "p.A")
            .with_operation(Operation::new("onStop").with_body(StatementTree::new()));

        let d = diff(&before, &after);
        assert!(d.operation_pairs.is_empty());
        assert_eq!(d.removed_operations[0].name, "onStart");
        assert_eq!(d.added_operations[0].name, "onStop");
    }

    #[test]
    fn test_empty_bodies_pair_on_shared_annotations() {
        let before = Class::new("A.java", "p.A").with_operation(
            Operation::new("setUp")
                .with_annotation(Annotation::marker("Before"))
                .with_body(StatementTree::new()),
        );
        let after = Class::new("A.java", "p.A").with_operation(
            Operation::new("init")
                .with_annotation(Annotation::marker("Before"))
                .with_body(StatementTree::new()),
        );

        let d = diff(&before, &after);
        assert_eq!(d.operation_pairs.len(), 1);
        assert!(d.added_operations.is_empty() && d.removed_operations.is_empty());
    }
}
