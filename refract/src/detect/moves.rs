//! Members that left one class and reappeared, unchanged, in another.

use crate::config::DiffConfig;
use crate::deadline::Deadline;
use crate::diff::ModelDiff;
use crate::error::DiffError;
use crate::model::Class;
use crate::refactoring::{
    AttributeChange, AttributeRef, OperationChange, OperationRef, Refactoring, RefactoringType,
};
use stemma::{MapperConfig, map_statements};

fn paired(model: &ModelDiff<'_>, before: &Class, after: &Class) -> bool {
    model.class_diffs.iter().any(|d| {
        d.before.qualified_name == before.qualified_name
            && d.after.qualified_name == after.qualified_name
    })
}

/// Removed and added operations with the same signature in different
/// classes, committed greedily by body similarity.
pub(crate) fn move_operations(
    model: &ModelDiff<'_>,
    config: &DiffConfig,
    mapper: &MapperConfig,
    deadline: &Deadline,
) -> Result<Vec<Refactoring>, DiffError> {
    let removed = model.removed_operations();
    let added = model.added_operations();

    // (score, removed index, added index)
    let mut scored: Vec<(f64, usize, usize)> = Vec::new();
    for (i, &(from, op)) in removed.iter().enumerate() {
        for (j, &(to, candidate)) in added.iter().enumerate() {
            if from.qualified_name == to.qualified_name
                || paired(model, from, to)
                || op.constructor
                || candidate.constructor
                || op.signature() != candidate.signature()
            {
                continue;
            }
            let score = match (op.has_body(), candidate.has_body()) {
                (true, true) => {
                    deadline.check()?;
                    let mapping = map_statements(op.body(), candidate.body(), mapper);
                    deadline.check()?;
                    mapping.similarity()
                }
                (false, false) => 1.0,
                _ => continue,
            };
            if score >= config.similar_body_threshold {
                scored.push((score, i, j));
            }
        }
    }
    scored.sort_by(|x, y| y.0.total_cmp(&x.0).then(x.1.cmp(&y.1)).then(x.2.cmp(&y.2)));

    let mut removed_used = vec![false; removed.len()];
    let mut added_used = vec![false; added.len()];
    let mut commits = Vec::new();
    for (_, i, j) in scored {
        if removed_used[i] || added_used[j] {
            continue;
        }
        removed_used[i] = true;
        added_used[j] = true;
        commits.push((i, j));
    }
    commits.sort_unstable();

    Ok(commits
        .into_iter()
        .map(|(i, j)| {
            let (from, op) = removed[i];
            let (to, moved) = added[j];
            Refactoring::Operation(OperationChange {
                ty: RefactoringType::MoveOperation,
                before: OperationRef::of(from, op),
                after: OperationRef::of(to, moved),
            })
        })
        .collect())
}

/// Removed and added attributes with the same name and type in different
/// classes, first come first served.
pub(crate) fn move_attributes(model: &ModelDiff<'_>) -> Vec<Refactoring> {
    let added = model.added_attributes();
    let mut added_used = vec![false; added.len()];
    let mut out = Vec::new();
    for (from, attribute) in model.removed_attributes() {
        let Some(j) = (0..added.len()).find(|&j| {
            let (to, candidate) = added[j];
            !added_used[j]
                && from.qualified_name != to.qualified_name
                && !paired(model, from, to)
                && candidate.name == attribute.name
                && candidate.type_name == attribute.type_name
        }) else {
            continue;
        };
        added_used[j] = true;
        let (to, candidate) = added[j];
        out.push(Refactoring::Attribute(AttributeChange {
            ty: RefactoringType::MoveAttribute,
            before: AttributeRef::of(from, attribute),
            after: AttributeRef::of(to, candidate),
        }));
    }
    out
}
