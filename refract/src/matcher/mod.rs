//! The entity matcher: pairs classes, then attributes and operations within
//! each class pair, and maps every paired operation body.

mod classes;
mod members;

use crate::config::DiffConfig;
use crate::deadline::Deadline;
use crate::diff::{ClassDiff, ModelDiff};
use crate::error::DiffError;
use crate::model::Snapshot;
use crate::debug;
use rayon::prelude::*;

/// Match two snapshots. Class pairs are independent, so their member
/// matching fans out over rayon when `config.parallel` is set; the result
/// keeps before declaration order either way.
pub fn match_snapshots<'a>(
    before: &'a Snapshot,
    after: &'a Snapshot,
    config: &DiffConfig,
    deadline: &Deadline,
) -> Result<ModelDiff<'a>, DiffError> {
    let mapper = config.mapper();
    let pairing = classes::pair_classes(before, after, config, &mapper, deadline)?;
    deadline.check()?;

    let class_diffs: Vec<ClassDiff<'a>> = if config.parallel {
        pairing
            .pairs
            .par_iter()
            .map(|candidate| members::diff_members(candidate, config, &mapper, deadline))
            .collect::<Result<_, _>>()?
    } else {
        pairing
            .pairs
            .iter()
            .map(|candidate| members::diff_members(candidate, config, &mapper, deadline))
            .collect::<Result<_, _>>()?
    };
    deadline.check()?;

    debug!(
        pairs = class_diffs.len(),
        added = pairing.added.len(),
        removed = pairing.removed.len(),
        "entity matching complete"
    );
    Ok(ModelDiff {
        before,
        after,
        class_diffs,
        added_classes: pairing.added,
        removed_classes: pairing.removed,
        refactorings: Vec::new(),
    })
}
