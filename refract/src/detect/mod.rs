//! Refactoring detectors.
//!
//! Detectors are pure functions over the entity diff and the statement
//! mappings it carries. Operation detectors run in a fixed order on each
//! operation pair and see the records already produced for that pair.

mod annotations;
mod assert_throws;
mod extract_inline;
mod moves;
mod signature;
mod try_fail_rule;
mod variables;

use crate::config::DiffConfig;
use crate::deadline::Deadline;
use crate::diff::{ClassDiff, ClassMatchKind, ModelDiff, OperationPair};
use crate::error::DiffError;
use crate::refactoring::{
    AttributeChange, AttributeRef, ClassChange, ClassRef, OperationRef, Refactoring,
    RefactoringRecord, RefactoringType,
};
use crate::{debug, trace};
use stemma::{MapperConfig, StatementTree};

/// One operation pair and the class pair that owns it.
pub(crate) struct OperationContext<'d, 'a> {
    pub diff: &'d ClassDiff<'a>,
    pub pair: &'d OperationPair<'a>,
    pub before: OperationRef,
    pub after: OperationRef,
}

impl<'d, 'a> OperationContext<'d, 'a> {
    fn new(diff: &'d ClassDiff<'a>, pair: &'d OperationPair<'a>) -> Self {
        Self {
            diff,
            pair,
            before: OperationRef::of(diff.before, pair.before),
            after: OperationRef::of(diff.after, pair.after),
        }
    }

    pub fn before_body(&self) -> &'a StatementTree {
        self.pair.before.body()
    }

    pub fn after_body(&self) -> &'a StatementTree {
        self.pair.after.body()
    }
}

type OperationDetector = fn(&OperationContext<'_, '_>, &[Refactoring]) -> Vec<Refactoring>;

const OPERATION_DETECTORS: &[OperationDetector] = &[
    signature::rename_method,
    signature::return_type,
    signature::parameters,
    annotations::detect,
    variables::detect,
    assert_throws::detect,
    try_fail_rule::detect,
];

/// Rename, move and move-and-rename of paired classes.
pub(crate) fn class_level(model: &ModelDiff<'_>) -> Vec<Refactoring> {
    model
        .class_diffs
        .iter()
        .filter_map(|d| {
            let ty = match d.kind {
                ClassMatchKind::Same => return None,
                ClassMatchKind::Rename => RefactoringType::RenameClass,
                ClassMatchKind::Move => RefactoringType::MoveClass,
                ClassMatchKind::MoveRename => RefactoringType::MoveRenameClass,
            };
            Some(Refactoring::Class(ClassChange {
                ty,
                before: ClassRef::of(d.before),
                after: ClassRef::of(d.after),
                before_range: d.before.range,
                after_range: d.after.range,
            }))
        })
        .collect()
}

/// Attribute records, then operation records in pair order.
pub(crate) fn within_class(diff: &ClassDiff<'_>) -> Vec<Refactoring> {
    let mut out = attribute_changes(diff);
    for pair in &diff.operation_pairs {
        let ctx = OperationContext::new(diff, pair);
        let mut found: Vec<Refactoring> = Vec::new();
        for detector in OPERATION_DETECTORS {
            let hits = detector(&ctx, &found);
            found.extend(hits);
        }
        trace!(operation = %ctx.after.signature, count = found.len(), "operation pair done");
        if !found.is_empty() {
            debug!(
                class = %diff.after.qualified_name,
                operation = %ctx.after.signature,
                count = found.len(),
                "refactorings detected"
            );
        }
        out.extend(found);
    }
    out
}

fn attribute_changes(diff: &ClassDiff<'_>) -> Vec<Refactoring> {
    let mut out = Vec::new();
    for pair in &diff.attribute_pairs {
        let before = AttributeRef::of(diff.before, pair.before);
        let after = AttributeRef::of(diff.after, pair.after);
        if before.name != after.name {
            out.push(Refactoring::Attribute(AttributeChange {
                ty: RefactoringType::RenameAttribute,
                before: before.clone(),
                after: after.clone(),
            }));
        }
        if before.type_name != after.type_name {
            out.push(Refactoring::Attribute(AttributeChange {
                ty: RefactoringType::ChangeAttributeType,
                before,
                after,
            }));
        }
    }
    out
}

/// Detectors that look across class pairs: extract, inline, move.
pub(crate) fn model_level(
    model: &ModelDiff<'_>,
    config: &DiffConfig,
    mapper: &MapperConfig,
    deadline: &Deadline,
) -> Result<Vec<Refactoring>, DiffError> {
    let mut out = extract_inline::extract(model, config, mapper, deadline)?;
    out.extend(extract_inline::inline(model, config, mapper, deadline)?);
    out.extend(moves::move_operations(model, config, mapper, deadline)?);
    out.extend(moves::move_attributes(model));
    debug!(count = out.len(), "model-level detection complete");
    Ok(out)
}

/// Whether any record in `found` has type `ty`.
fn has_type(found: &[Refactoring], ty: RefactoringType) -> bool {
    found.iter().any(|r| r.refactoring_type() == ty)
}
