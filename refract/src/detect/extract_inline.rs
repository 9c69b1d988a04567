//! Extract and inline operation.
//!
//! An added operation was extracted from a paired operation when the pair's
//! after body now calls it and the statements that lost their partner in the
//! pair mapping reappear in its body. Inline is the mirror image over removed
//! operations.

use crate::config::DiffConfig;
use crate::deadline::Deadline;
use crate::diff::ModelDiff;
use crate::error::DiffError;
use crate::model::Operation;
use crate::refactoring::{ExtractOperation, Fragment, InlineOperation, OperationRef, Refactoring};
use crate::trace;
use stemma::indextree::NodeId;
use stemma::{Invocation, MapperConfig, StatementTree, map_statements};

/// First call to `callee` in `body` with a matching argument count.
fn call_to<'t>(body: &'t StatementTree, callee: &Operation) -> Option<(NodeId, &'t Invocation)> {
    body.invocations().find(|(_, inv)| {
        inv.calls(&callee.name, &[]) && inv.arguments.len() == callee.parameters.len()
    })
}

pub(crate) fn extract(
    model: &ModelDiff<'_>,
    config: &DiffConfig,
    mapper: &MapperConfig,
    deadline: &Deadline,
) -> Result<Vec<Refactoring>, DiffError> {
    let mut out = Vec::new();
    for (class, added) in model.added_operations() {
        if !added.has_body() {
            continue;
        }
        for (diff, pair) in model.operation_pairs() {
            let (source_before, source_after) = (pair.before.body(), pair.after.body());
            let Some((call_site, call)) = call_to(source_after, added) else {
                continue;
            };
            if call_to(source_before, added).is_some() {
                continue;
            }
            deadline.check()?;
            let trial = map_statements(source_before, added.body(), mapper);
            deadline.check()?;

            let moved: Vec<NodeId> = trial
                .entries
                .iter()
                .map(|e| e.before)
                .filter(|&b| pair.mapping.mapped_after(b).is_none())
                .collect();
            trace!(
                extracted = %added,
                source = %pair.before,
                moved = moved.len(),
                "extract candidate"
            );
            if moved.len() < config.min_extracted_statements {
                continue;
            }
            out.push(Refactoring::Extract(ExtractOperation {
                extracted: OperationRef::of(class, added),
                source_before: OperationRef::of(diff.before, pair.before),
                source_after: OperationRef::of(diff.after, pair.after),
                extracted_statements: moved
                    .iter()
                    .map(|&id| Fragment::of_statement(source_before.get(id)))
                    .collect(),
                invocation: Fragment {
                    text: call.to_string(),
                    range: source_after.get(call_site).range,
                },
            }));
        }
    }
    Ok(out)
}

pub(crate) fn inline(
    model: &ModelDiff<'_>,
    config: &DiffConfig,
    mapper: &MapperConfig,
    deadline: &Deadline,
) -> Result<Vec<Refactoring>, DiffError> {
    let mut out = Vec::new();
    for (class, removed) in model.removed_operations() {
        if !removed.has_body() {
            continue;
        }
        for (diff, pair) in model.operation_pairs() {
            let (target_before, target_after) = (pair.before.body(), pair.after.body());
            let Some((call_site, call)) = call_to(target_before, removed) else {
                continue;
            };
            if call_to(target_after, removed).is_some() {
                continue;
            }
            deadline.check()?;
            let trial = map_statements(removed.body(), target_after, mapper);
            deadline.check()?;

            let absorbed: Vec<NodeId> = trial
                .entries
                .iter()
                .map(|e| e.after)
                .filter(|&a| pair.mapping.mapped_before(a).is_none())
                .collect();
            trace!(
                inlined = %removed,
                target = %pair.after,
                absorbed = absorbed.len(),
                "inline candidate"
            );
            if absorbed.len() < config.min_extracted_statements {
                continue;
            }
            out.push(Refactoring::Inline(InlineOperation {
                inlined: OperationRef::of(class, removed),
                target_before: OperationRef::of(diff.before, pair.before),
                target_after: OperationRef::of(diff.after, pair.after),
                inlined_statements: absorbed
                    .iter()
                    .map(|&id| Fragment::of_statement(target_after.get(id)))
                    .collect(),
                invocation: Fragment {
                    text: call.to_string(),
                    range: target_before.get(call_site).range,
                },
            }));
        }
    }
    Ok(out)
}
