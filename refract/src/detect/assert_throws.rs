//! `@Test(expected = X.class)` migrated to `assertThrows(X.class, () -> {..})`.

use super::{OperationContext, has_type};
use crate::refactoring::{AssertThrowsMigration, Fragment, Refactoring, RefactoringType};
use stemma::StatementTree;
use stemma::indextree::NodeId;

const ASSERT_RECEIVERS: &[&str] = &["Assert", "Assertions", ""];

/// Fires when the annotation lost its `expected` member (already reported as
/// a modified annotation) and a new `assertThrows` call with the same
/// exception wraps, in a lambda, statements mapped in their original order.
pub(crate) fn detect(ctx: &OperationContext<'_, '_>, found: &[Refactoring]) -> Vec<Refactoring> {
    if !has_type(found, RefactoringType::ModifyMethodAnnotation) {
        return Vec::new();
    }
    let Some(expected) = ctx
        .pair
        .before
        .annotation("Test")
        .and_then(|a| a.member("expected"))
    else {
        return Vec::new();
    };
    if ctx
        .pair
        .after
        .annotation("Test")
        .is_none_or(|a| a.member("expected").is_some())
    {
        return Vec::new();
    }

    let (before_body, after_body) = (ctx.before_body(), ctx.after_body());
    let mapping = &ctx.pair.mapping;
    for &leaf in &mapping.unmatched_leaves_after {
        let statement = after_body.get(leaf);
        let Some(call) = statement.invocations.iter().find(|inv| {
            inv.calls("assertThrows", ASSERT_RECEIVERS)
                && inv.arguments.first().is_some_and(|arg| arg == expected)
        }) else {
            continue;
        };
        let Some(lambda) = after_body.lambda_of(leaf) else {
            continue;
        };
        let wrapped: Option<Vec<NodeId>> = after_body
            .children(lambda)
            .map(|c| mapping.mapped_before(c))
            .collect();
        let Some(wrapped) = wrapped else {
            continue;
        };
        if !in_source_order(before_body, &wrapped) {
            continue;
        }

        return vec![Refactoring::AssertThrows(AssertThrowsMigration {
            exception: expected.to_string(),
            before: ctx.before.clone(),
            after: ctx.after.clone(),
            before_annotations: ctx
                .pair
                .before
                .annotations
                .iter()
                .map(Fragment::of_annotation)
                .collect(),
            after_annotations: ctx
                .pair
                .after
                .annotations
                .iter()
                .map(Fragment::of_annotation)
                .collect(),
            assert_throws: Fragment {
                text: call.to_string(),
                range: statement.range,
            },
            lambda: Fragment::of_statement(after_body.get(lambda)),
        })];
    }
    Vec::new()
}

/// Whether `nodes` appear in strictly increasing pre-order position.
fn in_source_order(tree: &StatementTree, nodes: &[NodeId]) -> bool {
    let order: Vec<NodeId> = tree.statements().collect();
    let positions: Option<Vec<usize>> = nodes
        .iter()
        .map(|n| order.iter().position(|o| o == n))
        .collect();
    positions.is_some_and(|p| p.windows(2).all(|w| w[0] < w[1]))
}
