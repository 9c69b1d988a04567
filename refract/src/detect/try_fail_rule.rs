//! `try { ..; fail(..); } catch (X e) {}` migrated to an `ExpectedException`
//! rule and `rule.expect(X.class)`.

use super::OperationContext;
use crate::refactoring::{AttributeRef, Fragment, Refactoring, TryFailRuleMigration};
use stemma::indextree::NodeId;
use stemma::{Invocation, StatementKind, StatementTree};

const FAIL_RECEIVERS: &[&str] = &["Assert", "Assertions", ""];

pub(crate) fn detect(ctx: &OperationContext<'_, '_>, _: &[Refactoring]) -> Vec<Refactoring> {
    let (before_body, after_body) = (ctx.before_body(), ctx.after_body());
    let mapping = &ctx.pair.mapping;
    let after_class = ctx.diff.after;

    // the rule field must be new in this class pair
    let Some(rule) = ctx
        .diff
        .added_attributes
        .iter()
        .copied()
        .find(|a| a.has_annotation("Rule") && a.type_name.ends_with("ExpectedException"))
    else {
        return Vec::new();
    };
    let this_rule = format!("this.{}", rule.name);
    let receivers = [rule.name.as_str(), this_rule.as_str()];

    for &id in &mapping.unmatched_composites_before {
        if !matches!(before_body.get(id).kind, StatementKind::Try { .. }) {
            continue;
        }
        let Some((last, fail)) = trailing_fail(before_body, id) else {
            continue;
        };
        let Some((catch, exception)) = expected_exception(before_body, id) else {
            continue;
        };
        let Some(expect) = mapping.unmatched_leaves_after.iter().copied().find(|&leaf| {
            after_body.get(leaf).invocations.iter().any(|inv| {
                inv.calls("expect", &receivers)
                    && inv.arguments.first().is_some_and(|arg| *arg == exception)
            })
        }) else {
            continue;
        };

        return vec![Refactoring::TryFailRule(TryFailRuleMigration {
            exception,
            before: ctx.before.clone(),
            after: ctx.after.clone(),
            try_statement: Fragment::of_statement(before_body.get(id)),
            catch_clause: Fragment::of_statement(before_body.get(catch)),
            fail_invocation: Fragment {
                text: fail.to_string(),
                range: before_body.get(last).range,
            },
            rule_field: AttributeRef::of(after_class, rule),
            expect_invocation: Fragment::of_statement(after_body.get(expect)),
        })];
    }
    Vec::new()
}

/// The last statement of the try body, if it calls `fail`. A last statement
/// without invocations simply does not qualify.
fn trailing_fail(tree: &StatementTree, try_id: NodeId) -> Option<(NodeId, &Invocation)> {
    let last = tree.try_body(try_id).last()?;
    let fail = tree
        .get(last)
        .invocations
        .iter()
        .find(|inv| inv.calls("fail", FAIL_RECEIVERS))?;
    Some((last, fail))
}

/// The first catch clause catching an exception type, and `Type.class`.
fn expected_exception(tree: &StatementTree, try_id: NodeId) -> Option<(NodeId, String)> {
    tree.catch_clauses(try_id).find_map(|c| match &tree.get(c).kind {
        StatementKind::Catch {
            exception_types, ..
        } => exception_types
            .iter()
            .find(|t| t.ends_with("Exception"))
            .map(|t| (c, format!("{t}.class"))),
        _ => None,
    })
}
