//! Name, return type and parameter list changes of paired operations.

use super::OperationContext;
use crate::model::Parameter;
use crate::refactoring::{
    OperationChange, ParameterChange, Refactoring, RefactoringType, ReturnTypeChange,
};

pub(crate) fn rename_method(ctx: &OperationContext<'_, '_>, _: &[Refactoring]) -> Vec<Refactoring> {
    let (b, a) = (ctx.pair.before, ctx.pair.after);
    if b.constructor || a.constructor || b.name == a.name {
        return Vec::new();
    }
    vec![Refactoring::Operation(OperationChange {
        ty: RefactoringType::RenameMethod,
        before: ctx.before.clone(),
        after: ctx.after.clone(),
    })]
}

pub(crate) fn return_type(ctx: &OperationContext<'_, '_>, _: &[Refactoring]) -> Vec<Refactoring> {
    match (&ctx.pair.before.return_type, &ctx.pair.after.return_type) {
        (Some(b), Some(a)) if b != a => vec![Refactoring::ReturnType(ReturnTypeChange {
            before_type: b.clone(),
            after_type: a.clone(),
            before: ctx.before.clone(),
            after: ctx.after.clone(),
        })],
        _ => Vec::new(),
    }
}

/// Parameters pair by name first (a type change if the types differ), then
/// leftovers pair in order by type (a rename). What is still unpaired was
/// removed or added.
pub(crate) fn parameters(ctx: &OperationContext<'_, '_>, _: &[Refactoring]) -> Vec<Refactoring> {
    let before = &ctx.pair.before.parameters;
    let after = &ctx.pair.after.parameters;
    let mut before_used = vec![false; before.len()];
    let mut after_used = vec![false; after.len()];
    let mut out = Vec::new();

    for (i, b) in before.iter().enumerate() {
        if let Some(j) = (0..after.len()).find(|&j| !after_used[j] && after[j].name == b.name) {
            before_used[i] = true;
            after_used[j] = true;
            if after[j].type_name != b.type_name {
                out.push(change(
                    ctx,
                    RefactoringType::ChangeParameterType,
                    Some(b),
                    Some(&after[j]),
                ));
            }
        }
    }

    for (i, b) in before.iter().enumerate() {
        if before_used[i] {
            continue;
        }
        if let Some(j) =
            (0..after.len()).find(|&j| !after_used[j] && after[j].type_name == b.type_name)
        {
            before_used[i] = true;
            after_used[j] = true;
            out.push(change(ctx, RefactoringType::RenameParameter, Some(b), Some(&after[j])));
        }
    }

    for (i, b) in before.iter().enumerate() {
        if !before_used[i] {
            out.push(change(ctx, RefactoringType::RemoveParameter, Some(b), None));
        }
    }
    for (j, a) in after.iter().enumerate() {
        if !after_used[j] {
            out.push(change(ctx, RefactoringType::AddParameter, None, Some(a)));
        }
    }
    out
}

fn change(
    ctx: &OperationContext<'_, '_>,
    ty: RefactoringType,
    before: Option<&Parameter>,
    after: Option<&Parameter>,
) -> Refactoring {
    Refactoring::Parameter(ParameterChange {
        ty,
        before_parameter: before.map(ToString::to_string),
        after_parameter: after.map(ToString::to_string),
        before: ctx.before.clone(),
        after: ctx.after.clone(),
    })
}
