//! Method annotation changes, keyed by annotation type.

use super::OperationContext;
use crate::model::Annotation;
use crate::refactoring::{AnnotationChange, Fragment, Refactoring, RefactoringType};

pub(crate) fn detect(ctx: &OperationContext<'_, '_>, _: &[Refactoring]) -> Vec<Refactoring> {
    let before = &ctx.pair.before.annotations;
    let after = &ctx.pair.after.annotations;
    let mut after_used = vec![false; after.len()];
    let mut out = Vec::new();

    for b in before {
        match (0..after.len()).find(|&j| !after_used[j] && after[j].type_name == b.type_name) {
            Some(j) => {
                after_used[j] = true;
                if after[j].args != b.args {
                    out.push(change(
                        ctx,
                        RefactoringType::ModifyMethodAnnotation,
                        Some(b),
                        Some(&after[j]),
                    ));
                }
            }
            None => out.push(change(ctx, RefactoringType::RemoveMethodAnnotation, Some(b), None)),
        }
    }
    for (j, a) in after.iter().enumerate() {
        if !after_used[j] {
            out.push(change(ctx, RefactoringType::AddMethodAnnotation, None, Some(a)));
        }
    }
    out
}

fn change(
    ctx: &OperationContext<'_, '_>,
    ty: RefactoringType,
    before: Option<&Annotation>,
    after: Option<&Annotation>,
) -> Refactoring {
    Refactoring::Annotation(AnnotationChange {
        ty,
        before_annotation: before.map(Fragment::of_annotation),
        after_annotation: after.map(Fragment::of_annotation),
        before: ctx.before.clone(),
        after: ctx.after.clone(),
    })
}
