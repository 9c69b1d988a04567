//! Local variable renames seen in mapped declarations.

use super::OperationContext;
use crate::refactoring::{Fragment, Refactoring, VariableRename};
use rapidhash::RapidHashSet as HashSet;
use stemma::ReplacementKind;

/// A mapped statement pair whose declarations differ only by name, with the
/// name substitution among the pair's replacements.
pub(crate) fn detect(ctx: &OperationContext<'_, '_>, _: &[Refactoring]) -> Vec<Refactoring> {
    let (before_body, after_body) = (ctx.before_body(), ctx.after_body());
    let mut seen: HashSet<(&str, &str)> = HashSet::default();
    let mut out = Vec::new();

    for entry in &ctx.pair.mapping.entries {
        let (b, a) = (before_body.get(entry.before), after_body.get(entry.after));
        for (bv, av) in b.variables.iter().zip(&a.variables) {
            if bv.name == av.name || bv.type_name != av.type_name {
                continue;
            }
            let renamed = entry.replacements.iter().any(|r| {
                r.kind == ReplacementKind::VariableName && r.before == bv.name && r.after == av.name
            });
            if !renamed || !seen.insert((bv.name.as_str(), av.name.as_str())) {
                continue;
            }
            out.push(Refactoring::Variable(VariableRename {
                before_variable: Fragment {
                    text: format!("{} : {}", bv.name, bv.type_name),
                    range: b.range,
                },
                after_variable: Fragment {
                    text: format!("{} : {}", av.name, av.type_name),
                    range: a.range,
                },
                before: ctx.before.clone(),
                after: ctx.after.clone(),
            }));
        }
    }
    out
}
