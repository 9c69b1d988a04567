//! The diff orchestrator: entity matching, statement mapping, detection.

use crate::config::{DiffConfig, InputOptions};
use crate::deadline::Deadline;
use crate::detect;
use crate::diff::ModelDiff;
use crate::error::DiffError;
use crate::matcher::match_snapshots;
use crate::model::{BuildOutput, ModelBuilder, Snapshot, SourceSet};
use crate::refactoring::{Refactoring, dedup};
use crate::{debug, warn};
use rayon::prelude::*;

impl Snapshot {
    /// Diff this snapshot against `after`.
    ///
    /// Either every refactoring is returned, or a single error: a timeout
    /// never yields a partial list.
    ///
    /// ```
    /// use refract::{Class, DiffConfig, Operation, RefactoringRecord, SnapshotBuilder};
    ///
    /// let before = SnapshotBuilder::new()
    ///     .class(Class::new("A.java", "p.A").with_operation(Operation::new("run")))
    ///     .build()?;
    /// let after = SnapshotBuilder::new()
    ///     .class(Class::new("A.java", "p.B").with_operation(Operation::new("run")))
    ///     .build()?;
    ///
    /// let diff = before.diff(&after, &DiffConfig::default())?;
    /// assert_eq!(diff.refactorings()[0].description(), "Rename Class\tp.A renamed to p.B");
    /// # Ok::<(), refract::DiffError>(())
    /// ```
    pub fn diff<'a>(
        &'a self,
        after: &'a Snapshot,
        config: &DiffConfig,
    ) -> Result<ModelDiff<'a>, DiffError> {
        config.validate()?;
        let deadline = Deadline::start(config.timeout_ms);
        let mapper = config.mapper();

        let mut model = match_snapshots(self, after, config, &deadline)?;
        deadline.check()?;

        let per_class: Vec<Vec<Refactoring>> = if config.parallel {
            model.class_diffs.par_iter().map(detect::within_class).collect()
        } else {
            model.class_diffs.iter().map(detect::within_class).collect()
        };
        deadline.check()?;

        let mut refactorings = detect::class_level(&model);
        refactorings.extend(per_class.into_iter().flatten());
        refactorings.extend(detect::model_level(&model, config, &mapper, &deadline)?);
        deadline.check()?;

        let total = refactorings.len();
        model.refactorings = dedup(refactorings);
        debug!(
            detected = total,
            kept = model.refactorings.len(),
            elapsed_ms = deadline.elapsed_ms(),
            "diff complete"
        );
        Ok(model)
    }
}

/// Build both snapshots with `front_end` and diff them.
///
/// Elements the front end could not resolve fail the call in strict mode;
/// otherwise they are dropped from their snapshot and only show up as added
/// or removed.
pub fn diff_sources(
    front_end: &impl ModelBuilder,
    before: &SourceSet,
    after: &SourceSet,
    options: &InputOptions,
    config: &DiffConfig,
) -> Result<Vec<Refactoring>, DiffError> {
    let before = resolve(front_end.build(before, options)?, options)?;
    let after = resolve(front_end.build(after, options)?, options)?;
    Ok(before.diff(&after, config)?.into_refactorings())
}

fn resolve(output: BuildOutput, options: &InputOptions) -> Result<Snapshot, DiffError> {
    let BuildOutput {
        snapshot,
        unresolved,
    } = output;
    if unresolved.is_empty() {
        return Ok(snapshot);
    }
    if options.strict
        && let Some(first) = unresolved.first()
    {
        return Err(DiffError::UnresolvedInput {
            file: first.file.clone(),
            element: first.element.clone(),
        });
    }
    let elements: Vec<&str> = unresolved.iter().map(|u| u.element.as_str()).collect();
    warn!(?elements, "dropping unresolved elements");
    Ok(snapshot.without(&elements))
}
