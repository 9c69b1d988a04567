//! Grouping, serialised reports and the front-end seam.

mod common;

use common::{body, snapshot};
use facet_testhelpers::test;
use refract::refactoring::{OperationRef, ParameterChange};
use refract::{
    BuildOutput, Class, DiffConfig, DiffError, InputOptions, MemberKey, ModelBuilder, Operation,
    Refactoring, RefactoringReport, RefactoringType, SnapshotBuilder, SourceSet, Unresolved,
    diff_sources, group_by_member, reports_to_json,
};

#[test]
fn test_grouping_files_every_record_under_the_shared_operation() {
    let before_class = Class::new("Mailer.java", "mail.Mailer");
    let after_class = Class::new("Mailer.java", "mail.Mailer");
    let send = Operation::new("send").with_parameter("to", "String");
    let shared = OperationRef::of(&before_class, &send);

    let added = ["subject", "body", "cc", "bcc", "retries"];
    let found: Vec<Refactoring> = added
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut after_op = send.clone();
            for extra in &added[..=i] {
                after_op = after_op.with_parameter(extra, "String");
            }
            Refactoring::Parameter(ParameterChange {
                ty: RefactoringType::AddParameter,
                before_parameter: None,
                after_parameter: Some(format!("{name} String")),
                before: shared.clone(),
                after: OperationRef::of(&after_class, &after_op),
            })
        })
        .collect();

    let groups = group_by_member(&found);
    let key = MemberKey::Operation {
        class: "mail.Mailer".to_string(),
        signature: "public send(to String) : void".to_string(),
    };
    assert_eq!(groups[&key].len(), added.len());
    assert_eq!(groups.len(), 1 + added.len());
    for key in groups.keys() {
        match key {
            MemberKey::Class { qualified_name } => assert!(!qualified_name.is_empty()),
            MemberKey::Operation { class, signature } => {
                assert!(!class.is_empty() && !signature.is_empty())
            }
            MemberKey::Attribute { class, name } => assert!(!class.is_empty() && !name.is_empty()),
        }
    }
}

#[test]
fn test_reports_round_trip_through_json() {
    let steps = ["open();", "write(buffer);", "close();"];
    let before = snapshot([Class::new("Store.java", "io.Store")
        .with_operation(Operation::new("save").with_body(body(4, &steps)))]);
    let after = snapshot([Class::new("Store.java", "io.Store")
        .with_operation(Operation::new("persist").with_body(body(4, &steps)))]);
    let diff = before.diff(&after, &DiffConfig::default()).unwrap();

    let json = reports_to_json(diff.refactorings()).unwrap();
    assert!(json.contains("\"leftSideLocations\""), "{json}");
    let reports: Vec<RefactoringReport> = facet_json::from_str(&json).unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0], diff.refactorings()[0].to_report());
    assert_eq!(reports[0].ty, "RENAME_METHOD");
    assert_eq!(reports[0].left_side_locations[0].code_element_type, "METHOD_DECLARATION");
    assert_eq!(reports[0].left_side_locations[0].file_path, "Store.java");
}

/// Reads one class per line: `class <qualified name>` or
/// `unresolved <qualified name>`.
struct LineFrontEnd;

impl ModelBuilder for LineFrontEnd {
    fn build(&self, sources: &SourceSet, _: &InputOptions) -> Result<BuildOutput, DiffError> {
        let mut builder = SnapshotBuilder::new();
        let mut unresolved = Vec::new();
        for (file, text) in sources.iter() {
            for line in text.lines() {
                let (kind, name) = line.split_once(' ').ok_or_else(|| DiffError::FrontEnd {
                    message: format!("bad line in {file}: {line}"),
                })?;
                if kind == "unresolved" {
                    unresolved.push(Unresolved {
                        file: file.to_string(),
                        element: name.to_string(),
                    });
                }
                builder.add_class(
                    Class::new(file, name)
                        .with_operation(Operation::new("run").with_body(body(2, &["work();"]))),
                );
            }
        }
        Ok(BuildOutput {
            snapshot: builder.build()?,
            unresolved,
        })
    }
}

#[test]
fn test_front_end_strict_and_lenient() {
    let before = SourceSet::new().file("A.java", "class p.A");
    let after = SourceSet::new().file("B.java", "unresolved p.B");
    let config = DiffConfig::default();

    let strict = InputOptions {
        strict: true,
        ..InputOptions::default()
    };
    let err = diff_sources(&LineFrontEnd, &before, &after, &strict, &config).unwrap_err();
    assert!(matches!(
        err,
        DiffError::UnresolvedInput { ref file, ref element } if file == "B.java" && element == "p.B"
    ));

    let lenient = InputOptions::default();
    let found = diff_sources(&LineFrontEnd, &before, &after, &lenient, &config).unwrap();
    assert!(found.is_empty());

    let resolved = SourceSet::new().file("B.java", "class p.B");
    let found = diff_sources(&LineFrontEnd, &before, &resolved, &lenient, &config).unwrap();
    assert_eq!(found.len(), 1);
}

#[test]
fn test_front_end_errors_propagate() {
    let broken = SourceSet::new().file("A.java", "garbage");
    let err = diff_sources(
        &LineFrontEnd,
        &broken,
        &broken,
        &InputOptions::default(),
        &DiffConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, DiffError::FrontEnd { .. }));
}
