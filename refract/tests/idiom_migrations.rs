//! Test idiom migrations: expected-exception annotations and try/fail blocks.

mod common;

use common::{declare, open, push, snapshot};
use facet_testhelpers::test;
use refract::{
    Annotation, Attribute, Class, CodeElementType, DiffConfig, Operation, RefactoringRecord,
    RefactoringType,
};
use stemma::{SourceRange, StatementKind, StatementTree};

fn expected_exception_test() -> Class {
    let mut body = StatementTree::new();
    let root = body.root;
    declare(&mut body, root, 12, "Widget widget = new Widget(\"w\");");
    push(&mut body, root, 13, "widget.resize(-1);");

    Class::new("src/test/WidgetTest.java", "com.acme.WidgetTest").with_operation(
        Operation::new("testRejectsNegativeSize")
            .with_annotation(
                Annotation::normal("Test", &[("expected", "IllegalArgumentException.class")])
                    .with_range(SourceRange::lines(10, 10)),
            )
            .with_body(body)
            .with_range(SourceRange::lines(10, 14)),
    )
}

fn assert_throws_test() -> Class {
    let mut body = StatementTree::new();
    let root = body.root;
    let call = push(
        &mut body,
        root,
        12,
        "Assertions.assertThrows(IllegalArgumentException.class, () -> {});",
    );
    let lambda = open(
        &mut body,
        call,
        (12, 15),
        StatementKind::Lambda {
            parameters: Vec::new(),
        },
    );
    declare(&mut body, lambda, 13, "Widget widget = new Widget(\"w\");");
    push(&mut body, lambda, 14, "widget.resize(-1);");

    Class::new("src/test/WidgetTest.java", "com.acme.WidgetTest").with_operation(
        Operation::new("testRejectsNegativeSize")
            .with_annotation(Annotation::marker("Test").with_range(SourceRange::lines(10, 10)))
            .with_body(body)
            .with_range(SourceRange::lines(10, 16)),
    )
}

#[test]
fn test_expected_annotation_to_assert_throws() {
    let before = snapshot([expected_exception_test()]);
    let after = snapshot([assert_throws_test()]);
    let diff = before.diff(&after, &DiffConfig::default()).unwrap();
    let found = diff.refactorings();

    let types: Vec<RefactoringType> = found.iter().map(|r| r.refactoring_type()).collect();
    assert_eq!(
        types,
        vec![
            RefactoringType::ModifyMethodAnnotation,
            RefactoringType::ReplaceExpectedWithAssertThrows,
        ]
    );

    assert_eq!(
        found[0].description(),
        "Modify Method Annotation\t@Test(expected = IllegalArgumentException.class) to @Test \
         in method public testRejectsNegativeSize() : void from class com.acme.WidgetTest"
    );
    let migration = &found[1];
    assert_eq!(
        migration.description(),
        "Replace Expect Annotation With Assert Throws\tIllegalArgumentException.class \
         from method public testRejectsNegativeSize() : void in class com.acme.WidgetTest"
    );

    let left = migration.left_side();
    let roles: Vec<&str> = left.iter().map(|r| r.description.as_str()).collect();
    assert_eq!(
        roles,
        vec![
            "source method declaration before migration",
            "source method's annotations before migration",
        ]
    );
    assert_eq!(
        left[1].code_element.as_deref(),
        Some("@Test(expected = IllegalArgumentException.class)")
    );

    let right = migration.right_side();
    let roles: Vec<&str> = right.iter().map(|r| r.description.as_str()).collect();
    assert_eq!(
        roles,
        vec![
            "method declaration after migration",
            "method's annotations after migration",
            "added Assert.assertThrows call",
            "extracted lambda from method's body",
        ]
    );
    assert_eq!(right[2].element_type, CodeElementType::MethodInvocation);
    assert_eq!(right[3].element_type, CodeElementType::LambdaExpression);
    assert_eq!(right[3].range, SourceRange::lines(12, 15));
}

#[test]
fn test_assert_throws_lambda_holds_original_body_in_order() {
    let before = snapshot([expected_exception_test()]);
    let after = snapshot([assert_throws_test()]);
    let diff = before.diff(&after, &DiffConfig::default()).unwrap();

    let pair = &diff.class_diffs[0].operation_pairs[0];
    let after_body = pair.after.body();
    let lambda = after_body
        .statements()
        .find(|&id| matches!(after_body.get(id).kind, StatementKind::Lambda { .. }))
        .expect("lambda");
    let wrapped: Vec<_> = after_body
        .children(lambda)
        .map(|c| pair.mapping.mapped_before(c).expect("lambda statement is mapped"))
        .collect();

    let before_body = pair.before.body();
    let original: Vec<_> = before_body.children(before_body.root).collect();
    assert_eq!(wrapped, original);
}

#[test]
fn test_assert_throws_needs_matching_exception() {
    let before = snapshot([expected_exception_test()]);
    let mut after_class = assert_throws_test();
    let mut body = StatementTree::new();
    let root = body.root;
    let call = push(
        &mut body,
        root,
        12,
        "Assertions.assertThrows(IllegalStateException.class, () -> {});",
    );
    let lambda = open(
        &mut body,
        call,
        (12, 15),
        StatementKind::Lambda {
            parameters: Vec::new(),
        },
    );
    declare(&mut body, lambda, 13, "Widget widget = new Widget(\"w\");");
    push(&mut body, lambda, 14, "widget.resize(-1);");
    after_class.operations[0].body = Some(body);
    let after = snapshot([after_class]);

    let diff = before.diff(&after, &DiffConfig::default()).unwrap();
    let types: Vec<RefactoringType> = diff
        .refactorings()
        .iter()
        .map(|r| r.refactoring_type())
        .collect();
    assert_eq!(types, vec![RefactoringType::ModifyMethodAnnotation]);
}

fn try_fail_test(last: &str) -> Class {
    let mut body = StatementTree::new();
    let root = body.root;
    let t = open(
        &mut body,
        root,
        (8, 13),
        StatementKind::Try {
            resources: Vec::new(),
        },
    );
    push(&mut body, t, 9, "parser.parse(\"abc\");");
    push(&mut body, t, 10, last);
    open(
        &mut body,
        t,
        (11, 12),
        StatementKind::Catch {
            exception_types: vec!["NumberFormatException".to_string()],
            variable: "e".to_string(),
        },
    );

    Class::new("src/test/ParserTest.java", "com.acme.ParserTest")
        .with_attribute(Attribute::new("parser", "Parser"))
        .with_operation(
            Operation::new("testInvalidNumber")
                .with_annotation(Annotation::marker("Test"))
                .with_body(body)
                .with_range(SourceRange::lines(7, 14)),
        )
}

fn rule_field() -> Attribute {
    Attribute::new("thrown", "ExpectedException")
        .with_annotation(Annotation::marker("Rule"))
        .with_initializer("ExpectedException.none()")
        .with_range(SourceRange::lines(6, 7))
}

fn rule_test() -> Class {
    let mut body = StatementTree::new();
    let root = body.root;
    push(&mut body, root, 12, "thrown.expect(NumberFormatException.class);");
    push(&mut body, root, 13, "parser.parse(\"abc\");");

    Class::new("src/test/ParserTest.java", "com.acme.ParserTest")
        .with_attribute(Attribute::new("parser", "Parser"))
        .with_attribute(rule_field())
        .with_operation(
            Operation::new("testInvalidNumber")
                .with_annotation(Annotation::marker("Test"))
                .with_body(body)
                .with_range(SourceRange::lines(10, 14)),
        )
}

#[test]
fn test_try_fail_to_expected_exception_rule() {
    let before = snapshot([try_fail_test("fail(\"expected NumberFormatException\");")]);
    let after = snapshot([rule_test()]);
    let diff = before.diff(&after, &DiffConfig::default()).unwrap();
    let found = diff.refactorings();

    assert_eq!(found.len(), 1, "{found:#?}");
    let migration = &found[0];
    assert_eq!(
        migration.refactoring_type(),
        RefactoringType::ReplaceTryFailWithRule
    );
    assert_eq!(
        migration.description(),
        "Replace Try And Fail With Rule\tNumberFormatException.class \
         from method public testInvalidNumber() : void in class com.acme.ParserTest"
    );

    let left = migration.left_side();
    let kinds: Vec<CodeElementType> = left.iter().map(|r| r.element_type).collect();
    assert_eq!(
        kinds,
        vec![
            CodeElementType::MethodDeclaration,
            CodeElementType::TryStatement,
            CodeElementType::CatchClause,
            CodeElementType::MethodInvocation,
        ]
    );
    assert_eq!(left[1].range, SourceRange::lines(8, 13));
    assert_eq!(left[2].range, SourceRange::lines(11, 12));
    assert_eq!(left[3].range, SourceRange::lines(10, 10));

    let right = migration.right_side();
    let roles: Vec<&str> = right.iter().map(|r| r.description.as_str()).collect();
    assert_eq!(
        roles,
        vec![
            "method declaration after migration",
            "ExpectedException field annotated with @Rule",
            "method's statement invoking ExpectedException's expect method",
        ]
    );
    assert_eq!(right[1].element_type, CodeElementType::FieldDeclaration);
    assert_eq!(right[1].range, SourceRange::lines(6, 7));
    assert_eq!(right[2].range, SourceRange::lines(12, 12));
}

#[test]
fn test_try_without_trailing_invocation_is_not_a_migration() {
    let before = snapshot([try_fail_test("count = 0;")]);
    let after = snapshot([rule_test()]);
    let diff = before.diff(&after, &DiffConfig::default()).unwrap();
    assert!(
        diff.refactorings()
            .iter()
            .all(|r| r.refactoring_type() != RefactoringType::ReplaceTryFailWithRule)
    );
}

#[test]
fn test_existing_rule_field_is_not_a_migration() {
    let with_rule = try_fail_test("fail(\"expected NumberFormatException\");")
        .with_attribute(rule_field());
    let before = snapshot([with_rule]);
    let after = snapshot([rule_test()]);
    let diff = before.diff(&after, &DiffConfig::default()).unwrap();
    assert!(
        diff.refactorings()
            .iter()
            .all(|r| r.refactoring_type() != RefactoringType::ReplaceTryFailWithRule)
    );
}
