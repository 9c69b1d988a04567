#![allow(dead_code)]

use refract::{Attribute, Class, Operation, Snapshot, SnapshotBuilder};
use stemma::indextree::NodeId;
use stemma::{
    LeafKind, SourceRange, Statement, StatementKind, StatementTree, VariableDeclaration,
};

/// A flat body of expression statements, one per line starting at `line`.
pub fn body(line: u32, statements: &[&str]) -> StatementTree {
    let mut tree = StatementTree::new();
    let root = tree.root;
    for (i, text) in statements.iter().enumerate() {
        push(&mut tree, root, line + i as u32, text);
    }
    tree
}

/// Append an expression leaf on one line.
pub fn push(tree: &mut StatementTree, parent: NodeId, line: u32, text: &str) -> NodeId {
    tree.add_child(
        parent,
        Statement::leaf(LeafKind::Expression, text).with_range(SourceRange::lines(line, line)),
    )
}

/// Append a local variable declaration on one line.
pub fn declare(tree: &mut StatementTree, parent: NodeId, line: u32, text: &str) -> NodeId {
    tree.add_child(
        parent,
        Statement::leaf(LeafKind::VariableDeclaration, text)
            .with_range(SourceRange::lines(line, line)),
    )
}

/// Append a composite spanning `lines`.
pub fn open(
    tree: &mut StatementTree,
    parent: NodeId,
    lines: (u32, u32),
    kind: StatementKind,
) -> NodeId {
    tree.add_child(
        parent,
        Statement::composite(kind).with_range(SourceRange::lines(lines.0, lines.1)),
    )
}

pub fn snapshot(classes: impl IntoIterator<Item = Class>) -> Snapshot {
    let mut builder = SnapshotBuilder::new();
    for class in classes {
        builder.add_class(class);
    }
    builder.build().expect("qualified names are unique")
}

/// Append a leaf of any kind on one line.
pub fn leaf(
    tree: &mut StatementTree,
    parent: NodeId,
    kind: LeafKind,
    line: u32,
    text: &str,
) -> NodeId {
    tree.add_child(
        parent,
        Statement::leaf(kind, text).with_range(SourceRange::lines(line, line)),
    )
}

fn find_body(variable: &str) -> StatementTree {
    let mut tree = StatementTree::new();
    let root = tree.root;
    let hit = open(
        &mut tree,
        root,
        (21, 23),
        StatementKind::If {
            condition: "cache.containsKey(id)".to_string(),
        },
    );
    leaf(&mut tree, hit, LeafKind::Return, 22, "return cache.get(id);");
    declare(&mut tree, root, 24, &format!("Item {variable} = repo.load(id);"));
    push(&mut tree, root, 25, &format!("cache.put(id, {variable});"));
    leaf(&mut tree, root, LeafKind::Return, 26, &format!("return {variable};"));
    tree
}

fn save_body() -> StatementTree {
    let mut tree = StatementTree::new();
    let root = tree.root;
    let each = open(
        &mut tree,
        root,
        (31, 35),
        StatementKind::EnhancedFor {
            variable: VariableDeclaration::new("Item", "existing", None),
            iterable: "cache.values()".to_string(),
        },
    );
    let dup = open(
        &mut tree,
        each,
        (32, 34),
        StatementKind::If {
            condition: "existing.same(item)".to_string(),
        },
    );
    leaf(
        &mut tree,
        dup,
        LeafKind::Throw,
        33,
        "throw new IllegalStateException(\"duplicate\");",
    );
    push(&mut tree, root, 36, "repo.store(item);");
    push(&mut tree, root, 37, "cache.put(item.id(), item);");
    tree
}

/// A cache-backed service class; `lookup` names the finder operation and
/// `variable` its local.
pub fn service(index: usize, lookup: &str, variable: &str) -> Class {
    let name = format!("Service{index}");
    Class::new(
        &format!("src/com/acme/svc{index}/{name}.java"),
        &format!("com.acme.svc{index}.{name}"),
    )
    .with_attribute(Attribute::new("repo", "Repository"))
    .with_attribute(Attribute::new("cache", "Map<String, Item>"))
    .with_operation(
        Operation::constructor(&name)
            .with_parameter("repo", "Repository")
            .with_body(body(11, &["this.repo = repo;", "this.cache = new HashMap<>();"]))
            .with_range(SourceRange::lines(10, 13)),
    )
    .with_operation(
        Operation::new(lookup)
            .with_parameter("id", "String")
            .returning("Item")
            .with_body(find_body(variable))
            .with_range(SourceRange::lines(20, 27)),
    )
    .with_operation(
        Operation::new("save")
            .with_parameter("item", "Item")
            .with_body(save_body())
            .with_range(SourceRange::lines(30, 38)),
    )
}
