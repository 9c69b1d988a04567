use divan::{Bencher, black_box};
use refract::{Attribute, Class, DiffConfig, Operation, Snapshot, SnapshotBuilder};
use stemma::{LeafKind, SourceRange, Statement, StatementKind, StatementTree};

fn main() {
    divan::main();
}

fn body(seed: usize, statements: usize) -> StatementTree {
    let mut tree = StatementTree::new();
    let root = tree.root;
    let guard = tree.add_child(
        root,
        Statement::composite(StatementKind::If {
            condition: format!("ready{seed}()"),
        })
        .with_range(SourceRange::lines(2, 3)),
    );
    tree.add_child(
        guard,
        Statement::leaf(LeafKind::Return, "return;").with_range(SourceRange::lines(3, 3)),
    );
    for i in 0..statements {
        let line = 4 + i as u32;
        tree.add_child(
            root,
            Statement::leaf(
                LeafKind::Expression,
                &format!("state{i} = compute{seed}(state{i}, {i});"),
            )
            .with_range(SourceRange::lines(line, line)),
        );
    }
    tree
}

/// `classes` classes with eight operations each; the after side renames
/// every fourth operation and every tenth class.
fn snapshots(classes: usize) -> (Snapshot, Snapshot) {
    let build = |renamed: bool| {
        let mut builder = SnapshotBuilder::new();
        for c in 0..classes {
            let name = if renamed && c % 10 == 0 {
                format!("app.m{c}.Renamed{c}")
            } else {
                format!("app.m{c}.Unit{c}")
            };
            let mut class = Class::new(&format!("src/app/m{c}/Unit{c}.java"), &name)
                .with_attribute(Attribute::new("state", "State"));
            for o in 0..8 {
                let op = if renamed && o % 4 == 0 {
                    format!("handle{o}Now")
                } else {
                    format!("handle{o}")
                };
                class = class.with_operation(
                    Operation::new(&op)
                        .with_parameter("input", "Input")
                        .with_body(body(c * 8 + o, 6)),
                );
            }
            builder.add_class(class);
        }
        builder.build().expect("generated names are unique")
    };
    (build(false), build(true))
}

#[divan::bench(args = [10, 50, 200])]
fn diff_parallel(bencher: Bencher, classes: usize) {
    let (before, after) = snapshots(classes);
    let config = DiffConfig::default();
    bencher.bench_local(|| {
        let diff = black_box(&before).diff(black_box(&after), &config).unwrap();
        black_box(diff.refactorings().len());
    });
}

#[divan::bench(args = [10, 50, 200])]
fn diff_sequential(bencher: Bencher, classes: usize) {
    let (before, after) = snapshots(classes);
    let config = DiffConfig {
        parallel: false,
        ..DiffConfig::default()
    };
    bencher.bench_local(|| {
        let diff = black_box(&before).diff(black_box(&after), &config).unwrap();
        black_box(diff.refactorings().len());
    });
}

#[divan::bench(args = [10, 50, 200])]
fn to_json(bencher: Bencher, classes: usize) {
    let (before, after) = snapshots(classes);
    let diff = before.diff(&after, &DiffConfig::default()).unwrap();
    bencher.bench_local(|| {
        let json = refract::reports_to_json(black_box(diff.refactorings())).unwrap();
        black_box(json);
    });
}
