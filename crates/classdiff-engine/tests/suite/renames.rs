use classdiff_config::MatchingConfig;
use classdiff_engine::{diff_classes, Refactoring, RefactoringKind};
use classdiff_test_utils::{class, constructor, method, stmt};
use pretty_assertions::assert_eq;

fn names<'a>(operations: &[&'a classdiff_model::Operation]) -> Vec<&'a str> {
    operations.iter().map(|operation| operation.name.as_str()).collect()
}

#[test]
fn renamed_method_with_identical_body() {
    let before = class("a.Foo")
        .method(method("void bar(int x)").body(vec![stmt("helper();"), stmt("int y = x + 1;")]))
        .method(method("void helper()").body(vec![stmt("log(\"helper\");")]))
        .build();
    let after = class("a.Foo")
        .method(method("void baz(int x)").body(vec![stmt("helper();"), stmt("int y = x + 1;")]))
        .method(method("void helper()").body(vec![stmt("log(\"helper\");")]))
        .build();

    let diff = diff_classes(&before, &after, &MatchingConfig::default()).unwrap();

    assert_eq!(diff.refactorings().len(), 1);
    match &diff.refactorings()[0] {
        Refactoring::RenameOperation {
            original, renamed, ..
        } => {
            assert_eq!(original.name, "bar");
            assert_eq!(renamed.name, "baz");
        }
        other => panic!("expected a rename, got {other}"),
    }
    assert!(diff.removed_operations().is_empty());
    assert!(diff.added_operations().is_empty());
    assert_eq!(diff.operation_body_mappers().len(), 2);
}

#[test]
fn constructors_are_matched_without_a_rename() {
    let before = class("a.Account")
        .method(constructor("public Account(String id)").body(vec![stmt("this.id = id;")]))
        .build();
    let after = class("a.Account")
        .method(
            constructor("public Account(String id, int limit)")
                .body(vec![stmt("this.id = id;"), stmt("this.limit = limit;")]),
        )
        .build();

    let diff = diff_classes(&before, &after, &MatchingConfig::default()).unwrap();

    assert!(diff.refactorings().is_empty());
    assert!(diff.removed_operations().is_empty());
    assert!(diff.added_operations().is_empty());
    assert_eq!(diff.operation_diffs().len(), 1);
    let operation_diff = &diff.operation_diffs()[0];
    assert!(!operation_diff.renamed);
    assert_eq!(operation_diff.added_parameters.len(), 1);
    assert_eq!(operation_diff.added_parameters[0].name, "limit");
}

/// `x` now calls `b` where it called `a`, so `a -> b` is accepted even though
/// the two bodies share nothing.
#[test]
fn consistent_invocation_rename_explains_unrelated_bodies() {
    let before = class("a.Sync")
        .method(method("void x()").body(vec![stmt("a();")]))
        .method(method("void a()").body(vec![stmt("alpha(1, 2);")]))
        .build();
    let after = class("a.Sync")
        .method(method("void x()").body(vec![stmt("b();")]))
        .method(method("void b()").body(vec![stmt("int beta = 0;")]))
        .build();

    let diff = diff_classes(&before, &after, &MatchingConfig::default()).unwrap();

    assert!(diff.consistent_renames().contains("a", "b"));
    let kinds: Vec<_> = diff.refactorings().iter().map(Refactoring::kind).collect();
    assert_eq!(kinds, vec![RefactoringKind::RenameOperation]);
    assert!(diff.removed_operations().is_empty());
    assert!(diff.added_operations().is_empty());
}

/// `a -> b` and `c -> b` contradict each other; neither survives and neither
/// pair is matched.
#[test]
fn contradicting_invocation_renames_leave_operations_unmatched() {
    let before = class("a.Sync")
        .method(method("void x()").body(vec![stmt("a();")]))
        .method(method("void a()").body(vec![stmt("alpha(1, 2);")]))
        .method(method("void y()").body(vec![stmt("c();")]))
        .method(method("void c()").body(vec![stmt("gamma(\"x\");")]))
        .build();
    let after = class("a.Sync")
        .method(method("void x()").body(vec![stmt("b();")]))
        .method(method("void b()").body(vec![stmt("int beta = 0;")]))
        .method(method("void y()").body(vec![stmt("b();")]))
        .build();

    let diff = diff_classes(&before, &after, &MatchingConfig::default()).unwrap();

    assert!(diff.consistent_renames().is_empty());
    assert!(diff.refactorings().is_empty());
    assert_eq!(names(diff.removed_operations()), vec!["a", "c"]);
    assert_eq!(names(diff.added_operations()), vec!["b"]);
}

#[test]
fn operation_moved_into_an_anonymous_class() {
    let body = || {
        vec![
            stmt("log(\"start\");"),
            stmt("run(task);"),
            stmt("notify(listeners);"),
        ]
    };
    let before = class("a.Worker")
        .method(method("void start()").body(body()))
        .build();
    let after = class("a.Worker")
        .method(method("void schedule()").body(vec![stmt("executor.submit(runnable);")]))
        .anonymous("schedule()", vec![method("public void run()").body(body())])
        .build();

    let diff = diff_classes(&before, &after, &MatchingConfig::default()).unwrap();

    assert_eq!(diff.added_anonymous_classes().len(), 1);
    assert_eq!(diff.refactorings().len(), 1);
    let Refactoring::RenameOperation { renamed, .. } = &diff.refactorings()[0] else {
        panic!("expected a rename");
    };
    assert_eq!(renamed.name, "run");
    assert_eq!(renamed.class_name, "a.Worker$1");
    assert!(diff.removed_operations().is_empty());
    // the enclosing operation itself stays unexplained
    assert_eq!(names(diff.added_operations()), vec!["schedule"]);
}

/// Calls whose names look like getters do not count as missing when
/// deciding that a renamed operation lost part of its body to a helper.
#[test]
fn getter_prefixes_are_configurable() {
    let before = class("a.Page")
        .method(method("void render(Page page)").body(vec![
            stmt("header(page);"),
            stmt("drawBody(page);"),
            stmt("fetchTitle();"),
            stmt("fetchFooter();"),
        ]))
        .build();
    let after = class("a.Page")
        .method(method("void show(Page page)").body(vec![
            stmt("header(page);"),
            stmt("paint(page, 0);"),
        ]))
        .method(method("void paint(Page page, int depth)").body(vec![stmt("drawBody(page);")]))
        .build();

    let diff = diff_classes(&before, &after, &MatchingConfig::default()).unwrap();
    assert!(diff.refactorings().is_empty());
    assert_eq!(names(diff.removed_operations()), vec!["render"]);

    let config = MatchingConfig {
        getter_prefixes: vec!["fetch".to_owned()],
        ..MatchingConfig::default()
    };
    let diff = diff_classes(&before, &after, &config).unwrap();
    let kinds: Vec<_> = diff.refactorings().iter().map(Refactoring::kind).collect();
    assert_eq!(
        kinds,
        vec![RefactoringKind::RenameOperation, RefactoringKind::ExtractOperation]
    );
    assert!(diff.removed_operations().is_empty());
    assert!(diff.added_operations().is_empty());
}

/// `show` lost `drawBody(page, 0)` to the new `paint`, which it calls in its
/// place. The pair shares a single mapping, and the receiver change keeps the
/// helper evidence weak, so only that one unmatched call vouches for it.
#[test]
fn single_unmatched_call_into_an_added_operation_supports_a_rename() {
    let before = class("a.Page")
        .method(method("void render(Page page)").body(vec![
            stmt("cache.clear();"),
            stmt("drawBody(page, 0);"),
        ]))
        .build();
    let after = class("a.Page")
        .method(method("void show(Page page)").body(vec![
            stmt("store.clear();"),
            stmt("paint(page);"),
        ]))
        .method(method("void paint(Page page)").body(vec![stmt("drawBody(page, 0);")]))
        .build();

    let diff = diff_classes(&before, &after, &MatchingConfig::default()).unwrap();

    let kinds: Vec<_> = diff.refactorings().iter().map(Refactoring::kind).collect();
    assert_eq!(
        kinds,
        vec![RefactoringKind::RenameOperation, RefactoringKind::ExtractOperation]
    );
    let Refactoring::RenameOperation {
        original, renamed, ..
    } = &diff.refactorings()[0]
    else {
        panic!("expected a rename");
    };
    assert_eq!((original.name.as_str(), renamed.name.as_str()), ("render", "show"));
    assert!(diff.removed_operations().is_empty());
    assert!(diff.added_operations().is_empty());
}

#[test]
fn unmatched_call_into_an_unrelated_added_operation_is_no_evidence() {
    let before = class("a.Page")
        .method(method("void render(Page page)").body(vec![
            stmt("cache.clear();"),
            stmt("drawBody(page, 0);"),
        ]))
        .build();
    let after = class("a.Page")
        .method(method("void show(Page page)").body(vec![
            stmt("store.clear();"),
            stmt("paint(page);"),
        ]))
        .method(method("void paint(Page page)").body(vec![stmt("drawFrame(page, 0);")]))
        .build();

    let diff = diff_classes(&before, &after, &MatchingConfig::default()).unwrap();

    assert!(diff.refactorings().is_empty());
    assert_eq!(names(diff.removed_operations()), vec!["render"]);
    assert_eq!(names(diff.added_operations()), vec!["show", "paint"]);
}

fn order_test(total: u32) -> Vec<classdiff_model::Statement> {
    vec![
        stmt("Order order = newOrder();"),
        stmt(&format!("assertEquals({total}, order.total());")),
    ]
}

/// Test methods get no slack beyond the size difference of the pools.
#[test]
fn test_methods_moved_within_equal_pools_are_not_renamed() {
    let before = class("a.OrderTest")
        .method(method("void setUp()").body(vec![stmt("reset();")]))
        .method(method("void checksTotal()").annotated("@Test").body(order_test(10)))
        .build();
    let after = class("a.OrderTest")
        .method(method("void verifiesTotal()").annotated("@Test").body(order_test(12)))
        .method(method("void setUp()").body(vec![stmt("reset();")]))
        .build();

    let diff = diff_classes(&before, &after, &MatchingConfig::default()).unwrap();

    assert!(diff.refactorings().is_empty());
    assert_eq!(names(diff.removed_operations()), vec!["checksTotal"]);
    assert_eq!(names(diff.added_operations()), vec!["verifiesTotal"]);

    // the same move is tolerated when `@Test` does not mark test methods
    let config = MatchingConfig {
        test_annotations: vec!["ParameterizedTest".to_owned()],
        ..MatchingConfig::default()
    };
    let diff = diff_classes(&before, &after, &config).unwrap();
    let kinds: Vec<_> = diff.refactorings().iter().map(Refactoring::kind).collect();
    assert_eq!(kinds, vec![RefactoringKind::RenameOperation]);
}

#[test]
fn test_methods_moved_by_the_pool_size_difference_are_renamed() {
    let before = class("a.OrderTest")
        .method(method("void setUp()").body(vec![stmt("reset();")]))
        .method(method("void checksTotal()").annotated("@Test").body(order_test(10)))
        .build();
    let after = class("a.OrderTest")
        .method(method("void verifiesTotal()").annotated("@Test").body(order_test(12)))
        .method(method("void setUp()").body(vec![stmt("reset();")]))
        .method(
            method("void verifiesEmptyOrder()")
                .annotated("@Test")
                .body(vec![stmt("assertTrue(newOrder().isEmpty());")]),
        )
        .build();

    let diff = diff_classes(&before, &after, &MatchingConfig::default()).unwrap();

    assert_eq!(diff.refactorings().len(), 1);
    let Refactoring::RenameOperation {
        original, renamed, ..
    } = &diff.refactorings()[0]
    else {
        panic!("expected a rename");
    };
    assert_eq!((original.name.as_str(), renamed.name.as_str()), ("checksTotal", "verifiesTotal"));
    assert!(diff.removed_operations().is_empty());
    assert_eq!(names(diff.added_operations()), vec!["verifiesEmptyOrder"]);
}

/// `render` now does inline what `print` delegated to `layout`; the call it
/// picked up from `layout` is what pairs `print` with `render`.
#[test]
fn rename_accepted_through_an_inlined_removed_operation() {
    let layout = |statement: &str| method("void layout(Grid grid)").body(vec![stmt(statement)]);
    let before = |statement: &str| {
        class("a.Report")
            .method(method("void print(Sheet sheet)").body(vec![
                stmt("header(sheet);"),
                stmt("layout(sheet.grid());"),
            ]))
            .method(layout(statement))
            .build()
    };
    let after = class("a.Report")
        .method(method("void render(Sheet sheet)").body(vec![
            stmt("header(sheet);"),
            stmt("drawGrid(sheet.grid(), 0);"),
        ]))
        .build();

    let inlining = before("drawGrid(grid, 0);");
    let diff = diff_classes(&inlining, &after, &MatchingConfig::default()).unwrap();

    let kinds: Vec<_> = diff.refactorings().iter().map(Refactoring::kind).collect();
    assert_eq!(
        kinds,
        vec![RefactoringKind::RenameOperation, RefactoringKind::InlineOperation]
    );
    assert_eq!(diff.refactorings()[0].subject().name, "print");
    assert_eq!(diff.refactorings()[1].subject().name, "layout");
    assert!(diff.removed_operations().is_empty());
    assert!(diff.added_operations().is_empty());

    // `layout` never made the call, so nothing vouches for the pair
    let unrelated = before("drawLines(grid, 0);");
    let diff = diff_classes(&unrelated, &after, &MatchingConfig::default()).unwrap();
    assert!(diff.refactorings().is_empty());
    assert_eq!(names(diff.removed_operations()), vec!["print", "layout"]);
    assert_eq!(names(diff.added_operations()), vec!["render"]);
}
