use classdiff_config::MatchingConfig;
use classdiff_engine::diff_classes;
use classdiff_test_utils::{class, method, stmt};
use pretty_assertions::assert_eq;

#[test]
fn superclass_change_alone_renders_nothing() {
    let before = class("a.Repo").extends("Base").build();
    let after = class("a.Repo").extends("AbstractRepo").build();

    let diff = diff_classes(&before, &after, &MatchingConfig::default()).unwrap();

    assert!(diff.superclass_changed());
    assert!(diff.is_empty());
    assert_eq!(diff.to_string(), "");
}

#[test]
fn rename_report_lists_the_diff_and_every_mapper() {
    let before = class("a.Foo")
        .method(method("void bar(int x)").body(vec![stmt("helper();"), stmt("int y = x + 1;")]))
        .method(method("void helper()").body(vec![stmt("log(\"helper\");")]))
        .build();
    let after = class("a.Foo")
        .method(method("void baz(int x)").body(vec![stmt("helper();"), stmt("int y = x + 1;")]))
        .method(method("void helper()").body(vec![stmt("log(\"helper\");")]))
        .build();

    let diff = diff_classes(&before, &after, &MatchingConfig::default()).unwrap();

    assert_eq!(
        diff.to_string(),
        "a.Foo:\n\
         \tpackage bar(x int) : void\n\
         \trenamed from bar to baz\n\
         package helper() : void -> package helper() : void\n\
         package bar(x int) : void -> package baz(x int) : void\n"
    );
}

#[test]
fn pools_are_sorted_and_attribute_changes_follow() {
    let before = class("a.Cache")
        .field("private int size")
        .method(method("int count()").body(vec![stmt("return size;")]))
        .build();
    let after = class("a.Cache")
        .field("private long size")
        .field("protected final int limit = 10")
        .method(method("int count()").body(vec![stmt("return size;")]))
        .method(method("void clear()").body(vec![stmt("size = 0;")]))
        .build();

    let diff = diff_classes(&before, &after, &MatchingConfig::default()).unwrap();

    assert_eq!(
        diff.to_string(),
        "a.Cache:\n\
         operation package clear() : void added\n\
         attribute protected limit : int added\n\
         \tprivate size : int\n\
         \ttype changed from int to long\n\
         package count() : int -> package count() : int\n"
    );
}
