use classdiff_config::MatchingConfig;
use classdiff_engine::diff_classes;
use classdiff_test_utils::{class, method, stmt};
use pretty_assertions::assert_eq;

#[test]
fn a_class_compared_with_itself_has_only_mappers() {
    let model = class("a.Ledger")
        .field("private long balance = 0")
        .method(method("public void deposit(long amount)").body(vec![
            stmt("check(amount);"),
            stmt("balance = balance + amount;"),
        ]))
        .method(method("public long balance()").body(vec![stmt("return balance;")]))
        .build();
    let copy = model.clone();

    let diff = diff_classes(&model, &copy, &MatchingConfig::default()).unwrap();

    assert!(diff.added_operations().is_empty());
    assert!(diff.removed_operations().is_empty());
    assert!(diff.added_attributes().is_empty());
    assert!(diff.removed_attributes().is_empty());
    assert!(diff.operation_diffs().is_empty());
    assert!(diff.attribute_diffs().is_empty());
    assert!(diff.refactorings().is_empty());
    assert_eq!(diff.operation_body_mappers().len(), model.operations.len());
    for mapper in diff.operation_body_mappers() {
        assert_eq!(mapper.non_mapped_elements_t1(), 0);
        assert_eq!(mapper.non_mapped_elements_t2(), 0);
    }
}

#[test]
fn same_signature_pairs_tolerate_changed_parameter_types() {
    let before = class("a.Index")
        .method(method("public void put(String key, int value)"))
        .method(method("public void put(String key)"))
        .method(method("public int size()"))
        .build();
    let after = class("a.Index")
        .method(method("public void put(String key, long value)"))
        .method(method("public void put(String key)"))
        .method(method("public boolean isEmpty()"))
        .build();

    let diff = diff_classes(&before, &after, &MatchingConfig::default()).unwrap();

    let pairs: Vec<(String, String)> = diff
        .operation_body_mappers()
        .iter()
        .map(|mapper| (mapper.operation1().signature(), mapper.operation2().signature()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("put(String, int)".to_owned(), "put(String, long)".to_owned()),
            ("put(String)".to_owned(), "put(String)".to_owned()),
        ]
    );
    for removed in diff.removed_operations() {
        assert!(after
            .operation_with_same_signature_ignoring_changed_types(removed)
            .is_none());
    }
    for added in diff.added_operations() {
        assert!(before
            .operation_with_same_signature_ignoring_changed_types(added)
            .is_none());
    }

    assert_eq!(diff.operation_diffs().len(), 1);
    let changes = &diff.operation_diffs()[0].parameter_type_changes;
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].0.name, "value");
    assert_eq!(changes[0].1.ty.as_str(), "long");
}

#[test]
fn surviving_invocation_renames_never_contradict_each_other() {
    let before = class("a.Jobs")
        .method(method("void x()").body(vec![stmt("a();")]))
        .method(method("void y()").body(vec![stmt("a();")]))
        .method(method("void z()").body(vec![stmt("c();")]))
        .method(method("void w()").body(vec![stmt("e();")]))
        .build();
    let after = class("a.Jobs")
        .method(method("void x()").body(vec![stmt("b();")]))
        .method(method("void y()").body(vec![stmt("b();")]))
        .method(method("void z()").body(vec![stmt("d();")]))
        .method(method("void w()").body(vec![stmt("d();")]))
        .build();

    let diff = diff_classes(&before, &after, &MatchingConfig::default()).unwrap();

    let renames: Vec<String> = diff
        .consistent_renames()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(renames, vec!["a -> b".to_owned()]);
    for first in diff.consistent_renames().iter() {
        for second in diff.consistent_renames().iter() {
            assert!(!first.conflicts_with(second));
        }
    }
}
