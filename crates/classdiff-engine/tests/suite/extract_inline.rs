use classdiff_config::MatchingConfig;
use classdiff_engine::{diff_classes, Refactoring, RefactoringKind};
use classdiff_mapper::ReplacementKind;
use classdiff_test_utils::{class, compound, method, stmt};
use pretty_assertions::assert_eq;

fn added_names(diff: &classdiff_engine::ClassDiff<'_>) -> Vec<String> {
    diff.added_operations()
        .iter()
        .map(|operation| operation.name.clone())
        .collect()
}

#[test]
fn tail_of_a_method_extracted_into_a_helper() {
    let before = class("a.Checkout")
        .method(method("void process(Order order)").body(vec![
            stmt("load(order);"),
            stmt("int total = order.total();"),
            stmt("check(total);"),
            stmt("log(total);"),
            stmt("audit(order);"),
        ]))
        .build();
    let after = class("a.Checkout")
        .method(method("void process(Order order)").body(vec![
            stmt("load(order);"),
            stmt("int total = order.total();"),
            stmt("validate(order, total);"),
        ]))
        .method(method("private void validate(Order order, int total)").body(vec![
            stmt("check(total);"),
            stmt("log(total);"),
            stmt("audit(order);"),
        ]))
        .build();

    let diff = diff_classes(&before, &after, &MatchingConfig::default()).unwrap();

    assert_eq!(diff.refactorings().len(), 1);
    let Refactoring::ExtractOperation {
        extracted,
        source_before,
        source_after,
        invocation,
        delegate_target,
        mapper,
    } = &diff.refactorings()[0]
    else {
        panic!("expected an extract");
    };
    assert_eq!(extracted.name, "validate");
    assert_eq!(source_before.name, "process");
    assert_eq!(source_after.name, "process");
    assert_eq!(invocation.to_string(), "validate(order, total)");
    assert!(delegate_target.is_none());
    assert_eq!(mapper.exact_match_count(), 3);

    assert!(diff.added_operations().is_empty());
    assert!(diff.removed_operations().is_empty());
    // `process` stays matched and carries the extracted body as an additional mapper
    let process = &diff.operation_body_mappers()[0];
    assert_eq!(process.operation1().name, "process");
    assert_eq!(process.additional_mappers().len(), 1);
}

#[test]
fn extracted_delegate_points_at_the_operation_doing_the_work() {
    let before = class("a.Store")
        .method(method("void save(Record record)").body(vec![
            stmt("open();"),
            stmt("write(record);"),
            stmt("flush();"),
            stmt("close();"),
        ]))
        .build();
    let after = class("a.Store")
        .method(method("void save(Record record)").body(vec![
            stmt("open();"),
            stmt("persist(record, true);"),
            stmt("close();"),
        ]))
        .method(method("void persist(Record record, boolean sync)").body(vec![stmt("doPersist(record);")]))
        .method(method("void doPersist(Record record)").body(vec![
            stmt("write(record);"),
            stmt("flush();"),
        ]))
        .build();

    let diff = diff_classes(&before, &after, &MatchingConfig::default()).unwrap();

    assert_eq!(diff.refactorings().len(), 1);
    let refactoring = &diff.refactorings()[0];
    assert_eq!(refactoring.kind(), RefactoringKind::ExtractAndMoveDelegate);
    let Refactoring::ExtractOperation {
        extracted,
        delegate_target,
        ..
    } = refactoring
    else {
        panic!("expected an extract");
    };
    assert_eq!(extracted.name, "persist");
    assert_eq!(delegate_target.map(|op| op.name.as_str()), Some("doPersist"));
    // only the called operation leaves the pool
    assert_eq!(added_names(&diff), vec!["doPersist".to_owned()]);
}

#[test]
fn helper_inlined_into_its_caller() {
    let before = class("a.Batch")
        .method(method("void a(List items)").body(vec![
            stmt("start();"),
            stmt("removedHelper(items, true);"),
            stmt("finish();"),
        ]))
        .method(method("void removedHelper(List values, boolean force)").body(vec![
            stmt("prepare(values);"),
            stmt("cleanup();"),
        ]))
        .build();
    let after = class("a.Batch")
        .method(method("void a(List items)").body(vec![
            stmt("start();"),
            stmt("prepare(items);"),
            stmt("cleanup();"),
            stmt("finish();"),
        ]))
        .build();

    let diff = diff_classes(&before, &after, &MatchingConfig::default()).unwrap();

    assert_eq!(diff.refactorings().len(), 1);
    let Refactoring::InlineOperation {
        inlined,
        target_before,
        target_after,
        invocation,
        mapper,
    } = &diff.refactorings()[0]
    else {
        panic!("expected an inline");
    };
    assert_eq!(inlined.name, "removedHelper");
    assert_eq!(target_before.name, "a");
    assert_eq!(target_after.name, "a");
    assert_eq!(invocation.arguments, vec!["items".to_owned(), "true".to_owned()]);
    // `values` is read as `items`
    assert_eq!(mapper.exact_match_count(), 2);

    assert!(diff.removed_operations().is_empty());
    assert!(diff.added_operations().is_empty());
    assert_eq!(diff.operation_body_mappers()[0].additional_mappers().len(), 1);
}

#[test]
fn inlined_and_extracted_operations_are_never_renamed() {
    let before = class("a.Batch")
        .method(method("void a(List items)").body(vec![
            stmt("start();"),
            stmt("removedHelper(items, true);"),
            stmt("finish();"),
        ]))
        .method(method("void removedHelper(List values, boolean force)").body(vec![
            stmt("prepare(values);"),
            stmt("cleanup();"),
        ]))
        .method(method("void b(Job job)").body(vec![
            stmt("begin(job);"),
            stmt("step(job);"),
            stmt("end(job);"),
        ]))
        .build();
    let after = class("a.Batch")
        .method(method("void a(List items)").body(vec![
            stmt("start();"),
            stmt("prepare(items);"),
            stmt("cleanup();"),
            stmt("finish();"),
        ]))
        .method(method("void b(Job job)").body(vec![
            stmt("begin(job);"),
            stmt("work(job, 1);"),
        ]))
        .method(method("void work(Job job, int attempts)").body(vec![
            stmt("step(job);"),
            stmt("end(job);"),
        ]))
        .build();

    let diff = diff_classes(&before, &after, &MatchingConfig::default()).unwrap();

    let mut kinds: Vec<_> = diff.refactorings().iter().map(Refactoring::kind).collect();
    kinds.sort_by_key(|kind| kind.to_string());
    assert_eq!(
        kinds,
        vec![RefactoringKind::ExtractOperation, RefactoringKind::InlineOperation]
    );
    let consumed: Vec<&str> = diff
        .refactorings()
        .iter()
        .map(|refactoring| refactoring.subject().name.as_str())
        .collect();
    assert_eq!(consumed, vec!["removedHelper", "work"]);
    assert!(diff.removed_operations().is_empty());
    assert!(diff.added_operations().is_empty());
}

/// The argument `value` is now wrapped in a call to a new operation that
/// returns it, guarded by a null check with a default. Only `return value;`
/// lines up with the old statement, which alone would be too little.
#[test]
fn argument_wrapped_in_an_operation_with_a_default_return() {
    let before = class("a.Printer")
        .method(method("void show(String value)").body(vec![stmt("consume(value);")]))
        .build();
    let after = class("a.Printer")
        .method(method("void show(String value)").body(vec![stmt("consume(orDefault(value));")]))
        .method(method("String orDefault(String value)").body(vec![
            compound("if (value == null)", vec![stmt("return \"none\";")]),
            stmt("return value;"),
        ]))
        .build();

    let diff = diff_classes(&before, &after, &MatchingConfig::default()).unwrap();

    let kinds: Vec<_> = diff.refactorings().iter().map(Refactoring::kind).collect();
    assert_eq!(kinds, vec![RefactoringKind::ExtractOperation]);
    let Refactoring::ExtractOperation {
        extracted, mapper, ..
    } = &diff.refactorings()[0]
    else {
        panic!("expected an extract");
    };
    assert_eq!(extracted.name, "orDefault");
    assert_eq!(mapper.mappings().len(), 1);
    let mapping = &mapper.mappings()[0];
    assert_eq!(mapping.fragment1.text, "consume(value);");
    assert_eq!(mapping.fragment2.text, "return value;");
    assert!(mapping.contains_replacement(ReplacementKind::ArgumentReplacedWithReturnExpression));
    assert!(added_names(&diff).is_empty());
}
