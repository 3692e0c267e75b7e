// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Unit tests for operations, targets and sub-queries

use unified_query_ir::{
    Aggregation, Expression, Filter, Function, JoinType, LockMode, Operation, OperationKind, Path,
    Projection, ProjectionItem, Sort, SortDirection, SubQuery, Target, Validate, ValueType,
};

fn order_target() -> Target {
    Target::new("Order").with_alias("o").join(
        JoinType::Left,
        Target::new("Customer").with_alias("c"),
        Some(Filter::eq(
            Path::untyped("customer").of_target("o"),
            Path::untyped("c"),
        )),
    )
}

#[test]
fn test_select_builder() {
    let op = Operation::select(order_target())
        .with_filter(Filter::gt(
            Path::new("total", ValueType::Decimal).of_target("o"),
            Expression::constant(100),
        ))
        .with_sort(Sort::new().desc(Path::untyped("total").of_target("o")))
        .with_limit(10)
        .with_offset(20)
        .with_distinct()
        .with_lock_mode(LockMode::PessimisticRead)
        .with_hint("timeout", "500");

    assert_eq!(op.kind, OperationKind::Select);
    assert_eq!(op.limit, Some(10));
    assert_eq!(op.offset, Some(20));
    assert!(op.distinct);
    assert_eq!(op.hints.get("timeout").map(String::as_str), Some("500"));
    assert_eq!(
        op.sort.as_ref().map(|s| s.items[0].direction),
        Some(SortDirection::Desc)
    );
    assert!(op.validate().is_ok());
}

#[test]
fn test_join_keywords() {
    assert_eq!(JoinType::Inner.keyword(), "INNER JOIN");
    assert_eq!(JoinType::Left.keyword(), "LEFT JOIN");
    assert_eq!(JoinType::Right.keyword(), "RIGHT JOIN");
}

#[test]
fn test_nested_join_validation() {
    let target = Target::new("A").inner_join(
        Target::new("B"),
        Filter::eq(Path::untyped("x"), Expression::Constant(unified_query_ir::Value::Null)),
    );
    assert!(target.validate().is_err());
}

#[test]
fn test_grouped_projection() {
    let op = Operation::select(Target::new("Order"))
        .with_aggregation(
            Aggregation::group_by(vec![Path::untyped("status").into()])
                .having(Filter::gt(Function::count(Path::untyped("id")), Expression::constant(2))),
        )
        .with_projection(Projection::properties(vec![
            ProjectionItem::new("status", Path::new("status", ValueType::String)),
            ProjectionItem::new("orders", Function::count(Path::untyped("id"))),
        ]));
    assert!(op.validate().is_ok());
}

#[test]
fn test_exists_subquery() {
    let items = SubQuery::new(
        Target::new("Item").with_alias("i"),
        Projection::Path(Path::untyped("id").of_target("i")),
    )
    .with_filter(Filter::eq(
        Path::untyped("order").of_target("i"),
        Path::untyped("o"),
    ))
    .correlated_with("o");

    let op = Operation::select(Target::new("Order").with_alias("o"))
        .with_filter(Filter::exists(items));
    assert!(op.validate().is_ok());
}

#[test]
fn test_operation_serialization() {
    let op = Operation::update(Target::new("Account"))
        .set(Path::new("active", ValueType::Boolean), Expression::constant(false))
        .with_filter(Filter::lt(Path::untyped("balance"), Expression::constant(0)));
    let json = serde_json::to_value(&op).unwrap();
    assert_eq!(json["kind"], "update");
    let back: Operation = serde_json::from_value(json).unwrap();
    assert_eq!(back, op);
}
