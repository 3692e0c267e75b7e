// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Proptest strategies
//!
//! Filters are generated over a fixed four-column row so that every leaf
//! can be evaluated:
//!
//! | Property | Type    |
//! |----------|---------|
//! | `qty`    | Integer |
//! | `price`  | Float   |
//! | `label`  | String  |
//! | `flag`   | Boolean |

use proptest::collection::vec;
use proptest::prelude::*;
use unified_query_ir::{Filter, Function, Path, Target, Value, ValueType};

use crate::evaluator::Row;

fn qty() -> Path {
    Path::new("qty", ValueType::Integer)
}

fn price() -> Path {
    Path::new("price", ValueType::Float)
}

fn label() -> Path {
    Path::new("label", ValueType::String)
}

fn flag() -> Path {
    Path::new("flag", ValueType::Boolean)
}

fn int_value() -> impl Strategy<Value = Value> {
    (-50i64..50).prop_map(Value::Integer)
}

fn float_value() -> impl Strategy<Value = Value> {
    (-200i64..200).prop_map(|quarters| Value::Float(quarters as f64 / 4.0))
}

/// Short strings that include `LIKE` metacharacters and quotes
pub fn text() -> impl Strategy<Value = String> {
    "[a-cA-C%_!' ]{0,5}"
}

/// A row over `qty`, `price`, `label` and `flag`
pub fn row() -> impl Strategy<Value = Row> {
    (int_value(), float_value(), text(), any::<bool>()).prop_map(|(qty, price, label, flag)| {
        Row::from([
            ("qty".to_string(), qty),
            ("price".to_string(), price),
            ("label".to_string(), Value::String(label)),
            ("flag".to_string(), Value::Boolean(flag)),
        ])
    })
}

/// Leaf predicates; every constant they hold is non-null
pub fn leaf_filter() -> impl Strategy<Value = Filter> {
    prop_oneof![
        int_value().prop_map(|v| Filter::eq(qty(), v)),
        int_value().prop_map(|v| Filter::ne(qty(), v)),
        float_value().prop_map(|v| Filter::gt(price(), v)),
        float_value().prop_map(|v| Filter::lte(price(), v)),
        (int_value(), int_value()).prop_map(|(a, b)| Filter::between(qty(), a, b)),
        vec(int_value(), 1..4).prop_map(|values| Filter::in_list(qty(), values)),
        vec(int_value(), 1..3).prop_map(|values| Filter::not_in(qty(), values)),
        any::<bool>().prop_map(|b| Filter::eq(flag(), Value::Boolean(b))),
        Just(Filter::is_not_null(label())),
        text().prop_map(|s| Filter::contains(label(), &s)),
        text().prop_map(|s| Filter::starts_with(label(), &s).ignore_case()),
        text().prop_map(|s| Filter::ends_with(label(), &s)),
        text().prop_map(|s| Filter::eq(Function::upper(label()), Value::String(s.to_uppercase()))),
    ]
}

/// Nested predicates with non-empty junctions
pub fn filter() -> impl Strategy<Value = Filter> {
    leaf_filter().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            vec(inner.clone(), 1..4).prop_map(Filter::And),
            vec(inner.clone(), 1..4).prop_map(Filter::Or),
            inner.prop_map(Filter::not),
        ]
    })
}

/// Identifiers usable as target names
pub fn entity_name() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{0,7}"
}

/// `name` joined with itself `joins` times
pub fn self_join(name: &str, joins: usize) -> Target {
    (0..joins).fold(Target::new(name), |target, _| {
        target.inner_join(Target::new(name), Filter::is_not_null(Path::untyped("id")))
    })
}
