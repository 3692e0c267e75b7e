// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Test fixtures and sample data

use chrono::NaiveDate;
use unified_query_catalog::StaticCatalog;
use unified_query_ir::{
    Aggregation, Expression, Filter, Function, Operation, Path, Projection, ProjectionItem, Sort,
    SubQuery, Target, Value, ValueType,
};

use crate::evaluator::Row;

/// Sample operations, catalogs and rows
pub struct QueryFixtures;

impl QueryFixtures {
    /// Catalog file describing the order/customer schema
    pub const CATALOG_YAML: &'static str = r#"
entities:
  - name: order
    entity_name: PurchaseOrder
    attributes:
      - { name: id, value_type: integer, is_id: true }
      - { name: customerId, value_type: integer }
      - { name: status, value_type: string }
      - { name: total, value_type: decimal }
      - { name: placedOn, value_type: date }
  - name: customer
    entity_name: Customer
    attributes:
      - { name: id, value_type: integer, is_id: true }
      - { name: name, value_type: string }
scoped:
  archive:
    - name: order
      entity_name: ArchivedOrder
"#;

    /// [`Self::CATALOG_YAML`] loaded into a static catalog
    pub fn catalog() -> StaticCatalog {
        match StaticCatalog::from_yaml_str(Self::CATALOG_YAML) {
            Ok(catalog) => catalog,
            Err(err) => panic!("fixture catalog is invalid: {}", err),
        }
    }

    pub fn status() -> Path {
        Path::new("status", ValueType::String)
    }

    pub fn total() -> Path {
        Path::new("total", ValueType::Decimal)
    }

    pub fn placed_on() -> Path {
        Path::new("placedOn", ValueType::Date)
    }

    /// Open orders, newest first
    pub fn open_orders() -> Operation {
        Operation::select(Target::new("order"))
            .with_filter(Filter::eq(Self::status(), Value::from("open")))
            .with_sort(Sort::new().desc(Self::placed_on()))
    }

    /// `price BETWEEN low AND high` written as two comparisons
    pub fn price_range(low: i64, high: i64) -> Filter {
        let price = Path::new("price", ValueType::Integer);
        Filter::and([
            Filter::gte(price.clone(), Value::from(low)),
            Filter::lte(price, Value::from(high)),
        ])
    }

    /// Customers that placed at least one order above `threshold`
    pub fn customers_with_large_orders(threshold: i64) -> Operation {
        let orders = SubQuery::new(
            Target::new("order"),
            Projection::Path(Path::new("id", ValueType::Integer)),
        )
        .with_filter(Filter::and([
            Filter::eq(
                Path::new("customerId", ValueType::Integer),
                Path::new("id", ValueType::Integer).of_target("customer"),
            ),
            Filter::gt(Self::total(), Value::from(threshold)),
        ]))
        .correlated_with("customer");
        Operation::select(Target::new("customer")).with_filter(Filter::exists(orders))
    }

    /// Order count and revenue per status
    pub fn totals_by_status() -> Operation {
        Operation::select(Target::new("order"))
            .with_aggregation(
                Aggregation::group_by([Expression::from(Self::status())])
                    .having(Filter::gt(Function::count(Path::untyped("id")), Value::from(1))),
            )
            .with_projection(Projection::properties([
                ProjectionItem::new("status", Self::status()),
                ProjectionItem::new("orders", Function::count(Path::untyped("id"))),
                ProjectionItem::new("revenue", Function::sum(Self::total())),
            ]))
    }

    /// Mark open orders placed before `day` as stale
    pub fn close_stale_orders(day: NaiveDate) -> Operation {
        Operation::update(Target::new("order"))
            .set(Self::status(), Value::from("stale"))
            .with_filter(Filter::and([
                Filter::eq(Self::status(), Value::from("open")),
                Filter::lt(Self::placed_on(), Value::from(day)),
            ]))
    }

    pub fn purge_cancelled() -> Operation {
        Operation::delete(Target::new("order"))
            .with_filter(Filter::eq(Self::status(), Value::from("cancelled")))
    }

    /// Orders keyed the way the evaluator reads them
    pub fn sample_rows() -> Vec<Row> {
        let order = |id: i64, status: &str, total: &str, day: u32| {
            Row::from([
                ("id".to_string(), Value::from(id)),
                ("status".to_string(), Value::from(status)),
                ("total".to_string(), Value::Decimal(total.to_string())),
                (
                    "placedOn".to_string(),
                    NaiveDate::from_ymd_opt(2024, 3, day).map_or(Value::Null, Value::from),
                ),
            ])
        };
        vec![
            order(1, "open", "19.99", 1),
            order(2, "open", "250.00", 12),
            order(3, "cancelled", "75.10", 20),
            order(4, "shipped", "1200.00", 28),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::evaluate;
    use unified_query_catalog::EntityCatalog;
    use unified_query_ir::Validate;

    #[test]
    fn test_catalog_fixture_loads() {
        let catalog = QueryFixtures::catalog();
        assert_eq!(catalog.resolve("default", "order").unwrap().entity_name, "PurchaseOrder");
        assert_eq!(catalog.resolve("archive", "order").unwrap().entity_name, "ArchivedOrder");
    }

    #[test]
    fn test_operations_are_valid() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        for operation in [
            QueryFixtures::open_orders(),
            QueryFixtures::customers_with_large_orders(100),
            QueryFixtures::totals_by_status(),
            QueryFixtures::close_stale_orders(day),
            QueryFixtures::purge_cancelled(),
        ] {
            assert!(operation.validate().is_ok(), "{:?}", operation.kind);
        }
    }

    #[test]
    fn test_rows_match_open_orders() {
        let filter = QueryFixtures::open_orders().filter.unwrap();
        let open = QueryFixtures::sample_rows()
            .iter()
            .filter(|row| evaluate(&filter, row).unwrap())
            .count();
        assert_eq!(open, 2);
    }
}
