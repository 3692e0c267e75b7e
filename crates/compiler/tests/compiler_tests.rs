// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Compilation against catalogs, configurations and executors' rows

use std::sync::Arc;
use std::thread;

use chrono::NaiveDate;
use serde_json::json;
use unified_query_catalog::{CachedCatalog, CatalogError};
use unified_query_compiler::{CompileError, CompilerConfig, QueryCompiler};
use unified_query_ir::{
    Filter, LockMode, Operation, OperationKind, Path, Platform, Projection, SubQuery, Target, Value,
    ValueType,
};
use unified_query_lowering::{ConvertError, RawRow, ResolveError, ResultShape, ResultValue};
use unified_query_test_utils::{MockCatalogBuilder, QueryAssertions, QueryFixtures};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn compiler(platform: Platform) -> QueryCompiler {
    let catalog = MockCatalogBuilder::new().with_standard_schema().build();
    QueryCompiler::new(CompilerConfig::new(platform).with_log_statements(true))
        .unwrap()
        .with_catalog(Arc::new(catalog))
}

#[test]
fn test_statement_carries_execution_metadata() {
    init_tracing();
    let operation = QueryFixtures::open_orders()
        .with_limit(20)
        .with_offset(40)
        .with_lock_mode(LockMode::PessimisticWrite)
        .with_hint("org.hibernate.readOnly", "true");
    let statement = compiler(Platform::Hibernate).compile(&operation).unwrap();

    assert_eq!(statement.kind, OperationKind::Select);
    assert_eq!(statement.limit, Some(20));
    assert_eq!(statement.offset, Some(40));
    assert_eq!(statement.lock_mode, LockMode::PessimisticWrite);
    assert_eq!(statement.hints.get("org.hibernate.readOnly").map(String::as_str), Some("true"));
    assert!(!statement.text.contains("20"));

    let json = statement.to_json().unwrap();
    assert_eq!(json["text"], json!(statement.text));
    assert_eq!(json["limit"], json!(20));
    assert!(json.get("converter").is_none());
}

#[test]
fn test_select_all_on_unknown_platform() {
    let statement = compiler(Platform::Unknown)
        .compile(&Operation::select(Target::new("product")).with_projection(Projection::SelectAll))
        .unwrap();
    assert_eq!(
        statement.text,
        "SELECT prod_0_0.id AS id, prod_0_0.name AS name, prod_0_0.price AS price \
         FROM Product prod_0_0"
    );
    assert_eq!(statement.shape, Some(ResultShape::Array));
    assert_eq!(statement.selections.len(), 3);

    let row = RawRow::Array(vec![Value::from(7), Value::from("Lamp"), Value::from(12)]);
    let converted = statement.convert(&row).unwrap();
    assert_eq!(converted.field("price"), Some(&Value::Float(12.0)));
}

#[test]
fn test_record_rows_are_tuples_where_supported() {
    let statement = compiler(Platform::EclipseLink)
        .compile(&QueryFixtures::totals_by_status())
        .unwrap();
    assert_eq!(statement.shape, Some(ResultShape::Tuple));
    let row = RawRow::Tuple(vec![
        ("status".into(), Value::from("open")),
        ("orders".into(), Value::from(3)),
        ("revenue".into(), Value::Decimal("99.90".into())),
    ]);
    let first = statement.convert(&row).unwrap();
    assert_eq!(first, statement.convert(&row).unwrap());
    assert_eq!(first.field("revenue"), Some(&Value::Decimal("99.90".into())));
}

#[test]
fn test_write_statement_has_no_rows() {
    let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    let statement = compiler(Platform::OpenJpa)
        .compile(&QueryFixtures::close_stale_orders(day))
        .unwrap();
    assert!(statement.is_write());
    assert_eq!(
        statement.text,
        "UPDATE PurchaseOrder orde_0_0 SET orde_0_0.status=:p0001 \
         WHERE (orde_0_0.status=:p0002) AND (orde_0_0.placedOn<:p0003)"
    );
    assert!(statement.shape.is_none());
    let rows = RawRow::Array(vec![Value::from(1)]);
    match statement.convert(&rows) {
        Err(ConvertError::ShapeMismatch { expected, found }) => {
            assert_eq!(expected, "no");
            assert_eq!(found, rows.shape_name());
            assert_eq!(found, "array");
        }
        other => panic!("unexpected conversion {:?}", other),
    }
}

#[test]
fn test_unknown_target_is_a_catalog_error() {
    let err = compiler(Platform::Hibernate)
        .compile(&Operation::select(Target::new("invoice")))
        .unwrap_err();
    assert!(matches!(
        err,
        CompileError::Resolve(ResolveError::Catalog(CatalogError::EntityNotFound { .. }))
    ));

    let explicit = compiler(Platform::Hibernate)
        .compile(&Operation::select(Target::new("invoice").with_entity("Invoice")))
        .unwrap();
    assert_eq!(explicit.text, "SELECT invo_0_0 FROM Invoice invo_0_0");
}

#[test]
fn test_nesting_limit() {
    let config = CompilerConfig::new(Platform::Hibernate).with_max_depth(1);
    let compiler = QueryCompiler::new(config).unwrap();
    let id = || Path::new("id", ValueType::Integer);
    let inner = SubQuery::new(Target::new("C"), Projection::Path(id()));
    let middle = SubQuery::new(Target::new("B"), Projection::Path(id()))
        .with_filter(Filter::in_query(id(), inner));
    let operation = Operation::select(Target::new("A")).with_filter(Filter::in_query(id(), middle));

    let err = compiler.compile(&operation).unwrap_err();
    assert!(matches!(
        err,
        CompileError::Resolve(ResolveError::RecursionLimitExceeded { depth: 2, limit: 1, .. })
    ));
}

#[test]
fn test_shared_compiler_across_threads() {
    let mock = MockCatalogBuilder::new().with_standard_schema().build();
    let catalog = Arc::new(CachedCatalog::new(mock.clone()));
    let compiler = QueryCompiler::new(CompilerConfig::new(Platform::Hibernate))
        .unwrap()
        .with_catalog(catalog.clone());

    let texts: Vec<String> = thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| compiler.compile(&QueryFixtures::purge_cancelled()).map(|st| st.text)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect()
    });

    assert!(texts.iter().all(|text| text == &texts[0]));
    QueryAssertions::assert_parameters_in_order(&texts[0], &["p0001"]);
    assert_eq!(catalog.len(), 1);
    assert!(mock.lookups() >= 1 && mock.lookups() <= 4);

    compiler.compile(&QueryFixtures::purge_cancelled()).unwrap();
    assert!(mock.lookups() <= 4);
}

#[test]
fn test_compiler_from_settings() {
    let settings = json!({
        "unifiedQuery": {
            "provider": "org.hibernate.jpa.HibernatePersistenceProvider",
            "aliasMode": "default"
        }
    });
    let config = CompilerConfig::from_settings(&settings).unwrap();
    let compiler = QueryCompiler::new(config).unwrap();
    assert_eq!(compiler.dialect().platform(), Platform::Hibernate);

    let statement = compiler
        .compile(&Operation::select(Target::new("Order").with_alias("o")).with_filter(Filter::eq(
            Path::new("total", ValueType::Decimal),
            Value::from(5),
        )))
        .unwrap();
    assert_eq!(statement.text, "SELECT o FROM Order o WHERE o.total=:p0001");
    let parameter = statement.parameters.get("p0001").unwrap();
    assert_eq!(parameter.value_type, ValueType::Decimal);
}

#[test]
fn test_entity_rows_are_left_to_the_host() {
    let statement = compiler(Platform::Hibernate)
        .compile(&QueryFixtures::customers_with_large_orders(100))
        .unwrap();
    assert_eq!(
        statement.shape,
        Some(ResultShape::Scalar(ValueType::Entity("Customer".into())))
    );
    let row = RawRow::Scalar(Value::from(1));
    assert!(matches!(
        statement.convert(&row).unwrap(),
        ResultValue::Entity { ref entity, .. } if entity == "Customer"
    ));
}

#[test]
fn test_correlated_delete_needs_outer_alias() {
    let blocked = SubQuery::new(
        Target::new("Blocked"),
        Projection::Path(Path::untyped("customerId")),
    )
    .with_filter(Filter::eq(
        Path::untyped("customerId"),
        Path::untyped("id").of_target("Customer"),
    ))
    .correlated_with("Customer");
    let operation = Operation::delete(Target::new("Customer")).with_filter(Filter::exists(blocked));

    let hibernate = QueryCompiler::new(CompilerConfig::new(Platform::Hibernate)).unwrap();
    assert_eq!(
        hibernate.compile(&operation).unwrap().text,
        "DELETE FROM Customer cust_0_0 WHERE EXISTS (SELECT bloc_1_0.customerId FROM Blocked bloc_1_0 \
         WHERE bloc_1_0.customerId=cust_0_0.id)"
    );

    let datanucleus = QueryCompiler::new(CompilerConfig::new(Platform::DataNucleus)).unwrap();
    let err = datanucleus.compile(&operation).unwrap_err();
    assert!(err.is_unsupported());
}
