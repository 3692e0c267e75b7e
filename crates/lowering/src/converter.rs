// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Result conversion
//!
//! A resolved projection describes three things: what goes in the select
//! list ([`Selection`]), the row shape the executor hands back
//! ([`ResultShape`]) and how to turn each raw row into the value the caller
//! asked for ([`ResultConverter`]).
//!
//! Converters are plain data plus an optional closure, so a compiled
//! statement can be shared across threads and applied to any number of rows.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use unified_query_ir::{Value, ValueType};

/// Row as returned by the executor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RawRow {
    Scalar(Value),
    /// Columns addressed by selection alias
    Tuple(Vec<(String, Value)>),
    /// Columns addressed by position
    Array(Vec<Value>),
}

impl RawRow {
    /// `scalar`, `tuple` or `array`
    pub fn shape_name(&self) -> &'static str {
        match self {
            RawRow::Scalar(_) => "scalar",
            RawRow::Tuple(_) => "tuple",
            RawRow::Array(_) => "array",
        }
    }
}

/// Converted result of one row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ResultValue {
    Value(Value),
    /// Named values in projection order
    Record(Vec<(String, Value)>),
    /// Entity materialization left to the host
    Entity { entity: String, row: RawRow },
}

impl ResultValue {
    /// Field of a record result
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            ResultValue::Record(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

/// Shape of the rows the executor returns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultShape {
    Scalar(ValueType),
    Tuple,
    Array,
}

/// Errors raised while converting a raw row
#[derive(Debug, thiserror::Error, Clone, PartialEq, Serialize)]
pub enum ConvertError {
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("Column '{0}' is missing from the row")]
    MissingColumn(String),

    #[error("Row has {found} columns, expected {expected}")]
    ArityMismatch { expected: usize, found: usize },

    #[error("Expected a {expected} row, got a {found} row")]
    ShapeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

/// Output column of a record projection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordColumn {
    /// Key in the converted record
    pub name: String,
    /// Selection alias, used to address tuple rows
    pub alias: Option<String>,
    /// Position in the select list
    pub position: usize,
    pub value_type: ValueType,
}

impl RecordColumn {
    fn key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

type ConvertFn = dyn Fn(&RawRow) -> Result<ResultValue, ConvertError> + Send + Sync;

/// Turns raw rows into caller-facing values
#[derive(Clone)]
pub enum ResultConverter {
    /// Single value coerced to a type
    Scalar { value_type: ValueType },
    /// Ignores the row and yields a fixed value
    Constant(Value),
    /// Whole entity of the named target
    Entity { entity: String },
    Record { columns: Vec<RecordColumn> },
    Custom(Arc<ConvertFn>),
}

impl ResultConverter {
    pub fn custom(
        f: impl Fn(&RawRow) -> Result<ResultValue, ConvertError> + Send + Sync + 'static,
    ) -> Self {
        ResultConverter::Custom(Arc::new(f))
    }

    pub fn convert(&self, row: &RawRow) -> Result<ResultValue, ConvertError> {
        match self {
            ResultConverter::Scalar { value_type } => {
                let value = single_value(row)?;
                coerce(value, value_type).map(ResultValue::Value)
            }
            ResultConverter::Constant(value) => Ok(ResultValue::Value(value.clone())),
            ResultConverter::Entity { entity } => Ok(ResultValue::Entity {
                entity: entity.clone(),
                row: row.clone(),
            }),
            ResultConverter::Record { columns } => convert_record(columns, row),
            ResultConverter::Custom(f) => f(row),
        }
    }

    /// Convert every row, stopping at the first failure
    pub fn convert_all<'r>(
        &self,
        rows: impl IntoIterator<Item = &'r RawRow>,
    ) -> Result<Vec<ResultValue>, ConvertError> {
        rows.into_iter().map(|row| self.convert(row)).collect()
    }
}

impl fmt::Debug for ResultConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultConverter::Scalar { value_type } => f
                .debug_struct("Scalar")
                .field("value_type", value_type)
                .finish(),
            ResultConverter::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            ResultConverter::Entity { entity } => {
                f.debug_struct("Entity").field("entity", entity).finish()
            }
            ResultConverter::Record { columns } => {
                f.debug_struct("Record").field("columns", columns).finish()
            }
            ResultConverter::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

fn single_value(row: &RawRow) -> Result<&Value, ConvertError> {
    match row {
        RawRow::Scalar(value) => Ok(value),
        RawRow::Array(values) if values.len() == 1 => Ok(&values[0]),
        RawRow::Tuple(values) if values.len() == 1 => Ok(&values[0].1),
        RawRow::Array(values) => Err(ConvertError::ArityMismatch {
            expected: 1,
            found: values.len(),
        }),
        RawRow::Tuple(values) => Err(ConvertError::ArityMismatch {
            expected: 1,
            found: values.len(),
        }),
    }
}

fn convert_record(columns: &[RecordColumn], row: &RawRow) -> Result<ResultValue, ConvertError> {
    let mut fields = Vec::with_capacity(columns.len());
    match row {
        RawRow::Tuple(values) => {
            for column in columns {
                let value = values
                    .iter()
                    .find(|(name, _)| name == column.key())
                    .map(|(_, v)| v)
                    .ok_or_else(|| ConvertError::MissingColumn(column.key().to_string()))?;
                fields.push((column.name.clone(), coerce(value, &column.value_type)?));
            }
        }
        RawRow::Array(values) => {
            if values.len() != columns.len() {
                return Err(ConvertError::ArityMismatch {
                    expected: columns.len(),
                    found: values.len(),
                });
            }
            for column in columns {
                let value = values
                    .get(column.position)
                    .ok_or_else(|| ConvertError::MissingColumn(column.name.clone()))?;
                fields.push((column.name.clone(), coerce(value, &column.value_type)?));
            }
        }
        RawRow::Scalar(value) => match columns {
            [column] => fields.push((column.name.clone(), coerce(value, &column.value_type)?)),
            _ => {
                return Err(ConvertError::ShapeMismatch {
                    expected: "multi-column",
                    found: row.shape_name(),
                });
            }
        },
    }
    Ok(ResultValue::Record(fields))
}

fn mismatch(expected: &ValueType, found: &Value) -> ConvertError {
    ConvertError::TypeMismatch {
        expected: expected.to_string(),
        found: found.value_type().to_string(),
    }
}

/// Coerce a raw cell to the statically expected type
///
/// Widening conversions are applied (integer to float, date to datetime);
/// anything lossy is a [`ConvertError::TypeMismatch`]. Nulls pass through.
pub fn coerce(value: &Value, expected: &ValueType) -> Result<Value, ConvertError> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    let coerced = match (expected, value) {
        (ValueType::Any | ValueType::Entity(_) | ValueType::List(_), v) => Some(v.clone()),
        (ValueType::Boolean, Value::Boolean(b)) => Some(Value::Boolean(*b)),
        (ValueType::Boolean, Value::Integer(i)) if *i == 0 || *i == 1 => Some(Value::Boolean(*i == 1)),
        (ValueType::Integer, Value::Decimal(d)) => d.parse().ok().map(Value::Integer),
        (ValueType::Integer, v @ (Value::Integer(_) | Value::Float(_))) => {
            v.as_i64().map(Value::Integer)
        }
        (ValueType::Float, v @ (Value::Integer(_) | Value::Float(_) | Value::Decimal(_))) => {
            v.as_f64().map(Value::Float)
        }
        (ValueType::Decimal, Value::Decimal(d)) => Some(Value::Decimal(d.clone())),
        (ValueType::Decimal, Value::Integer(i)) => Some(Value::Decimal(i.to_string())),
        (ValueType::Decimal, Value::Float(f)) => Some(Value::Decimal(f.to_string())),
        (ValueType::String, Value::String(s) | Value::Enum(s)) => Some(Value::String(s.clone())),
        (ValueType::Enum(_), Value::String(s) | Value::Enum(s)) => Some(Value::Enum(s.clone())),
        (ValueType::Date, Value::Date(d)) => Some(Value::Date(*d)),
        (ValueType::Date, Value::DateTime(dt)) => Some(Value::Date(dt.date())),
        (ValueType::Time, Value::Time(t)) => Some(Value::Time(*t)),
        (ValueType::Time, Value::DateTime(dt)) => Some(Value::Time(dt.time())),
        (ValueType::DateTime, Value::DateTime(dt)) => Some(Value::DateTime(*dt)),
        (ValueType::DateTime, Value::Date(d)) => d.and_hms_opt(0, 0, 0).map(Value::DateTime),
        _ => None,
    };
    coerced.ok_or_else(|| mismatch(expected, value))
}

/// One entry of the select list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub fragment: String,
    pub alias: Option<String>,
}

impl Selection {
    pub fn new(fragment: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: Option<String>) -> Self {
        self.alias = alias;
        self
    }

    pub fn render(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} AS {}", self.fragment, alias),
            None => self.fragment.clone(),
        }
    }
}

/// Resolved projection
#[derive(Debug, Clone)]
pub struct ProjectionContext {
    pub selections: Vec<Selection>,
    pub shape: ResultShape,
    pub converter: ResultConverter,
}

impl ProjectionContext {
    /// Rendered select list, e.g. `o.id AS id, o.total AS total`
    pub fn select_list(&self) -> String {
        self.selections
            .iter()
            .map(Selection::render)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.selections.is_empty() {
            return Err("projection selects nothing".to_string());
        }
        if let Some(empty) = self.selections.iter().position(|s| s.fragment.trim().is_empty()) {
            return Err(format!("selection {} is empty", empty));
        }
        if let ResultConverter::Record { columns } = &self.converter {
            if columns.iter().any(|c| c.position >= self.selections.len()) {
                return Err("record column points past the select list".to_string());
            }
        }
        Ok(())
    }
}
