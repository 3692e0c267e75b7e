// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Values and value types
//!
//! [`Value`] is the payload of constant expressions and bound parameters,
//! and also the cell type of raw result rows handed back by the executor.
//! [`ValueType`] is the static type carried by paths and functions.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Static value type of a path, function or parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ValueType {
    Boolean,
    Integer,
    Float,
    Decimal,
    String,
    Date,
    Time,
    DateTime,
    /// Enumeration, bound by its constant name
    Enum(String),
    /// Whole entity (full-target projections)
    Entity(String),
    List(Box<ValueType>),
    /// Type not known statically
    Any,
}

impl ValueType {
    /// Temporal granularity hint used when binding a parameter of this type
    pub fn temporal_type(&self) -> Option<TemporalType> {
        match self {
            ValueType::Date => Some(TemporalType::Date),
            ValueType::Time => Some(TemporalType::Time),
            ValueType::DateTime => Some(TemporalType::Timestamp),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueType::Integer | ValueType::Float | ValueType::Decimal)
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, ValueType::String | ValueType::Enum(_) | ValueType::Any)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Boolean => write!(f, "boolean"),
            ValueType::Integer => write!(f, "int"),
            ValueType::Float => write!(f, "float"),
            ValueType::Decimal => write!(f, "decimal"),
            ValueType::String => write!(f, "string"),
            ValueType::Date => write!(f, "date"),
            ValueType::Time => write!(f, "time"),
            ValueType::DateTime => write!(f, "datetime"),
            ValueType::Enum(name) => write!(f, "enum {}", name),
            ValueType::Entity(name) => write!(f, "entity {}", name),
            ValueType::List(inner) => write!(f, "list<{}>", inner),
            ValueType::Any => write!(f, "any"),
        }
    }
}

/// Temporal granularity for parameter binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalType {
    Date,
    Time,
    Timestamp,
}

/// A constant value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
#[non_exhaustive]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    /// Arbitrary precision number kept in its textual form
    Decimal(String),
    String(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    /// Enumeration constant name
    Enum(String),
    /// Multi-valued operand (e.g. the right side of `IN`)
    List(Vec<Value>),
}

impl Value {
    /// Type inferred from the value itself
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Any,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Integer(_) => ValueType::Integer,
            Value::Float(_) => ValueType::Float,
            Value::Decimal(_) => ValueType::Decimal,
            Value::String(_) => ValueType::String,
            Value::Date(_) => ValueType::Date,
            Value::Time(_) => ValueType::Time,
            Value::DateTime(_) => ValueType::DateTime,
            Value::Enum(_) => ValueType::Enum(String::new()),
            Value::List(items) => {
                let inner = items.first().map(Value::value_type).unwrap_or(ValueType::Any);
                ValueType::List(Box::new(inner))
            }
        }
    }

    pub fn temporal_type(&self) -> Option<TemporalType> {
        self.value_type().temporal_type()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Enum(s) | Value::Decimal(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 => {
                Some(*f as i64)
            }
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Decimal(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Decimal(s) | Value::String(s) | Value::Enum(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d),
            Value::Time(t) => write!(f, "{}", t),
            Value::DateTime(dt) => write!(f, "{}", dt),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveTime> for Value {
    fn from(value: NaiveTime) -> Self {
        Value::Time(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_inference() {
        assert_eq!(Value::from(1).value_type(), ValueType::Integer);
        assert_eq!(Value::from("a").value_type(), ValueType::String);
        assert_eq!(
            Value::from(vec![1, 2]).value_type(),
            ValueType::List(Box::new(ValueType::Integer))
        );
        assert_eq!(Value::Null.value_type(), ValueType::Any);
    }

    #[test]
    fn test_temporal_hint() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(Value::from(date).temporal_type(), Some(TemporalType::Date));
        assert_eq!(Value::from(3).temporal_type(), None);
        assert_eq!(
            ValueType::DateTime.temporal_type(),
            Some(TemporalType::Timestamp)
        );
    }

    #[test]
    fn test_numeric_accessors() {
        assert_eq!(Value::Float(4.0).as_i64(), Some(4));
        assert_eq!(Value::Float(4.5).as_i64(), None);
        assert_eq!(Value::Float(1e300).as_i64(), None);
        assert_eq!(Value::Float(-1e300).as_i64(), None);
        assert_eq!(Value::Decimal("2.5".into()).as_f64(), Some(2.5));
    }

    #[test]
    fn test_value_serialization() {
        let json = serde_json::to_value(Value::Integer(1)).unwrap();
        assert_eq!(json["type"], "integer");
        assert_eq!(json["value"], 1);
    }
}
