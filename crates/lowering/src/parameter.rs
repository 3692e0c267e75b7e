// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Named parameter table of one statement

use serde::Serialize;
use unified_query_ir::{TemporalType, Value, ValueType};

/// A value bound to a generated parameter name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterValue {
    pub value_type: ValueType,
    pub value: Value,
    /// Granularity hint for date/time binding
    pub temporal: Option<TemporalType>,
}

/// Parameters in allocation order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NamedParameters {
    entries: Vec<(String, ParameterValue)>,
}

impl NamedParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, name: String, value: ParameterValue) {
        self.entries.push((name, value));
    }

    /// Drop every parameter allocated after the first `len`
    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a NamedParameters {
    type Item = &'a (String, ParameterValue);
    type IntoIter = std::slice::Iter<'a, (String, ParameterValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
