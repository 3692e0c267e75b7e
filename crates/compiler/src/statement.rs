// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Compiled statement handed to the executor

use std::collections::BTreeMap;

use serde::Serialize;
use unified_query_ir::{LockMode, OperationKind};
use unified_query_lowering::{
    ConvertError, NamedParameters, RawRow, ResultConverter, ResultShape, ResultValue, Selection,
};

/// Statement text with everything needed to run it and read its rows
///
/// Limit and offset have no textual form in the object query language;
/// the executor applies them, as it does the lock mode and hints.
#[derive(Debug, Clone, Serialize)]
pub struct CompiledStatement {
    pub kind: OperationKind,
    pub text: String,
    pub parameters: NamedParameters,
    /// Select list entries; empty for writes
    pub selections: Vec<Selection>,
    /// Row shape; `None` for writes
    pub shape: Option<ResultShape>,
    #[serde(skip)]
    pub converter: Option<ResultConverter>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub lock_mode: LockMode,
    pub hints: BTreeMap<String, String>,
}

impl CompiledStatement {
    pub fn is_write(&self) -> bool {
        self.kind.is_write()
    }

    /// Convert one executor row
    ///
    /// Write statements return no rows; asking them to convert one is a
    /// shape mismatch.
    pub fn convert(&self, row: &RawRow) -> Result<ResultValue, ConvertError> {
        match &self.converter {
            Some(converter) => converter.convert(row),
            None => Err(ConvertError::ShapeMismatch {
                expected: "no",
                found: row.shape_name(),
            }),
        }
    }

    /// Metadata for trace output; the converter is omitted
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
