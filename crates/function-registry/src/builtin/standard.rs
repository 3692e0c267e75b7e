// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Functions spelled identically on every platform

use crate::{FunctionKind, FunctionMetadata, FunctionType, ValueType};

/// Get all portable functions
pub fn all_functions() -> Vec<FunctionMetadata> {
    vec![
        // Aggregate functions
        FunctionMetadata::new("count", FunctionKind::Count, ValueType::Integer, "count({0})")
            .with_type(FunctionType::Aggregate)
            .with_description("Count the number of rows"),
        FunctionMetadata::new("sum", FunctionKind::Sum, ValueType::Any, "sum({0})")
            .with_type(FunctionType::Aggregate)
            .with_description("Sum of values"),
        FunctionMetadata::new("avg", FunctionKind::Avg, ValueType::Float, "avg({0})")
            .with_type(FunctionType::Aggregate)
            .with_description("Average of values"),
        FunctionMetadata::new("min", FunctionKind::Min, ValueType::Any, "min({0})")
            .with_type(FunctionType::Aggregate)
            .with_description("Minimum value"),
        FunctionMetadata::new("max", FunctionKind::Max, ValueType::Any, "max({0})")
            .with_type(FunctionType::Aggregate)
            .with_description("Maximum value"),
        // Scalar functions
        FunctionMetadata::new("lower", FunctionKind::Lower, ValueType::String, "lower({0})")
            .with_description("Convert to lowercase"),
        FunctionMetadata::new("upper", FunctionKind::Upper, ValueType::String, "upper({0})")
            .with_description("Convert to uppercase"),
        // Current date/time
        FunctionMetadata::new("CURRENT_DATE", FunctionKind::CurrentDate, ValueType::Date, "CURRENT_DATE")
            .with_type(FunctionType::Temporal)
            .with_description("Current date"),
        FunctionMetadata::new("CURRENT_TIME", FunctionKind::CurrentTime, ValueType::Time, "CURRENT_TIME")
            .with_type(FunctionType::Temporal)
            .with_description("Current time"),
        FunctionMetadata::new(
            "CURRENT_TIMESTAMP",
            FunctionKind::CurrentTimestamp,
            ValueType::DateTime,
            "CURRENT_TIMESTAMP",
        )
        .with_type(FunctionType::Temporal)
        .with_description("Current date and time"),
    ]
}
