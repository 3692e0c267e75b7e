// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Date part extraction, spelled per platform
//!
//! | Platform     | year-of                  |
//! |--------------|--------------------------|
//! | Hibernate    | `year(x)`                |
//! | EclipseLink  | `EXTRACT(YEAR FROM x)`   |
//! | OpenJPA      | `FUNCTION('YEAR', x)`    |
//! | DataNucleus  | `YEAR(x)`                |
//! | Unknown      | `EXTRACT(YEAR FROM x)`   |

use crate::{FunctionKind, FunctionMetadata, Platform, ValueType};

const PARTS: [(FunctionKind, &str); 4] = [
    (FunctionKind::Year, "YEAR"),
    (FunctionKind::Month, "MONTH"),
    (FunctionKind::Day, "DAY"),
    (FunctionKind::Hour, "HOUR"),
];

fn template(platform: Platform, part: &str) -> String {
    match platform {
        Platform::Hibernate => format!("{}({{0}})", part.to_ascii_lowercase()),
        Platform::OpenJpa => format!("FUNCTION('{}', {{0}})", part),
        Platform::DataNucleus => format!("{}({{0}})", part),
        _ => format!("EXTRACT({} FROM {{0}})", part),
    }
}

/// Get all date part functions for a platform
pub fn all_functions(platform: Platform) -> Vec<FunctionMetadata> {
    PARTS
        .iter()
        .map(|(kind, part)| {
            FunctionMetadata::new(*part, *kind, ValueType::Integer, template(platform, part))
                .with_description(format!("{} part of a date/time value", part.to_ascii_lowercase()))
        })
        .collect()
}
