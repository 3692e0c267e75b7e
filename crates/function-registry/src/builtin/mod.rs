// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Builtin function definitions
//!
//! `standard` holds the spellings every platform shares; `temporal` holds
//! date part extraction, which each platform spells differently.

pub mod standard;
pub mod temporal;

use crate::{FunctionMetadata, Platform};

/// Every builtin function for a platform
pub fn functions_for(platform: Platform) -> Vec<FunctionMetadata> {
    let mut functions = standard::all_functions();
    functions.extend(temporal::all_functions(platform));
    functions
}
