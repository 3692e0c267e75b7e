// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Testing utilities for Unified Query
//!
//! This crate provides common testing components including:
//! - A counting mock entity catalog
//! - Sample operations, catalogs and rows
//! - A reference filter evaluator used to check parameter binding
//! - Proptest strategies for filters and targets
//! - Statement text assertions

pub mod assertions;
pub mod evaluator;
pub mod fixtures;
pub mod mock_catalog;
pub mod strategies;

// Re-exports for convenience
pub use assertions::QueryAssertions;
pub use evaluator::{EvalError, Row, evaluate, rebind};
pub use fixtures::QueryFixtures;
pub use mock_catalog::{MockEntityCatalog, MockCatalogBuilder};
