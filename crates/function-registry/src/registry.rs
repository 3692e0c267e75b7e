// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use crate::{FunctionKind, FunctionMetadata, Platform, builtin};
use std::collections::HashMap;
use tracing::debug;

/// Function registry for platform function spellings
///
/// This struct stores and provides lookup for function templates
/// across different persistence platforms.
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    /// Functions organized by platform, then kind
    functions: HashMap<Platform, HashMap<FunctionKind, FunctionMetadata>>,
}

impl FunctionRegistry {
    /// Create a new function registry with all builtin functions loaded
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use unified_query_function_registry::{FunctionRegistry, Platform};
    ///
    /// let registry = FunctionRegistry::new();
    /// let functions = registry.get_functions(Platform::Hibernate);
    /// ```
    pub fn new() -> Self {
        let mut registry = Self {
            functions: HashMap::new(),
        };

        // Load builtin functions for each platform
        for platform in Platform::ALL.into_iter().chain([Platform::Unknown]) {
            let by_kind = builtin::functions_for(platform)
                .into_iter()
                .map(|f| (f.kind, f))
                .collect();
            registry.functions.insert(platform, by_kind);
        }

        registry
    }

    /// Get all functions for a specific platform, sorted by kind
    pub fn get_functions(&self, platform: Platform) -> Vec<FunctionMetadata> {
        let mut functions: Vec<FunctionMetadata> = self
            .functions
            .get(&platform)
            .map(|by_kind| by_kind.values().cloned().collect())
            .unwrap_or_default();
        functions.sort_by_key(|f| f.kind);
        functions
    }

    /// Lookup the spelling of a function kind on a platform
    pub fn get_function(&self, platform: Platform, kind: FunctionKind) -> Option<&FunctionMetadata> {
        self.functions.get(&platform)?.get(&kind)
    }

    /// Lookup a single function by name and platform
    ///
    /// # Arguments
    ///
    /// * `platform` - The platform to search in
    /// * `name` - The function name to lookup (case-insensitive)
    pub fn get_function_by_name(&self, platform: Platform, name: &str) -> Option<&FunctionMetadata> {
        self.functions
            .get(&platform)?
            .values()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Check if a function kind has a spelling for a platform
    pub fn has_function(&self, platform: Platform, kind: FunctionKind) -> bool {
        self.get_function(platform, kind).is_some()
    }

    /// Override or add the spelling of a function on a platform
    pub fn register(&mut self, platform: Platform, metadata: FunctionMetadata) {
        debug!(
            platform = %platform,
            kind = %metadata.kind,
            template = %metadata.template,
            "Registering function spelling"
        );
        self.functions
            .entry(platform)
            .or_default()
            .insert(metadata.kind, metadata);
    }

    /// Render a call with already-resolved argument fragments
    ///
    /// Returns `None` when the platform has no spelling for `kind`.
    pub fn render(
        &self,
        platform: Platform,
        kind: FunctionKind,
        args: &[String],
        distinct: bool,
    ) -> Option<String> {
        self.get_function(platform, kind)
            .map(|f| f.render(args, distinct))
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
