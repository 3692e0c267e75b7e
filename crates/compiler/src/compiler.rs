// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Query Compiler
//!
//! [`QueryCompiler`] owns everything that outlives one statement: the
//! configuration, the dialect, the resolver registry and the catalog.
//! Each [`compile`](QueryCompiler::compile) call opens a fresh root
//! [`ResolutionContext`], so parameter names restart at `p0001` for every
//! statement.
//!
//! Update and delete statements are composed without target aliases on
//! platforms that reject them.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument};
use unified_query_catalog::EntityCatalog;
use unified_query_function_registry::FunctionRegistry;
use unified_query_ir::{Operation, OperationKind, PlatformCapability};
use unified_query_lowering::compose::alias_mode_for;
use unified_query_lowering::{Dialect, ResolutionContext, ResolverRegistry, compose_operation};

use crate::config::CompilerConfig;
use crate::error::CompileResult;
use crate::statement::CompiledStatement;

/// Shareable operation compiler
#[derive(Clone)]
pub struct QueryCompiler {
    config: CompilerConfig,
    dialect: Dialect,
    registry: Arc<ResolverRegistry>,
    catalog: Option<Arc<dyn EntityCatalog>>,
}

impl fmt::Debug for QueryCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCompiler")
            .field("config", &self.config)
            .field("resolvers", &self.registry.len())
            .field("catalog", &self.catalog.is_some())
            .finish()
    }
}

impl QueryCompiler {
    /// Create a compiler with the built-in resolvers and no catalog
    pub fn new(config: CompilerConfig) -> CompileResult<Self> {
        config.validate()?;
        let dialect = config.dialect();
        debug!(platform = %config.platform, alias_mode = ?config.alias_mode, "Created query compiler");
        Ok(Self {
            config,
            dialect,
            registry: Arc::new(ResolverRegistry::new()),
            catalog: None,
        })
    }

    /// Resolve target names through `catalog`
    pub fn with_catalog(mut self, catalog: Arc<dyn EntityCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Use a registry with user or fallback resolvers
    pub fn with_registry(mut self, registry: ResolverRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Use customized function spellings
    pub fn with_functions(mut self, functions: Arc<FunctionRegistry>) -> Self {
        self.dialect = self.dialect.with_functions(functions);
        self
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub fn registry(&self) -> &ResolverRegistry {
        &self.registry
    }

    /// Compile one operation into a self-contained statement
    #[instrument(skip_all, fields(kind = ?operation.kind, target = %operation.target.name))]
    pub fn compile(&self, operation: &Operation) -> CompileResult<CompiledStatement> {
        let write_alias_supported = match operation.kind {
            OperationKind::Update => self.dialect.supports(PlatformCapability::UpdateTargetAlias),
            OperationKind::Delete => self.dialect.supports(PlatformCapability::DeleteTargetAlias),
            OperationKind::Select | OperationKind::Insert => true,
        };
        let alias_mode = alias_mode_for(operation.kind, self.config.alias_mode, write_alias_supported);

        let mut ctx =
            ResolutionContext::new(&self.dialect, alias_mode).with_max_depth(self.config.max_depth);
        if let Some(catalog) = &self.catalog {
            ctx = ctx.with_catalog(catalog.as_ref(), self.config.catalog_scope.as_str());
        }

        let composed = compose_operation(operation, &self.registry, &mut ctx)?;
        let parameters = ctx.into_parameters();
        let (selections, shape, converter) = match composed.projection {
            Some(projection) => (
                projection.selections,
                Some(projection.shape),
                Some(projection.converter),
            ),
            None => (Vec::new(), None, None),
        };

        let statement = CompiledStatement {
            kind: operation.kind,
            text: composed.text,
            parameters,
            selections,
            shape,
            converter,
            limit: operation.limit,
            offset: operation.offset,
            lock_mode: operation.lock_mode,
            hints: operation.hints.clone(),
        };

        if self.config.log_statements {
            info!(
                text = %statement.text,
                parameters = statement.parameters.len(),
                "Compiled statement"
            );
        } else {
            debug!(text = %statement.text, "Compiled statement");
        }
        Ok(statement)
    }
}
