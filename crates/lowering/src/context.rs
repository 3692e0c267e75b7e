// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Resolution context
//!
//! [`ResolutionContext`] tracks the state shared by every resolver working
//! on one statement. It is an explicit tree stored as an arena of scopes:
//!
//! ```text
//! root (sequence 0)          parameters, sequence counter, used aliases
//! ├── scope 1 (sequence 1)   sub-query in WHERE
//! │   └── scope 3 (seq 3)    sub-query inside that sub-query
//! └── scope 2 (sequence 2)   sibling sub-query
//! ```
//!
//! State is split in two:
//!
//! - **Root-owned**: the named parameter table, the sequence counter and
//!   the set of aliases used anywhere in the statement. Allocation from any
//!   scope goes here, so names are unique across the whole tree.
//! - **Per-scope**: alias mode, bound targets and the duplicate counters
//!   used to derive aliases.
//!
//! Joins bind their targets in the scope of the target they join; only
//! sub-queries open a child scope.
//!
//! A context tree is not shareable: every compilation owns its own and
//! mutates it through `&mut`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use unified_query_catalog::EntityCatalog;
use unified_query_ir::{AttributeMetadata, Target, Value, ValueType};

use crate::dialect::{Dialect, shared};
use crate::error::{ResolveError, ResolveResult};
use crate::parameter::{NamedParameters, ParameterValue};

/// Default limit on sub-query nesting
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Policy for target aliases in a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasMode {
    /// Only explicit aliases are used
    Default,
    /// Aliases are generated for targets without one
    #[default]
    Auto,
    /// The statement form cannot alias its targets
    Unsupported,
}

/// A target bound in a scope
#[derive(Debug, Clone, PartialEq)]
pub struct TargetBinding {
    /// Logical name from the operation
    pub name: String,
    /// Entity name used in statement text
    pub entity: String,
    pub alias: Option<String>,
    /// Attributes known from the catalog, empty when unknown
    pub attributes: Vec<AttributeMetadata>,
}

impl TargetBinding {
    /// Identification variable if aliased, entity name otherwise
    pub fn reference(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.entity)
    }

    /// Qualify a property name with this target's alias
    pub fn qualify(&self, property: &str) -> String {
        match &self.alias {
            Some(alias) => format!("{}.{}", alias, property),
            None => property.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct Scope {
    sequence: usize,
    parent: Option<usize>,
    alias_mode: AliasMode,
    bindings: Vec<TargetBinding>,
    alias_counts: HashMap<String, usize>,
    depth: usize,
}

impl Scope {
    fn new(sequence: usize, parent: Option<usize>, alias_mode: AliasMode, depth: usize) -> Self {
        Self {
            sequence,
            parent,
            alias_mode,
            bindings: Vec::new(),
            alias_counts: HashMap::new(),
            depth,
        }
    }

    fn find(&self, qualifier: &str) -> Option<&TargetBinding> {
        self.bindings
            .iter()
            .find(|b| b.alias.as_deref() == Some(qualifier))
            .or_else(|| self.bindings.iter().find(|b| b.name == qualifier))
            .or_else(|| self.bindings.iter().find(|b| b.entity == qualifier))
    }
}

/// Per-statement resolution state
pub struct ResolutionContext<'a> {
    dialect: &'a Dialect,
    catalog: Option<&'a dyn EntityCatalog>,
    catalog_scope: String,
    scopes: Vec<Scope>,
    current: usize,
    parameters: NamedParameters,
    next_sequence: usize,
    aliases: Vec<String>,
    max_depth: usize,
    value_hint: Option<ValueType>,
}

impl<'a> ResolutionContext<'a> {
    /// Create a root context
    pub fn new(dialect: &'a Dialect, alias_mode: AliasMode) -> Self {
        Self {
            dialect,
            catalog: None,
            catalog_scope: "default".to_string(),
            scopes: vec![Scope::new(0, None, alias_mode, 0)],
            current: 0,
            parameters: NamedParameters::new(),
            next_sequence: 1,
            aliases: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            value_hint: None,
        }
    }

    /// Resolve target names through a catalog within `scope`
    pub fn with_catalog(mut self, catalog: &'a dyn EntityCatalog, scope: impl Into<String>) -> Self {
        self.catalog = Some(catalog);
        self.catalog_scope = scope.into();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn dialect(&self) -> &'a Dialect {
        self.dialect
    }

    fn scope(&self) -> &Scope {
        &self.scopes[self.current]
    }

    fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scopes[self.current]
    }

    pub fn alias_mode(&self) -> AliasMode {
        self.scope().alias_mode
    }

    /// Sequence number of the current scope
    pub fn sequence(&self) -> usize {
        self.scope().sequence
    }

    /// Sub-query nesting depth of the current scope
    pub fn depth(&self) -> usize {
        self.scope().depth
    }

    pub fn is_root(&self) -> bool {
        self.scope().parent.is_none()
    }

    /// Alias for a target about to be bound in the current scope
    ///
    /// Returns the explicit alias when there is one, a generated alias in
    /// `Auto` mode, and `None` otherwise. `Unsupported` scopes never alias.
    pub fn get_or_create_alias(
        &mut self,
        name: &str,
        explicit: Option<&str>,
    ) -> ResolveResult<Option<String>> {
        let mode = self.alias_mode();
        if mode == AliasMode::Unsupported {
            return Ok(None);
        }

        if let Some(alias) = explicit {
            if self.aliases.iter().any(|a| a == alias) {
                return Err(ResolveError::DuplicateAlias(alias.to_string()));
            }
            self.aliases.push(alias.to_string());
            return Ok(Some(alias.to_string()));
        }

        if mode == AliasMode::Default {
            return Ok(None);
        }

        let base = shared::alias_base(name);
        let sequence = self.sequence();
        let alias = loop {
            let count = self.scope_mut().alias_counts.entry(base.clone()).or_insert(0);
            let candidate = format!("{}_{}_{}", base, sequence, count);
            *count += 1;
            if !self.aliases.contains(&candidate) {
                break candidate;
            }
        };
        trace!(target_name = name, alias = %alias, "Generated alias");
        self.aliases.push(alias.clone());
        Ok(Some(alias))
    }

    /// Bind a target (without its joins) in the current scope
    pub fn bind_target(&mut self, target: &Target) -> ResolveResult<TargetBinding> {
        let (entity, attributes) = self.resolve_entity(target)?;
        let alias = self.get_or_create_alias(&target.name, target.alias.as_deref())?;
        let binding = TargetBinding {
            name: target.name.clone(),
            entity,
            alias,
            attributes,
        };
        debug!(
            target_name = %binding.name,
            entity = %binding.entity,
            alias = ?binding.alias,
            sequence = self.sequence(),
            "Bound target"
        );
        self.scope_mut().bindings.push(binding.clone());
        Ok(binding)
    }

    fn resolve_entity(&self, target: &Target) -> ResolveResult<(String, Vec<AttributeMetadata>)> {
        match (&target.entity, self.catalog) {
            (Some(entity), None) => Ok((entity.clone(), Vec::new())),
            (Some(entity), Some(catalog)) => {
                // Attributes are a bonus here; an explicit entity needs no catalog entry
                let attributes = catalog
                    .resolve(&self.catalog_scope, &target.name)
                    .map(|m| m.attributes)
                    .unwrap_or_default();
                Ok((entity.clone(), attributes))
            }
            (None, Some(catalog)) => {
                let metadata = catalog.resolve(&self.catalog_scope, &target.name)?;
                Ok((metadata.entity_name, metadata.attributes))
            }
            (None, None) => Ok((target.name.clone(), Vec::new())),
        }
    }

    /// Find a bound target by alias, name or entity
    ///
    /// Walks from the current scope towards the root and stops after the
    /// first scope whose alias mode is `Unsupported`.
    pub fn lookup(&self, qualifier: &str) -> ResolveResult<&TargetBinding> {
        self.find_binding(qualifier).map(|(_, binding)| binding)
    }

    fn find_binding(&self, qualifier: &str) -> ResolveResult<(usize, &TargetBinding)> {
        let mut id = Some(self.current);
        while let Some(scope_id) = id {
            let scope = &self.scopes[scope_id];
            if let Some(binding) = scope.find(qualifier) {
                return Ok((scope_id, binding));
            }
            if scope.alias_mode == AliasMode::Unsupported {
                break;
            }
            id = scope.parent;
        }
        Err(ResolveError::missing_target(qualifier))
    }

    /// Alias already assigned to a bound target
    pub fn target_alias(&self, qualifier: &str) -> ResolveResult<Option<String>> {
        self.lookup(qualifier).map(|binding| binding.alias.clone())
    }

    /// Alias qualifying a property of the target named `qualifier`
    ///
    /// A target bound without an alias in an enclosing scope cannot be
    /// referenced here, since its bare property names would read the
    /// current scope's target.
    pub fn path_qualifier(&self, qualifier: &str) -> ResolveResult<Option<String>> {
        let (scope_id, binding) = self.find_binding(qualifier)?;
        if binding.alias.is_none() && scope_id != self.current {
            return Err(ResolveError::unsupported(
                format!("reference to unaliased outer target {}", binding.name),
                self.dialect.platform(),
            ));
        }
        Ok(binding.alias.clone())
    }

    /// Root target of the current scope
    pub fn current_target(&self) -> Option<&TargetBinding> {
        self.scope().bindings.first()
    }

    /// Bind a value to a new statement-wide parameter name
    pub fn add_named_parameter(&mut self, value: Value, value_type: ValueType) -> String {
        let name = self.dialect.parameter_name(self.parameters.len() + 1);
        let temporal = value_type.temporal_type().or_else(|| value.temporal_type());
        trace!(parameter = %name, value_type = %value_type, "Allocated parameter");
        self.parameters.push(
            name.clone(),
            ParameterValue {
                value_type,
                value,
                temporal,
            },
        );
        name
    }

    /// Bind a value and return its reference in statement text
    pub fn bind_parameter(&mut self, value: Value, value_type: ValueType) -> String {
        let name = self.add_named_parameter(value, value_type);
        self.dialect.parameter_reference(&name)
    }

    /// Run `f` inside a new child scope
    ///
    /// The child gets the next value of the statement-wide sequence counter.
    /// The current scope is restored whether `f` succeeds or not.
    pub fn with_child<T>(
        &mut self,
        alias_mode: AliasMode,
        f: impl FnOnce(&mut Self) -> ResolveResult<T>,
    ) -> ResolveResult<T> {
        let depth = self.depth() + 1;
        if depth > self.max_depth {
            return Err(ResolveError::RecursionLimitExceeded {
                context: "sub-query resolution".to_string(),
                depth,
                limit: self.max_depth,
            });
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let parent = self.current;
        self.scopes
            .push(Scope::new(sequence, Some(parent), alias_mode, depth));
        self.current = self.scopes.len() - 1;
        debug!(sequence, depth, ?alias_mode, "Entered child scope");

        let result = f(self);

        self.current = parent;
        result
    }

    /// Type expected for constants resolved while `f` runs
    pub fn with_value_hint<T>(
        &mut self,
        hint: ValueType,
        f: impl FnOnce(&mut Self) -> ResolveResult<T>,
    ) -> ResolveResult<T> {
        let previous = self.value_hint.replace(hint);
        let result = f(self);
        self.value_hint = previous;
        result
    }

    pub fn value_hint(&self) -> Option<&ValueType> {
        self.value_hint.as_ref()
    }

    pub fn parameters(&self) -> &NamedParameters {
        &self.parameters
    }

    /// Forget parameters allocated after the first `len`
    pub(crate) fn truncate_parameters(&mut self, len: usize) {
        self.parameters.truncate(len);
    }

    pub fn into_parameters(self) -> NamedParameters {
        self.parameters
    }

    /// Every alias used so far, in allocation order
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unified_query_catalog::StaticCatalog;
    use unified_query_ir::{EntityMetadata, Platform};

    fn dialect() -> Dialect {
        Dialect::new(Platform::Hibernate)
    }

    #[test]
    fn test_self_join_aliases() {
        let dialect = dialect();
        let mut ctx = ResolutionContext::new(&dialect, AliasMode::Auto);
        let first = ctx.bind_target(&Target::new("A")).unwrap();
        let second = ctx.bind_target(&Target::new("A")).unwrap();
        assert_eq!(first.alias.as_deref(), Some("a_0_0"));
        assert_eq!(second.alias.as_deref(), Some("a_0_1"));
    }

    #[test]
    fn test_explicit_alias_wins() {
        let dialect = dialect();
        let mut ctx = ResolutionContext::new(&dialect, AliasMode::Auto);
        let binding = ctx.bind_target(&Target::new("Order").with_alias("o")).unwrap();
        assert_eq!(binding.alias.as_deref(), Some("o"));
        assert_eq!(ctx.target_alias("Order").unwrap().as_deref(), Some("o"));
        assert_eq!(ctx.target_alias("o").unwrap().as_deref(), Some("o"));
    }

    #[test]
    fn test_duplicate_explicit_alias() {
        let dialect = dialect();
        let mut ctx = ResolutionContext::new(&dialect, AliasMode::Default);
        ctx.bind_target(&Target::new("A").with_alias("x")).unwrap();
        let err = ctx.bind_target(&Target::new("B").with_alias("x")).unwrap_err();
        assert_eq!(err, ResolveError::DuplicateAlias("x".to_string()));
    }

    #[test]
    fn test_default_mode_without_alias() {
        let dialect = dialect();
        let mut ctx = ResolutionContext::new(&dialect, AliasMode::Default);
        let binding = ctx.bind_target(&Target::new("Order")).unwrap();
        assert_eq!(binding.alias, None);
        assert_eq!(binding.reference(), "Order");
        assert_eq!(binding.qualify("total"), "total");
    }

    #[test]
    fn test_unsupported_mode_never_aliases() {
        let dialect = dialect();
        let mut ctx = ResolutionContext::new(&dialect, AliasMode::Unsupported);
        let binding = ctx.bind_target(&Target::new("Order").with_alias("o")).unwrap();
        assert_eq!(binding.alias, None);
    }

    #[test]
    fn test_missing_target() {
        let dialect = dialect();
        let ctx = ResolutionContext::new(&dialect, AliasMode::Auto);
        let err = ctx.target_alias("Order").unwrap_err();
        assert!(err.to_string().contains("missing context data target Order"));
    }

    #[test]
    fn test_child_scopes_use_shared_sequence() {
        let dialect = dialect();
        let mut ctx = ResolutionContext::new(&dialect, AliasMode::Auto);
        ctx.bind_target(&Target::new("A")).unwrap();

        let first = ctx
            .with_child(AliasMode::Auto, |ctx| {
                let binding = ctx.bind_target(&Target::new("A"))?;
                // Parent targets stay visible
                assert_eq!(ctx.target_alias("A")?.as_deref(), Some("a_1_0"));
                Ok(binding.alias)
            })
            .unwrap();
        let second = ctx
            .with_child(AliasMode::Auto, |ctx| Ok(ctx.bind_target(&Target::new("A"))?.alias))
            .unwrap();

        assert_eq!(first.as_deref(), Some("a_1_0"));
        assert_eq!(second.as_deref(), Some("a_2_0"));
        assert!(ctx.is_root());
        assert_eq!(ctx.target_alias("A").unwrap().as_deref(), Some("a_0_0"));
        assert_eq!(ctx.aliases(), ["a_0_0", "a_1_0", "a_2_0"]);
    }

    #[test]
    fn test_lookup_stops_at_unsupported_scope() {
        let dialect = dialect();
        let mut ctx = ResolutionContext::new(&dialect, AliasMode::Auto);
        ctx.bind_target(&Target::new("Outer")).unwrap();
        let result = ctx.with_child(AliasMode::Unsupported, |ctx| {
            ctx.with_child(AliasMode::Auto, |ctx| ctx.target_alias("Outer"))
        });
        assert!(matches!(result, Err(ResolveError::MissingContextState(_))));
    }

    #[test]
    fn test_parameters_are_root_owned() {
        let dialect = dialect();
        let mut ctx = ResolutionContext::new(&dialect, AliasMode::Auto);
        let outer = ctx.bind_parameter(Value::from(1), ValueType::Integer);
        let inner = ctx
            .with_child(AliasMode::Auto, |ctx| {
                Ok(ctx.bind_parameter(Value::from("x"), ValueType::String))
            })
            .unwrap();
        let last = ctx.bind_parameter(Value::from(2), ValueType::Integer);
        assert_eq!(outer, ":p0001");
        assert_eq!(inner, ":p0002");
        assert_eq!(last, ":p0003");
        assert_eq!(ctx.parameters().len(), 3);
    }

    #[test]
    fn test_temporal_hint_recorded() {
        let dialect = dialect();
        let mut ctx = ResolutionContext::new(&dialect, AliasMode::Auto);
        let name = ctx.add_named_parameter(Value::from("2024-01-01"), ValueType::Date);
        let param = ctx.parameters().get(&name).unwrap();
        assert_eq!(param.temporal, Some(unified_query_ir::TemporalType::Date));
    }

    #[test]
    fn test_recursion_limit() {
        let dialect = dialect();
        let mut ctx = ResolutionContext::new(&dialect, AliasMode::Auto).with_max_depth(1);
        let result = ctx.with_child(AliasMode::Auto, |ctx| {
            ctx.with_child(AliasMode::Auto, |_| Ok(()))
        });
        assert!(matches!(
            result,
            Err(ResolveError::RecursionLimitExceeded { depth: 2, limit: 1, .. })
        ));
        assert!(ctx.is_root());
    }

    #[test]
    fn test_catalog_resolution() {
        let dialect = dialect();
        let catalog = StaticCatalog::new().with_entity(
            EntityMetadata::new("order", "PurchaseOrder").with_attribute("id", ValueType::Integer),
        );
        let mut ctx = ResolutionContext::new(&dialect, AliasMode::Auto).with_catalog(&catalog, "shop");
        let binding = ctx.bind_target(&Target::new("order")).unwrap();
        assert_eq!(binding.entity, "PurchaseOrder");
        assert_eq!(binding.alias.as_deref(), Some("orde_0_0"));
        assert_eq!(binding.attributes.len(), 1);

        let missing = ctx.bind_target(&Target::new("invoice")).unwrap_err();
        assert!(matches!(missing, ResolveError::Catalog(_)));
    }
}
