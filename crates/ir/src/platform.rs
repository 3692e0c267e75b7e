// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Persistence platforms
//!
//! A [`Platform`] identifies the persistence provider that will execute the
//! compiled statement. Providers share the same statement language but
//! differ in a handful of behaviours:
//!
//! - **Multi-value results**: some providers return named tuples for
//!   multi-column selections, others positional arrays
//! - **Write aliases**: some providers reject an identification variable on
//!   the target of `UPDATE`/`DELETE`
//! - **Entity joins**: joining an unrelated entity with an explicit `ON`
//! - **Function spellings**: date part extraction is spelled differently
//!   (see the function registry)
//!
//! Capabilities are queried through [`Platform::supports`], in the same way
//! the resolvers query every other provider-specific behaviour.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported persistence providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Platform {
    Hibernate,
    EclipseLink,
    OpenJpa,
    DataNucleus,
    /// Provider could not be identified; only portable behaviour is used
    #[default]
    Unknown,
}

impl Platform {
    /// All known platforms, excluding `Unknown`
    pub const ALL: [Platform; 4] = [
        Platform::Hibernate,
        Platform::EclipseLink,
        Platform::OpenJpa,
        Platform::DataNucleus,
    ];

    /// Check if this platform supports a capability
    pub fn supports(&self, capability: PlatformCapability) -> bool {
        match capability {
            PlatformCapability::TupleResults => matches!(
                self,
                Platform::Hibernate | Platform::EclipseLink | Platform::DataNucleus
            ),
            PlatformCapability::UpdateTargetAlias | PlatformCapability::DeleteTargetAlias => {
                matches!(
                    self,
                    Platform::Hibernate | Platform::EclipseLink | Platform::OpenJpa
                )
            }
            PlatformCapability::EntityJoins => {
                matches!(self, Platform::Hibernate | Platform::EclipseLink)
            }
        }
    }

    /// Identify a platform from a provider class name or product string
    ///
    /// Matching is case-insensitive and substring based, so both
    /// `org.hibernate.jpa.HibernatePersistenceProvider` and `hibernate`
    /// resolve to [`Platform::Hibernate`].
    pub fn detect(provider: &str) -> Platform {
        let provider = provider.to_ascii_lowercase();
        if provider.contains("hibernate") {
            Platform::Hibernate
        } else if provider.contains("eclipselink") || provider.contains("toplink") {
            Platform::EclipseLink
        } else if provider.contains("openjpa") {
            Platform::OpenJpa
        } else if provider.contains("datanucleus") {
            Platform::DataNucleus
        } else {
            Platform::Unknown
        }
    }

    /// Parse a platform from its configured name
    pub fn from_name(name: &str) -> Option<Platform> {
        match name.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "hibernate" => Some(Platform::Hibernate),
            "eclipselink" => Some(Platform::EclipseLink),
            "openjpa" => Some(Platform::OpenJpa),
            "datanucleus" => Some(Platform::DataNucleus),
            "unknown" | "generic" => Some(Platform::Unknown),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Hibernate => "hibernate",
            Platform::EclipseLink => "eclipselink",
            Platform::OpenJpa => "openjpa",
            Platform::DataNucleus => "datanucleus",
            Platform::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Provider behaviours that vary across platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum PlatformCapability {
    /// Multi-column selections come back as named tuples
    TupleResults,

    /// `UPDATE Entity e SET e.x = ...` is accepted
    UpdateTargetAlias,

    /// `DELETE FROM Entity e WHERE ...` is accepted
    DeleteTargetAlias,

    /// `JOIN Entity b ON ...` between unrelated entities
    EntityJoins,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuple_results() {
        assert!(Platform::Hibernate.supports(PlatformCapability::TupleResults));
        assert!(Platform::EclipseLink.supports(PlatformCapability::TupleResults));
        assert!(Platform::DataNucleus.supports(PlatformCapability::TupleResults));
        assert!(!Platform::OpenJpa.supports(PlatformCapability::TupleResults));
        assert!(!Platform::Unknown.supports(PlatformCapability::TupleResults));
    }

    #[test]
    fn test_write_aliases() {
        for platform in [Platform::Hibernate, Platform::EclipseLink, Platform::OpenJpa] {
            assert!(platform.supports(PlatformCapability::UpdateTargetAlias));
            assert!(platform.supports(PlatformCapability::DeleteTargetAlias));
        }
        assert!(!Platform::DataNucleus.supports(PlatformCapability::DeleteTargetAlias));
        assert!(!Platform::Unknown.supports(PlatformCapability::UpdateTargetAlias));
    }

    #[test]
    fn test_detect() {
        assert_eq!(
            Platform::detect("org.hibernate.jpa.HibernatePersistenceProvider"),
            Platform::Hibernate
        );
        assert_eq!(
            Platform::detect("org.eclipse.persistence.jpa.PersistenceProvider EclipseLink"),
            Platform::EclipseLink
        );
        assert_eq!(
            Platform::detect("org.apache.openjpa.persistence.PersistenceProviderImpl"),
            Platform::OpenJpa
        );
        assert_eq!(
            Platform::detect("org.datanucleus.api.jakarta.PersistenceProviderImpl"),
            Platform::DataNucleus
        );
        assert_eq!(Platform::detect("com.example.Custom"), Platform::Unknown);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Platform::from_name("Open-JPA"), Some(Platform::OpenJpa));
        assert_eq!(Platform::from_name("eclipse_link"), Some(Platform::EclipseLink));
        assert_eq!(Platform::from_name("mystery"), None);
    }
}
