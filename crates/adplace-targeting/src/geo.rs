//! Country include/exclude rules and the geo lookup seam

use std::collections::HashMap;
use std::net::IpAddr;

use adplace_core::{CountryCode, GeoMode, GeoRule};

use crate::Rejection;

pub fn check(rule: &GeoRule, country: Option<&CountryCode>) -> Result<(), Rejection> {
    if !rule.enabled {
        return Ok(());
    }

    let Some(country) = country else {
        return if rule.show_unknown {
            Ok(())
        } else {
            Err(Rejection::UnknownCountry)
        };
    };

    match rule.mode {
        // An empty include list means every country
        GeoMode::Include if rule.countries.is_empty() || rule.countries.contains(country) => Ok(()),
        GeoMode::Include => Err(Rejection::CountryNotIncluded),
        GeoMode::Exclude if rule.countries.contains(country) => Err(Rejection::CountryExcluded),
        GeoMode::Exclude => Ok(()),
    }
}

/// IP to country lookup provided by the host
pub trait GeoProvider: Send + Sync {
    /// `Ok(None)` when the provider has no answer for this address
    fn lookup(&self, ip: IpAddr) -> anyhow::Result<Option<CountryCode>>;
}

/// Resolve a visitor's country; provider failures resolve to unknown
pub fn resolve_country(provider: &dyn GeoProvider, ip: IpAddr) -> Option<CountryCode> {
    match provider.lookup(ip) {
        Ok(country) => country,
        Err(e) => {
            tracing::warn!(%ip, error = %e, "Geo lookup failed, treating country as unknown");
            None
        }
    }
}

/// Fixed IP to country table
#[derive(Debug, Clone, Default)]
pub struct StaticGeoProvider {
    table: HashMap<IpAddr, CountryCode>,
}

impl StaticGeoProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, ip: IpAddr, country: impl Into<CountryCode>) -> Self {
        self.table.insert(ip, country.into());
        self
    }
}

impl GeoProvider for StaticGeoProvider {
    fn lookup(&self, ip: IpAddr) -> anyhow::Result<Option<CountryCode>> {
        Ok(self.table.get(&ip).cloned())
    }
}
