//! Zone resolution and zone-relative record naming
//!
//! The zone is taken to be the last two labels of a domain. No public suffix
//! list is consulted, so `example.co.uk` resolves to the zone `co.uk`.

use std::fmt;

/// Name used by the provider for the zone apex
pub const APEX: &str = "@";

/// A DNS zone identified by its apex domain (e.g. `bbdevs.com`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Zone(String);

impl Zone {
    /// Use an explicit zone instead of the two-label heuristic
    pub fn new(apex: impl Into<String>) -> Self {
        Self(apex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Zone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A record name relative to its zone: `@` for the apex, otherwise the labels
/// preceding the apex (e.g. `_acme-challenge.sso`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelativeName(String);

impl RelativeName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this name refers to the zone apex
    pub fn is_apex(&self) -> bool {
        self.0 == APEX
    }

    /// Rebuild the fully-qualified name within `zone`
    pub fn to_fqdn(&self, zone: &Zone) -> String {
        if self.is_apex() {
            zone.to_string()
        } else {
            format!("{}.{}", self.0, zone)
        }
    }
}

impl fmt::Display for RelativeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for RelativeName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for RelativeName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Resolve the zone a domain belongs to
///
/// Examples:
/// - `sso.bbdevs.com` -> `bbdevs.com`
/// - `auth.sso.bbdevs.com` -> `bbdevs.com`
/// - `bbdevs.com` -> `bbdevs.com`
/// - `localhost` -> `localhost`
pub fn resolve_zone(fqdn: &str) -> Zone {
    let labels: Vec<&str> = fqdn.split('.').collect();
    if labels.len() < 2 {
        return Zone(fqdn.to_string());
    }

    Zone(labels[labels.len() - 2..].join("."))
}

/// Express `record_name` relative to `zone`
///
/// Names outside the zone are passed through unchanged; the provider rejects
/// them if they are invalid.
pub fn to_relative_name(record_name: &str, zone: &Zone) -> RelativeName {
    if record_name == zone.as_str() {
        return RelativeName(APEX.to_string());
    }

    match record_name
        .strip_suffix(zone.as_str())
        .and_then(|prefix| prefix.strip_suffix('.'))
    {
        Some(prefix) => RelativeName(prefix.to_string()),
        None => RelativeName(record_name.to_string()),
    }
}
