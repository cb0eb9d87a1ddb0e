// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone resolution for node names.
//!
//! The zone is derived from the node name on every reconciliation; it is never
//! stored. Only the final label is returned, so `worker-1.example.com` resolves
//! to `com` rather than `example.com`. Multi-label zones are therefore not
//! supported yet and the record is always written into the top-level zone.

use crate::constants::DNS_LABEL_SEPARATOR;
use crate::dns_errors::ValidationError;

/// Resolve the DNS zone a node record belongs to.
///
/// # Errors
///
/// - [`ValidationError::EmptyName`] if `name` is empty
/// - [`ValidationError::NotFullyQualified`] if `name` contains no `.`
///
/// # Example
///
/// ```rust
/// use nodedns::zone::resolve_zone;
///
/// assert_eq!(resolve_zone("worker-1.example.com").unwrap(), "com");
/// assert!(resolve_zone("worker-1").is_err());
/// ```
pub fn resolve_zone(name: &str) -> Result<String, ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }

    if !name.contains(DNS_LABEL_SEPARATOR) {
        return Err(ValidationError::NotFullyQualified {
            name: name.to_string(),
        });
    }

    // rsplit always yields at least one item
    let zone = name.rsplit(DNS_LABEL_SEPARATOR).next().unwrap_or_default();

    Ok(zone.to_string())
}

#[cfg(test)]
#[path = "zone_tests.rs"]
mod zone_tests;
