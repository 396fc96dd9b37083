//! Parent zone resolution.

use tracing::debug;

use crate::edge::{EdgeApi, EdgeApiError, Zone};

use super::types::{ZoneId, ZoneLookup};

/// Find the first zone whose name matches `zone_name` exactly (case-sensitive).
pub fn find_zone(zones: &[Zone], zone_name: &str) -> ZoneLookup {
    zones
        .iter()
        .find(|zone| zone.name == zone_name)
        .map(|zone| ZoneLookup::Found(ZoneId::new(zone.id.clone())))
        .unwrap_or(ZoneLookup::NotFound)
}

/// List zones once and resolve `zone_name` to its identifier.
pub async fn resolve_zone(api: &dyn EdgeApi, zone_name: &str) -> Result<ZoneLookup, EdgeApiError> {
    let zones = api.list_zones().await?;
    let lookup = find_zone(&zones, zone_name);
    debug!(
        zone_name,
        scanned = zones.len(),
        found = lookup.zone_id().is_some(),
        "Zone lookup finished"
    );
    Ok(lookup)
}
