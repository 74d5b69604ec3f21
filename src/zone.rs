//! Zones are the parts of the country in which a technology may be deployed.
use crate::id::{IDCollection, define_id_type};
use anyhow::{Result, ensure};
use indexmap::IndexSet;

define_id_type! {ZoneID}

/// The zones in which a technology is available
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ZoneSelection {
    /// Available everywhere
    #[default]
    All,
    /// Available only in the listed zones
    Some(IndexSet<ZoneID>),
}

impl ZoneSelection {
    /// Whether the selection includes the given zone
    pub fn contains(&self, zone_id: &ZoneID) -> bool {
        match self {
            Self::All => true,
            Self::Some(zones) => zones.contains(zone_id),
        }
    }
}

/// Parse a string of zones separated by semicolons into a [`ZoneSelection`].
///
/// The string can be either "all" (case-insensitive), a single zone, or a semicolon-separated
/// list of zones (e.g. "north;south" or "north; south"). If the model declares no zones, any zone
/// names are accepted.
pub fn parse_zone_str(s: &str, zone_ids: &IndexSet<ZoneID>) -> Result<ZoneSelection> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("all") {
        return Ok(ZoneSelection::All);
    }

    let zones = s
        .split(';')
        .map(|zone| {
            let zone = zone.trim();
            if zone_ids.is_empty() {
                Ok(ZoneID::new(zone))
            } else {
                zone_ids.get_id_by_str(zone)
            }
        })
        .collect::<Result<IndexSet<_>>>()?;
    ensure!(
        !zones.iter().any(|zone| zone.0.is_empty()),
        "Empty zone name in \"{s}\""
    );

    Ok(ZoneSelection::Some(zones))
}
