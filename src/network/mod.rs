//! Station identifiers and the static station-to-zones lookup table.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::errors::{FareError, FareResult};

/// Numbered fare region. Zone 1 is the central zone.
pub type Zone = u8;

/// Boundary stations belong to at most two adjacent zones.
pub const MAX_ZONES_PER_STATION: usize = 2;

/// Normalised station identifier (trimmed, lowercase).
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct StationId(String);

impl StationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Maps every known station to the zone(s) it sits in.
///
/// Zone order is preserved as supplied; the nearest-pair search walks it in
/// that order, so it decides ties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationZones {
    stations: BTreeMap<StationId, Vec<Zone>>,
}

impl StationZones {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert used when assembling static tables.
    pub fn with_station(mut self, id: impl Into<StationId>, zones: &[Zone]) -> Self {
        self.insert(id, zones);
        self
    }

    pub fn insert(&mut self, id: impl Into<StationId>, zones: &[Zone]) {
        self.stations.insert(id.into(), zones.to_vec());
    }

    pub fn zones(&self, id: &StationId) -> Option<&[Zone]> {
        self.stations.get(id).map(Vec::as_slice)
    }

    /// Looks up a station, failing with [`FareError::UnknownStation`] when absent.
    pub fn require(&self, id: &StationId) -> FareResult<&[Zone]> {
        self.zones(id)
            .ok_or_else(|| FareError::UnknownStation(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn validate(&self) -> FareResult<()> {
        if self.is_empty() {
            return Err(FareError::InvalidConfig(
                "station table must list at least one station".into(),
            ));
        }
        for (id, zones) in &self.stations {
            if id.as_str().is_empty() {
                return Err(FareError::InvalidConfig(
                    "station identifiers must not be empty".into(),
                ));
            }
            if zones.is_empty() || zones.len() > MAX_ZONES_PER_STATION {
                return Err(FareError::InvalidConfig(format!(
                    "station `{}` must belong to 1 or {} zones, found {}",
                    id,
                    MAX_ZONES_PER_STATION,
                    zones.len()
                )));
            }
            if zones.contains(&0) {
                return Err(FareError::InvalidConfig(format!(
                    "station `{}` lists zone 0; zones start at 1",
                    id
                )));
            }
        }
        Ok(())
    }
}
