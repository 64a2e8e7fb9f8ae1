//! Fare tiers, the fare table, and zone-distance fare computation.

use std::{collections::BTreeMap, fmt};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{FareError, FareResult},
    network::Zone,
};

/// The five tube fare buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FareTier {
    /// Same zone, zone 1.
    Tier1,
    /// Same zone, outside zone 1.
    Tier2,
    /// One crossing, touching zone 1.
    Tier3,
    /// One crossing, outside zone 1.
    Tier4,
    /// Two crossings.
    Tier5,
}

impl FareTier {
    pub const ALL: [FareTier; 5] = [
        FareTier::Tier1,
        FareTier::Tier2,
        FareTier::Tier3,
        FareTier::Tier4,
        FareTier::Tier5,
    ];

    /// Classifies a travelled zone pair into its tier.
    pub fn for_pair(pair: ZonePair) -> FareResult<Self> {
        match pair.crossings() {
            0 if pair.includes(1) => Ok(FareTier::Tier1),
            0 => Ok(FareTier::Tier2),
            1 if pair.includes(1) => Ok(FareTier::Tier3),
            1 => Ok(FareTier::Tier4),
            2 => Ok(FareTier::Tier5),
            crossings => Err(FareError::UnsupportedTrip { crossings }),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FareTier::Tier1 => "tier1",
            FareTier::Tier2 => "tier2",
            FareTier::Tier3 => "tier3",
            FareTier::Tier4 => "tier4",
            FareTier::Tier5 => "tier5",
        }
    }
}

impl fmt::Display for FareTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The (entry zone, exit zone) interpretation chosen for a journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZonePair {
    pub entry: Zone,
    pub exit: Zone,
}

impl ZonePair {
    pub fn new(entry: Zone, exit: Zone) -> Self {
        Self { entry, exit }
    }

    pub fn crossings(&self) -> Zone {
        self.entry.abs_diff(self.exit)
    }

    pub fn includes(&self, zone: Zone) -> bool {
        self.entry == zone || self.exit == zone
    }
}

impl fmt::Display for ZonePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone {} -> zone {}", self.entry, self.exit)
    }
}

/// Picks the entry/exit zone combination with the fewest crossings.
///
/// Entry zones form the outer loop and exit zones the inner loop; the first
/// minimum encountered wins. Returns `None` if either set is empty.
pub fn nearest_zone_pair(entry_zones: &[Zone], exit_zones: &[Zone]) -> Option<ZonePair> {
    let mut closest: Option<ZonePair> = None;
    for &entry in entry_zones {
        for &exit in exit_zones {
            let candidate = ZonePair::new(entry, exit);
            match closest {
                Some(best) if best.crossings() <= candidate.crossings() => {}
                _ => closest = Some(candidate),
            }
        }
    }
    closest
}

/// Static price list: one amount per tube tier plus the flat bus fare.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareTable {
    tiers: BTreeMap<FareTier, Decimal>,
    bus_fare: Decimal,
}

impl FareTable {
    pub fn new(tiers: impl IntoIterator<Item = (FareTier, Decimal)>, bus_fare: Decimal) -> Self {
        Self {
            tiers: tiers.into_iter().collect(),
            bus_fare,
        }
    }

    pub fn bus_fare(&self) -> Decimal {
        self.bus_fare
    }

    pub fn tier_fare(&self, tier: FareTier) -> FareResult<Decimal> {
        self.tiers
            .get(&tier)
            .copied()
            .ok_or_else(|| FareError::InvalidConfig(format!("no fare defined for {}", tier)))
    }

    /// The hold charged at tube tap-on: the dearest tube tier.
    pub fn max_tube_fare(&self) -> Decimal {
        self.tiers.values().copied().max().unwrap_or(Decimal::ZERO)
    }

    /// Prices a travelled zone pair. Pure; depends only on the pair.
    pub fn calculate_fare(&self, pair: ZonePair) -> FareResult<Decimal> {
        let tier = FareTier::for_pair(pair)?;
        let fare = self.tier_fare(tier)?;
        tracing::debug!(%pair, %tier, %fare, "calculated tube fare");
        Ok(fare)
    }

    pub fn validate(&self) -> FareResult<()> {
        for tier in FareTier::ALL {
            let fare = self.tier_fare(tier)?;
            if fare <= Decimal::ZERO {
                return Err(FareError::InvalidConfig(format!(
                    "{} fare must be positive, got {}",
                    tier, fare
                )));
            }
        }
        if self.bus_fare <= Decimal::ZERO {
            return Err(FareError::InvalidConfig(format!(
                "bus fare must be positive, got {}",
                self.bus_fare
            )));
        }
        Ok(())
    }
}

impl Default for FareTable {
    fn default() -> Self {
        Self::new(
            [
                (FareTier::Tier1, dec!(2.5)),
                (FareTier::Tier2, dec!(2.0)),
                (FareTier::Tier3, dec!(3.0)),
                (FareTier::Tier4, dec!(2.25)),
                (FareTier::Tier5, dec!(3.2)),
            ],
            dec!(1.8),
        )
    }
}
