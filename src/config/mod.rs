//! Static fare configuration handed to every card at construction.

use serde::{Deserialize, Serialize};

use crate::{errors::FareResult, fares::FareTable, network::StationZones};

/// What a tap-on does when the balance cannot cover the charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalancePolicy {
    /// Charge anyway; the balance may go negative.
    #[default]
    AllowNegative,
    /// Refuse the tap with `InsufficientFunds`.
    RejectInsufficient,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareConfig {
    pub stations: StationZones,
    pub fares: FareTable,
    #[serde(default)]
    pub balance_policy: BalancePolicy,
}

impl FareConfig {
    pub fn new(stations: StationZones, fares: FareTable) -> Self {
        Self {
            stations,
            fares,
            balance_policy: BalancePolicy::default(),
        }
    }

    pub fn with_balance_policy(mut self, policy: BalancePolicy) -> Self {
        self.balance_policy = policy;
        self
    }

    pub fn validate(&self) -> FareResult<()> {
        self.stations.validate()?;
        self.fares.validate()
    }
}

impl Default for FareConfig {
    fn default() -> Self {
        let stations = StationZones::new()
            .with_station("holborn", &[1])
            .with_station("chelsea", &[1])
            .with_station("earls_court", &[1, 2])
            .with_station("hammersmith", &[2])
            .with_station("wimbledon", &[3]);
        Self::new(stations, FareTable::default())
    }
}
