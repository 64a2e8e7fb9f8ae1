use std::sync::Arc;

use fare_card::{BalancePolicy, FareCard, FareConfig, FareTable, FareTier, StationZones};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// A small suburban network with cheaper fares, used to check that cards
/// honour whatever table they are handed.
pub fn suburban_config() -> FareConfig {
    let stations = StationZones::new()
        .with_station("market", &[2])
        .with_station("junction", &[2, 3])
        .with_station("orchard", &[3])
        .with_station("harbour", &[4])
        .with_station("terminus", &[5]);
    let fares = FareTable::new(
        [
            (FareTier::Tier1, dec!(2.00)),
            (FareTier::Tier2, dec!(1.10)),
            (FareTier::Tier3, dec!(2.40)),
            (FareTier::Tier4, dec!(1.50)),
            (FareTier::Tier5, dec!(2.60)),
        ],
        dec!(1.00),
    );
    FareConfig::new(stations, fares)
}

pub fn suburban_card(balance: Decimal, policy: BalancePolicy) -> FareCard {
    FareCard::with_config(
        Arc::new(suburban_config().with_balance_policy(policy)),
        balance,
    )
    .expect("suburban config is valid")
}
