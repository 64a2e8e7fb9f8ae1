//! The stored-value card: balance, the open tube journey, and tap handling.

use std::{fmt, str::FromStr, sync::Arc};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    config::{BalancePolicy, FareConfig},
    errors::{FareError, FareResult},
    fares::{nearest_zone_pair, ZonePair},
    network::StationId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    Tube,
    Bus,
}

impl TravelMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TravelMode::Tube => "tube",
            TravelMode::Bus => "bus",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelMode {
    type Err = FareError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "tube" => Ok(TravelMode::Tube),
            "bus" => Ok(TravelMode::Bus),
            _ => Err(FareError::UnsupportedMode(value.to_string())),
        }
    }
}

/// Tube journey state. Bus taps never leave it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JourneyState {
    #[default]
    Idle,
    Open { entry: StationId },
}

impl JourneyState {
    pub fn is_open(&self) -> bool {
        matches!(self, JourneyState::Open { .. })
    }

    pub fn entry_station(&self) -> Option<&StationId> {
        match self {
            JourneyState::Idle => None,
            JourneyState::Open { entry } => Some(entry),
        }
    }
}

/// A settled trip as it appears on the card statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRecord {
    pub mode: TravelMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<StationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit: Option<StationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zones: Option<ZonePair>,
    pub charged: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// Stored-value travel card.
///
/// Tube trips are charged the maximum fare at tap-on and reimbursed down to
/// the actual fare at tap-off. Bus trips are a single flat-rate tap.
#[derive(Debug, Clone)]
pub struct FareCard {
    config: Arc<FareConfig>,
    balance: Decimal,
    journey: JourneyState,
    history: Vec<TripRecord>,
}

impl Default for FareCard {
    fn default() -> Self {
        Self::new(Decimal::ZERO)
    }
}

impl FareCard {
    /// Creates a card on the default network with the given starting balance.
    pub fn new(balance: Decimal) -> Self {
        Self::from_parts(Arc::new(FareConfig::default()), balance)
    }

    /// Creates a card on a caller-supplied network, rejecting tables that
    /// would let a tube journey open but never settle.
    pub fn with_config(config: Arc<FareConfig>, balance: Decimal) -> FareResult<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, balance))
    }

    fn from_parts(config: Arc<FareConfig>, balance: Decimal) -> Self {
        Self {
            config,
            balance,
            journey: JourneyState::Idle,
            history: Vec::new(),
        }
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn journey(&self) -> &JourneyState {
        &self.journey
    }

    pub fn entry_station(&self) -> Option<&StationId> {
        self.journey.entry_station()
    }

    pub fn history(&self) -> &[TripRecord] {
        &self.history
    }

    pub fn config(&self) -> &FareConfig {
        &self.config
    }

    pub fn max_tube_fare(&self) -> Decimal {
        self.config.fares.max_tube_fare()
    }

    pub fn load_card(&mut self, amount: Decimal) -> FareResult<Decimal> {
        if amount <= Decimal::ZERO {
            return Err(FareError::InvalidAmount(amount.to_string()));
        }
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(FareError::BalanceOverflow {
                balance: self.balance,
                change: amount,
            })?;
        tracing::debug!(%amount, balance = %self.balance, "loaded card");
        Ok(self.balance)
    }

    /// Parses a textual amount, rejecting anything that is not a positive decimal.
    pub fn load_card_str(&mut self, raw: &str) -> FareResult<Decimal> {
        let amount = Decimal::from_str(raw.trim())
            .map_err(|_| FareError::InvalidAmount(raw.to_string()))?;
        self.load_card(amount)
    }

    /// Starts a trip. Tube requires a known entry station; bus ignores it.
    pub fn tap_on(&mut self, mode: TravelMode, entry_station: Option<&str>) -> FareResult<()> {
        match mode {
            TravelMode::Tube => {
                if let Some(open) = self.journey.entry_station() {
                    tracing::warn!(station = %open, "tap-on refused, journey already open");
                    return Err(FareError::JourneyAlreadyOpen {
                        station: open.to_string(),
                    });
                }
                let station = StationId::new(entry_station.unwrap_or_default());
                self.config.stations.require(&station)?;
                let hold = self.max_tube_fare();
                self.authorize(hold)?;
                self.deduct_fare(hold)?;
                tracing::debug!(%station, %hold, balance = %self.balance, "tube tap-on");
                self.journey = JourneyState::Open { entry: station };
            }
            TravelMode::Bus => {
                let fare = self.config.fares.bus_fare();
                self.authorize(fare)?;
                self.deduct_fare(fare)?;
                tracing::debug!(%fare, balance = %self.balance, "bus tap-on");
                self.history.push(TripRecord {
                    mode,
                    entry: None,
                    exit: None,
                    zones: None,
                    charged: fare,
                    timestamp: Utc::now(),
                });
            }
        }
        Ok(())
    }

    /// Text entry point used by drivers; unknown modes yield `UnsupportedMode`.
    pub fn tap_on_str(&mut self, mode: &str, entry_station: Option<&str>) -> FareResult<()> {
        let mode = mode.parse::<TravelMode>()?;
        self.tap_on(mode, entry_station)
    }

    /// Ends the open tube journey, reimbursing the hold down to the actual fare.
    ///
    /// On any error the card is left exactly as it was, journey included.
    pub fn tap_off(&mut self, exit_station: &str) -> FareResult<Decimal> {
        let entry = self
            .journey
            .entry_station()
            .cloned()
            .ok_or(FareError::NoOpenJourney)?;
        let exit = StationId::new(exit_station);

        let entry_zones = self.config.stations.require(&entry)?;
        let exit_zones = self.config.stations.require(&exit)?;
        let pair = nearest_zone_pair(entry_zones, exit_zones).ok_or_else(|| {
            FareError::InvalidConfig(format!("no zones recorded for `{}` or `{}`", entry, exit))
        })?;
        let fare = self.calculate_fare(pair)?;

        let reimbursement = self.max_tube_fare() - fare;
        if reimbursement > Decimal::ZERO {
            self.load_card(reimbursement)?;
        }
        self.journey = JourneyState::Idle;
        tracing::info!(
            %entry,
            %exit,
            %pair,
            %fare,
            %reimbursement,
            balance = %self.balance,
            "tube journey completed"
        );
        self.history.push(TripRecord {
            mode: TravelMode::Tube,
            entry: Some(entry),
            exit: Some(exit),
            zones: Some(pair),
            charged: fare,
            timestamp: Utc::now(),
        });
        Ok(fare)
    }

    pub fn calculate_fare(&self, pair: ZonePair) -> FareResult<Decimal> {
        self.config.fares.calculate_fare(pair)
    }

    fn authorize(&self, charge: Decimal) -> FareResult<()> {
        match self.config.balance_policy {
            BalancePolicy::AllowNegative => Ok(()),
            BalancePolicy::RejectInsufficient if self.balance >= charge => Ok(()),
            BalancePolicy::RejectInsufficient => {
                tracing::warn!(balance = %self.balance, %charge, "tap-on refused, insufficient funds");
                Err(FareError::InsufficientFunds {
                    balance: self.balance,
                    required: charge,
                })
            }
        }
    }

    fn deduct_fare(&mut self, fare: Decimal) -> FareResult<()> {
        self.balance = self
            .balance
            .checked_sub(fare)
            .ok_or(FareError::BalanceOverflow {
                balance: self.balance,
                change: -fare,
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{
        fares::{FareTable, FareTier},
        network::StationZones,
    };

    fn card(balance: Decimal) -> FareCard {
        FareCard::new(balance)
    }

    #[test]
    fn load_card_rejects_non_positive_amounts() {
        let mut card = card(dec!(5));
        assert_eq!(
            card.load_card(dec!(0)),
            Err(FareError::InvalidAmount("0".into()))
        );
        assert!(matches!(
            card.load_card(dec!(-3)),
            Err(FareError::InvalidAmount(_))
        ));
        assert_eq!(card.balance(), dec!(5));
    }

    #[test]
    fn load_card_str_rejects_non_numeric_text() {
        let mut card = card(dec!(0));
        assert_eq!(
            card.load_card_str("ten"),
            Err(FareError::InvalidAmount("ten".into()))
        );
        assert_eq!(card.load_card_str(" 12.40 "), Ok(dec!(12.40)));
    }

    #[test]
    fn tube_tap_on_holds_the_maximum_fare() {
        let mut card = card(dec!(10));
        card.tap_on(TravelMode::Tube, Some("holborn")).unwrap();
        assert_eq!(card.balance(), dec!(6.8));
        assert_eq!(card.entry_station(), Some(&StationId::new("holborn")));
        assert!(card.history().is_empty());
    }

    #[test]
    fn tube_tap_on_at_unknown_station_changes_nothing() {
        let mut card = card(dec!(10));
        assert_eq!(
            card.tap_on(TravelMode::Tube, Some("atlantis")),
            Err(FareError::UnknownStation("atlantis".into()))
        );
        assert_eq!(
            card.tap_on(TravelMode::Tube, None),
            Err(FareError::UnknownStation(String::new()))
        );
        assert_eq!(card.balance(), dec!(10));
        assert_eq!(card.journey(), &JourneyState::Idle);
    }

    #[test]
    fn second_tube_tap_on_is_refused() {
        let mut card = card(dec!(10));
        card.tap_on(TravelMode::Tube, Some("chelsea")).unwrap();
        assert_eq!(
            card.tap_on(TravelMode::Tube, Some("holborn")),
            Err(FareError::JourneyAlreadyOpen {
                station: "chelsea".into()
            })
        );
        assert_eq!(card.balance(), dec!(6.8));
        assert_eq!(card.entry_station(), Some(&StationId::new("chelsea")));
    }

    #[test]
    fn bus_tap_on_charges_flat_fare_without_journey() {
        let mut card = card(dec!(10));
        card.tap_on(TravelMode::Bus, Some("ignored")).unwrap();
        assert_eq!(card.balance(), dec!(8.2));
        assert!(!card.journey().is_open());
        assert_eq!(card.history().len(), 1);
        assert_eq!(card.history()[0].charged, dec!(1.8));
    }

    #[test]
    fn unsupported_mode_is_rejected() {
        let mut card = card(dec!(10));
        assert_eq!(
            card.tap_on_str("car", None),
            Err(FareError::UnsupportedMode("car".into()))
        );
        assert_eq!(card.balance(), dec!(10));
    }

    #[test]
    fn tap_off_without_journey_fails() {
        let mut card = card(dec!(10));
        assert_eq!(card.tap_off("holborn"), Err(FareError::NoOpenJourney));
    }

    #[test]
    fn tap_off_at_unknown_station_keeps_journey_open() {
        let mut card = card(dec!(10));
        card.tap_on(TravelMode::Tube, Some("holborn")).unwrap();
        assert_eq!(
            card.tap_off("narnia"),
            Err(FareError::UnknownStation("narnia".into()))
        );
        assert_eq!(card.balance(), dec!(6.8));
        assert!(card.journey().is_open());
    }

    #[test]
    fn tap_off_reimburses_down_to_actual_fare() {
        let mut card = card(dec!(30));
        card.tap_on(TravelMode::Tube, Some("holborn")).unwrap();
        assert_eq!(card.balance(), dec!(26.8));
        assert_eq!(card.tap_off("earls_court"), Ok(dec!(2.5)));
        assert_eq!(card.balance(), dec!(27.5));
        assert_eq!(card.journey(), &JourneyState::Idle);

        let trip = &card.history()[0];
        assert_eq!(trip.mode, TravelMode::Tube);
        assert_eq!(trip.zones, Some(ZonePair::new(1, 1)));
        assert_eq!(trip.charged, dec!(2.5));
    }

    #[test]
    fn unsupported_trip_leaves_card_untouched() {
        let stations = StationZones::new()
            .with_station("centre", &[1])
            .with_station("far_out", &[6]);
        let config = FareConfig::new(stations, FareTable::default());
        let mut card = FareCard::with_config(Arc::new(config), dec!(10)).unwrap();

        card.tap_on(TravelMode::Tube, Some("centre")).unwrap();
        assert_eq!(
            card.tap_off("far_out"),
            Err(FareError::UnsupportedTrip { crossings: 5 })
        );
        assert_eq!(card.balance(), dec!(6.8));
        assert!(card.journey().is_open());
    }

    #[test]
    fn reject_insufficient_policy_blocks_tap_on() {
        let config = FareConfig::default().with_balance_policy(BalancePolicy::RejectInsufficient);
        let mut card = FareCard::with_config(Arc::new(config), dec!(2)).unwrap();
        assert_eq!(
            card.tap_on(TravelMode::Tube, Some("holborn")),
            Err(FareError::InsufficientFunds {
                balance: dec!(2),
                required: dec!(3.2)
            })
        );
        card.tap_on(TravelMode::Bus, None).unwrap();
        assert_eq!(card.balance(), dec!(0.2));
        assert!(card.tap_on(TravelMode::Bus, None).is_err());
    }

    #[test]
    fn allow_negative_policy_lets_balance_drop_below_zero() {
        let mut card = card(dec!(1));
        card.tap_on(TravelMode::Tube, Some("wimbledon")).unwrap();
        assert_eq!(card.balance(), dec!(-2.2));
    }

    #[test]
    fn load_onto_full_balance_is_refused() {
        let mut card = card(Decimal::MAX);
        assert_eq!(
            card.load_card(dec!(1)),
            Err(FareError::BalanceOverflow {
                balance: Decimal::MAX,
                change: dec!(1)
            })
        );
        assert_eq!(card.balance(), Decimal::MAX);
    }

    #[test]
    fn tap_on_at_minimum_balance_is_refused() {
        let mut card = card(Decimal::MIN);
        assert!(matches!(
            card.tap_on(TravelMode::Tube, Some("holborn")),
            Err(FareError::BalanceOverflow { .. })
        ));
        assert!(matches!(
            card.tap_on(TravelMode::Bus, None),
            Err(FareError::BalanceOverflow { .. })
        ));
        assert_eq!(card.balance(), Decimal::MIN);
        assert_eq!(card.journey(), &JourneyState::Idle);
        assert!(card.history().is_empty());
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let stations = StationZones::new()
            .with_station("a", &[1])
            .with_station("b", &[]);
        let config = FareConfig::new(stations, FareTable::default());
        assert!(matches!(
            FareCard::with_config(Arc::new(config), dec!(10)),
            Err(FareError::InvalidConfig(_))
        ));

        let missing_tier = FareTable::new([(FareTier::Tier1, dec!(2.5))], dec!(1.8));
        let config = FareConfig::new(FareConfig::default().stations, missing_tier);
        assert!(matches!(
            FareCard::with_config(Arc::new(config), dec!(10)),
            Err(FareError::InvalidConfig(_))
        ));
    }

    #[test]
    fn modes_parse_case_insensitively() {
        assert_eq!("Tube".parse::<TravelMode>(), Ok(TravelMode::Tube));
        assert_eq!(" BUS ".parse::<TravelMode>(), Ok(TravelMode::Bus));
    }
}
