use rust_decimal::Decimal;
use thiserror::Error;

use crate::network::Zone;

pub type FareResult<T> = Result<T, FareError>;

/// Error type that captures every way a card operation can be refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FareError {
    #[error("Amount to add must be a positive number, got `{0}`")]
    InvalidAmount(String),
    #[error("Unknown station: `{0}`")]
    UnknownStation(String),
    #[error("Mode `{0}` is not supported")]
    UnsupportedMode(String),
    #[error("Tube trips must record an entry station before tapping off")]
    NoOpenJourney,
    #[error("No fare defined for a trip crossing {crossings} zones")]
    UnsupportedTrip { crossings: Zone },
    #[error("A journey from `{station}` is already open")]
    JourneyAlreadyOpen { station: String },
    #[error("Insufficient funds: balance {balance} cannot cover {required}")]
    InsufficientFunds { balance: Decimal, required: Decimal },
    #[error("Balance {balance} cannot absorb a change of {change}")]
    BalanceOverflow { balance: Decimal, change: Decimal },
    #[error("Invalid fare configuration: {0}")]
    InvalidConfig(String),
}
