#![doc(test(attr(deny(warnings))))]

//! Fare Card models a stored-value transit card: it holds a balance, tracks
//! the entry point of an open tube journey, and prices trips by the zones
//! they cross.
//!
//! ```
//! use fare_card::card::{FareCard, TravelMode};
//! use rust_decimal_macros::dec;
//!
//! let mut card = FareCard::new(dec!(30));
//! card.tap_on(TravelMode::Tube, Some("holborn")).unwrap();
//! assert_eq!(card.balance(), dec!(26.8));
//! card.tap_off("earls_court").unwrap();
//! assert_eq!(card.balance(), dec!(27.5));
//! ```

pub mod card;
pub mod cli;
pub mod config;
pub mod errors;
pub mod fares;
pub mod network;
pub mod utils;

pub use card::{FareCard, JourneyState, TravelMode, TripRecord};
pub use config::{BalancePolicy, FareConfig};
pub use errors::{FareError, FareResult};
pub use fares::{nearest_zone_pair, FareTable, FareTier, ZonePair};
pub use network::{StationId, StationZones, Zone};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Fare Card tracing initialized.");
    });
}
