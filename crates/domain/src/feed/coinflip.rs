//! Coinflip scoreboard results.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::payload::{FieldValue, Payload};
use crate::record::FeedRecord;
use crate::time::{self, Timestamp};

/// Path of the coinflip results feed.
pub const PATH: &str = "coinflips";

/// Side of the coin a player bet on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Heads,
    Tails,
}

impl Side {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Heads => "heads",
            Self::Tails => "tails",
        }
    }
}

impl std::str::FromStr for Side {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "heads" => Ok(Self::Heads),
            "tails" => Ok(Self::Tails),
            other => Err(ValidationError::InvalidField {
                field: "side",
                value: other.to_string(),
            }),
        }
    }
}

/// One settled coinflip as shown on the scoreboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoinflipResult {
    pub side: Side,
    pub wager: f64,
    pub win: bool,
    pub payout: f64,
    #[serde(with = "time::millis")]
    pub timestamp: Timestamp,
}

impl CoinflipResult {
    /// Payload to append for a settled flip.
    #[must_use]
    pub fn payload(side: Side, wager: f64, win: bool, payout: f64) -> Payload {
        Payload::new()
            .with("side", side.as_str())
            .with("wager", wager)
            .with("win", win)
            .with("payout", payout)
    }

    /// Scoreboard row: `heads - Wager: 1 - Won 2` or `tails - Wager: 1 - Lost`.
    #[must_use]
    pub fn summary(&self) -> String {
        let outcome = if self.win {
            format!("Won {}", self.payout)
        } else {
            "Lost".to_string()
        };
        format!("{} - Wager: {} - {outcome}", self.side.as_str(), self.wager)
    }
}

impl TryFrom<&FeedRecord> for CoinflipResult {
    type Error = ValidationError;

    fn try_from(record: &FeedRecord) -> Result<Self, Self::Error> {
        let payload = &record.payload;
        let side = payload
            .get("side")
            .and_then(FieldValue::as_str)
            .ok_or(ValidationError::MissingField { field: "side" })?
            .parse()?;
        let number = |field: &'static str| {
            payload
                .get(field)
                .and_then(FieldValue::as_f64)
                .ok_or(ValidationError::MissingField { field })
        };
        Ok(Self {
            side,
            wager: number("wager")?,
            win: payload
                .get("win")
                .and_then(FieldValue::as_bool)
                .ok_or(ValidationError::MissingField { field: "win" })?,
            payout: number("payout")?,
            timestamp: record.timestamp,
        })
    }
}
