//! Faction tension level (validated newtype)
//!
//! Tension between two factions is an integer on a [-100, 100] scale:
//! positive values are hostility, negative values are warmth. The newtype
//! guarantees out-of-range values cannot be constructed, and carries the
//! threshold classification used by the ledger.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Tension between two factions on a [-100, 100] scale.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(try_from = "i32", into = "i32")]
pub struct TensionLevel(i32);

impl TensionLevel {
    /// Minimum valid value: firm alliance.
    pub const MIN: i32 = -100;

    /// Maximum valid value: total war.
    pub const MAX: i32 = 100;

    /// Tension at or above this is open war.
    pub const WAR_THRESHOLD: i32 = 70;

    /// Tension at or below this is a formal alliance trigger.
    pub const ALLIANCE_THRESHOLD: i32 = -50;

    /// Neutral starting point for new relationships.
    pub const NEUTRAL: TensionLevel = TensionLevel(0);

    /// Create a new `TensionLevel`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the value is outside [-100, 100].
    pub fn new(value: i32) -> Result<Self, DomainError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(DomainError::validation(format!(
                "Tension must be within [{}, {}], got {}",
                Self::MIN,
                Self::MAX,
                value
            )));
        }
        Ok(Self(value))
    }

    /// Create a `TensionLevel`, clamping to the valid range.
    pub fn clamped(value: i32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    /// Returns the underlying value.
    #[inline]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Apply a signed delta, saturating at the scale bounds.
    pub fn apply(self, delta: i32) -> Self {
        Self::clamped(self.0.saturating_add(delta))
    }

    /// Step toward neutral by `amount` without overshooting zero.
    pub fn decayed_toward_neutral(self, amount: i32) -> Self {
        if self.0 > 0 {
            Self((self.0 - amount).max(0))
        } else if self.0 < 0 {
            Self((self.0 + amount).min(0))
        } else {
            self
        }
    }

    /// Classify the relationship this tension level implies.
    pub fn standing(self) -> Standing {
        if self.0 >= Self::WAR_THRESHOLD {
            Standing::War
        } else if self.0 >= 30 {
            Standing::Hostile
        } else if self.0 >= -30 {
            Standing::Neutral
        } else if self.0 >= -60 {
            Standing::Friendly
        } else {
            Standing::Alliance
        }
    }

    pub fn is_at_war(self) -> bool {
        self.0 >= Self::WAR_THRESHOLD
    }

    pub fn is_allied(self) -> bool {
        self.0 <= Self::ALLIANCE_THRESHOLD
    }
}

impl fmt::Display for TensionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<TensionLevel> for i32 {
    fn from(level: TensionLevel) -> Self {
        level.0
    }
}

impl TryFrom<i32> for TensionLevel {
    type Error = DomainError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Relationship classification derived from tension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Standing {
    War,
    Hostile,
    Neutral,
    Friendly,
    Alliance,
}

impl fmt::Display for Standing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::War => "war",
            Self::Hostile => "hostile",
            Self::Neutral => "neutral",
            Self::Friendly => "friendly",
            Self::Alliance => "alliance",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_out_of_range() {
        assert!(TensionLevel::new(101).is_err());
        assert!(TensionLevel::new(-101).is_err());
        assert!(TensionLevel::new(100).is_ok());
        assert!(TensionLevel::new(-100).is_ok());
    }

    #[test]
    fn apply_saturates_at_bounds() {
        let high = TensionLevel::clamped(95);
        assert_eq!(high.apply(20).value(), 100);
        let low = TensionLevel::clamped(-95);
        assert_eq!(low.apply(-20).value(), -100);
    }

    #[test]
    fn decay_never_overshoots_neutral() {
        assert_eq!(TensionLevel::clamped(3).decayed_toward_neutral(5).value(), 0);
        assert_eq!(
            TensionLevel::clamped(-3).decayed_toward_neutral(5).value(),
            0
        );
        assert_eq!(
            TensionLevel::clamped(10).decayed_toward_neutral(4).value(),
            6
        );
    }

    #[test]
    fn standing_thresholds() {
        assert_eq!(TensionLevel::clamped(70).standing(), Standing::War);
        assert_eq!(TensionLevel::clamped(69).standing(), Standing::Hostile);
        assert_eq!(TensionLevel::clamped(30).standing(), Standing::Hostile);
        assert_eq!(TensionLevel::clamped(0).standing(), Standing::Neutral);
        assert_eq!(TensionLevel::clamped(-30).standing(), Standing::Neutral);
        assert_eq!(TensionLevel::clamped(-31).standing(), Standing::Friendly);
        assert_eq!(TensionLevel::clamped(-60).standing(), Standing::Friendly);
        assert_eq!(TensionLevel::clamped(-61).standing(), Standing::Alliance);
    }
}
