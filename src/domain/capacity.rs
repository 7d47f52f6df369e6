//! Event capacity value object.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum number of simultaneous registrations an event accepts.
///
/// Always within [`Capacity::MIN`]..=[`Capacity::MAX`], so it is never zero
/// and percentage computations never divide by zero. Fixed at event creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema)]
#[serde(transparent)]
pub struct Capacity(u32);

impl Capacity {
    /// Smallest accepted capacity.
    pub const MIN: u32 = 1;
    /// Largest accepted capacity.
    pub const MAX: u32 = 1000;

    /// Creates a capacity, returning `None` when `value` is out of range.
    #[must_use]
    pub const fn new(value: u32) -> Option<Self> {
        if value >= Self::MIN && value <= Self::MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Returns the capacity as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for Capacity {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(value)
    }
}

impl<'de> Deserialize<'de> for Capacity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = i64::deserialize(deserializer)?;
        Self::try_from(raw).map_err(|v| {
            serde::de::Error::custom(format!(
                "capacity must be between {} and {}, got {v}",
                Self::MIN,
                Self::MAX
            ))
        })
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
