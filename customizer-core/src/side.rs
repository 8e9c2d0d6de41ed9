//! Product sides.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CustomizerError;

/// One of the two faces of the product being designed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Front face.
    #[default]
    Front,
    /// Back face.
    Back,
}

impl Side {
    /// Both sides in capture order.
    pub const ALL: [Self; 2] = [Self::Front, Self::Back];

    /// The opposite side.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }

    /// Lowercase name, as stored in design records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = CustomizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "front" => Ok(Self::Front),
            "back" => Ok(Self::Back),
            other => Err(CustomizerError::InvalidCommand(format!(
                "unknown side '{other}' (expected front or back)"
            ))),
        }
    }
}

/// A value held once per side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerSide<T> {
    /// Front value.
    pub front: T,
    /// Back value.
    pub back: T,
}

impl<T> PerSide<T> {
    /// Borrow the value for a side.
    #[must_use]
    pub const fn get(&self, side: Side) -> &T {
        match side {
            Side::Front => &self.front,
            Side::Back => &self.back,
        }
    }

    /// Mutably borrow the value for a side.
    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Front => &mut self.front,
            Side::Back => &mut self.back,
        }
    }
}
