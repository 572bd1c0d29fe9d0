// Plane types are inferred from the position of the first wire plane of a ROP
// within its TPC: plane 0 is first induction, plane 1 second induction and
// plane 2 collection. Nothing in the geometry confirms this; a detector whose
// planes are numbered differently gets silently misclassified.
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::readout_id::PlaneID;

/// Signal type of a readout plane, in the order the planes are stacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaneType {
    FirstInduction,
    SecondInduction,
    Collection,
    Unknown,
}

impl PlaneType {
    /// Plane type for a wire plane index
    pub fn from_plane_index(plane: u32) -> Self {
        match plane {
            0 => Self::FirstInduction,
            1 => Self::SecondInduction,
            2 => Self::Collection,
            _ => Self::Unknown,
        }
    }

    /// Classify a ROP from its ordered member planes
    ///
    /// An empty ROP is Unknown.
    pub fn classify(planes: &[PlaneID]) -> Self {
        match planes.first() {
            Some(pid) => Self::from_plane_index(pid.plane),
            None => Self::Unknown,
        }
    }

    pub fn signal_type(&self) -> SignalType {
        match self {
            Self::FirstInduction | Self::SecondInduction => SignalType::Induction,
            Self::Collection => SignalType::Collection,
            Self::Unknown => SignalType::Unknown,
        }
    }
}

impl Display for PlaneType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FirstInduction => write!(f, "first induction"),
            Self::SecondInduction => write!(f, "second induction"),
            Self::Collection => write!(f, "collection"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Signal type of a channel as seen by downstream reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalType {
    Induction,
    Collection,
    Unknown,
}

impl Display for SignalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Induction => write!(f, "induction"),
            Self::Collection => write!(f, "collection"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}
