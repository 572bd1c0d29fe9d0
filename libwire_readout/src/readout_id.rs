use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Electronics readout channel number, unique across the whole detector.
pub type ChannelID = u32;

/// Index of a cryostat.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct CryostatID {
    pub cryostat: u32,
}

impl CryostatID {
    pub fn new(cryostat: u32) -> Self {
        Self { cryostat }
    }
}

impl Display for CryostatID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "C:{}", self.cryostat)
    }
}

/// A TPC within a cryostat.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct TPCID {
    pub cryostat: u32,
    pub tpc: u32,
}

impl TPCID {
    pub fn new(cryostat: u32, tpc: u32) -> Self {
        Self { cryostat, tpc }
    }

    pub fn cryostat_id(&self) -> CryostatID {
        CryostatID::new(self.cryostat)
    }
}

impl Display for TPCID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "C:{} T:{}", self.cryostat, self.tpc)
    }
}

/// A physical wire plane.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct PlaneID {
    pub cryostat: u32,
    pub tpc: u32,
    pub plane: u32,
}

impl PlaneID {
    pub fn new(cryostat: u32, tpc: u32, plane: u32) -> Self {
        Self {
            cryostat,
            tpc,
            plane,
        }
    }

    pub fn tpc_id(&self) -> TPCID {
        TPCID::new(self.cryostat, self.tpc)
    }
}

impl Display for PlaneID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "C:{} T:{} P:{}", self.cryostat, self.tpc, self.plane)
    }
}

/// A physical wire, local index within its plane.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct WireID {
    pub plane_id: PlaneID,
    pub wire: u32,
}

impl WireID {
    pub fn new(plane_id: PlaneID, wire: u32) -> Self {
        Self { plane_id, wire }
    }
}

impl Display for WireID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} W:{}", self.plane_id, self.wire)
    }
}

/// A group of TPCs sharing one set of readout electronics.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct TPCSetID {
    pub cryostat: u32,
    pub tpcset: u32,
}

impl TPCSetID {
    pub fn new(cryostat: u32, tpcset: u32) -> Self {
        Self { cryostat, tpcset }
    }

    pub fn cryostat_id(&self) -> CryostatID {
        CryostatID::new(self.cryostat)
    }
}

impl Display for TPCSetID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "C:{} S:{}", self.cryostat, self.tpcset)
    }
}

/// Readout plane (ROP): wire planes ganged onto the same channel range.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct ROPID {
    pub cryostat: u32,
    pub tpcset: u32,
    pub rop: u32,
}

impl ROPID {
    pub fn new(cryostat: u32, tpcset: u32, rop: u32) -> Self {
        Self {
            cryostat,
            tpcset,
            rop,
        }
    }

    pub fn tpcset_id(&self) -> TPCSetID {
        TPCSetID::new(self.cryostat, self.tpcset)
    }
}

impl Display for ROPID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "C:{} S:{} R:{}", self.cryostat, self.tpcset, self.rop)
    }
}

//Unit tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexicographic_order() {
        let a = PlaneID::new(0, 1, 2);
        let b = PlaneID::new(0, 2, 0);
        let c = PlaneID::new(1, 0, 0);
        assert!(a < b);
        assert!(b < c);
        assert!(ROPID::new(0, 0, 3) < ROPID::new(0, 1, 0));
        assert!(WireID::new(a, 100) < WireID::new(b, 0));
    }

    #[test]
    fn test_display() {
        assert_eq!(ROPID::new(1, 0, 2).to_string(), "C:1 S:0 R:2");
        assert_eq!(
            WireID::new(PlaneID::new(0, 1, 2), 5).to_string(),
            "C:0 T:1 P:2 W:5"
        );
    }
}
