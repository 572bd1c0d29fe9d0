//! The grouping of TPCs into TPC sets and of wire planes into readout planes (ROPs).
//!
//! The grouping is decided elsewhere; this module only holds it, checks that it
//! refers to things that exist in the geometry, and answers membership questions
//! in both directions.
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::error::TopologyError;
use super::geometry::DetectorGeometry;
use super::readout_id::{CryostatID, PlaneID, TPCSetID, ROPID, TPCID};

/// A wire plane referenced from within its cryostat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaneRef {
    pub tpc: u32,
    pub plane: u32,
}

/// One TPC set: its TPCs and its ROPs, each ROP an ordered list of member wire planes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TPCSetReadout {
    pub tpcs: Vec<u32>,
    pub rops: Vec<Vec<PlaneRef>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CryostatReadout {
    pub tpc_sets: Vec<TPCSetReadout>,
}

/// The readout grouping as supplied by the grouping pass (or a detector description file).
///
/// Order matters everywhere: TPC sets, ROPs and member planes are numbered and
/// visited in the order given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadoutTopology {
    pub cryostats: Vec<CryostatReadout>,
}

/// ReadoutMapInfo is the validated, indexed form of a ReadoutTopology.
///
/// Forward lists are kept in their given order; the reverse maps (TPC to TPC set,
/// wire plane to ROP) are derived once here.
#[derive(Debug, Clone, Default)]
pub struct ReadoutMapInfo {
    tpcset_tpcs: Vec<Vec<Vec<TPCID>>>,
    rop_planes: Vec<Vec<Vec<Vec<PlaneID>>>>,
    tpc_to_tpcset: FxHashMap<TPCID, TPCSetID>,
    plane_to_rop: FxHashMap<PlaneID, ROPID>,
}

impl ReadoutMapInfo {
    /// Index a topology, checking every referenced TPC and plane against the geometry
    pub fn new(
        topology: &ReadoutTopology,
        geometry: &DetectorGeometry,
    ) -> Result<Self, TopologyError> {
        if topology.cryostats.len() != geometry.n_cryostats() {
            return Err(TopologyError::CryostatMismatch {
                topology: topology.cryostats.len(),
                geometry: geometry.n_cryostats(),
            });
        }

        let mut info = ReadoutMapInfo::default();
        for (c, cryo) in topology.cryostats.iter().enumerate() {
            let c = c as u32;
            let mut cryo_tpcs: Vec<Vec<TPCID>> = Vec::with_capacity(cryo.tpc_sets.len());
            let mut cryo_rops: Vec<Vec<Vec<PlaneID>>> = Vec::with_capacity(cryo.tpc_sets.len());
            for (s, set) in cryo.tpc_sets.iter().enumerate() {
                let sid = TPCSetID::new(c, s as u32);

                let mut tpcs: Vec<TPCID> = Vec::with_capacity(set.tpcs.len());
                for tpc in set.tpcs.iter() {
                    let tid = TPCID::new(c, *tpc);
                    if geometry.tpc(&tid).is_none() {
                        return Err(TopologyError::UnknownTPC(tid));
                    }
                    info.tpc_to_tpcset.insert(tid, sid);
                    tpcs.push(tid);
                }

                let mut rops: Vec<Vec<PlaneID>> = Vec::with_capacity(set.rops.len());
                for (r, members) in set.rops.iter().enumerate() {
                    let rid = ROPID::new(c, s as u32, r as u32);
                    let mut planes: Vec<PlaneID> = Vec::with_capacity(members.len());
                    for member in members.iter() {
                        let pid = PlaneID::new(c, member.tpc, member.plane);
                        if geometry.plane(&pid).is_none() {
                            return Err(TopologyError::UnknownPlane(pid));
                        }
                        if let Some(first) = info.plane_to_rop.insert(pid, rid) {
                            return Err(TopologyError::DuplicatePlane {
                                plane: pid,
                                first,
                                second: rid,
                            });
                        }
                        planes.push(pid);
                    }
                    rops.push(planes);
                }

                cryo_tpcs.push(tpcs);
                cryo_rops.push(rops);
            }
            info.tpcset_tpcs.push(cryo_tpcs);
            info.rop_planes.push(cryo_rops);
        }

        Ok(info)
    }

    pub fn n_cryostats(&self) -> usize {
        self.rop_planes.len()
    }

    pub fn has_cryostat(&self, id: &CryostatID) -> bool {
        (id.cryostat as usize) < self.n_cryostats()
    }

    /// Number of TPC sets in a cryostat, None if the cryostat is unknown
    pub fn tpcset_count(&self, id: &CryostatID) -> Option<usize> {
        self.rop_planes.get(id.cryostat as usize).map(|c| c.len())
    }

    /// Number of ROPs in a TPC set, None if the TPC set is unknown
    pub fn rop_count(&self, id: &TPCSetID) -> Option<usize> {
        self.rop_planes
            .get(id.cryostat as usize)?
            .get(id.tpcset as usize)
            .map(|s| s.len())
    }

    pub fn tpcset_tpcs(&self, id: &TPCSetID) -> Option<&[TPCID]> {
        self.tpcset_tpcs
            .get(id.cryostat as usize)?
            .get(id.tpcset as usize)
            .map(|t| t.as_slice())
    }

    pub fn rop_planes(&self, id: &ROPID) -> Option<&[PlaneID]> {
        self.rop_planes
            .get(id.cryostat as usize)?
            .get(id.tpcset as usize)?
            .get(id.rop as usize)
            .map(|p| p.as_slice())
    }

    pub fn tpc_to_tpcset(&self, id: &TPCID) -> Option<TPCSetID> {
        self.tpc_to_tpcset.get(id).copied()
    }

    pub fn plane_to_rop(&self, id: &PlaneID) -> Option<ROPID> {
        self.plane_to_rop.get(id).copied()
    }

    /// Largest number of TPC sets in any cryostat
    pub fn max_tpcsets(&self) -> usize {
        self.rop_planes.iter().map(|c| c.len()).max().unwrap_or(0)
    }

    /// Largest number of ROPs in any TPC set
    pub fn max_rops(&self) -> usize {
        self.rop_planes
            .iter()
            .flat_map(|c| c.iter())
            .map(|s| s.len())
            .max()
            .unwrap_or(0)
    }

    /// Total number of ROPs in the detector
    pub fn total_rops(&self) -> usize {
        self.rop_planes
            .iter()
            .flat_map(|c| c.iter())
            .map(|s| s.len())
            .sum()
    }

    /// All ROP IDs in canonical order (cryostat, then TPC set, then ROP)
    pub fn rop_ids(&self) -> Vec<ROPID> {
        let mut ids = Vec::with_capacity(self.total_rops());
        for (c, cryo) in self.rop_planes.iter().enumerate() {
            for (s, set) in cryo.iter().enumerate() {
                for r in 0..set.len() {
                    ids.push(ROPID::new(c as u32, s as u32, r as u32));
                }
            }
        }
        ids
    }
}
