// The channel map is a table of readout planes (ROPs), each owning a contiguous
// range of channels. ROPs are stored in the order they were numbered, so the
// first channels are sorted and a channel is located by binary search.
// Next to it sits the per wire plane channel range, indexed [cryostat, tpc, plane]
// like the geometry itself. Wire planes in the same ROP may overlap in channels
// (that is the point of ganging them), ROPs never do.
use fxhash::FxHashMap;
use ndarray::Array3;
use serde::{Deserialize, Serialize};

use super::readout_id::{ChannelID, PlaneID, ROPID};

/// Half-open range of channels `[begin, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChannelRange {
    pub begin: ChannelID,
    pub end: ChannelID,
}

impl ChannelRange {
    pub fn new(begin: ChannelID, end: ChannelID) -> Self {
        Self { begin, end }
    }

    pub fn contains(&self, channel: ChannelID) -> bool {
        channel >= self.begin && channel < self.end
    }

    pub fn len(&self) -> u32 {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.begin
    }
}

/// Channels of one wire plane and the ROP it is read out by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaneChannelInfo {
    pub range: ChannelRange,
    pub rop: ROPID,
}

impl PlaneChannelInfo {
    pub fn new(range: ChannelRange, rop: ROPID) -> Self {
        Self { range, rop }
    }

    /// Channel of wire 0
    pub fn first_channel(&self) -> ChannelID {
        self.range.begin
    }

    /// One past the channel of the last wire
    pub fn last_channel(&self) -> ChannelID {
        self.range.end
    }
}

/// Channels of one ROP, wireless ones included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ROPChannelInfo {
    pub rop: ROPID,
    pub first_channel: ChannelID,
    pub n_channels: u32,
}

impl ROPChannelInfo {
    pub fn end_channel(&self) -> ChannelID {
        self.first_channel + self.n_channels
    }

    pub fn contains(&self, channel: ChannelID) -> bool {
        channel >= self.first_channel && channel < self.end_channel()
    }
}

/// ChannelToWireMap is the index built once per detector description.
///
/// It is filled by the map builder and read-only afterwards.
#[derive(Debug, Clone)]
pub struct ChannelToWireMap {
    rops: Vec<ROPChannelInfo>,
    rop_index: FxHashMap<ROPID, usize>,
    plane_info: Array3<Option<PlaneChannelInfo>>,
    end_channel: ChannelID,
}

impl Default for ChannelToWireMap {
    fn default() -> Self {
        Self::new([0, 0, 0])
    }
}

impl ChannelToWireMap {
    /// Create an empty map with room for planes up to `[cryostats, tpcs, planes]`
    pub fn new(max_elements: [usize; 3]) -> Self {
        Self {
            rops: Vec::new(),
            rop_index: FxHashMap::default(),
            plane_info: Array3::from_elem(
                (max_elements[0], max_elements[1], max_elements[2]),
                None,
            ),
            end_channel: 0,
        }
    }

    /// Register the channels of the next ROP. ROPs must come in channel order.
    pub(crate) fn add_rop(&mut self, rop: ROPID, first_channel: ChannelID, n_channels: u32) {
        debug_assert!(self
            .rops
            .last()
            .map_or(true, |last| last.end_channel() <= first_channel));
        self.rop_index.insert(rop, self.rops.len());
        self.rops.push(ROPChannelInfo {
            rop,
            first_channel,
            n_channels,
        });
    }

    /// Record the channels of a plane. Returns false if the plane is outside the table.
    pub(crate) fn set_plane_info(&mut self, plane: &PlaneID, info: PlaneChannelInfo) -> bool {
        match self.plane_info.get_mut(plane_index(plane)) {
            Some(slot) => {
                *slot = Some(info);
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_end_channel(&mut self, end_channel: ChannelID) {
        self.end_channel = end_channel;
    }

    /// Find the ROP which owns a channel. None if the channel is out of range.
    pub fn find_by_channel(&self, channel: ChannelID) -> Option<&ROPChannelInfo> {
        let idx = self.rops.partition_point(|r| r.first_channel <= channel);
        if idx == 0 {
            return None;
        }
        let info = &self.rops[idx - 1];
        if info.contains(channel) {
            Some(info)
        } else {
            None
        }
    }

    pub fn find_by_rop(&self, rop: &ROPID) -> Option<&ROPChannelInfo> {
        self.rop_index.get(rop).map(|idx| &self.rops[*idx])
    }

    /// Channels of a wire plane, None if the plane was never assigned
    pub fn plane_info(&self, plane: &PlaneID) -> Option<&PlaneChannelInfo> {
        self.plane_info.get(plane_index(plane))?.as_ref()
    }

    /// Total number of channels, one past the last assigned channel
    pub fn n_channels(&self) -> ChannelID {
        self.end_channel
    }

    /// All ROPs in channel order
    pub fn rops(&self) -> &[ROPChannelInfo] {
        &self.rops
    }

    pub fn n_rops(&self) -> usize {
        self.rops.len()
    }
}

fn plane_index(plane: &PlaneID) -> (usize, usize, usize) {
    (
        plane.cryostat as usize,
        plane.tpc as usize,
        plane.plane as usize,
    )
}
