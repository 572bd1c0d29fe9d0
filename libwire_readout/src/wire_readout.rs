use super::channel_map::{ChannelToWireMap, PlaneChannelInfo};
use super::config::Config;
use super::error::{ChannelMapError, ConfigError, ReadoutError, UnsupportedError};
use super::geometry::{DetectorDescription, DetectorGeometry, Point3};
use super::map_builder::ChannelMapBuilder;
use super::plane_type::{PlaneType, SignalType};
use super::readout_id::{ChannelID, CryostatID, PlaneID, TPCSetID, WireID, ROPID, TPCID};
use super::topology::{ReadoutMapInfo, ReadoutTopology};
use super::wireless::WirelessChannelCounts;

#[derive(Debug, Clone)]
struct ReadoutState {
    readout: ReadoutMapInfo,
    channel_map: ChannelToWireMap,
}

/// WireReadout is the channel <-> wire translation service for one detector.
///
/// It is created from the wireless channel configuration, then initialized once
/// against a detector geometry and its readout grouping. After initialization it
/// is read-only and can be shared freely between readers. `uninitialize` drops
/// every derived table so that it can be initialized again.
///
/// Queries on unknown channels or IDs (or on a WireReadout that is not
/// initialized) are not errors: they return None, an empty list or 0.
#[derive(Debug, Clone)]
pub struct WireReadout {
    wireless: WirelessChannelCounts,
    stitch_tolerance: Option<f64>,
    state: Option<ReadoutState>,
}

impl WireReadout {
    pub fn new(wireless: WirelessChannelCounts, stitch_tolerance: Option<f64>) -> Self {
        Self {
            wireless,
            stitch_tolerance,
            state: None,
        }
    }

    /// Create an uninitialized WireReadout from the channel mapping parameters of a Config
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.wireless_channel_counts()?,
            config.stitch_tolerance()?,
        ))
    }

    /// Build the channel map.
    ///
    /// On failure the WireReadout is left uninitialized, whatever its state before.
    pub fn initialize(
        &mut self,
        geometry: &DetectorGeometry,
        topology: &ReadoutTopology,
    ) -> Result<(), ChannelMapError> {
        spdlog::info!("Initializing wire readout channel mapping.");
        self.state = None;

        let readout = ReadoutMapInfo::new(topology, geometry)?;
        let channel_map =
            ChannelMapBuilder::new(geometry, &readout, &self.wireless, self.stitch_tolerance)
                .build()?;

        spdlog::info!(
            "Channel mapping complete: {} channels in {} readout planes.",
            channel_map.n_channels(),
            channel_map.n_rops()
        );
        self.state = Some(ReadoutState {
            readout,
            channel_map,
        });
        Ok(())
    }

    pub fn initialize_from_description(
        &mut self,
        description: &DetectorDescription,
    ) -> Result<(), ChannelMapError> {
        self.initialize(&description.geometry, &description.readout)
    }

    /// Clear all derived tables
    pub fn uninitialize(&mut self) {
        self.state = None;
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    pub fn wireless_channel_counts(&self) -> &WirelessChannelCounts {
        &self.wireless
    }

    pub fn stitch_tolerance(&self) -> Option<f64> {
        self.stitch_tolerance
    }

    pub fn channel_map(&self) -> Option<&ChannelToWireMap> {
        self.state.as_ref().map(|s| &s.channel_map)
    }

    pub fn readout_map_info(&self) -> Option<&ReadoutMapInfo> {
        self.state.as_ref().map(|s| &s.readout)
    }

    // --- Channel mapping ---

    /// Wires read by a channel, one per wire plane of its ROP that covers it.
    ///
    /// Empty for wireless channels and for channels out of range.
    pub fn channel_to_wire(&self, channel: ChannelID) -> Vec<WireID> {
        let Some(state) = &self.state else {
            return Vec::new();
        };
        let Some(rop_info) = state.channel_map.find_by_channel(channel) else {
            return Vec::new();
        };
        let planes = state.readout.rop_planes(&rop_info.rop).unwrap_or(&[]);

        let mut segments = Vec::with_capacity(planes.len());
        for pid in planes.iter() {
            let Some(info) = state.channel_map.plane_info(pid) else {
                continue;
            };
            if !info.range.contains(channel) {
                continue;
            }
            segments.push(WireID::new(*pid, channel - info.first_channel()));
        }
        segments
    }

    /// Channel reading a wire, None if the plane is unknown or the wire is not in it
    pub fn wire_to_channel(&self, wire: &WireID) -> Option<ChannelID> {
        let info = self.plane_info(&wire.plane_id)?;
        if wire.wire < info.range.len() {
            Some(info.first_channel() + wire.wire)
        } else {
            None
        }
    }

    /// Total number of channels, wireless ones included
    pub fn n_channels(&self) -> u32 {
        self.channel_map().map_or(0, |m| m.n_channels())
    }

    /// Number of channels in a ROP, 0 if the ROP does not exist
    pub fn n_channels_in_rop(&self, rop: &ROPID) -> u32 {
        self.channel_map()
            .and_then(|m| m.find_by_rop(rop))
            .map_or(0, |info| info.n_channels)
    }

    pub fn plane_info(&self, plane: &PlaneID) -> Option<&PlaneChannelInfo> {
        self.channel_map()?.plane_info(plane)
    }

    pub fn signal_type(&self, channel: ChannelID) -> SignalType {
        match self.channel_to_rop(channel) {
            Some(rop) => self.plane_type(&rop).signal_type(),
            None => SignalType::Unknown,
        }
    }

    pub fn plane_type(&self, rop: &ROPID) -> PlaneType {
        let planes = self.readout_map_info().and_then(|r| r.rop_planes(rop));
        PlaneType::classify(planes.unwrap_or(&[]))
    }

    // --- TPC set mapping ---

    pub fn has_cryostat(&self, cryostat: &CryostatID) -> bool {
        self.readout_map_info()
            .is_some_and(|r| r.has_cryostat(cryostat))
    }

    /// Number of TPC sets in a cryostat, 0 if no such cryostat
    pub fn n_tpcsets(&self, cryostat: &CryostatID) -> u32 {
        self.readout_map_info()
            .and_then(|r| r.tpcset_count(cryostat))
            .unwrap_or(0) as u32
    }

    /// Largest number of TPC sets any cryostat has
    pub fn max_tpcsets(&self) -> u32 {
        self.readout_map_info().map_or(0, |r| r.max_tpcsets()) as u32
    }

    pub fn has_tpcset(&self, tpcset: &TPCSetID) -> bool {
        (tpcset.tpcset as usize) < self.n_tpcsets(&tpcset.cryostat_id()) as usize
    }

    pub fn tpc_to_tpcset(&self, tpc: &TPCID) -> Option<TPCSetID> {
        self.readout_map_info()?.tpc_to_tpcset(tpc)
    }

    pub fn tpcset_to_tpcs(&self, tpcset: &TPCSetID) -> Vec<TPCID> {
        self.readout_map_info()
            .and_then(|r| r.tpcset_tpcs(tpcset))
            .map(|tpcs| tpcs.to_vec())
            .unwrap_or_default()
    }

    pub fn first_tpc_in_tpcset(&self, tpcset: &TPCSetID) -> Option<TPCID> {
        self.readout_map_info()?
            .tpcset_tpcs(tpcset)?
            .first()
            .copied()
    }

    // --- Readout plane mapping ---

    /// Number of ROPs in a TPC set, 0 if no such TPC set
    pub fn n_rops(&self, tpcset: &TPCSetID) -> u32 {
        self.readout_map_info()
            .and_then(|r| r.rop_count(tpcset))
            .unwrap_or(0) as u32
    }

    /// Largest number of ROPs any TPC set has
    pub fn max_rops(&self) -> u32 {
        self.readout_map_info().map_or(0, |r| r.max_rops()) as u32
    }

    pub fn has_rop(&self, rop: &ROPID) -> bool {
        (rop.rop as usize) < self.n_rops(&rop.tpcset_id()) as usize
    }

    pub fn wire_plane_to_rop(&self, plane: &PlaneID) -> Option<ROPID> {
        self.readout_map_info()?.plane_to_rop(plane)
    }

    pub fn rop_to_wire_planes(&self, rop: &ROPID) -> Vec<PlaneID> {
        self.readout_map_info()
            .and_then(|r| r.rop_planes(rop))
            .map(|planes| planes.to_vec())
            .unwrap_or_default()
    }

    /// TPCs spanned by a ROP, each listed once in member plane order
    pub fn rop_to_tpcs(&self, rop: &ROPID) -> Vec<TPCID> {
        let mut tpcs: Vec<TPCID> = Vec::new();
        for pid in self.rop_to_wire_planes(rop) {
            let tid = pid.tpc_id();
            if !tpcs.contains(&tid) {
                tpcs.push(tid);
            }
        }
        tpcs
    }

    pub fn channel_to_rop(&self, channel: ChannelID) -> Option<ROPID> {
        self.channel_map()?.find_by_channel(channel).map(|i| i.rop)
    }

    pub fn first_channel_in_rop(&self, rop: &ROPID) -> Option<ChannelID> {
        self.channel_map()?
            .find_by_rop(rop)
            .map(|i| i.first_channel)
    }

    pub fn first_wire_plane_in_rop(&self, rop: &ROPID) -> Option<PlaneID> {
        self.readout_map_info()?.rop_planes(rop)?.first().copied()
    }

    // --- Not supported here; kept so callers find out where to go instead ---

    pub fn wire_coordinate(
        &self,
        _y: f64,
        _z: f64,
        _plane: &PlaneID,
    ) -> Result<f64, UnsupportedError> {
        Err(UnsupportedError {
            operation: "wire_coordinate",
            alternative: "WireGeo::distance_from_line()",
        })
    }

    pub fn nearest_wire_id(
        &self,
        _point: &Point3,
        _plane: &PlaneID,
    ) -> Result<WireID, UnsupportedError> {
        Err(UnsupportedError {
            operation: "nearest_wire_id",
            alternative: "PlaneGeo::nearest_wire()",
        })
    }

    pub fn plane_ids(&self) -> Result<Vec<PlaneID>, UnsupportedError> {
        Err(UnsupportedError {
            operation: "plane_ids",
            alternative: "DetectorGeometry::plane_ids()",
        })
    }
}

/// Load the detector description named in the config and build its channel map.
pub fn load_wire_readout(config: &Config) -> Result<WireReadout, ReadoutError> {
    let mut wire_readout = WireReadout::from_config(config)?;
    spdlog::info!(
        "Loading detector description from {}...",
        config.detector_path.to_string_lossy()
    );
    let description = DetectorDescription::read_detector_file(&config.detector_path)?;
    wire_readout.initialize_from_description(&description)?;
    Ok(wire_readout)
}
