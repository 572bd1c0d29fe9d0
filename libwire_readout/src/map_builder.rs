use super::channel_map::{ChannelRange, ChannelToWireMap, PlaneChannelInfo};
use super::error::ChannelMapError;
use super::geometry::{DetectorGeometry, PlaneGeo};
use super::plane_type::PlaneType;
use super::readout_id::{ChannelID, PlaneID, ROPID};
use super::topology::ReadoutMapInfo;
use super::wireless::{ChannelPadding, Parity, WirelessChannelCounts};

/// ChannelMapBuilder assigns channel numbers to every wire plane of the detector.
///
/// Readout planes are numbered in order: cryostat, then TPC set, then ROP. Each ROP
/// gets a contiguous block of channels: its wireless "pre" channels, the channels of
/// its wires, then its wireless "post" channels. The first wire plane of a ROP takes
/// one new channel per wire. Each following plane is stitched to the one before it:
/// the wire nearest to the last wire of the previous plane reuses that wire's
/// channel, and the rest of the plane is numbered around it. A physical wire split
/// across two planes is therefore read by a single channel.
#[derive(Debug)]
pub struct ChannelMapBuilder<'a> {
    geometry: &'a DetectorGeometry,
    readout: &'a ReadoutMapInfo,
    wireless: &'a WirelessChannelCounts,
    stitch_tolerance: Option<f64>,
}

impl<'a> ChannelMapBuilder<'a> {
    /// Create a new ChannelMapBuilder.
    ///
    /// If `stitch_tolerance` is Some, a stitching match farther than that from the
    /// previous plane's last wire is an error.
    pub fn new(
        geometry: &'a DetectorGeometry,
        readout: &'a ReadoutMapInfo,
        wireless: &'a WirelessChannelCounts,
        stitch_tolerance: Option<f64>,
    ) -> Self {
        Self {
            geometry,
            readout,
            wireless,
            stitch_tolerance,
        }
    }

    /// Run the numbering over the whole detector.
    ///
    /// Any malformed ROP aborts the build; no partial map is returned.
    pub fn build(&self) -> Result<ChannelToWireMap, ChannelMapError> {
        if self.readout.total_rops() == 0 {
            return Err(ChannelMapError::EmptyTopology);
        }

        let mut map = ChannelToWireMap::new(self.geometry.max_elements());
        let mut next_channel: ChannelID = 0;

        // canonical order: cryostat, then TPC set, then ROP
        for rid in self.readout.rop_ids() {
            // wireless channel counts depend on whether the TPC set is even or odd
            let parity = Parity::of(rid.tpcset);
            next_channel = self.fill_rop(&rid, parity, next_channel, &mut map)?;
        }

        map.set_end_channel(next_channel);
        spdlog::trace!("Counted {} channels.", next_channel);
        Ok(map)
    }

    /// Number one ROP starting at `first_rop_channel`; returns the next free channel
    fn fill_rop(
        &self,
        rid: &ROPID,
        parity: Parity,
        first_rop_channel: ChannelID,
        map: &mut ChannelToWireMap,
    ) -> Result<ChannelID, ChannelMapError> {
        let planes = self.readout.rop_planes(rid).unwrap_or(&[]);
        let (first_pid, other_pids) = planes
            .split_first()
            .ok_or(ChannelMapError::EmptyROP(*rid))?;

        let plane_type = PlaneType::classify(planes);
        let padding = match self.wireless.padding(parity, plane_type) {
            Some(p) => p,
            None => {
                spdlog::warn!(
                    "ROP {} starts with plane {} of unknown type; it gets no wireless channels",
                    rid,
                    first_pid
                );
                ChannelPadding::default()
            }
        };
        spdlog::trace!(
            "ROP: {} (plane type: {}, {} TPC set) ({} planes)",
            rid,
            plane_type,
            parity,
            planes.len()
        );

        let overflow = || ChannelMapError::ChannelOverflow(*rid);

        // the first plane takes fresh channels for all its wires
        let mut previous = self.plane_geo(rid, first_pid)?;
        let begin = first_rop_channel
            .checked_add(padding.pre)
            .ok_or_else(overflow)?;
        let mut next_channel = begin
            .checked_add(previous.n_wires())
            .ok_or_else(overflow)?;
        self.record_plane(map, rid, first_pid, ChannelRange::new(begin, next_channel))?;

        let mut previous_pid = first_pid;
        for pid in other_pids {
            let plane = self.plane_geo(rid, pid)?;
            let last_wire_pos = previous
                .last_wire()
                .ok_or(ChannelMapError::NoWires {
                    rop: *rid,
                    plane: *previous_pid,
                })?
                .center();

            let matched = plane
                .nearest_wire(&last_wire_pos)
                .ok_or(ChannelMapError::NoNearestWire {
                    rop: *rid,
                    plane: *pid,
                })?;
            if let Some(tolerance) = self.stitch_tolerance {
                if matched.distance > tolerance {
                    return Err(ChannelMapError::StitchOutOfTolerance {
                        rop: *rid,
                        plane: *pid,
                        wire: matched.wire,
                        distance: matched.distance,
                        tolerance,
                    });
                }
            }

            // the last channel of the previous plane goes to the matched wire
            let last_channel = next_channel - 1;
            let first_channel = last_channel
                .checked_sub(matched.wire)
                .filter(|first| *first >= first_rop_channel)
                .ok_or(ChannelMapError::ChannelUnderflow {
                    rop: *rid,
                    plane: *pid,
                    wire: matched.wire,
                    last_channel,
                    first_rop_channel,
                })?;
            next_channel = first_channel
                .checked_add(plane.n_wires())
                .ok_or_else(overflow)?;
            self.record_plane(
                map,
                rid,
                pid,
                ChannelRange::new(first_channel, next_channel),
            )?;

            previous = plane;
            previous_pid = pid;
        }

        next_channel = next_channel
            .checked_add(padding.post)
            .ok_or_else(overflow)?;
        let n_channels = next_channel - first_rop_channel;
        map.add_rop(*rid, first_rop_channel, n_channels);
        spdlog::trace!(
            "ROP: {} => {} channels starting at {}",
            rid,
            n_channels,
            first_rop_channel
        );

        Ok(next_channel)
    }

    fn plane_geo(&self, rid: &ROPID, pid: &PlaneID) -> Result<&'a PlaneGeo, ChannelMapError> {
        self.geometry
            .plane(pid)
            .ok_or(ChannelMapError::UnknownPlane {
                rop: *rid,
                plane: *pid,
            })
    }

    fn record_plane(
        &self,
        map: &mut ChannelToWireMap,
        rid: &ROPID,
        pid: &PlaneID,
        range: ChannelRange,
    ) -> Result<(), ChannelMapError> {
        spdlog::trace!("  [{}] {} -- {}", pid, range.begin, range.end);
        if map.set_plane_info(pid, PlaneChannelInfo::new(range, *rid)) {
            Ok(())
        } else {
            Err(ChannelMapError::UnknownPlane {
                rop: *rid,
                plane: *pid,
            })
        }
    }
}

//Unit tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WirelessChannelConfig;
    use crate::geometry::{CryostatGeo, Point3, TPCGeo, WireGeo};
    use crate::topology::{CryostatReadout, PlaneRef, ReadoutTopology, TPCSetReadout};

    fn plane_at(zs: &[f64]) -> PlaneGeo {
        PlaneGeo::new(
            zs.iter()
                .map(|z| WireGeo::new(Point3::new(0.0, -1.0, *z), Point3::new(0.0, 1.0, *z)))
                .collect(),
        )
    }

    // One TPC set, one collection ROP made of plane 2 of TPC 0 and plane 2 of TPC 1
    fn ganged(first: PlaneGeo, second: PlaneGeo) -> (DetectorGeometry, ReadoutMapInfo) {
        let geometry = DetectorGeometry::new(vec![CryostatGeo {
            tpcs: vec![
                TPCGeo {
                    planes: vec![PlaneGeo::default(), PlaneGeo::default(), first],
                },
                TPCGeo {
                    planes: vec![PlaneGeo::default(), PlaneGeo::default(), second],
                },
            ],
        }]);
        let topology = ReadoutTopology {
            cryostats: vec![CryostatReadout {
                tpc_sets: vec![TPCSetReadout {
                    tpcs: vec![0, 1],
                    rops: vec![vec![
                        PlaneRef { tpc: 0, plane: 2 },
                        PlaneRef { tpc: 1, plane: 2 },
                    ]],
                }],
            }],
        };
        let readout = match ReadoutMapInfo::new(&topology, &geometry) {
            Ok(r) => r,
            Err(e) => panic!("{e}"),
        };
        (geometry, readout)
    }

    fn no_wireless() -> WirelessChannelCounts {
        WirelessChannelCounts::new(&WirelessChannelConfig::default()).expect("zero counts")
    }

    #[test]
    fn test_stitch() {
        let (geometry, readout) = ganged(
            plane_at(&[0.0, 1.0, 2.0, 3.0]),
            plane_at(&[2.0, 3.0, 4.0]),
        );
        let wireless = no_wireless();
        let map = ChannelMapBuilder::new(&geometry, &readout, &wireless, Some(0.1))
            .build()
            .expect("well formed detector");
        let second = map.plane_info(&PlaneID::new(0, 1, 2)).expect("assigned");
        assert_eq!(second.range, ChannelRange::new(2, 5));
        assert_eq!(map.n_channels(), 5);
    }

    #[test]
    fn test_stitch_out_of_tolerance() {
        let (geometry, readout) = ganged(plane_at(&[0.0, 1.0]), plane_at(&[1.5, 2.5]));
        let wireless = no_wireless();
        let result = ChannelMapBuilder::new(&geometry, &readout, &wireless, Some(0.1)).build();
        assert!(matches!(
            result,
            Err(ChannelMapError::StitchOutOfTolerance { wire: 0, .. })
        ));
        // without a tolerance the nearest wire is taken whatever its distance
        assert!(ChannelMapBuilder::new(&geometry, &readout, &wireless, None)
            .build()
            .is_ok());
    }

    #[test]
    fn test_stitch_underflow() {
        // the last wire of the first plane matches wire 3 of the second plane,
        // which would number the second plane from channel -2
        let (geometry, readout) = ganged(plane_at(&[3.0, 4.0]), plane_at(&[0.0, 1.0, 2.0, 4.0]));
        let wireless = no_wireless();
        let result = ChannelMapBuilder::new(&geometry, &readout, &wireless, None).build();
        assert!(matches!(
            result,
            Err(ChannelMapError::ChannelUnderflow { wire: 3, .. })
        ));
    }

    #[test]
    fn test_stitch_before_rop_start() {
        // ROP 0 takes channels [0, 10); the second plane of ROP 1 matches its wire 3
        // to channel 11, which would start it at channel 8, inside ROP 0
        let zs: Vec<f64> = (0..10).map(|z| z as f64).collect();
        let geometry = DetectorGeometry::new(vec![CryostatGeo {
            tpcs: vec![
                TPCGeo {
                    planes: vec![plane_at(&zs), plane_at(&[3.0, 4.0])],
                },
                TPCGeo {
                    planes: vec![PlaneGeo::default(), plane_at(&[0.0, 1.0, 2.0, 4.0])],
                },
            ],
        }]);
        let topology = ReadoutTopology {
            cryostats: vec![CryostatReadout {
                tpc_sets: vec![TPCSetReadout {
                    tpcs: vec![0, 1],
                    rops: vec![
                        vec![PlaneRef { tpc: 0, plane: 0 }],
                        vec![PlaneRef { tpc: 0, plane: 1 }, PlaneRef { tpc: 1, plane: 1 }],
                    ],
                }],
            }],
        };
        let readout = ReadoutMapInfo::new(&topology, &geometry).expect("valid topology");
        let wireless = no_wireless();
        let result = ChannelMapBuilder::new(&geometry, &readout, &wireless, None).build();
        match result {
            Err(ChannelMapError::ChannelUnderflow {
                rop,
                wire,
                last_channel,
                first_rop_channel,
                ..
            }) => {
                assert_eq!(rop, ROPID::new(0, 0, 1));
                assert_eq!(wire, 3);
                assert_eq!(last_channel, 11);
                assert_eq!(first_rop_channel, 10);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_no_wires_to_stitch() {
        let (geometry, readout) = ganged(PlaneGeo::default(), plane_at(&[0.0]));
        let wireless = no_wireless();
        let result = ChannelMapBuilder::new(&geometry, &readout, &wireless, None).build();
        assert!(matches!(result, Err(ChannelMapError::NoWires { .. })));

        let (geometry, readout) = ganged(plane_at(&[0.0]), PlaneGeo::default());
        let result = ChannelMapBuilder::new(&geometry, &readout, &wireless, None).build();
        assert!(matches!(result, Err(ChannelMapError::NoNearestWire { .. })));
    }

    #[test]
    fn test_empty_rop() {
        let geometry = DetectorGeometry::new(vec![CryostatGeo {
            tpcs: vec![TPCGeo {
                planes: vec![plane_at(&[0.0])],
            }],
        }]);
        let topology = ReadoutTopology {
            cryostats: vec![CryostatReadout {
                tpc_sets: vec![TPCSetReadout {
                    tpcs: vec![0],
                    rops: vec![vec![PlaneRef { tpc: 0, plane: 0 }], vec![]],
                }],
            }],
        };
        let readout = ReadoutMapInfo::new(&topology, &geometry).expect("valid topology");
        let wireless = no_wireless();
        let result = ChannelMapBuilder::new(&geometry, &readout, &wireless, None).build();
        match result {
            Err(ChannelMapError::EmptyROP(rid)) => assert_eq!(rid, ROPID::new(0, 0, 1)),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_empty_topology() {
        let geometry = DetectorGeometry::default();
        let readout = ReadoutMapInfo::default();
        let wireless = no_wireless();
        let result = ChannelMapBuilder::new(&geometry, &readout, &wireless, None).build();
        assert!(matches!(result, Err(ChannelMapError::EmptyTopology)));
    }
}
