use std::path::PathBuf;
use thiserror::Error;

use super::readout_id::{ChannelID, PlaneID, TPCID, ROPID};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
    #[error("Wireless channel parameter {parameter} must not be negative (found {value})")]
    NegativeCount { parameter: &'static str, value: i64 },
    #[error("Wireless channel parameter {parameter} is too large (found {value})")]
    CountOverflow { parameter: &'static str, value: i64 },
    #[error("Stitch tolerance must be a non-negative number (found {0})")]
    BadTolerance(f64),
}

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("Failed to load detector description as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Detector description failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Detector description failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("Readout topology describes {topology} cryostats, but the geometry has {geometry}")]
    CryostatMismatch { topology: usize, geometry: usize },
    #[error("Readout topology references TPC {0} which is not in the geometry")]
    UnknownTPC(TPCID),
    #[error("Readout topology references wire plane {0} which is not in the geometry")]
    UnknownPlane(PlaneID),
    #[error("Wire plane {plane} is assigned to both ROP {first} and ROP {second}")]
    DuplicatePlane {
        plane: PlaneID,
        first: ROPID,
        second: ROPID,
    },
}

#[derive(Debug, Error)]
pub enum ChannelMapError {
    #[error("Channel map cannot be built from an empty readout topology")]
    EmptyTopology,
    #[error("ROP {0} has no wire planes")]
    EmptyROP(ROPID),
    #[error("ROP {rop} includes wire plane {plane} which is not in the geometry")]
    UnknownPlane { rop: ROPID, plane: PlaneID },
    #[error("ROP {rop}: wire plane {plane} has no wires to stitch the next plane to")]
    NoWires { rop: ROPID, plane: PlaneID },
    #[error("ROP {rop}: no wire in plane {plane} is near the last wire of the previous plane")]
    NoNearestWire { rop: ROPID, plane: PlaneID },
    #[error("ROP {rop}: nearest wire {wire} in plane {plane} is {distance} away from the last wire of the previous plane (tolerance {tolerance})")]
    StitchOutOfTolerance {
        rop: ROPID,
        plane: PlaneID,
        wire: u32,
        distance: f64,
        tolerance: f64,
    },
    #[error("ROP {rop}: matching wire {wire} of plane {plane} to channel {last_channel} would start the plane before the first channel of the ROP ({first_rop_channel})")]
    ChannelUnderflow {
        rop: ROPID,
        plane: PlaneID,
        wire: u32,
        last_channel: ChannelID,
        first_rop_channel: ChannelID,
    },
    #[error("ROP {0}: channel numbers exceed the channel ID range")]
    ChannelOverflow(ROPID),
    #[error("Channel map failed due to topology error: {0}")]
    TopologyError(#[from] TopologyError),
}

/// Raised by the operations kept on the readout interface that this layer cannot answer.
#[derive(Debug, Error)]
#[error("WireReadout does not support `{operation}()`; please update calling software to use `{alternative}`")]
pub struct UnsupportedError {
    pub operation: &'static str,
    pub alternative: &'static str,
}

#[derive(Debug, Error)]
pub enum DumpError {
    #[error("Dump failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Dump failed to convert to yaml: {0}")]
    ParsingError(#[from] serde_yaml::Error),
    #[error("Dump requested from a WireReadout that is not initialized")]
    NotInitialized,
}

#[derive(Debug, Error)]
pub enum ReadoutError {
    #[error("WireReadout failed due to Config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("WireReadout failed due to Geometry error: {0}")]
    GeometryError(#[from] GeometryError),
    #[error("WireReadout failed due to ChannelMap error: {0}")]
    ChannelMapError(#[from] ChannelMapError),
}
