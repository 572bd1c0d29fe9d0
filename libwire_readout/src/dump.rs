use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use super::error::DumpError;
use super::plane_type::PlaneType;
use super::readout_id::ChannelID;
use super::wire_readout::WireReadout;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneDump {
    pub plane: String,
    pub first_channel: ChannelID,
    pub end_channel: ChannelID,
    pub n_wires: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ROPDump {
    pub rop: String,
    pub plane_type: PlaneType,
    pub first_channel: ChannelID,
    pub n_channels: u32,
    pub planes: Vec<PlaneDump>,
}

/// A human readable snapshot of a channel map, written as YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMapDump {
    pub n_channels: u32,
    pub max_tpcsets: u32,
    pub max_rops: u32,
    pub rops: Vec<ROPDump>,
}

impl ChannelMapDump {
    /// Take a snapshot of an initialized WireReadout
    pub fn new(wire_readout: &WireReadout) -> Result<Self, DumpError> {
        let channel_map = wire_readout
            .channel_map()
            .ok_or(DumpError::NotInitialized)?;

        let mut rops: Vec<ROPDump> = Vec::with_capacity(channel_map.n_rops());
        for rop_info in channel_map.rops() {
            let planes = wire_readout
                .rop_to_wire_planes(&rop_info.rop)
                .iter()
                .filter_map(|pid| {
                    channel_map.plane_info(pid).map(|info| PlaneDump {
                        plane: pid.to_string(),
                        first_channel: info.first_channel(),
                        end_channel: info.last_channel(),
                        n_wires: info.range.len(),
                    })
                })
                .collect();
            rops.push(ROPDump {
                rop: rop_info.rop.to_string(),
                plane_type: wire_readout.plane_type(&rop_info.rop),
                first_channel: rop_info.first_channel,
                n_channels: rop_info.n_channels,
                planes,
            });
        }

        Ok(Self {
            n_channels: wire_readout.n_channels(),
            max_tpcsets: wire_readout.max_tpcsets(),
            max_rops: wire_readout.max_rops(),
            rops,
        })
    }

    pub fn to_yaml(&self) -> Result<String, DumpError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write the dump to a file, or to stdout if no path is given.
    ///
    /// When appending, the dump starts a new YAML document so the file stays readable.
    pub fn write(&self, path: Option<&Path>, append: bool) -> Result<(), DumpError> {
        let yaml_str = self.to_yaml()?;
        match path {
            Some(p) => {
                let mut file = OpenOptions::new()
                    .create(true)
                    .write(true)
                    .append(append)
                    .truncate(!append)
                    .open(p)?;
                if append {
                    file.write_all(b"---\n")?;
                }
                file.write_all(yaml_str.as_bytes())?;
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(yaml_str.as_bytes())?;
                stdout.flush()?;
            }
        }
        Ok(())
    }
}
