use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::ConfigError;
use super::wireless::WirelessChannelCounts;

/// Number of channels with no connected wire before (pre) and after (post) the
/// wired channels of each readout plane.
///
/// First induction counts are shared by even and odd TPC sets; second induction
/// and collection counts differ by the parity of the TPC set within its cryostat.
/// Every field is required. Counts are read as signed integers so that a negative
/// value can be reported by name when the table is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WirelessChannelConfig {
    pub first_induction_pre_channels: i64,
    pub first_induction_post_channels: i64,
    pub second_induction_even_pre_channels: i64,
    pub second_induction_even_post_channels: i64,
    pub second_induction_odd_pre_channels: i64,
    pub second_induction_odd_post_channels: i64,
    pub collection_even_pre_channels: i64,
    pub collection_even_post_channels: i64,
    pub collection_odd_pre_channels: i64,
    pub collection_odd_post_channels: i64,
}

/// Structure representing the application configuration. Contains the detector
/// description path and the channel mapping parameters.
/// Configs are seralizable and deserializable to YAML using serde and serde_yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub detector_path: PathBuf,
    pub wireless_channels: WirelessChannelConfig,
    pub stitch_tolerance: Option<f64>,
}

impl Default for Config {
    /// Generate a new Config object. The path is invalid and all counts are 0
    fn default() -> Self {
        Self {
            detector_path: PathBuf::from("None"),
            wireless_channels: WirelessChannelConfig::default(),
            stitch_tolerance: None,
        }
    }
}

impl Config {
    /// Read the configuration in a YAML file
    /// Returns a Config if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }

    /// Build the wireless channel table, validating the counts
    pub fn wireless_channel_counts(&self) -> Result<WirelessChannelCounts, ConfigError> {
        WirelessChannelCounts::new(&self.wireless_channels)
    }

    /// The stitching tolerance, checked to be a non-negative number if given
    pub fn stitch_tolerance(&self) -> Result<Option<f64>, ConfigError> {
        match self.stitch_tolerance {
            Some(tol) if tol.is_nan() || tol < 0.0 => Err(ConfigError::BadTolerance(tol)),
            other => Ok(other),
        }
    }
}

//Unit tests
#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CONFIG: &str = "
detector_path: detector.yml
wireless_channels:
  first_induction_pre_channels: 0
  first_induction_post_channels: 96
  second_induction_even_pre_channels: 96
  second_induction_even_post_channels: 64
  second_induction_odd_pre_channels: 64
  second_induction_odd_post_channels: 96
  collection_even_pre_channels: 64
  collection_even_post_channels: 96
  collection_odd_pre_channels: 96
  collection_odd_post_channels: 64
stitch_tolerance: 0.5
";

    #[test]
    fn test_parse_config() {
        let config: Config = serde_yaml::from_str(FULL_CONFIG).expect("valid config");
        assert_eq!(config.detector_path, PathBuf::from("detector.yml"));
        assert_eq!(config.wireless_channels.first_induction_post_channels, 96);
        assert_eq!(config.stitch_tolerance().ok(), Some(Some(0.5)));
        assert!(config.wireless_channel_counts().is_ok());
    }

    #[test]
    fn test_missing_parameter() {
        let yaml = FULL_CONFIG.replace("  collection_odd_post_channels: 64\n", "");
        let err = match serde_yaml::from_str::<Config>(&yaml) {
            Ok(_) => panic!("config with a missing parameter was accepted"),
            Err(e) => e,
        };
        assert!(err.to_string().contains("collection_odd_post_channels"));
    }

    #[test]
    fn test_negative_parameter() {
        let yaml = FULL_CONFIG.replace(
            "second_induction_odd_pre_channels: 64",
            "second_induction_odd_pre_channels: -2",
        );
        let config: Config = serde_yaml::from_str(&yaml).expect("valid yaml");
        match config.wireless_channel_counts() {
            Err(ConfigError::NegativeCount { parameter, value }) => {
                assert_eq!(parameter, "second_induction_odd_pre_channels");
                assert_eq!(value, -2);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_bad_tolerance() {
        let config = Config {
            stitch_tolerance: Some(-1.0),
            ..Default::default()
        };
        assert!(matches!(
            config.stitch_tolerance(),
            Err(ConfigError::BadTolerance(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Config::read_config_file(Path::new("/this/path/does/not/exist.yml")),
            Err(ConfigError::BadFilePath(_))
        ));
    }
}
