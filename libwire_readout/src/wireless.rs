use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::config::WirelessChannelConfig;
use super::error::ConfigError;
use super::plane_type::PlaneType;

/// Parity of a TPC set index within its cryostat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Parity {
    Even,
    Odd,
}

impl Parity {
    pub fn of(index: u32) -> Self {
        if index & 1 == 0 {
            Self::Even
        } else {
            Self::Odd
        }
    }

    fn index(&self) -> usize {
        match self {
            Self::Even => 0,
            Self::Odd => 1,
        }
    }
}

impl Display for Parity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Even => write!(f, "even"),
            Self::Odd => write!(f, "odd"),
        }
    }
}

/// Wireless channels before and after the wired channels of a readout plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChannelPadding {
    pub pre: u32,
    pub post: u32,
}

impl ChannelPadding {
    pub fn new(pre: u32, post: u32) -> Self {
        Self { pre, post }
    }
}

fn checked_count(parameter: &'static str, value: i64) -> Result<u32, ConfigError> {
    if value < 0 {
        return Err(ConfigError::NegativeCount { parameter, value });
    }
    u32::try_from(value).map_err(|_| ConfigError::CountOverflow { parameter, value })
}

fn checked_padding(
    pre: (&'static str, i64),
    post: (&'static str, i64),
) -> Result<ChannelPadding, ConfigError> {
    Ok(ChannelPadding::new(
        checked_count(pre.0, pre.1)?,
        checked_count(post.0, post.1)?,
    ))
}

/// WirelessChannelCounts is the lookup (TPC set parity, plane type) -> padding.
///
/// Rows are indexed by parity, columns by plane type in stacking order
/// (first induction, second induction, collection). Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WirelessChannelCounts {
    counts: [[ChannelPadding; 3]; 2],
}

impl WirelessChannelCounts {
    /// Build the table from configuration. Fails on any negative count, naming it.
    pub fn new(config: &WirelessChannelConfig) -> Result<Self, ConfigError> {
        let first_induction = checked_padding(
            (
                "first_induction_pre_channels",
                config.first_induction_pre_channels,
            ),
            (
                "first_induction_post_channels",
                config.first_induction_post_channels,
            ),
        )?;
        let second_induction_even = checked_padding(
            (
                "second_induction_even_pre_channels",
                config.second_induction_even_pre_channels,
            ),
            (
                "second_induction_even_post_channels",
                config.second_induction_even_post_channels,
            ),
        )?;
        let second_induction_odd = checked_padding(
            (
                "second_induction_odd_pre_channels",
                config.second_induction_odd_pre_channels,
            ),
            (
                "second_induction_odd_post_channels",
                config.second_induction_odd_post_channels,
            ),
        )?;
        let collection_even = checked_padding(
            (
                "collection_even_pre_channels",
                config.collection_even_pre_channels,
            ),
            (
                "collection_even_post_channels",
                config.collection_even_post_channels,
            ),
        )?;
        let collection_odd = checked_padding(
            (
                "collection_odd_pre_channels",
                config.collection_odd_pre_channels,
            ),
            (
                "collection_odd_post_channels",
                config.collection_odd_post_channels,
            ),
        )?;

        Ok(Self {
            counts: [
                // even TPC sets (e.g. C:0 S:0)
                [first_induction, second_induction_even, collection_even],
                // odd TPC sets (e.g. C:0 S:1)
                [first_induction, second_induction_odd, collection_odd],
            ],
        })
    }

    /// Padding for a plane type in a TPC set of the given parity.
    ///
    /// Returns None for an Unknown plane type.
    pub fn padding(&self, parity: Parity, plane_type: PlaneType) -> Option<ChannelPadding> {
        let column = match plane_type {
            PlaneType::FirstInduction => 0,
            PlaneType::SecondInduction => 1,
            PlaneType::Collection => 2,
            PlaneType::Unknown => return None,
        };
        Some(self.counts[parity.index()][column])
    }
}
