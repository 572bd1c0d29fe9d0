//! # wire_readout
//!
//! wire_readout assigns electronics channel numbers to the wire planes of a segmented
//! liquid argon TPC detector (several cryostats, each holding TPCs made of stacked wire
//! planes), and answers the channel <-> wire questions reconstruction code asks of it.
//!
//! ## Installation
//!
//! Currently the only method of install is from source. If you have not used Rust
//! before, see the [Rust docs](https://www.rust-lang.org/tools/install) for installation
//! instructions.
//!
//! To build and install the CLI use `cargo install --path ./wire_readout_cli` from the
//! top level wire_readout repository. To use the library in another crate, depend on
//! `libwire_readout` by path.
//!
//! ## Channel numbering
//!
//! The detector is described by a geometry (cryostats, TPCs, wire planes, wires; see
//! [`geometry`]) and by a readout grouping (see [`topology`]):
//!
//! - TPCs sharing one set of readout electronics form a *TPC set*
//! - wire planes electrically ganged onto the same channels form a *readout plane* (ROP)
//!
//! Channels are numbered from 0, one ROP after the other: cryostat by cryostat, TPC
//! set by TPC set, ROP by ROP, all in the order given by the grouping. Within a ROP:
//!
//! - the ROP starts with its wireless "pre" channels
//! - the first wire plane gets one channel per wire
//! - each following wire plane is stitched to the previous one: its wire nearest to
//!   the last wire of the previous plane shares that wire's channel
//! - the ROP ends with its wireless "post" channels
//!
//! Wireless channels are valid channels (they count in the total) but map to no wire.
//!
//! ## Plane types
//!
//! Each ROP is classified by the index of its first wire plane: plane 0 is first
//! induction, plane 1 second induction, plane 2 collection. Anything else is unknown.
//! The number of wireless channels depends on the plane type and on whether the TPC
//! set index within its cryostat is even or odd.
//!
//! ## Configuration
//!
//! The YAML format of a configuration file is as follows:
//!
//! ```yml
//! detector_path: detector.yml
//! wireless_channels:
//!   first_induction_pre_channels: 0
//!   first_induction_post_channels: 96
//!   second_induction_even_pre_channels: 96
//!   second_induction_even_post_channels: 64
//!   second_induction_odd_pre_channels: 64
//!   second_induction_odd_post_channels: 96
//!   collection_even_pre_channels: 64
//!   collection_even_post_channels: 96
//!   collection_odd_pre_channels: 96
//!   collection_odd_post_channels: 64
//! stitch_tolerance: null
//! ```
//!
//! All the wireless channel counts must be given and must not be negative.
//! `stitch_tolerance` is the largest distance accepted between the last wire of a
//! plane and its match in the next plane of the same ROP; `null` accepts any match.
//!
//! ### Detector description format
//!
//! ```yml
//! geometry:
//!   cryostats:
//!     - tpcs:
//!         - planes:
//!             - wires:
//!                 - start: [0.0, -100.0, 0.0]
//!                   end: [0.0, 100.0, 0.0]
//! readout:
//!   cryostats:
//!     - tpc_sets:
//!         - tpcs: [0]
//!           rops:
//!             - [{ tpc: 0, plane: 0 }]
//! ```
//!
//! Cryostats, TPCs, planes and wires are numbered by their position in the lists.
//! ROP members are given as TPC and plane indices within the cryostat.
pub mod channel_map;
pub mod config;
pub mod dump;
pub mod error;
pub mod geometry;
pub mod map_builder;
pub mod plane_type;
pub mod readout_id;
pub mod topology;
pub mod wire_readout;
pub mod wireless;
