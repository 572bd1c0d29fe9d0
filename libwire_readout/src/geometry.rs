use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::GeometryError;
use super::readout_id::{CryostatID, PlaneID, TPCID};
use super::topology::ReadoutTopology;

/// A point in detector space.
pub type Point3 = nalgebra::Point3<f64>;

/// Points are written as `[x, y, z]` in detector files.
mod point_yaml {
    use super::Point3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(point: &Point3, serializer: S) -> Result<S::Ok, S::Error> {
        [point.x, point.y, point.z].serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Point3, D::Error> {
        let [x, y, z] = <[f64; 3]>::deserialize(deserializer)?;
        Ok(Point3::new(x, y, z))
    }
}

/// A single wire, described by its two end points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WireGeo {
    #[serde(with = "point_yaml")]
    pub start: Point3,
    #[serde(with = "point_yaml")]
    pub end: Point3,
}

impl WireGeo {
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.start, &self.end)
    }

    pub fn length(&self) -> f64 {
        nalgebra::distance(&self.start, &self.end)
    }

    /// Distance of a point from the (infinite) line the wire lies on.
    ///
    /// For parallel wires in a plane this is the distance in wire coordinate.
    /// A wire with zero length degenerates to the distance from its center.
    pub fn distance_from_line(&self, point: &Point3) -> f64 {
        let to_point = *point - self.center();
        let axis = self.end - self.start;
        let length = axis.norm();
        if length == 0.0 {
            return to_point.norm();
        }
        to_point.cross(&axis).norm() / length
    }
}

/// Result of a nearest-wire query on a plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireMatch {
    pub wire: u32,
    pub distance: f64,
}

/// A wire plane: wires are stored in their local (sorted) order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaneGeo {
    pub wires: Vec<WireGeo>,
}

impl PlaneGeo {
    pub fn new(wires: Vec<WireGeo>) -> Self {
        Self { wires }
    }

    pub fn n_wires(&self) -> u32 {
        self.wires.len() as u32
    }

    pub fn last_wire(&self) -> Option<&WireGeo> {
        self.wires.last()
    }

    /// Find the wire closest to `point`.
    ///
    /// Returns None if the plane has no wires (or no wire yields a finite distance).
    pub fn nearest_wire(&self, point: &Point3) -> Option<WireMatch> {
        self.wires
            .iter()
            .enumerate()
            .map(|(idx, wire)| WireMatch {
                wire: idx as u32,
                distance: wire.distance_from_line(point),
            })
            .filter(|m| m.distance.is_finite())
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TPCGeo {
    pub planes: Vec<PlaneGeo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CryostatGeo {
    pub tpcs: Vec<TPCGeo>,
}

/// The geometric hierarchy of the detector, already in canonical order.
///
/// IDs are positional: cryostat `c`, TPC `t` and plane `p` are the entries at
/// those indices of the respective lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectorGeometry {
    pub cryostats: Vec<CryostatGeo>,
}

impl DetectorGeometry {
    pub fn new(cryostats: Vec<CryostatGeo>) -> Self {
        Self { cryostats }
    }

    pub fn n_cryostats(&self) -> usize {
        self.cryostats.len()
    }

    pub fn cryostat(&self, id: &CryostatID) -> Option<&CryostatGeo> {
        self.cryostats.get(id.cryostat as usize)
    }

    pub fn tpc(&self, id: &TPCID) -> Option<&TPCGeo> {
        self.cryostat(&id.cryostat_id())?.tpcs.get(id.tpc as usize)
    }

    pub fn plane(&self, id: &PlaneID) -> Option<&PlaneGeo> {
        self.tpc(&id.tpc_id())?.planes.get(id.plane as usize)
    }

    /// Largest number of cryostats, TPCs in any cryostat and planes in any TPC
    pub fn max_elements(&self) -> [usize; 3] {
        let max_tpcs = self.cryostats.iter().map(|c| c.tpcs.len()).max();
        let max_planes = self
            .cryostats
            .iter()
            .flat_map(|c| c.tpcs.iter())
            .map(|t| t.planes.len())
            .max();
        [
            self.cryostats.len(),
            max_tpcs.unwrap_or(0),
            max_planes.unwrap_or(0),
        ]
    }

    /// All plane IDs in canonical order
    pub fn plane_ids(&self) -> Vec<PlaneID> {
        let mut ids = Vec::new();
        for (c, cryo) in self.cryostats.iter().enumerate() {
            for (t, tpc) in cryo.tpcs.iter().enumerate() {
                for p in 0..tpc.planes.len() {
                    ids.push(PlaneID::new(c as u32, t as u32, p as u32));
                }
            }
        }
        ids
    }
}

/// A full detector description file: the geometry and its readout grouping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectorDescription {
    pub geometry: DetectorGeometry,
    pub readout: ReadoutTopology,
}

impl DetectorDescription {
    /// Read a detector description from a YAML file
    pub fn read_detector_file(path: &Path) -> Result<Self, GeometryError> {
        if !path.exists() {
            return Err(GeometryError::BadFilePath(path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }
}

//Unit tests
#[cfg(test)]
mod tests {
    use super::*;

    fn vertical_wire(z: f64) -> WireGeo {
        WireGeo::new(Point3::new(0.0, -1.0, z), Point3::new(0.0, 1.0, z))
    }

    #[test]
    fn test_nearest_wire() {
        let plane = PlaneGeo::new((0..5).map(|i| vertical_wire(i as f64 * 0.3)).collect());
        let found = plane
            .nearest_wire(&Point3::new(0.0, 40.0, 0.65))
            .expect("plane has wires");
        assert_eq!(found.wire, 2);
        assert!((found.distance - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_distance_from_line() {
        let diagonal = WireGeo::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 1.0, 1.0));
        let distance = diagonal.distance_from_line(&Point3::new(0.0, 0.0, 1.0));
        assert!((distance - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
        // along the wire, past its end
        assert!(diagonal.distance_from_line(&Point3::new(0.0, 3.0, 3.0)) < 1e-12);

        let point_like = WireGeo::new(Point3::new(1.0, 1.0, 1.0), Point3::new(1.0, 1.0, 1.0));
        assert_eq!(point_like.length(), 0.0);
        assert!((point_like.distance_from_line(&Point3::new(1.0, 4.0, 5.0)) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_nearest_wire_empty_plane() {
        let plane = PlaneGeo::default();
        assert!(plane.nearest_wire(&Point3::origin()).is_none());
        assert!(plane.last_wire().is_none());
    }

    #[test]
    fn test_max_elements() {
        let geom = DetectorGeometry::new(vec![
            CryostatGeo {
                tpcs: vec![TPCGeo {
                    planes: vec![PlaneGeo::default(); 3],
                }],
            },
            CryostatGeo {
                tpcs: vec![TPCGeo::default(), TPCGeo::default()],
            },
        ]);
        assert_eq!(geom.max_elements(), [2, 2, 3]);
        assert_eq!(geom.plane_ids().len(), 3);
        assert!(geom.plane(&PlaneID::new(0, 0, 2)).is_some());
        assert!(geom.plane(&PlaneID::new(1, 0, 0)).is_none());
    }

    #[test]
    fn test_point_yaml() {
        let wire: WireGeo = serde_yaml::from_str("start: [0, -1, 2]\nend: [0, 1, 2]\n")
            .expect("valid wire yaml");
        assert_eq!(wire.center(), Point3::new(0.0, 0.0, 2.0));
    }
}
