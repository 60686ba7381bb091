//! Geodesic cell identifiers.
//!
//! The game service addresses the world through a cube-sphere decomposition:
//! the sphere is projected onto six cube faces, each face is subdivided as a
//! quadtree down to 30 levels, and leaf positions are linearized along a
//! Hilbert curve. A cell identifier packs the face (3 bits), the Hilbert
//! position (60 bits), and a sentinel bit marking the cell's level.
//!
//! Only the operations the neighborhood query needs are implemented here:
//! locating the leaf cell for a geographic point, ascending to a coarser
//! level, and converting between identifiers and face-local integer
//! coordinates at maximum resolution.

/// Deepest subdivision level of the grid.
pub const MAX_LEVEL: u8 = 30;

/// Number of bits used for the Hilbert position plus the sentinel.
const POS_BITS: u64 = 2 * MAX_LEVEL as u64 + 1;

/// Face-local coordinate range at maximum resolution (2^30).
const MAX_SIZE: i32 = 1 << MAX_LEVEL;

/// Orientation bit: swap i and j.
const SWAP_MASK: usize = 0x01;
/// Orientation bit: invert i and j.
const INVERT_MASK: usize = 0x02;

/// Hilbert curve traversal order: position within a parent -> (i << 1 | j),
/// indexed by the parent's orientation.
const POS_TO_IJ: [[u8; 4]; 4] = [
    [0, 1, 3, 2],
    [0, 2, 3, 1],
    [3, 2, 0, 1],
    [3, 1, 0, 2],
];

/// Inverse of [`POS_TO_IJ`]: (i << 1 | j) -> position within the parent.
const IJ_TO_POS: [[u8; 4]; 4] = [
    [0, 1, 3, 2],
    [0, 3, 1, 2],
    [2, 3, 1, 0],
    [2, 1, 3, 0],
];

/// Orientation adjustment applied when descending into each child position.
const POS_TO_ORIENTATION: [usize; 4] = [SWAP_MASK, 0, 0, INVERT_MASK | SWAP_MASK];

/// A 64-bit geodesic grid cell identifier.
///
/// Identifiers are opaque to callers; their only guaranteed property is that
/// the same (face, i, j, level) input always produces the same identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(u64);

impl CellId {
    /// Wraps a raw identifier.
    pub fn new(id: u64) -> Self {
        CellId(id)
    }

    /// Returns the raw 64-bit identifier.
    pub fn id(&self) -> u64 {
        self.0
    }

    /// Returns the leaf cell containing the given geographic point.
    ///
    /// Latitude/longitude are in degrees. Values outside the usual
    /// [-90, 90] / [-180, 180] ranges are not validated; the projection
    /// simply maps whatever unit vector they produce.
    pub fn from_lat_lon(lat_deg: f64, lon_deg: f64) -> Self {
        let phi = lat_deg.to_radians();
        let theta = lon_deg.to_radians();
        let cos_phi = phi.cos();
        let (x, y, z) = (cos_phi * theta.cos(), cos_phi * theta.sin(), phi.sin());

        let (face, u, v) = xyz_to_face_uv(x, y, z);
        let i = st_to_ij(uv_to_st(u));
        let j = st_to_ij(uv_to_st(v));
        Self::from_face_ij(face, i, j)
    }

    /// Builds the leaf cell at face-local coordinates (i, j).
    ///
    /// Coordinates are taken modulo 2^30, so neighbor arithmetic that steps
    /// past a face edge still yields a well-formed identifier (it wraps
    /// within the face rather than reprojecting onto the adjacent face).
    pub fn from_face_ij(face: u8, i: i32, j: i32) -> Self {
        let mut pos: u64 = 0;
        let mut orientation = (face as usize) & SWAP_MASK;

        for k in (0..MAX_LEVEL as u32).rev() {
            let ij = (((i >> k) & 1) << 1 | ((j >> k) & 1)) as usize;
            let child = IJ_TO_POS[orientation][ij] as u64;
            pos |= child << (2 * k);
            orientation ^= POS_TO_ORIENTATION[child as usize];
        }

        CellId(((face as u64) << POS_BITS) | (pos << 1) | 1)
    }

    /// Decodes the face and the face-local (i, j) coordinates at maximum
    /// resolution.
    ///
    /// For a non-leaf cell the sentinel bit participates in the decoding,
    /// so the returned coordinates land inside the cell rather than at its
    /// minimum corner.
    pub fn to_face_ij(&self) -> (u8, i32, i32) {
        let face = (self.0 >> POS_BITS) as u8;
        let mut i: i32 = 0;
        let mut j: i32 = 0;
        let mut orientation = (face as usize) & SWAP_MASK;

        for k in (0..MAX_LEVEL as u32).rev() {
            let child = ((self.0 >> (1 + 2 * k)) & 3) as usize;
            let ij = POS_TO_IJ[orientation][child];
            i |= ((ij >> 1) as i32) << k;
            j |= ((ij & 1) as i32) << k;
            orientation ^= POS_TO_ORIENTATION[child];
        }

        (face, i, j)
    }

    /// Returns this cell's ancestor at the given (coarser or equal) level.
    pub fn parent(&self, level: u8) -> Self {
        let lsb = 1u64 << (2 * (MAX_LEVEL - level) as u32);
        CellId((self.0 & lsb.wrapping_neg()) | lsb)
    }

    /// Returns the subdivision level of this cell.
    pub fn level(&self) -> u8 {
        MAX_LEVEL - (self.0.trailing_zeros() / 2) as u8
    }

    /// Returns the face (0-5) this cell lies on.
    pub fn face(&self) -> u8 {
        (self.0 >> POS_BITS) as u8
    }
}

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Projects a unit vector onto the cube face with the largest axis
/// component and returns (face, u, v) in [-1, 1].
fn xyz_to_face_uv(x: f64, y: f64, z: f64) -> (u8, f64, f64) {
    let (ax, ay, az) = (x.abs(), y.abs(), z.abs());
    let axis = if ax > ay {
        if ax > az {
            0
        } else {
            2
        }
    } else if ay > az {
        1
    } else {
        2
    };

    match axis {
        0 if x >= 0.0 => (0, y / x, z / x),
        0 => (3, z / x, y / x),
        1 if y >= 0.0 => (1, -x / y, z / y),
        1 => (4, z / y, -x / y),
        _ if z >= 0.0 => (2, -x / z, -y / z),
        _ => (5, -y / z, -x / z),
    }
}

/// Quadratic (u, v) -> (s, t) transform. Trades a little distortion for a
/// near-uniform cell area across the face.
fn uv_to_st(u: f64) -> f64 {
    if u >= 0.0 {
        0.5 * (1.0 + 3.0 * u).sqrt()
    } else {
        1.0 - 0.5 * (1.0 - 3.0 * u).sqrt()
    }
}

/// Discretizes s in [0, 1] to an integer coordinate in [0, 2^30).
fn st_to_ij(s: f64) -> i32 {
    ((MAX_SIZE as f64 * s) as i64).clamp(0, MAX_SIZE as i64 - 1) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_lat_lon_yields_leaf_cell() {
        let cell = CellId::from_lat_lon(37.4, -122.1);
        assert_eq!(cell.level(), MAX_LEVEL);
    }

    #[test]
    fn test_from_lat_lon_is_deterministic() {
        let a = CellId::from_lat_lon(51.5074, -0.1278);
        let b = CellId::from_lat_lon(51.5074, -0.1278);
        assert_eq!(a, b);
    }

    #[test]
    fn test_axis_points_land_on_expected_faces() {
        assert_eq!(CellId::from_lat_lon(0.0, 0.0).face(), 0);
        assert_eq!(CellId::from_lat_lon(0.0, 90.0).face(), 1);
        assert_eq!(CellId::from_lat_lon(90.0, 0.0).face(), 2);
        assert_eq!(CellId::from_lat_lon(0.0, 180.0).face(), 3);
        assert_eq!(CellId::from_lat_lon(0.0, -90.0).face(), 4);
        assert_eq!(CellId::from_lat_lon(-90.0, 0.0).face(), 5);
    }

    #[test]
    fn test_parent_reduces_level() {
        let leaf = CellId::from_lat_lon(37.4, -122.1);
        let parent = leaf.parent(15);
        assert_eq!(parent.level(), 15);
        // Ascending to a cell's own level is a no-op.
        assert_eq!(parent.parent(15), parent);
    }

    #[test]
    fn test_leaves_in_same_block_share_parent() {
        // Leaves whose coordinates agree in the top 15 bits lie in the same
        // level-15 cell.
        let a = CellId::from_face_ij(3, (7 << 15) | 123, (9 << 15) | 456);
        let b = CellId::from_face_ij(3, (7 << 15) | 32_000, (9 << 15) | 1);
        assert_eq!(a.parent(15), b.parent(15));

        // Differing top bits put them in different level-15 cells.
        let c = CellId::from_face_ij(3, (8 << 15) | 123, (9 << 15) | 456);
        assert_ne!(a.parent(15), c.parent(15));
    }

    #[test]
    fn test_face_ij_roundtrip() {
        let cell = CellId::from_face_ij(2, 12345678, 87654321);
        let (face, i, j) = cell.to_face_ij();
        assert_eq!(face, 2);
        assert_eq!(i, 12345678);
        assert_eq!(j, 87654321);
    }

    #[test]
    fn test_from_face_ij_masks_out_of_range_coordinates() {
        // Stepping past the face edge wraps modulo 2^30.
        let wrapped = CellId::from_face_ij(1, -1, 0);
        let expected = CellId::from_face_ij(1, (1 << 30) - 1, 0);
        assert_eq!(wrapped, expected);
    }

    #[test]
    fn test_display_is_hex() {
        let cell = CellId::new(0x89c2_5000_0000_0001);
        assert_eq!(cell.to_string(), "89c2500000000001");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_face_ij_roundtrip_property(
                face in 0u8..6,
                i in 0i32..(1 << 30),
                j in 0i32..(1 << 30)
            ) {
                let cell = CellId::from_face_ij(face, i, j);
                prop_assert_eq!(cell.level(), MAX_LEVEL);

                let (rface, ri, rj) = cell.to_face_ij();
                prop_assert_eq!(rface, face);
                prop_assert_eq!(ri, i);
                prop_assert_eq!(rj, j);
            }

            #[test]
            fn test_parent_is_monotone_in_level(
                lat in -85.0..85.0_f64,
                lon in -180.0..180.0_f64,
                level in 1u8..30
            ) {
                let leaf = CellId::from_lat_lon(lat, lon);
                let parent = leaf.parent(level);
                let grandparent = leaf.parent(level - 1);

                prop_assert_eq!(parent.level(), level);
                prop_assert_eq!(grandparent.level(), level - 1);
                // The coarser ancestor is reachable from the finer one.
                prop_assert_eq!(parent.parent(level - 1), grandparent);
            }

            #[test]
            fn test_from_lat_lon_stays_on_one_face(
                lat in -85.0..85.0_f64,
                lon in -180.0..180.0_f64
            ) {
                let cell = CellId::from_lat_lon(lat, lon);
                prop_assert!(cell.face() < 6);
                prop_assert_eq!(cell.parent(15).face(), cell.face());
            }
        }
    }
}
