//! Geodesic grid addressing
//!
//! Maps geographic positions onto the hierarchical cell grid the game
//! service uses to tile the world, and enumerates the square neighborhood of
//! cells that a map query should cover.

mod cell;

pub use cell::{CellId, MAX_LEVEL};

/// Grid level used for map queries. A level-15 cell spans a few tens of
/// meters, which matches the service's notion of a "local area".
pub const QUERY_LEVEL: u8 = 15;

/// Computes the cell identifiers covering a `width` x `width` neighborhood
/// centered on the given geographic point, at [`QUERY_LEVEL`].
///
/// The result is deterministic and ordered: the outer loop walks the i axis,
/// the inner loop the j axis, both from `-width / 2` to `width / 2`
/// inclusive. Note the truncating division: an *even* `width` therefore
/// produces a `(width + 1)`-wide window, i.e. `(width + 1)^2` cells. Callers
/// that want a symmetric square should pass an odd width.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees
/// * `lon` - Longitude in degrees
/// * `width` - Neighborhood width in cells
pub fn cell_ids_for(lat: f64, lon: f64, width: i32) -> Vec<CellId> {
    let center = CellId::from_lat_lon(lat, lon).parent(QUERY_LEVEL);
    let (face, i, j) = center.to_face_ij();

    // Stride of one query-level cell in max-resolution coordinates.
    let size = 1i32 << (MAX_LEVEL - QUERY_LEVEL) as u32;
    let half = width / 2;

    let mut cells = Vec::with_capacity(((2 * half + 1) * (2 * half + 1)).max(0) as usize);
    for dx in -half..=half {
        for dy in -half..=half {
            cells.push(CellId::from_face_ij(face, i + dx * size, j + dy * size).parent(QUERY_LEVEL));
        }
    }
    cells
}
