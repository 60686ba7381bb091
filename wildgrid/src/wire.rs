//! Wire messages exchanged with the game service.
//!
//! Messages are plain serde structs encoded with bincode. The transport
//! layer treats the encoded bodies as opaque bytes; this module owns the
//! field layout and the encode/decode boundary. A body that fails to decode
//! surfaces as a [`WireError`], which the map facade folds into the same
//! remote-server error as a transport failure.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised at the encode/decode boundary.
#[derive(Debug, Error)]
pub enum WireError {
    /// A request body could not be encoded.
    #[error("failed to encode request: {0}")]
    Encode(#[source] bincode::Error),

    /// A response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(#[source] bincode::Error),
}

/// Encodes a request message to bytes.
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, WireError> {
    bincode::serialize(message).map_err(WireError::Encode)
}

/// Decodes a response message from bytes.
pub fn decode<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, WireError> {
    bincode::deserialize(bytes).map_err(WireError::Decode)
}

/// The operation a request body belongs to. The transport uses this to route
/// the request; this library never inspects it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    GetMapObjects,
    FortDetails,
    FortSearch,
    Encounter,
    CatchCreature,
}

// ==================== Batched map query ====================

/// Batched request for the map state of a set of grid cells.
///
/// `since_timestamp_ms` carries one entry per cell; this client always sends
/// zero to request full state rather than an incremental delta.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapObjectsRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub cell_ids: Vec<u64>,
    pub since_timestamp_ms: Vec<u64>,
}

/// Response to [`MapObjectsRequest`]: one payload per requested cell.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapObjectsResponse {
    pub cells: Vec<CellPayload>,
}

/// Heterogeneous per-cell payload. Empty lists and absent data are the same
/// thing on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CellPayload {
    pub nearby_creatures: Vec<NearbyCreature>,
    pub catchable_creatures: Vec<MapCreature>,
    pub wild_creatures: Vec<WildCreature>,
    pub spawn_points: Vec<SpawnPoint>,
    pub decimated_spawn_points: Vec<SpawnPoint>,
    pub forts: Vec<FortData>,
}

// ==================== Map entities ====================

/// A creature reported near the player but too far to interact with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyCreature {
    pub encounter_id: u64,
    pub creature_kind: u32,
    pub distance_m: f32,
}

/// A creature close enough to be engaged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapCreature {
    pub encounter_id: u64,
    pub spawn_point_id: String,
    pub creature_kind: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub expiration_timestamp_ms: i64,
}

/// A creature reported by the wild-sightings channel. May describe the same
/// encounter as a [`MapCreature`]; the two are kept in separate sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WildCreature {
    pub encounter_id: u64,
    pub spawn_point_id: String,
    pub creature_kind: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub time_till_hidden_ms: i64,
}

/// A location creatures can appear at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Declared kind of a location feature ("fort").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FortKind {
    /// Kind missing or unrecognized; such forts are dropped during
    /// decomposition.
    Unspecified,
    Gym,
    Checkpoint,
}

/// A location-anchored feature of the game world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FortData {
    pub id: String,
    pub kind: FortKind,
    pub latitude: f64,
    pub longitude: f64,
    pub enabled: bool,
}

// ==================== One-shot operations ====================

/// Request for the detail record of a single fort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FortDetailsRequest {
    pub fort_id: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Detail record of a single fort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FortDetailsResponse {
    pub fort_id: String,
    pub kind: FortKind,
    pub name: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub image_urls: Vec<String>,
}

/// Outcome of spinning a fort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FortSearchOutcome {
    Success,
    OutOfRange,
    InCooldown,
    InventoryFull,
}

/// Request to search (spin) a fort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FortSearchRequest {
    pub fort_id: String,
    pub fort_latitude: f64,
    pub fort_longitude: f64,
    pub player_latitude: f64,
    pub player_longitude: f64,
}

/// Response to a fort search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FortSearchResponse {
    pub outcome: FortSearchOutcome,
    pub experience_awarded: u32,
    pub cooldown_complete_timestamp_ms: i64,
}

/// Outcome of initiating an encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterOutcome {
    Success,
    NotFound,
    Closed,
    CreatureFled,
    NotInRange,
}

/// Request to start an encounter with a catchable creature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterRequest {
    pub encounter_id: u64,
    pub spawn_point_id: String,
    pub player_latitude: f64,
    pub player_longitude: f64,
}

/// Response to an encounter request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterResponse {
    pub outcome: EncounterOutcome,
    pub wild_creature: Option<WildCreature>,
    pub capture_probability: Vec<f32>,
}

/// Ball used for a catch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallKind {
    Standard,
    Great,
    Ultra,
}

/// Outcome of a catch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatchOutcome {
    Success,
    Escape,
    Flee,
    Missed,
}

/// Request for one throw at an encountered creature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatchCreatureRequest {
    pub encounter_id: u64,
    pub spawn_point_id: String,
    pub hit: bool,
    pub normalized_hit_position: f64,
    pub normalized_reticle_size: f64,
    pub spin_modifier: f64,
    pub ball: BallKind,
}

/// Response to a catch attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatchCreatureResponse {
    pub outcome: CatchOutcome,
    pub captured_creature_id: u64,
    pub experience_awarded: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_request_roundtrip() {
        let request = MapObjectsRequest {
            latitude: 37.4,
            longitude: -122.1,
            cell_ids: vec![1, 2, 3],
            since_timestamp_ms: vec![0, 0, 0],
        };

        let bytes = encode(&request).unwrap();
        let decoded: MapObjectsRequest = decode(&bytes).unwrap();
        assert_eq!(decoded.cell_ids, vec![1, 2, 3]);
        assert_eq!(decoded.since_timestamp_ms, vec![0, 0, 0]);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let result = decode::<MapObjectsResponse>(&[0xff; 3]);
        assert!(matches!(result, Err(WireError::Decode(_))));
    }
}
