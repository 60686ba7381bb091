//! Projection wrappers returned by the derived map queries.
//!
//! These are thin, location-bearing views over the wire entities. The
//! interesting one is [`CatchableCreature`], which gives the catchable and
//! wild channels a single uniform shape and an identity-based equality so
//! the union of the two can be deduplicated as a set.

use std::hash::{Hash, Hasher};

use crate::wire::{FortData, MapCreature, SpawnPoint, WildCreature};

/// A creature the player can attempt to catch, regardless of which channel
/// reported it.
///
/// Equality and hashing use the encounter identity only; two sightings of
/// the same encounter are the same creature.
#[derive(Debug, Clone)]
pub struct CatchableCreature {
    pub encounter_id: u64,
    pub spawn_point_id: String,
    pub creature_kind: u32,
    pub latitude: f64,
    pub longitude: f64,
    /// Absolute expiration when reported through the catchable channel;
    /// wild sightings only carry a relative time-till-hidden, so this stays
    /// `None` for them.
    pub expiration_timestamp_ms: Option<i64>,
}

impl PartialEq for CatchableCreature {
    fn eq(&self, other: &Self) -> bool {
        self.encounter_id == other.encounter_id
    }
}

impl Eq for CatchableCreature {}

impl Hash for CatchableCreature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.encounter_id.hash(state);
    }
}

impl From<&MapCreature> for CatchableCreature {
    fn from(creature: &MapCreature) -> Self {
        Self {
            encounter_id: creature.encounter_id,
            spawn_point_id: creature.spawn_point_id.clone(),
            creature_kind: creature.creature_kind,
            latitude: creature.latitude,
            longitude: creature.longitude,
            expiration_timestamp_ms: Some(creature.expiration_timestamp_ms),
        }
    }
}

impl From<&WildCreature> for CatchableCreature {
    fn from(creature: &WildCreature) -> Self {
        Self {
            encounter_id: creature.encounter_id,
            spawn_point_id: creature.spawn_point_id.clone(),
            creature_kind: creature.creature_kind,
            latitude: creature.latitude,
            longitude: creature.longitude,
            expiration_timestamp_ms: None,
        }
    }
}

/// A bare location, used for spawn points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&SpawnPoint> for Point {
    fn from(point: &SpawnPoint) -> Self {
        Self {
            latitude: point.latitude,
            longitude: point.longitude,
        }
    }
}

/// A gym in the neighborhood.
#[derive(Debug, Clone)]
pub struct Gym {
    data: FortData,
}

impl Gym {
    pub fn new(data: FortData) -> Self {
        Self { data }
    }

    pub fn id(&self) -> &str {
        &self.data.id
    }

    pub fn latitude(&self) -> f64 {
        self.data.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.data.longitude
    }

    pub fn is_enabled(&self) -> bool {
        self.data.enabled
    }

    /// The underlying fort record, e.g. for a follow-up detail lookup.
    pub fn fort(&self) -> &FortData {
        &self.data
    }
}
