//! Aggregated, decomposed result of one batched map fetch.
//!
//! The service answers a map query with one heterogeneous payload per cell.
//! [`MapSnapshot::from_cells`] folds those payloads into seven typed
//! collections, deduplicating within each collection by the entity's natural
//! identity and partitioning forts by their declared kind. A snapshot is
//! immutable once built; the cache replaces it wholesale, never in place.

use std::collections::HashSet;

use crate::wire::{CellPayload, FortData, FortKind, MapCreature, NearbyCreature, SpawnPoint, WildCreature};

/// Everything one fetch learned about the neighborhood.
///
/// Collections preserve first-seen order across cells. A creature reported
/// both as catchable and as wild keeps one entry in *each* of those
/// collections; deduplication only applies within a collection.
#[derive(Debug, Clone, Default)]
pub struct MapSnapshot {
    pub wild_creatures: Vec<WildCreature>,
    pub catchable_creatures: Vec<MapCreature>,
    pub nearby_creatures: Vec<NearbyCreature>,
    pub spawn_points: Vec<SpawnPoint>,
    pub decimated_spawn_points: Vec<SpawnPoint>,
    pub gyms: Vec<FortData>,
    pub checkpoints: Vec<FortData>,
}

impl MapSnapshot {
    /// An empty snapshot, used as the cache's initial state.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Folds per-cell payloads into one snapshot.
    ///
    /// Within each collection the first occurrence of an identity wins and
    /// later duplicates are dropped. Forts whose kind is neither gym nor
    /// checkpoint are discarded; both buckets always exist, so a cell with
    /// no forts of some kind simply contributes nothing to it.
    pub fn from_cells(cells: Vec<CellPayload>) -> Self {
        let mut snapshot = Self::empty();

        let mut seen_nearby: HashSet<u64> = HashSet::new();
        let mut seen_catchable: HashSet<u64> = HashSet::new();
        let mut seen_wild: HashSet<u64> = HashSet::new();
        let mut seen_spawns: HashSet<(u64, u64)> = HashSet::new();
        let mut seen_decimated: HashSet<(u64, u64)> = HashSet::new();
        let mut seen_forts: HashSet<String> = HashSet::new();

        for cell in cells {
            for creature in cell.nearby_creatures {
                if seen_nearby.insert(creature.encounter_id) {
                    snapshot.nearby_creatures.push(creature);
                }
            }
            for creature in cell.catchable_creatures {
                if seen_catchable.insert(creature.encounter_id) {
                    snapshot.catchable_creatures.push(creature);
                }
            }
            for creature in cell.wild_creatures {
                if seen_wild.insert(creature.encounter_id) {
                    snapshot.wild_creatures.push(creature);
                }
            }
            for point in cell.spawn_points {
                if seen_spawns.insert(spawn_key(&point)) {
                    snapshot.spawn_points.push(point);
                }
            }
            for point in cell.decimated_spawn_points {
                if seen_decimated.insert(spawn_key(&point)) {
                    snapshot.decimated_spawn_points.push(point);
                }
            }
            for fort in cell.forts {
                match fort.kind {
                    FortKind::Gym => {
                        if seen_forts.insert(fort.id.clone()) {
                            snapshot.gyms.push(fort);
                        }
                    }
                    FortKind::Checkpoint => {
                        if seen_forts.insert(fort.id.clone()) {
                            snapshot.checkpoints.push(fort);
                        }
                    }
                    FortKind::Unspecified => {}
                }
            }
        }

        snapshot
    }
}

/// Identity key for a spawn point: its exact coordinates.
fn spawn_key(point: &SpawnPoint) -> (u64, u64) {
    (point.latitude.to_bits(), point.longitude.to_bits())
}
