//! Map query facade.
//!
//! [`MapClient`] is the public surface of the library. Every derived query
//! (creatures, spawn points, gyms) is a projection over one shared,
//! time-windowed snapshot fetch:
//!
//! ```text
//! query -> SnapshotCache::get_or_fetch(cell_ids_for(position, width))
//!       -> (on miss) Transport::send -> decode -> MapSnapshot::from_cells
//!       -> projection
//! ```
//!
//! The one-shot operations (fort details, fort search, encounter, catch
//! attempt) are plain request/response shims with no caching or grid logic.

mod cache;
mod entities;
mod snapshot;

pub use cache::DEFAULT_TTL_MS;
pub use entities::{CatchableCreature, Gym, Point};
pub use snapshot::MapSnapshot;

use std::collections::HashSet;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::ClientError;
use crate::grid::{cell_ids_for, CellId};
use crate::session::Session;
use crate::transport::Transport;
use crate::wire::{
    self, BallKind, CatchCreatureRequest, CatchCreatureResponse, EncounterRequest,
    EncounterResponse, FortData, FortDetailsRequest, FortDetailsResponse, FortSearchRequest,
    FortSearchResponse, MapCreature, MapObjectsRequest, MapObjectsResponse, NearbyCreature,
    RequestKind,
};

use cache::SnapshotCache;

/// Default neighborhood width, in cells, for queries that do not specify
/// one.
pub const DEFAULT_CELL_WIDTH: i32 = 3;

/// Tunables for a [`MapClient`].
#[derive(Debug, Clone)]
pub struct MapConfig {
    /// How long one fetched snapshot satisfies subsequent queries.
    pub cache_ttl_ms: u64,
    /// Neighborhood width used by the no-argument queries.
    pub default_cell_width: i32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            cache_ttl_ms: DEFAULT_TTL_MS,
            default_cell_width: DEFAULT_CELL_WIDTH,
        }
    }
}

/// Location-aware client for the game service's map API.
///
/// All queries share one snapshot cache slot: within the TTL window every
/// caller receives the most recently fetched snapshot, even when it asked
/// for a different cell set or position. See [`MapClient::map_snapshot_for_cells`].
pub struct MapClient<T> {
    transport: T,
    session: Session,
    cache: SnapshotCache,
    config: MapConfig,
}

impl<T: Transport> MapClient<T> {
    /// Creates a client with default configuration.
    pub fn new(transport: T, session: Session) -> Self {
        Self::with_config(transport, session, MapConfig::default())
    }

    /// Creates a client with explicit configuration.
    pub fn with_config(transport: T, session: Session, config: MapConfig) -> Self {
        Self {
            transport,
            session,
            cache: SnapshotCache::new(config.cache_ttl_ms),
            config,
        }
    }

    /// The session this client reads its position and time from.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The transport this client sends requests through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Pure grid-address computation: the ordered cell identifiers covering
    /// a `width` x `width` neighborhood around the given point.
    pub fn cell_ids(&self, latitude: f64, longitude: f64, width: i32) -> Vec<CellId> {
        cell_ids_for(latitude, longitude, width)
    }

    // ==================== Snapshot fetch ====================

    /// Fetches (or reuses) the snapshot around the current session
    /// position, at the default width.
    pub async fn map_snapshot(&self) -> Result<Arc<MapSnapshot>, ClientError> {
        self.map_snapshot_with_width(self.config.default_cell_width)
            .await
    }

    /// Fetches (or reuses) the snapshot around the current session
    /// position, at an explicit width.
    pub async fn map_snapshot_with_width(
        &self,
        width: i32,
    ) -> Result<Arc<MapSnapshot>, ClientError> {
        let position = self.session.position();
        let cells = cell_ids_for(position.latitude, position.longitude, width);
        self.snapshot_for(&cells, position.latitude, position.longitude)
            .await
    }

    /// Fetches (or reuses) the snapshot around an explicit position.
    ///
    /// The position is threaded through the request only; the session is
    /// never mutated.
    pub async fn map_snapshot_at(
        &self,
        latitude: f64,
        longitude: f64,
        width: i32,
    ) -> Result<Arc<MapSnapshot>, ClientError> {
        let cells = cell_ids_for(latitude, longitude, width);
        self.snapshot_for(&cells, latitude, longitude).await
    }

    /// Fetches (or reuses) the snapshot for an explicit cell set, reported
    /// against the current session position.
    ///
    /// Note the cache is a single shared slot with a time window, not a
    /// per-cell-set cache: inside the window the previous snapshot is
    /// returned unchanged regardless of `cell_ids`.
    pub async fn map_snapshot_for_cells(
        &self,
        cell_ids: &[CellId],
    ) -> Result<Arc<MapSnapshot>, ClientError> {
        let position = self.session.position();
        self.snapshot_for(cell_ids, position.latitude, position.longitude)
            .await
    }

    async fn snapshot_for(
        &self,
        cell_ids: &[CellId],
        latitude: f64,
        longitude: f64,
    ) -> Result<Arc<MapSnapshot>, ClientError> {
        let now_ms = self.session.now_ms();
        self.cache
            .get_or_fetch(now_ms, || self.fetch_snapshot(cell_ids, latitude, longitude))
            .await
    }

    /// One uncached round trip: build the batched request, send it, decode
    /// the response, and fold it into a snapshot.
    async fn fetch_snapshot(
        &self,
        cell_ids: &[CellId],
        latitude: f64,
        longitude: f64,
    ) -> Result<MapSnapshot, ClientError> {
        let request = MapObjectsRequest {
            latitude,
            longitude,
            cell_ids: cell_ids.iter().map(CellId::id).collect(),
            // Always request full state, never an incremental delta.
            since_timestamp_ms: vec![0; cell_ids.len()],
        };

        debug!(cells = cell_ids.len(), latitude, longitude, "fetching map objects");
        let body = wire::encode(&request)?;
        let bytes = self.transport.send(RequestKind::GetMapObjects, body).await?;
        let response: MapObjectsResponse = wire::decode(&bytes)?;

        debug!(cells = response.cells.len(), "decoded map objects response");
        Ok(MapSnapshot::from_cells(response.cells))
    }

    // ==================== Derived projections ====================

    /// Creatures the player can attempt to catch around the current
    /// position: the union of the catchable and wild channels, deduplicated
    /// by encounter identity.
    pub async fn catchable_creatures(&self) -> Result<Vec<CatchableCreature>, ClientError> {
        let snapshot = self.map_snapshot().await?;

        let mut seen: HashSet<u64> = HashSet::new();
        let mut creatures = Vec::new();
        for creature in &snapshot.catchable_creatures {
            if seen.insert(creature.encounter_id) {
                creatures.push(CatchableCreature::from(creature));
            }
        }
        for creature in &snapshot.wild_creatures {
            if seen.insert(creature.encounter_id) {
                creatures.push(CatchableCreature::from(creature));
            }
        }
        Ok(creatures)
    }

    /// Creatures reported nearby but out of interaction range.
    pub async fn nearby_creatures(&self) -> Result<Vec<NearbyCreature>, ClientError> {
        let snapshot = self.map_snapshot().await?;
        Ok(snapshot.nearby_creatures.clone())
    }

    /// Spawn points around the current position.
    pub async fn spawn_points(&self) -> Result<Vec<Point>, ClientError> {
        let snapshot = self.map_snapshot().await?;
        Ok(snapshot.spawn_points.iter().map(Point::from).collect())
    }

    /// Decimated spawn points around the current position.
    pub async fn decimated_spawn_points(&self) -> Result<Vec<Point>, ClientError> {
        let snapshot = self.map_snapshot().await?;
        Ok(snapshot
            .decimated_spawn_points
            .iter()
            .map(Point::from)
            .collect())
    }

    /// Gyms around the current position.
    pub async fn gyms(&self) -> Result<Vec<Gym>, ClientError> {
        let snapshot = self.map_snapshot().await?;
        Ok(snapshot.gyms.iter().cloned().map(Gym::new).collect())
    }

    // ==================== One-shot operations ====================

    /// Looks up the detail record of a fort.
    pub async fn fort_details(
        &self,
        fort_id: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<FortDetailsResponse, ClientError> {
        let request = FortDetailsRequest {
            fort_id: fort_id.to_string(),
            latitude,
            longitude,
        };
        self.send_one_shot(RequestKind::FortDetails, &request).await
    }

    /// Searches (spins) a fort from the current session position.
    pub async fn search_fort(&self, fort: &FortData) -> Result<FortSearchResponse, ClientError> {
        let position = self.session.position();
        let request = FortSearchRequest {
            fort_id: fort.id.clone(),
            fort_latitude: fort.latitude,
            fort_longitude: fort.longitude,
            player_latitude: position.latitude,
            player_longitude: position.longitude,
        };
        self.send_one_shot(RequestKind::FortSearch, &request).await
    }

    /// Initiates an encounter with a catchable creature.
    pub async fn encounter_creature(
        &self,
        creature: &MapCreature,
    ) -> Result<EncounterResponse, ClientError> {
        let position = self.session.position();
        let request = EncounterRequest {
            encounter_id: creature.encounter_id,
            spawn_point_id: creature.spawn_point_id.clone(),
            player_latitude: position.latitude,
            player_longitude: position.longitude,
        };
        self.send_one_shot(RequestKind::Encounter, &request).await
    }

    /// Makes one catch attempt against an encountered creature.
    pub async fn catch_creature(
        &self,
        creature: &MapCreature,
        normalized_hit_position: f64,
        normalized_reticle_size: f64,
        spin_modifier: f64,
        ball: BallKind,
    ) -> Result<CatchCreatureResponse, ClientError> {
        let request = CatchCreatureRequest {
            encounter_id: creature.encounter_id,
            spawn_point_id: creature.spawn_point_id.clone(),
            hit: true,
            normalized_hit_position,
            normalized_reticle_size,
            spin_modifier,
            ball,
        };
        self.send_one_shot(RequestKind::CatchCreature, &request)
            .await
    }

    async fn send_one_shot<Req, Resp>(
        &self,
        kind: RequestKind,
        request: &Req,
    ) -> Result<Resp, ClientError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let body = wire::encode(request)?;
        let bytes = self.transport.send(kind, body).await?;
        Ok(wire::decode(&bytes)?)
    }

    // ==================== Blocking wrappers ====================
    //
    // Each wrapper drives the corresponding future on the calling thread.
    // They must not be invoked from inside an async runtime; spawn-blocking
    // there instead.

    /// Blocking form of [`MapClient::map_snapshot`].
    pub fn map_snapshot_blocking(&self) -> Result<Arc<MapSnapshot>, ClientError> {
        futures::executor::block_on(self.map_snapshot())
    }

    /// Blocking form of [`MapClient::map_snapshot_with_width`].
    pub fn map_snapshot_with_width_blocking(
        &self,
        width: i32,
    ) -> Result<Arc<MapSnapshot>, ClientError> {
        futures::executor::block_on(self.map_snapshot_with_width(width))
    }

    /// Blocking form of [`MapClient::map_snapshot_at`].
    pub fn map_snapshot_at_blocking(
        &self,
        latitude: f64,
        longitude: f64,
        width: i32,
    ) -> Result<Arc<MapSnapshot>, ClientError> {
        futures::executor::block_on(self.map_snapshot_at(latitude, longitude, width))
    }

    /// Blocking form of [`MapClient::map_snapshot_for_cells`].
    pub fn map_snapshot_for_cells_blocking(
        &self,
        cell_ids: &[CellId],
    ) -> Result<Arc<MapSnapshot>, ClientError> {
        futures::executor::block_on(self.map_snapshot_for_cells(cell_ids))
    }

    /// Blocking form of [`MapClient::catchable_creatures`].
    pub fn catchable_creatures_blocking(&self) -> Result<Vec<CatchableCreature>, ClientError> {
        futures::executor::block_on(self.catchable_creatures())
    }

    /// Blocking form of [`MapClient::nearby_creatures`].
    pub fn nearby_creatures_blocking(&self) -> Result<Vec<NearbyCreature>, ClientError> {
        futures::executor::block_on(self.nearby_creatures())
    }

    /// Blocking form of [`MapClient::spawn_points`].
    pub fn spawn_points_blocking(&self) -> Result<Vec<Point>, ClientError> {
        futures::executor::block_on(self.spawn_points())
    }

    /// Blocking form of [`MapClient::decimated_spawn_points`].
    pub fn decimated_spawn_points_blocking(&self) -> Result<Vec<Point>, ClientError> {
        futures::executor::block_on(self.decimated_spawn_points())
    }

    /// Blocking form of [`MapClient::gyms`].
    pub fn gyms_blocking(&self) -> Result<Vec<Gym>, ClientError> {
        futures::executor::block_on(self.gyms())
    }

    /// Blocking form of [`MapClient::fort_details`].
    pub fn fort_details_blocking(
        &self,
        fort_id: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<FortDetailsResponse, ClientError> {
        futures::executor::block_on(self.fort_details(fort_id, latitude, longitude))
    }

    /// Blocking form of [`MapClient::search_fort`].
    pub fn search_fort_blocking(&self, fort: &FortData) -> Result<FortSearchResponse, ClientError> {
        futures::executor::block_on(self.search_fort(fort))
    }

    /// Blocking form of [`MapClient::encounter_creature`].
    pub fn encounter_creature_blocking(
        &self,
        creature: &MapCreature,
    ) -> Result<EncounterResponse, ClientError> {
        futures::executor::block_on(self.encounter_creature(creature))
    }

    /// Blocking form of [`MapClient::catch_creature`].
    pub fn catch_creature_blocking(
        &self,
        creature: &MapCreature,
        normalized_hit_position: f64,
        normalized_reticle_size: f64,
        spin_modifier: f64,
        ball: BallKind,
    ) -> Result<CatchCreatureResponse, ClientError> {
        futures::executor::block_on(self.catch_creature(
            creature,
            normalized_hit_position,
            normalized_reticle_size,
            spin_modifier,
            ball,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::MockClock;
    use crate::transport::tests::MockTransport;
    use crate::transport::TransportError;
    use crate::wire::{CellPayload, EncounterOutcome, FortKind, WildCreature};
    use bytes::Bytes;

    fn wild(encounter_id: u64) -> WildCreature {
        WildCreature {
            encounter_id,
            spawn_point_id: format!("sp-{encounter_id}"),
            creature_kind: 25,
            latitude: 37.4,
            longitude: -122.1,
            time_till_hidden_ms: 60_000,
        }
    }

    fn catchable(encounter_id: u64) -> MapCreature {
        MapCreature {
            encounter_id,
            spawn_point_id: format!("sp-{encounter_id}"),
            creature_kind: 25,
            latitude: 37.4,
            longitude: -122.1,
            expiration_timestamp_ms: 1_000_000,
        }
    }

    fn encoded_response(cells: Vec<CellPayload>) -> Bytes {
        Bytes::from(wire::encode(&MapObjectsResponse { cells }).unwrap())
    }

    fn client_at(
        latitude: f64,
        longitude: f64,
    ) -> (MapClient<MockTransport>, std::sync::Arc<MockClock>) {
        let clock = MockClock::new(100_000);
        let session = Session::with_clock(latitude, longitude, clock.clone());
        let client = MapClient::new(MockTransport::new(), session);
        (client, clock)
    }

    #[tokio::test]
    async fn test_map_request_carries_cells_and_zero_since_timestamps() {
        let (client, _clock) = client_at(37.4, -122.1);
        client
            .transport
            .push_response(Ok(encoded_response(vec![])));

        client.map_snapshot().await.unwrap();

        let (kind, body) = client.transport.last_request().unwrap();
        assert_eq!(kind, RequestKind::GetMapObjects);

        let request: MapObjectsRequest = wire::decode(&body).unwrap();
        assert_eq!(request.cell_ids.len(), 9);
        assert!(request.since_timestamp_ms.iter().all(|&since| since == 0));
        assert_eq!(request.latitude, 37.4);
        assert_eq!(request.longitude, -122.1);
    }

    #[tokio::test]
    async fn test_snapshot_within_ttl_reused_for_different_cells() {
        let (client, clock) = client_at(37.4, -122.1);
        client.transport.push_response(Ok(encoded_response(vec![CellPayload {
            wild_creatures: vec![wild(1)],
            ..Default::default()
        }])));

        let first = client.map_snapshot().await.unwrap();
        assert_eq!(first.wild_creatures.len(), 1);
        assert_eq!(client.transport.calls(), 1);

        // A different position and width inside the window still gets the
        // cached snapshot: the slot is shared, not keyed by cell set.
        clock.advance(DEFAULT_TTL_MS - 1);
        let second = client.map_snapshot_at(51.5, -0.12, 5).await.unwrap();
        assert_eq!(second.wild_creatures.len(), 1);
        assert_eq!(client.transport.calls(), 1);

        // Past the window a new transport call happens.
        clock.advance(2);
        client
            .transport
            .push_response(Ok(encoded_response(vec![])));
        let third = client.map_snapshot_at(51.5, -0.12, 5).await.unwrap();
        assert!(third.wild_creatures.is_empty());
        assert_eq!(client.transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_explicit_position_does_not_mutate_session() {
        let (client, _clock) = client_at(37.4, -122.1);
        client
            .transport
            .push_response(Ok(encoded_response(vec![])));

        client.map_snapshot_at(51.5, -0.12, 3).await.unwrap();

        // Request carried the explicit position...
        let (_, body) = client.transport.last_request().unwrap();
        let request: MapObjectsRequest = wire::decode(&body).unwrap();
        assert_eq!(request.latitude, 51.5);
        assert_eq!(request.longitude, -0.12);

        // ...and the session still points at the original one.
        let position = client.session().position();
        assert_eq!(position.latitude, 37.4);
        assert_eq!(position.longitude, -122.1);
    }

    #[tokio::test]
    async fn test_catchable_union_deduplicates_by_encounter() {
        let (client, _clock) = client_at(37.4, -122.1);
        client.transport.push_response(Ok(encoded_response(vec![CellPayload {
            catchable_creatures: vec![catchable(1)],
            wild_creatures: vec![wild(1), wild(2)],
            ..Default::default()
        }])));

        let creatures = client.catchable_creatures().await.unwrap();
        assert_eq!(creatures.len(), 2);

        let ids: Vec<u64> = creatures.iter().map(|creature| creature.encounter_id).collect();
        assert_eq!(ids, vec![1, 2]);
        // Encounter 1 came through the catchable channel first, so it keeps
        // the absolute expiration.
        assert!(creatures[0].expiration_timestamp_ms.is_some());
        assert!(creatures[1].expiration_timestamp_ms.is_none());
    }

    #[tokio::test]
    async fn test_derived_queries_share_one_fetch() {
        let (client, _clock) = client_at(37.4, -122.1);
        client.transport.push_response(Ok(encoded_response(vec![CellPayload {
            forts: vec![FortData {
                id: "g-1".into(),
                kind: FortKind::Gym,
                latitude: 37.4,
                longitude: -122.1,
                enabled: true,
            }],
            spawn_points: vec![crate::wire::SpawnPoint {
                latitude: 1.0,
                longitude: 2.0,
            }],
            ..Default::default()
        }])));

        let gyms = client.gyms().await.unwrap();
        let points = client.spawn_points().await.unwrap();
        let nearby = client.nearby_creatures().await.unwrap();

        assert_eq!(gyms.len(), 1);
        assert_eq!(points.len(), 1);
        assert!(nearby.is_empty());
        // Three derived queries, one transport round trip.
        assert_eq!(client.transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_undecodable_response_is_a_remote_server_error() {
        let (client, _clock) = client_at(37.4, -122.1);
        client
            .transport
            .push_response(Ok(Bytes::from_static(&[0xde, 0xad])));

        let result = client.map_snapshot().await;
        assert!(matches!(result, Err(ClientError::RemoteServer(_))));
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces_and_preserves_cache() {
        let (client, clock) = client_at(37.4, -122.1);
        client.transport.push_response(Ok(encoded_response(vec![CellPayload {
            wild_creatures: vec![wild(5)],
            ..Default::default()
        }])));

        client.map_snapshot().await.unwrap();

        clock.advance(DEFAULT_TTL_MS + 1);
        client
            .transport
            .push_response(Err(TransportError::Network("unreachable".into())));
        let failed = client.map_snapshot().await;
        assert!(matches!(failed, Err(ClientError::RemoteServer(_))));

        // The failure neither replaced the snapshot nor advanced the
        // timestamp: inside the original window the old snapshot returns.
        clock.set(100_000 + DEFAULT_TTL_MS - 1);
        let cached = client.map_snapshot().await.unwrap();
        assert_eq!(cached.wild_creatures[0].encounter_id, 5);
        assert_eq!(client.transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_login_failure_propagates_unchanged() {
        let (client, _clock) = client_at(37.4, -122.1);
        client
            .transport
            .push_response(Err(TransportError::LoginFailed("token expired".into())));

        let result = client.map_snapshot().await;
        assert!(matches!(result, Err(ClientError::LoginFailed(_))));
    }

    #[tokio::test]
    async fn test_encounter_builds_request_from_session_position() {
        let (client, _clock) = client_at(37.4, -122.1);
        let response = EncounterResponse {
            outcome: EncounterOutcome::Success,
            wild_creature: Some(wild(1)),
            capture_probability: vec![0.4, 0.6, 0.8],
        };
        client
            .transport
            .push_response(Ok(Bytes::from(wire::encode(&response).unwrap())));

        let result = client.encounter_creature(&catchable(1)).await.unwrap();
        assert_eq!(result.outcome, EncounterOutcome::Success);

        let (kind, body) = client.transport.last_request().unwrap();
        assert_eq!(kind, RequestKind::Encounter);
        let request: EncounterRequest = wire::decode(&body).unwrap();
        assert_eq!(request.encounter_id, 1);
        assert_eq!(request.player_latitude, 37.4);
        assert_eq!(request.player_longitude, -122.1);
    }

    #[tokio::test]
    async fn test_catch_attempt_roundtrip() {
        let (client, _clock) = client_at(37.4, -122.1);
        let response = CatchCreatureResponse {
            outcome: crate::wire::CatchOutcome::Success,
            captured_creature_id: 4242,
            experience_awarded: 210,
        };
        client
            .transport
            .push_response(Ok(Bytes::from(wire::encode(&response).unwrap())));

        let result = client
            .catch_creature(&catchable(1), 1.0, 1.95, 0.85, BallKind::Great)
            .await
            .unwrap();
        assert_eq!(result.captured_creature_id, 4242);

        let (_, body) = client.transport.last_request().unwrap();
        let request: CatchCreatureRequest = wire::decode(&body).unwrap();
        assert!(request.hit);
        assert_eq!(request.ball, BallKind::Great);
    }

    #[test]
    fn test_blocking_wrapper_resolves_on_calling_thread() {
        let (client, _clock) = client_at(37.4, -122.1);
        client.transport.push_response(Ok(encoded_response(vec![CellPayload {
            wild_creatures: vec![wild(11)],
            ..Default::default()
        }])));

        let creatures = client.catchable_creatures_blocking().unwrap();
        assert_eq!(creatures.len(), 1);
        assert_eq!(creatures[0].encounter_id, 11);
    }
}
