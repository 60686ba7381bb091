//! WildGrid - location-aware map client for the WildGrid game service
//!
//! The service exposes the game world as cells of a hierarchical geodesic
//! grid. This library computes the cell identifiers covering a square
//! neighborhood around the player, issues one batched query for those cells,
//! caches the aggregated snapshot for a short window, and decomposes the
//! per-cell payload into typed, deduplicated collections (creatures, spawn
//! points, gyms, checkpoints).
//!
//! # Architecture
//!
//! - [`grid`] - geodesic cell identifiers and neighborhood enumeration
//! - [`wire`] - typed request/response messages and their binary encoding
//! - [`transport`] - the async boundary to the remote service (trait only;
//!   the embedding application supplies the implementation)
//! - [`session`] - current player position and clock
//! - [`map`] - the [`MapClient`] facade: cached snapshot fetch, derived
//!   queries, and one-shot operations
//!
//! # Example
//!
//! ```ignore
//! use wildgrid::{MapClient, Session};
//!
//! let session = Session::new(37.4, -122.1);
//! let client = MapClient::new(transport, session);
//!
//! let creatures = client.catchable_creatures().await?;
//! let gyms = client.gyms().await?;
//! ```

pub mod error;
pub mod grid;
pub mod map;
pub mod session;
pub mod transport;
pub mod wire;

pub use error::ClientError;
pub use grid::{cell_ids_for, CellId};
pub use map::{CatchableCreature, Gym, MapClient, MapConfig, MapSnapshot, Point};
pub use session::{Clock, Position, Session, SystemClock};
pub use transport::{Transport, TransportError};
