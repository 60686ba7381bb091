//! Transport abstraction toward the game service.
//!
//! This library never opens a socket itself. The embedding application
//! supplies a [`Transport`] that ships an encoded request body to the
//! service and hands back the raw response bytes. Retries, timeouts and
//! session keep-alive all live behind that boundary.
//!
//! The trait is async-only; blocking callers go through the facade's
//! `*_blocking` wrappers instead of a second synchronous trait.

use bytes::Bytes;
use thiserror::Error;

use crate::wire::RequestKind;

/// Errors a transport may raise.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The request could not be completed (connectivity, server-side
    /// failure, malformed envelope).
    #[error("transport error: {0}")]
    Network(String),

    /// The underlying session is not authenticated. Distinct from network
    /// failure so callers can re-login instead of retrying.
    #[error("login failed: {0}")]
    LoginFailed(String),
}

/// Asynchronous request/response channel to the game service.
///
/// Implementations must be `Send + Sync`; one transport is shared by every
/// query a [`crate::MapClient`] issues.
pub trait Transport: Send + Sync {
    /// Sends one encoded request body and returns the raw response bytes.
    fn send(
        &self,
        kind: RequestKind,
        body: Vec<u8>,
    ) -> impl std::future::Future<Output = Result<Bytes, TransportError>> + Send;
}
