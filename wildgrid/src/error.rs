//! Error taxonomy for map queries.
//!
//! Callers see exactly two failure kinds: the remote service could not
//! satisfy the request (network trouble or an undecodable response), or the
//! session behind the transport is no longer authenticated. Every fetch-path
//! error aborts the whole fetch; no partial snapshot is ever produced and
//! the cached state is left untouched.

use thiserror::Error;

use crate::transport::TransportError;
use crate::wire::WireError;

/// Errors surfaced by [`crate::MapClient`] operations.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The remote service failed: transport trouble or a response that
    /// could not be decoded. The two are folded together so callers handle
    /// them uniformly.
    #[error("remote server error: {0}")]
    RemoteServer(String),

    /// The session is not (or no longer) authenticated. Raised upstream by
    /// the transport and propagated unchanged.
    #[error("login failed: {0}")]
    LoginFailed(String),
}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Network(message) => ClientError::RemoteServer(message),
            TransportError::LoginFailed(message) => ClientError::LoginFailed(message),
        }
    }
}

impl From<WireError> for ClientError {
    fn from(err: WireError) -> Self {
        ClientError::RemoteServer(err.to_string())
    }
}
