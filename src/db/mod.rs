//! Document store access.
//!
//! The import routine talks to the database only through two traits:
//!
//! - [`Connector`] opens a connection to a [`ServerEndpoint`]
//! - [`DocumentStore`] is the open connection: bulk inserts, then close
//!
//! [`mongo::MongoConnector`] is the production backend. Connections are
//! always held through [`scoped::ScopedConnection`], which guarantees the
//! handle is closed exactly once.

pub mod mongo;
pub mod scoped;

pub use mongo::MongoConnector;
pub use scoped::{ConnectionScope, ScopedConnection};

use crate::import::Row;
use std::fmt;
use thiserror::Error;

/// Loopback address used when no host is configured.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Standard MongoDB port.
pub const DEFAULT_PORT: u16 = 27017;

/// Host and port of the database server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEndpoint {
    pub host: String,
    pub port: u16,
}

impl ServerEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Default for ServerEndpoint {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl fmt::Display for ServerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Result of one bulk insert as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertOutcome {
    /// Number of documents the server wrote
    pub inserted: usize,
    /// Whether the server confirmed the write
    pub acknowledged: bool,
    /// Server explanation when the write was not acknowledged
    pub detail: Option<String>,
}

impl InsertOutcome {
    pub fn acknowledged(inserted: usize) -> Self {
        Self {
            inserted,
            acknowledged: true,
            detail: None,
        }
    }

    pub fn unacknowledged(inserted: usize, detail: impl Into<String>) -> Self {
        Self {
            inserted,
            acknowledged: false,
            detail: Some(detail.into()),
        }
    }
}

/// Errors raised by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot reach {endpoint}: {source}")]
    Connect {
        endpoint: ServerEndpoint,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("insert into {collection} failed: {source}")]
    Insert {
        collection: String,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// An open connection that accepts bulk inserts.
pub trait DocumentStore {
    /// Insert `rows` as documents into `database.collection`.
    ///
    /// A write the server refused to confirm is `Ok` with
    /// `acknowledged == false`; `Err` is reserved for failures that should
    /// abort the import.
    fn insert_many(
        &mut self,
        database: &str,
        collection: &str,
        rows: &[Row],
    ) -> Result<InsertOutcome, StoreError>;

    /// Release the connection.
    fn close(self)
    where
        Self: Sized;
}

/// Opens [`DocumentStore`] connections.
pub trait Connector {
    type Store: DocumentStore;

    fn connect(&self, endpoint: &ServerEndpoint) -> Result<Self::Store, StoreError>;
}
