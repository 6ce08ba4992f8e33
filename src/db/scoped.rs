//! Connection whose lifetime is bound to a scope.
//!
//! [`ScopedConnection`] only remembers where to connect. [`ScopedConnection::enter`]
//! opens the handle and returns a [`ConnectionScope`] guard; the handle is
//! released by [`ConnectionScope::close`] or, on every other exit path, by the
//! guard's `Drop`. Either way it is closed exactly once.

use crate::db::{Connector, DocumentStore, InsertOutcome, ServerEndpoint, StoreError};
use crate::import::Row;
use crate::logging::{ImportLog, log_to};
use log::Level;

/// Connection target, not yet connected.
pub struct ScopedConnection<C: Connector> {
    connector: C,
    endpoint: ServerEndpoint,
}

impl<C: Connector> ScopedConnection<C> {
    pub fn new(connector: C, endpoint: ServerEndpoint) -> Self {
        Self {
            connector,
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &ServerEndpoint {
        &self.endpoint
    }

    /// Open the connection for the lifetime of the returned guard.
    pub fn enter<'a>(
        &'a self,
        log: &'a ImportLog,
    ) -> Result<ConnectionScope<'a, C::Store>, StoreError> {
        let store = self.connector.connect(&self.endpoint)?;
        log_to!(log, Level::Debug, "connected to {}", self.endpoint);

        Ok(ConnectionScope {
            store: Some(store),
            endpoint: &self.endpoint,
            log,
        })
    }
}

/// Open connection; closed when the guard is closed or dropped.
pub struct ConnectionScope<'a, S: DocumentStore> {
    store: Option<S>,
    endpoint: &'a ServerEndpoint,
    log: &'a ImportLog,
}

impl<S: DocumentStore> ConnectionScope<'_, S> {
    pub fn is_open(&self) -> bool {
        self.store.is_some()
    }

    pub fn insert_many(
        &mut self,
        database: &str,
        collection: &str,
        rows: &[Row],
    ) -> Result<InsertOutcome, StoreError> {
        match self.store.as_mut() {
            Some(store) => store.insert_many(database, collection, rows),
            None => Err(StoreError::Unavailable(format!(
                "connection to {} is closed",
                self.endpoint
            ))),
        }
    }

    /// Release the handle. Later calls do nothing.
    pub fn close(&mut self) {
        if let Some(store) = self.store.take() {
            store.close();
            log_to!(self.log, Level::Debug, "closed connection to {}", self.endpoint);
        }
    }
}

impl<S: DocumentStore> Drop for ConnectionScope<'_, S> {
    fn drop(&mut self) {
        self.close();
    }
}
