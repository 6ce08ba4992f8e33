//! MongoDB backend built on the driver's blocking API.

use crate::db::{Connector, DocumentStore, InsertOutcome, ServerEndpoint, StoreError};
use crate::import::Row;
use mongodb::bson::{Document, doc};
use mongodb::error::{ErrorKind, InsertManyError};
use mongodb::options::{ClientOptions, ServerAddress};
use mongodb::sync::Client;
use std::time::Duration;

const APP_NAME: &str = "media-import";

/// Opens blocking MongoDB clients.
#[derive(Debug, Clone)]
pub struct MongoConnector {
    server_selection_timeout: Duration,
}

impl MongoConnector {
    pub fn new(server_selection_timeout: Duration) -> Self {
        Self {
            server_selection_timeout,
        }
    }

    fn client_options(&self, endpoint: &ServerEndpoint) -> ClientOptions {
        let mut options = ClientOptions::default();
        options.hosts = vec![ServerAddress::Tcp {
            host: endpoint.host.clone(),
            port: Some(endpoint.port),
        }];
        options.app_name = Some(APP_NAME.to_string());
        options.server_selection_timeout = Some(self.server_selection_timeout);
        options
    }
}

impl Default for MongoConnector {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl Connector for MongoConnector {
    type Store = MongoStore;

    /// Build a client and ping the server.
    ///
    /// The driver connects lazily, so the ping is what surfaces an
    /// unreachable or refusing server at scope entry.
    fn connect(&self, endpoint: &ServerEndpoint) -> Result<MongoStore, StoreError> {
        let connect_error = |source: mongodb::error::Error| StoreError::Connect {
            endpoint: endpoint.clone(),
            source,
        };

        let client = Client::with_options(self.client_options(endpoint)).map_err(connect_error)?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .run()
            .map_err(connect_error)?;

        Ok(MongoStore { client })
    }
}

/// Open MongoDB client.
pub struct MongoStore {
    client: Client,
}

impl DocumentStore for MongoStore {
    fn insert_many(
        &mut self,
        database: &str,
        collection: &str,
        rows: &[Row],
    ) -> Result<InsertOutcome, StoreError> {
        let documents: Vec<Document> = rows.iter().map(Row::to_document).collect();

        let result = self
            .client
            .database(database)
            .collection::<Document>(collection)
            .insert_many(&documents)
            .run();

        match result {
            Ok(result) => Ok(InsertOutcome::acknowledged(result.inserted_ids.len())),
            Err(err) => match err.kind.as_ref() {
                ErrorKind::InsertMany(failure) => Ok(unacknowledged(failure, documents.len())),
                _ => Err(StoreError::Insert {
                    collection: collection.to_string(),
                    source: err,
                }),
            },
        }
    }

    /// Shut the client down, waiting until its connection pools are closed.
    fn close(self) {
        self.client.shutdown().run();
    }
}

/// Translate a server-side write failure into an outcome.
fn unacknowledged(failure: &InsertManyError, attempted: usize) -> InsertOutcome {
    let write_errors: Vec<(usize, &str)> = failure
        .write_errors
        .iter()
        .flatten()
        .map(|e| (e.index, e.message.as_str()))
        .collect();
    let concern = failure
        .write_concern_error
        .as_ref()
        .map(|e| e.message.as_str());

    write_failure_outcome(&write_errors, concern, attempted)
}

/// Outcome of an ordered insert the server reported as failed.
///
/// Inserts are ordered, so everything before the first failed index was
/// written. With only a write concern error every document was written
/// but durability was not confirmed.
fn write_failure_outcome(
    write_errors: &[(usize, &str)],
    write_concern: Option<&str>,
    attempted: usize,
) -> InsertOutcome {
    let inserted = write_errors
        .iter()
        .map(|(index, _)| *index)
        .min()
        .unwrap_or(attempted)
        .min(attempted);

    let detail = match (write_errors, write_concern) {
        ([], Some(concern)) => format!("write concern error: {concern}"),
        ([], None) => "server did not acknowledge the write".to_string(),
        (errors, _) => errors
            .iter()
            .map(|(index, message)| format!("document {index}: {message}"))
            .collect::<Vec<_>>()
            .join("; "),
    };

    InsertOutcome::unacknowledged(inserted, detail)
}
