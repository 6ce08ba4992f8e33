//! Helpers shared by unit and integration tests.

use crate::db::{Connector, DocumentStore, InsertOutcome, ServerEndpoint, StoreError};
use crate::import::Row;
use crate::logging::ImportLog;
use log::{Level, Log, Metadata, Record};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub use database::{TestMongo, TestMongoError};

#[derive(Default)]
struct MemoryState {
    unreachable: bool,
    withheld: HashSet<String>,
    failing: HashSet<String>,
    documents: HashMap<String, Vec<Row>>,
    databases: Vec<String>,
    insert_order: Vec<String>,
    connects: usize,
    closes: usize,
}

/// Scriptable in-memory document store.
///
/// Clones share state, so a test keeps one clone for assertions and hands
/// another to the code under test.
#[derive(Clone, Default)]
pub struct MemoryConnector {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse every connection attempt.
    pub fn unreachable(self) -> Self {
        self.state.lock().unreachable = true;
        self
    }

    /// Store inserts into `collection` but report them unacknowledged.
    pub fn withhold_ack(self, collection: &str) -> Self {
        self.state.lock().withheld.insert(collection.to_string());
        self
    }

    /// Fail inserts into `collection` with an unexpected store error.
    pub fn fail_insert(self, collection: &str) -> Self {
        self.state.lock().failing.insert(collection.to_string());
        self
    }

    /// Connection attempts, refused ones included.
    pub fn connects(&self) -> usize {
        self.state.lock().connects
    }

    pub fn closes(&self) -> usize {
        self.state.lock().closes
    }

    pub fn documents(&self, collection: &str) -> Vec<Row> {
        self.state
            .lock()
            .documents
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Database named by each insert, in call order.
    pub fn databases(&self) -> Vec<String> {
        self.state.lock().databases.clone()
    }

    /// Collections that received an insert, in call order.
    pub fn insert_order(&self) -> Vec<String> {
        self.state.lock().insert_order.clone()
    }
}

impl Connector for MemoryConnector {
    type Store = MemoryStore;

    fn connect(&self, endpoint: &ServerEndpoint) -> Result<MemoryStore, StoreError> {
        let mut state = self.state.lock();
        state.connects += 1;
        if state.unreachable {
            return Err(StoreError::Unavailable(format!(
                "connection refused by {}",
                endpoint
            )));
        }

        Ok(MemoryStore {
            state: Arc::clone(&self.state),
        })
    }
}

/// Open connection handed out by [`MemoryConnector`].
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl DocumentStore for MemoryStore {
    fn insert_many(
        &mut self,
        database: &str,
        collection: &str,
        rows: &[Row],
    ) -> Result<InsertOutcome, StoreError> {
        let mut state = self.state.lock();
        if state.failing.contains(collection) {
            return Err(StoreError::Unavailable(format!(
                "simulated failure inserting into {}",
                collection
            )));
        }

        state.databases.push(database.to_string());
        state.insert_order.push(collection.to_string());
        state
            .documents
            .entry(collection.to_string())
            .or_default()
            .extend_from_slice(rows);

        if state.withheld.contains(collection) {
            Ok(InsertOutcome::unacknowledged(
                rows.len(),
                "write concern not satisfied",
            ))
        } else {
            Ok(InsertOutcome::acknowledged(rows.len()))
        }
    }

    fn close(self) {
        self.state.lock().closes += 1;
    }
}

/// One entry captured by [`CapturingLog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEntry {
    pub level: Level,
    pub message: String,
    pub file: Option<String>,
}

/// `log::Log` implementation that keeps every entry in memory.
#[derive(Clone, Default)]
pub struct CapturingLog {
    entries: Arc<Mutex<Vec<CapturedEntry>>>,
}

impl CapturingLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// An [`ImportLog`] writing into this capture.
    pub fn import_log(&self) -> ImportLog {
        ImportLog::from_logger(self.clone())
    }

    pub fn entries(&self) -> Vec<CapturedEntry> {
        self.entries.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .map(|entry| entry.message.clone())
            .collect()
    }

    pub fn at_level(&self, level: Level) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|entry| entry.level == level)
            .map(|entry| entry.message.clone())
            .collect()
    }
}

impl Log for CapturingLog {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        self.entries.lock().push(CapturedEntry {
            level: record.level(),
            message: record.args().to_string(),
            file: record.file().map(str::to_string),
        });
    }

    fn flush(&self) {}
}

/// Temporary directory of CSV source files.
pub struct CsvFixture {
    dir: TempDir,
}

impl CsvFixture {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    /// Fixture holding `products.csv`, `customers.csv` and `rentals.csv`.
    pub fn with_media(products: &str, customers: &str, rentals: &str) -> io::Result<Self> {
        let fixture = Self::new()?;
        fixture.write("products.csv", products)?;
        fixture.write("customers.csv", customers)?;
        fixture.write("rentals.csv", rentals)?;
        Ok(fixture)
    }

    pub fn write(&self, name: &str, contents: &str) -> io::Result<PathBuf> {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

pub mod database {
    use crate::db::{MongoConnector, ServerEndpoint};
    use mongodb::bson::{Document, doc};
    use mongodb::sync::Client;
    use std::time::Duration;
    use testcontainers::{Container, core::error::TestcontainersError, runners::SyncRunner};
    use testcontainers_modules::mongo::Mongo;
    use thiserror::Error;
    use uuid::Uuid;

    const MONGO_PORT: u16 = 27017;

    #[derive(Debug, Error)]
    pub enum TestMongoError {
        #[error("container error: {0}")]
        Container(#[from] TestcontainersError),
        #[error("mongodb error: {0}")]
        Mongo(#[from] mongodb::error::Error),
    }

    /// Disposable MongoDB server for integration tests.
    ///
    /// Each instance hands out a fresh database name so tests never see
    /// each other's documents. The container is removed on drop.
    pub struct TestMongo {
        endpoint: ServerEndpoint,
        database: String,
        client: Client,
        _container: Container<Mongo>,
    }

    impl TestMongo {
        /// Launch a MongoDB container and wait until it accepts connections.
        pub fn start() -> Result<Self, TestMongoError> {
            let container = Mongo::default().start()?;
            let host = container.get_host()?.to_string();
            let port = container.get_host_port_ipv4(MONGO_PORT)?;
            let endpoint = ServerEndpoint::new(host, port);

            let client = Client::with_uri_str(format!("mongodb://{}", endpoint))?;
            client.database("admin").run_command(doc! { "ping": 1 }).run()?;

            Ok(Self {
                endpoint,
                database: format!("media_{}", Uuid::new_v4().simple()),
                client,
                _container: container,
            })
        }

        pub fn endpoint(&self) -> &ServerEndpoint {
            &self.endpoint
        }

        pub fn database(&self) -> &str {
            &self.database
        }

        pub fn connector(&self) -> MongoConnector {
            MongoConnector::new(Duration::from_secs(5))
        }

        /// Every document in `collection` of this test's database.
        pub fn documents(&self, collection: &str) -> Result<Vec<Document>, TestMongoError> {
            let cursor = self
                .client
                .database(&self.database)
                .collection::<Document>(collection)
                .find(doc! {})
                .run()?;
            Ok(cursor.collect::<Result<Vec<_>, _>>()?)
        }
    }
}
