//! Import coordination for the media database.
//!
//! The MediaImporter runs the whole load:
//! 1. Read the products, customers and rentals CSV files
//! 2. Open one scoped connection
//! 3. Bulk insert each row collection into its collection
//! 4. Log each outcome and collect the report
//!
//! Every file is read before any connection attempt. Each insert is
//! attempted even when an earlier one was not acknowledged.

use crate::config::ImportConfig;
use crate::db::{Connector, InsertOutcome, MongoConnector, ScopedConnection, ServerEndpoint};
use crate::error::{ImportError, ImportResult};
use crate::import::{
    ImportReport, ImportSummary, MEDIA_DATABASE, MediaCollection, Row, SourceFiles, reader,
};
use crate::logging::{ImportLog, log_to};
use log::Level;
use std::path::Path;

/// Loads CSV sources into the media collections of one database.
pub struct MediaImporter<'a, C: Connector> {
    connection: ScopedConnection<C>,
    database: String,
    log: &'a ImportLog,
}

impl<'a, C: Connector> MediaImporter<'a, C> {
    /// Create an importer. Nothing is connected until [`MediaImporter::import`].
    ///
    /// # Arguments
    /// * `connector` - Store backend used to open the connection
    /// * `endpoint` - Database server address
    /// * `database` - Logical database holding the media collections
    /// * `log` - Destination for progress and failure entries
    pub fn new(
        connector: C,
        endpoint: ServerEndpoint,
        database: impl Into<String>,
        log: &'a ImportLog,
    ) -> Self {
        Self {
            connection: ScopedConnection::new(connector, endpoint),
            database: database.into(),
            log,
        }
    }

    pub fn endpoint(&self) -> &ServerEndpoint {
        self.connection.endpoint()
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Import the three source files found under `directory`.
    ///
    /// # Errors
    /// * `ImportError::Open` / `ImportError::Parse` - a source file is
    ///   missing or not valid CSV; raised before connecting
    /// * `ImportError::Connection` - the server could not be reached
    /// * `ImportError::Insert` - an insert failed for a reason other than
    ///   a missing acknowledgment; the connection is still closed
    ///
    /// # Returns
    /// Per-collection outcomes; unacknowledged inserts are counted there
    /// rather than raised.
    pub fn import(&self, directory: &Path, files: &SourceFiles) -> ImportResult<ImportReport> {
        let mut sources: Vec<(MediaCollection, Vec<Row>)> = Vec::with_capacity(3);
        for collection in MediaCollection::ALL {
            let file = files.file(collection);
            let rows = reader::read_rows(&directory.join(file))?;
            log_to!(
                self.log,
                Level::Debug,
                "Read in {} data from {}: {}",
                collection.kind(),
                file.display(),
                serde_json::to_string(&rows).unwrap_or_else(|_| format!("{:?}", rows))
            );
            sources.push((collection, rows));
        }

        let mut scope = self
            .connection
            .enter(self.log)
            .map_err(ImportError::Connection)?;

        let mut report = ImportReport::default();
        for (collection, rows) in &sources {
            let outcome = if rows.is_empty() {
                log_to!(self.log, Level::Debug, "No records to write to {}", collection);
                InsertOutcome::acknowledged(0)
            } else {
                scope
                    .insert_many(&self.database, collection.name(), rows)
                    .map_err(|source| ImportError::Insert {
                        collection: collection.name().to_string(),
                        source,
                    })?
            };

            if outcome.acknowledged {
                log_to!(
                    self.log,
                    Level::Debug,
                    "Wrote {} records to {}",
                    outcome.inserted,
                    collection
                );
            } else {
                match outcome.detail.as_deref() {
                    Some(detail) => log_to!(
                        self.log,
                        Level::Warn,
                        "Failed to write records to {}: {}",
                        collection,
                        detail
                    ),
                    None => log_to!(
                        self.log,
                        Level::Warn,
                        "Failed to write records to {}",
                        collection
                    ),
                }
            }

            report.record(*collection, outcome);
        }

        scope.close();
        self.log.flush();

        Ok(report)
    }
}

impl<'a> MediaImporter<'a, MongoConnector> {
    /// MongoDB importer for the configured endpoint and database.
    pub fn from_config(config: &ImportConfig, log: &'a ImportLog) -> Self {
        Self::new(
            MongoConnector::new(config.server_selection_timeout),
            config.endpoint.clone(),
            config.database.clone(),
            log,
        )
    }
}

/// Import three CSV files into the `media` database on the local server.
///
/// Returns `((products, customers, rentals), failures)` where `failures`
/// is the number of inserts the server did not acknowledge.
pub fn import_data(
    directory_name: impl AsRef<Path>,
    product_file: impl AsRef<Path>,
    customer_file: impl AsRef<Path>,
    rentals_file: impl AsRef<Path>,
    log: &ImportLog,
) -> ImportResult<ImportSummary> {
    let importer = MediaImporter::new(
        MongoConnector::default(),
        ServerEndpoint::default(),
        MEDIA_DATABASE,
        log,
    );
    let files = SourceFiles::new(
        product_file.as_ref(),
        customer_file.as_ref(),
        rentals_file.as_ref(),
    );

    Ok(importer.import(directory_name.as_ref(), &files)?.into_summary())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CapturingLog, CsvFixture, MemoryConnector};

    const PRODUCTS: &str = "product_id,description,product_type,quantity_available\n\
        prd001,60-inch TV stand,livingroom,3\n\
        prd002,L-shaped sofa,livingroom,0\n";
    const CUSTOMERS: &str = "user_id,name,address,phone_number,email\n\
        user001,Elisa Miles,4490 Union Street,206-922-0882,elisa.miles@yahoo.com\n";
    const RENTALS: &str = "product_id,user_id\nprd001,user001\nprd002,user001\nprd002,user002\n";

    fn fixture() -> CsvFixture {
        CsvFixture::with_media(PRODUCTS, CUSTOMERS, RENTALS).unwrap()
    }

    fn importer<'a>(
        connector: &MemoryConnector,
        log: &'a ImportLog,
    ) -> MediaImporter<'a, MemoryConnector> {
        MediaImporter::new(connector.clone(), ServerEndpoint::default(), MEDIA_DATABASE, log)
    }

    #[test]
    fn imports_every_collection() {
        let fixture = fixture();
        let connector = MemoryConnector::new();
        let log = ImportLog::discard();

        let report = importer(&connector, &log)
            .import(fixture.path(), &SourceFiles::default())
            .unwrap();

        assert_eq!(report.into_summary(), ((2, 1, 3), 0));
        assert_eq!(connector.documents("customers")[0].get("name"), Some("Elisa Miles"));
        assert_eq!(connector.databases(), vec![MEDIA_DATABASE.to_string(); 3]);
        assert_eq!(connector.closes(), 1);
    }

    #[test]
    fn inserts_run_in_fixed_order() {
        let fixture = fixture();
        let connector = MemoryConnector::new();
        let log = ImportLog::discard();

        importer(&connector, &log)
            .import(fixture.path(), &SourceFiles::default())
            .unwrap();

        assert_eq!(connector.insert_order(), vec!["products", "customers", "rentals"]);
    }

    #[test]
    fn unacknowledged_insert_is_counted_and_warned() {
        let fixture = fixture();
        let connector = MemoryConnector::new().withhold_ack("customers");
        let capture = CapturingLog::new();
        let log = capture.import_log();

        let summary = importer(&connector, &log)
            .import(fixture.path(), &SourceFiles::default())
            .unwrap()
            .into_summary();

        assert_eq!(summary, ((2, 1, 3), 1));
        let warnings = capture.at_level(Level::Warn);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("customers"));
        assert_eq!(connector.documents("rentals").len(), 3);
    }

    #[test]
    fn every_insert_is_attempted_when_all_fail_to_acknowledge() {
        let fixture = fixture();
        let connector = MemoryConnector::new()
            .withhold_ack("products")
            .withhold_ack("customers")
            .withhold_ack("rentals");
        let log = ImportLog::discard();

        let report = importer(&connector, &log)
            .import(fixture.path(), &SourceFiles::default())
            .unwrap();

        assert_eq!(report.failures(), 3);
        assert_eq!(connector.insert_order().len(), 3);
    }

    #[test]
    fn read_entries_name_the_file_and_contents() {
        let fixture = fixture();
        let connector = MemoryConnector::new();
        let capture = CapturingLog::new();
        let log = capture.import_log();

        importer(&connector, &log)
            .import(fixture.path(), &SourceFiles::default())
            .unwrap();

        let debug = capture.at_level(Level::Debug);
        assert!(debug[0].starts_with("Read in product data from products.csv: [{"));
        assert!(debug[0].contains(r#""product_id":"prd001""#));
        assert!(debug[1].starts_with("Read in customer data from customers.csv"));
        assert!(debug[2].starts_with("Read in rental data from rentals.csv"));
        assert!(debug.contains(&"Wrote 2 records to products".to_string()));
        assert!(debug.contains(&"Wrote 3 records to rentals".to_string()));
        assert!(
            capture
                .entries()
                .iter()
                .all(|entry| entry.file.as_deref().is_some_and(|f| f.starts_with("src/")))
        );
    }

    #[test]
    fn header_only_file_skips_insert() {
        let fixture = CsvFixture::with_media(PRODUCTS, "user_id,name\n", RENTALS).unwrap();
        let connector = MemoryConnector::new();
        let capture = CapturingLog::new();
        let log = capture.import_log();

        let summary = importer(&connector, &log)
            .import(fixture.path(), &SourceFiles::default())
            .unwrap()
            .into_summary();

        assert_eq!(summary, ((2, 0, 3), 0));
        assert_eq!(connector.insert_order(), vec!["products", "rentals"]);
        assert!(capture.messages().contains(&"No records to write to customers".to_string()));
    }

    #[test]
    fn missing_file_fails_before_connecting() {
        let fixture = CsvFixture::new().unwrap();
        fixture.write("customers.csv", CUSTOMERS).unwrap();
        fixture.write("rentals.csv", RENTALS).unwrap();
        let connector = MemoryConnector::new();
        let capture = CapturingLog::new();
        let log = capture.import_log();

        let err = importer(&connector, &log)
            .import(fixture.path(), &SourceFiles::default())
            .unwrap_err();

        assert!(matches!(err, ImportError::Open { .. }));
        assert_eq!(connector.connects(), 0);
        assert!(capture.messages().iter().all(|m| !m.starts_with("connected")));
    }

    #[test]
    fn malformed_file_fails_before_connecting() {
        let fixture =
            CsvFixture::with_media(PRODUCTS, CUSTOMERS, "product_id,user_id\nprd001\n").unwrap();
        let connector = MemoryConnector::new();
        let log = ImportLog::discard();

        let err = importer(&connector, &log)
            .import(fixture.path(), &SourceFiles::default())
            .unwrap_err();

        match err {
            ImportError::Parse { path, .. } => assert!(path.ends_with("rentals.csv")),
            other => panic!("expected parse error, got {other:?}"),
        }
        assert_eq!(connector.connects(), 0);
    }

    #[test]
    fn unreachable_server_fails_after_reading() {
        let fixture = fixture();
        let connector = MemoryConnector::new().unreachable();
        let capture = CapturingLog::new();
        let log = capture.import_log();

        let err = importer(&connector, &log)
            .import(fixture.path(), &SourceFiles::default())
            .unwrap_err();

        assert!(matches!(err, ImportError::Connection(_)));
        let reads = capture
            .messages()
            .iter()
            .filter(|m| m.starts_with("Read in"))
            .count();
        assert_eq!(reads, 3);
        assert!(connector.insert_order().is_empty());
        assert_eq!(connector.closes(), 0);
    }

    #[test]
    fn failing_insert_closes_connection_once() {
        let fixture = fixture();
        let connector = MemoryConnector::new().fail_insert("customers");
        let log = ImportLog::discard();

        let err = importer(&connector, &log)
            .import(fixture.path(), &SourceFiles::default())
            .unwrap_err();

        match err {
            ImportError::Insert { collection, .. } => assert_eq!(collection, "customers"),
            other => panic!("expected insert error, got {other:?}"),
        }
        assert_eq!(connector.insert_order(), vec!["products"]);
        assert_eq!(connector.connects(), 1);
        assert_eq!(connector.closes(), 1);
    }

    #[test]
    fn custom_file_names_are_resolved_against_directory() {
        let fixture = CsvFixture::new().unwrap();
        fixture.write("p.csv", PRODUCTS).unwrap();
        fixture.write("c.csv", CUSTOMERS).unwrap();
        fixture.write("r.csv", RENTALS).unwrap();
        let connector = MemoryConnector::new();
        let log = ImportLog::discard();

        let report = importer(&connector, &log)
            .import(fixture.path(), &SourceFiles::new("p.csv", "c.csv", "r.csv"))
            .unwrap();

        assert_eq!(report.counts(), (2, 1, 3));
    }

    #[test]
    fn from_config_uses_configured_target() {
        let config = ImportConfig::from_lookup(|key| match key {
            "MEDIA_DB_HOST" => Some("mongo.internal".to_string()),
            "MEDIA_DB_NAME" => Some("media_staging".to_string()),
            _ => None,
        });
        let log = ImportLog::discard();

        let importer = MediaImporter::from_config(&config, &log);
        assert_eq!(importer.endpoint(), &ServerEndpoint::new("mongo.internal", 27017));
        assert_eq!(importer.database(), "media_staging");
    }
}
