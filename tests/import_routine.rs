use log::{Level, LevelFilter};
use media_import::db::ServerEndpoint;
use media_import::import::{MEDIA_DATABASE, MediaCollection, Row};
use media_import::test_support::{CapturingLog, CsvFixture, MemoryConnector};
use media_import::{ImportError, ImportLog, MediaImporter, SourceFiles};

const PRODUCTS: &str = "id,name\n1,Alice\n2,Bob\n";
const CUSTOMERS: &str = "id,name\n10,Carol\n11,Dave\n12,Erin\n";
const RENTALS: &str = "product_id,user_id\n1,10\n";

fn import_with(
    connector: &MemoryConnector,
    fixture: &CsvFixture,
    log: &ImportLog,
) -> Result<media_import::ImportReport, ImportError> {
    MediaImporter::new(connector.clone(), ServerEndpoint::default(), MEDIA_DATABASE, log)
        .import(fixture.path(), &SourceFiles::default())
}

#[test]
fn rows_keep_string_fields_and_file_order() {
    let fixture = CsvFixture::with_media(PRODUCTS, CUSTOMERS, RENTALS).expect("fixture");
    let connector = MemoryConnector::new();
    let log = ImportLog::discard();

    import_with(&connector, &fixture, &log).expect("import succeeds");

    assert_eq!(
        connector.documents("products"),
        vec![
            Row::from_pairs([("id", "1"), ("name", "Alice")]),
            Row::from_pairs([("id", "2"), ("name", "Bob")]),
        ]
    );
}

#[test]
fn all_acknowledged_returns_counts_and_no_failures() {
    let fixture = CsvFixture::with_media(PRODUCTS, CUSTOMERS, RENTALS).expect("fixture");
    let connector = MemoryConnector::new();
    let capture = CapturingLog::new();
    let log = capture.import_log();

    let summary = import_with(&connector, &fixture, &log)
        .expect("import succeeds")
        .into_summary();

    assert_eq!(summary, ((2, 3, 1), 0));
    assert!(capture.at_level(Level::Warn).is_empty());
}

#[test]
fn customers_not_acknowledged_yields_one_failure() {
    let fixture = CsvFixture::with_media(PRODUCTS, CUSTOMERS, RENTALS).expect("fixture");
    let connector = MemoryConnector::new().withhold_ack("customers");
    let capture = CapturingLog::new();
    let log = capture.import_log();

    let report = import_with(&connector, &fixture, &log).expect("import succeeds");

    assert_eq!(report.failed_collections(), vec![MediaCollection::Customers]);
    assert_eq!(report.into_summary(), ((2, 3, 1), 1));

    let warnings = capture.at_level(Level::Warn);
    assert_eq!(warnings.len(), 1, "warnings: {warnings:?}");
    assert!(warnings[0].starts_with("Failed to write records to customers"));
}

#[test]
fn missing_product_file_never_connects() {
    let fixture = CsvFixture::new().expect("fixture");
    fixture.write("customers.csv", CUSTOMERS).expect("write");
    fixture.write("rentals.csv", RENTALS).expect("write");
    let connector = MemoryConnector::new();
    let capture = CapturingLog::new();
    let log = capture.import_log();

    let err = import_with(&connector, &fixture, &log).expect_err("import fails");

    assert!(err.is_input_error());
    assert!(err.to_string().contains("products.csv"));
    assert_eq!(connector.connects(), 0);
    assert!(capture.messages().is_empty());
}

#[test]
fn unreachable_server_fails_before_inserting() {
    let fixture = CsvFixture::with_media(PRODUCTS, CUSTOMERS, RENTALS).expect("fixture");
    let connector = MemoryConnector::new().unreachable();
    let capture = CapturingLog::new();
    let log = capture.import_log();

    let err = import_with(&connector, &fixture, &log).expect_err("import fails");

    assert!(matches!(err, ImportError::Connection(_)));
    assert_eq!(connector.connects(), 1);
    assert!(connector.insert_order().is_empty());
    assert_eq!(
        capture
            .messages()
            .iter()
            .filter(|m| m.starts_with("Read in"))
            .count(),
        3
    );
}

#[test]
fn unexpected_insert_failure_releases_connection() {
    let fixture = CsvFixture::with_media(PRODUCTS, CUSTOMERS, RENTALS).expect("fixture");
    let connector = MemoryConnector::new().fail_insert("rentals");
    let log = ImportLog::discard();

    let err = import_with(&connector, &fixture, &log).expect_err("import fails");

    assert!(matches!(err, ImportError::Insert { .. }));
    assert_eq!(connector.insert_order(), vec!["products", "customers"]);
    assert_eq!(connector.closes(), 1);
}

#[test]
fn file_log_records_reads_writes_and_warnings() {
    let fixture = CsvFixture::with_media(PRODUCTS, CUSTOMERS, RENTALS).expect("fixture");
    let log_path = fixture.path().join("db.log");
    let connector = MemoryConnector::new().withhold_ack("rentals");
    let log = ImportLog::to_file(&log_path, LevelFilter::Debug).expect("log file");

    import_with(&connector, &fixture, &log).expect("import succeeds");
    drop(log);

    let contents = std::fs::read_to_string(&log_path).expect("read log");
    let lines: Vec<&str> = contents.lines().collect();

    assert!(lines[0].contains(" DEBUG Read in product data from products.csv: "));
    assert!(lines[0].contains(r#"{"id":"1","name":"Alice"}"#));
    assert!(contents.contains(" DEBUG Wrote 2 records to products"));
    assert!(contents.contains(" DEBUG Wrote 3 records to customers"));
    assert_eq!(
        lines.iter().filter(|line| line.contains(" WARN ")).count(),
        1
    );
    assert!(contents.contains(" WARN Failed to write records to rentals"));
}
