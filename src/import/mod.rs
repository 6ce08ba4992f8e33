//! Media CSV import.
//!
//! Loads the products, customers and rentals CSV files into the matching
//! collections of the media database:
//!
//! 1. **Reading** (`reader`) - parses each CSV file into [`Row`]s
//! 2. **Coordination** (`coordinator`) - opens the scoped connection and runs the inserts
//! 3. **Reporting** (`stats`) - per-collection outcomes and the summary tuple
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use media_import::import::import_data;
//! use media_import::logging::ImportLog;
//!
//! let log = ImportLog::to_file("db.log", log::LevelFilter::Debug)?;
//! let ((products, customers, rentals), failures) =
//!     import_data("data", "products.csv", "customers.csv", "rentals.csv", &log)?;
//! ```

pub mod coordinator;
pub mod reader;
pub mod row;
pub mod sources;
pub mod stats;

pub use coordinator::{MediaImporter, import_data};
pub use row::Row;
pub use sources::{MediaCollection, SourceFiles};
pub use stats::{CollectionOutcome, ImportReport, ImportSummary};

/// Logical database the media collections live in.
pub const MEDIA_DATABASE: &str = "media";
