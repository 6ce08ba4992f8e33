pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod logging;

pub use config::ImportConfig;
pub use error::{ImportError, ImportResult};
pub use import::{ImportReport, MediaImporter, SourceFiles, import_data};
pub use logging::ImportLog;

#[cfg_attr(not(test), allow(dead_code))]
pub mod test_support;
