//! CSV source files → row collections.

use crate::error::{ImportError, ImportResult};
use crate::import::Row;
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read a header-delimited CSV file into rows, in file order.
pub fn read_rows(path: &Path) -> ImportResult<Vec<Row>> {
    let file = File::open(path).map_err(|source| ImportError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    parse_rows(file).map_err(|source| ImportError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse CSV from any reader. The first record names the fields.
///
/// Every record must have as many fields as the header.
pub fn parse_rows<R: Read>(input: R) -> Result<Vec<Row>, csv::Error> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(input);
    let headers = reader.headers()?.clone();

    reader
        .records()
        .map(|record| record.map(|record| Row::from_record(&headers, &record)))
        .collect()
}
