use std::fmt;
use std::path::{Path, PathBuf};

/// Target collections of the media database, in import order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaCollection {
    Products,
    Customers,
    Rentals,
}

impl MediaCollection {
    pub const ALL: [MediaCollection; 3] = [
        MediaCollection::Products,
        MediaCollection::Customers,
        MediaCollection::Rentals,
    ];

    /// Collection name in the database.
    pub fn name(self) -> &'static str {
        match self {
            MediaCollection::Products => "products",
            MediaCollection::Customers => "customers",
            MediaCollection::Rentals => "rentals",
        }
    }

    /// Singular noun used in log messages.
    pub fn kind(self) -> &'static str {
        match self {
            MediaCollection::Products => "product",
            MediaCollection::Customers => "customer",
            MediaCollection::Rentals => "rental",
        }
    }
}

impl fmt::Display for MediaCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// CSV file names, relative to the import directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFiles {
    pub products: PathBuf,
    pub customers: PathBuf,
    pub rentals: PathBuf,
}

impl SourceFiles {
    pub fn new(
        products: impl Into<PathBuf>,
        customers: impl Into<PathBuf>,
        rentals: impl Into<PathBuf>,
    ) -> Self {
        Self {
            products: products.into(),
            customers: customers.into(),
            rentals: rentals.into(),
        }
    }

    pub fn file(&self, collection: MediaCollection) -> &Path {
        match collection {
            MediaCollection::Products => &self.products,
            MediaCollection::Customers => &self.customers,
            MediaCollection::Rentals => &self.rentals,
        }
    }
}

impl Default for SourceFiles {
    fn default() -> Self {
        Self::new("products.csv", "customers.csv", "rentals.csv")
    }
}
