//! Import result tracking.
//!
//! Records what happened to each collection and reduces it to the
//! `((products, customers, rentals), failures)` summary.

use crate::db::InsertOutcome;
use crate::import::MediaCollection;
use std::fmt;

/// Inserted counts for products, customers and rentals, then the number of
/// unacknowledged inserts.
pub type ImportSummary = ((usize, usize, usize), usize);

/// What one collection's bulk insert produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionOutcome {
    pub collection: MediaCollection,
    /// Number of documents written
    pub inserted: usize,
    /// Whether the server confirmed the write
    pub acknowledged: bool,
    /// Server explanation for a missing acknowledgment
    pub detail: Option<String>,
}

/// Per-collection outcomes of one import, in import order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    outcomes: Vec<CollectionOutcome>,
}

impl ImportReport {
    pub fn record(&mut self, collection: MediaCollection, outcome: InsertOutcome) {
        self.outcomes.push(CollectionOutcome {
            collection,
            inserted: outcome.inserted,
            acknowledged: outcome.acknowledged,
            detail: outcome.detail,
        });
    }

    pub fn outcomes(&self) -> &[CollectionOutcome] {
        &self.outcomes
    }

    pub fn outcome(&self, collection: MediaCollection) -> Option<&CollectionOutcome> {
        self.outcomes.iter().find(|o| o.collection == collection)
    }

    pub fn inserted(&self, collection: MediaCollection) -> usize {
        self.outcome(collection).map(|o| o.inserted).unwrap_or(0)
    }

    /// Inserted counts as `(products, customers, rentals)`.
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.inserted(MediaCollection::Products),
            self.inserted(MediaCollection::Customers),
            self.inserted(MediaCollection::Rentals),
        )
    }

    /// Number of inserts the server did not acknowledge.
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.acknowledged).count()
    }

    pub fn failed_collections(&self) -> Vec<MediaCollection> {
        self.outcomes
            .iter()
            .filter(|o| !o.acknowledged)
            .map(|o| o.collection)
            .collect()
    }

    pub fn into_summary(self) -> ImportSummary {
        (self.counts(), self.failures())
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            let status = if outcome.acknowledged {
                "acknowledged"
            } else {
                "NOT acknowledged"
            };
            writeln!(
                f,
                "  {:<10} {:>6} inserted ({})",
                outcome.collection.name(),
                outcome.inserted,
                status
            )?;
        }
        write!(f, "  failures: {}", self.failures())
    }
}
