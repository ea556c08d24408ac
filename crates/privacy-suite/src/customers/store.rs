use std::collections::BTreeMap;
use std::fmt;

use super::domain::{
    CustomerFilter, CustomerId, CustomerRecord, CustomerUpdate, NormalizedPreferences,
};
use super::source::{CustomerSource, SourceError};

/// Non-fatal note recorded when the source could not be read at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    pub source: String,
    pub reason: String,
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "customer data unavailable from {}: {}",
            self.source, self.reason
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("customer {0} not found")]
    NotFound(CustomerId),
    #[error("failed to persist customer data: {0}")]
    Persist(#[source] SourceError),
}

/// Id-keyed customer records backed by a [`CustomerSource`].
///
/// The store is the only stateful component of the suite. Reads borrow the
/// records, `update` takes `&mut self` so writers are serialized by the
/// borrow checker.
#[derive(Debug)]
pub struct PreferenceStore<S> {
    source: S,
    records: BTreeMap<CustomerId, CustomerRecord>,
    load_warning: Option<LoadWarning>,
}

impl<S> PreferenceStore<S>
where
    S: CustomerSource,
{
    /// Reads every record from `source`. A missing or malformed source yields
    /// an empty store with a load warning rather than an error.
    pub fn load(source: S) -> Self {
        let mut records = BTreeMap::new();
        let load_warning = match source.read() {
            Ok(rows) => {
                for record in rows {
                    if let Some(previous) = records.insert(record.customer_id.clone(), record) {
                        tracing::debug!(
                            customer_id = %previous.customer_id,
                            "duplicate customer id, keeping the later record"
                        );
                    }
                }
                tracing::info!(
                    source = %source.describe(),
                    customers = records.len(),
                    "loaded customer preferences"
                );
                None
            }
            Err(err) => {
                let warning = LoadWarning {
                    source: source.describe(),
                    reason: err.to_string(),
                };
                tracing::warn!(%warning, "starting with an empty customer store");
                Some(warning)
            }
        };

        Self {
            source,
            records,
            load_warning,
        }
    }

    pub fn load_warning(&self) -> Option<&LoadWarning> {
        self.load_warning.as_ref()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, customer_id: &str) -> bool {
        self.records.contains_key(customer_id)
    }

    pub fn get(&self, customer_id: &str) -> Option<&CustomerRecord> {
        self.records.get(customer_id)
    }

    /// Every stored record, ordered by customer id.
    pub fn list_all(&self) -> Vec<&CustomerRecord> {
        self.records.values().collect()
    }

    pub fn filter_by(&self, filter: &CustomerFilter) -> Vec<&CustomerRecord> {
        self.records
            .values()
            .filter(|record| filter.matches(record))
            .collect()
    }

    /// Merges `update` into the stored record and writes the whole mapping back.
    ///
    /// The in-memory merge is kept even when the write fails.
    pub fn update(&mut self, customer_id: &str, update: &CustomerUpdate) -> Result<(), StoreError> {
        let record = self
            .records
            .get_mut(customer_id)
            .ok_or_else(|| StoreError::NotFound(CustomerId::from(customer_id)))?;
        update.apply_to(record);

        let rows: Vec<CustomerRecord> = self.records.values().cloned().collect();
        self.source.write(&rows).map_err(|err| {
            tracing::error!(customer_id, error = %err, "customer update not persisted");
            StoreError::Persist(err)
        })?;

        tracing::info!(customer_id, "customer preferences updated");
        Ok(())
    }

    /// Preferences with every default filled in. Unknown ids get the
    /// all-defaults view.
    pub fn normalized_preferences(&self, customer_id: &str) -> NormalizedPreferences {
        match self.records.get(customer_id) {
            Some(record) => NormalizedPreferences::from_record(record),
            None => NormalizedPreferences::defaults_for(CustomerId::from(customer_id)),
        }
    }
}
