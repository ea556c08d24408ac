//! Customer records, the backing sources they are read from, and the
//! preference store that normalizes them.

pub mod domain;
pub mod source;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    CustomerFilter, CustomerId, CustomerRecord, CustomerUpdate, DeviceCategory,
    NormalizedPreferences, PreferenceOrigin, PrivacyTier, ProtectionToggle, ServiceTier,
    DEFAULT_CITIES, DEFAULT_IDENTITY_COUNT, MAX_IDENTITY_COUNT,
};
pub use source::{CustomerSource, JsonFileSource, MemorySource, SourceError};
pub use store::{LoadWarning, PreferenceStore, StoreError};
