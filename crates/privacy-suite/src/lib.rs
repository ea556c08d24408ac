//! Preference-driven privacy decoy generation.
//!
//! Customer preferences are read into a [`customers::PreferenceStore`],
//! mapped onto per-subsystem policy by [`policy::PolicyResolver`] and fanned
//! out to the [`generators`] by a [`composer::ProfileComposer`].

pub mod composer;
pub mod config;
pub mod customers;
pub mod error;
pub mod generators;
pub mod policy;
pub mod telemetry;

#[cfg(test)]
mod test_support;
