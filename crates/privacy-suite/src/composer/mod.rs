//! Per-customer protection profiles.
//!
//! The composer normalizes a customer's preferences once, resolves one policy
//! per subsystem and fans out to every generator. Sentinel artifacts are kept
//! so every profile carries exactly one entry per subsystem.

pub mod report;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::config::GenerationConfig;
use crate::customers::{CustomerId, CustomerSource, NormalizedPreferences, PreferenceStore};
use crate::generators::{GeneratedArtifact, GenerationRequest, GeneratorSet};
use crate::policy::{PolicyResolver, Subsystem};

pub use report::{render_markdown, ProfileSummary, SubsystemSummary};

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("customer {0} not found")]
    NotFound(CustomerId),
    #[error("failed to write report to {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Every artifact generated for one customer at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtectionProfile {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub generated_at: DateTime<Utc>,
    pub preferences: NormalizedPreferences,
    pub artifacts: BTreeMap<Subsystem, GeneratedArtifact>,
}

impl ProtectionProfile {
    pub fn artifact(&self, subsystem: Subsystem) -> Option<&GeneratedArtifact> {
        self.artifacts.get(&subsystem)
    }

    /// Subsystems that produced data rather than a sentinel.
    pub fn active_subsystems(&self) -> impl Iterator<Item = Subsystem> + '_ {
        self.artifacts
            .values()
            .filter(|artifact| !artifact.is_disabled() && !artifact.is_not_applicable())
            .map(|artifact| artifact.subsystem)
    }

    /// File name used by [`ProfileComposer::save_report`].
    pub fn report_file_name(&self) -> String {
        format!(
            "privacy_report_{}_{}.md",
            self.customer_id,
            self.generated_at.format("%Y%m%d_%H%M%S")
        )
    }
}

/// Builds profiles from a borrowed store.
pub struct ProfileComposer<'a, S, R> {
    store: &'a PreferenceStore<S>,
    resolver: PolicyResolver,
    generators: GeneratorSet,
    rng: R,
}

impl<'a, S> ProfileComposer<'a, S, ChaCha8Rng>
where
    S: CustomerSource,
{
    /// Reproducible composer: the same seed and timestamp give the same profile.
    pub fn seeded(store: &'a PreferenceStore<S>, seed: u64) -> Self {
        Self::with_rng(store, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Uses the configured seed, or a fresh one from the thread RNG.
    pub fn from_config(store: &'a PreferenceStore<S>, config: &GenerationConfig) -> Self {
        let seed = config.seed.unwrap_or_else(|| rand::rng().random::<u64>());
        tracing::debug!(seed, pinned = config.seed.is_some(), "seeding profile composer");
        Self::seeded(store, seed)
    }
}

impl<'a, S, R> ProfileComposer<'a, S, R>
where
    S: CustomerSource,
    R: RngCore,
{
    pub fn with_rng(store: &'a PreferenceStore<S>, rng: R) -> Self {
        Self {
            store,
            resolver: PolicyResolver::new(),
            generators: GeneratorSet::standard(),
            rng,
        }
    }

    pub fn store(&self) -> &'a PreferenceStore<S> {
        self.store
    }

    pub fn build_profile(&mut self, customer_id: &str) -> Result<ProtectionProfile, ProfileError> {
        self.build_profile_at(customer_id, Utc::now())
    }

    /// Builds a profile stamped with `generated_at`.
    pub fn build_profile_at(
        &mut self,
        customer_id: &str,
        generated_at: DateTime<Utc>,
    ) -> Result<ProtectionProfile, ProfileError> {
        let record = self
            .store
            .get(customer_id)
            .ok_or_else(|| ProfileError::NotFound(CustomerId::from(customer_id)))?;

        let preferences = NormalizedPreferences::from_record(record);
        let policies = self.resolver.resolve_all(&preferences);

        let mut artifacts = BTreeMap::new();
        for generator in self.generators.iter() {
            let subsystem = generator.subsystem();
            let Some(policy) = policies.get(&subsystem) else {
                continue;
            };
            let request = GenerationRequest {
                customer_id: &record.customer_id,
                policy,
                generated_at,
            };
            artifacts.insert(subsystem, generator.generate(&request, &mut self.rng));
        }

        tracing::info!(
            customer_id,
            privacy_tier = preferences.privacy_tier.label(),
            service_tier = preferences.service_tier.label(),
            "built protection profile"
        );

        Ok(ProtectionProfile {
            customer_id: record.customer_id.clone(),
            customer_name: record.name.clone(),
            generated_at,
            preferences,
            artifacts,
        })
    }

    /// Builds a fresh profile and renders it as Markdown.
    pub fn report(&mut self, customer_id: &str) -> Result<String, ProfileError> {
        let profile = self.build_profile(customer_id)?;
        Ok(render_markdown(&profile))
    }

    /// Writes a fresh Markdown report into `dir`, creating it when needed.
    pub fn save_report(&mut self, customer_id: &str, dir: &Path) -> Result<PathBuf, ProfileError> {
        let profile = self.build_profile(customer_id)?;
        let path = dir.join(profile.report_file_name());

        fs::create_dir_all(dir)
            .and_then(|()| fs::write(&path, render_markdown(&profile)))
            .map_err(|source| ProfileError::Write {
                path: path.clone(),
                source,
            })?;

        tracing::info!(customer_id, path = %path.display(), "saved privacy report");
        Ok(path)
    }
}
