use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::customers::{CustomerId, PreferenceOrigin};
use crate::generators::{ArtifactPayload, GeneratedArtifact};
use crate::policy::Subsystem;

use super::super::ProtectionProfile;

#[derive(Debug, Clone, Serialize)]
pub struct SubsystemSummary {
    pub subsystem: Subsystem,
    pub subsystem_label: &'static str,
    pub status_label: &'static str,
    pub intensity_label: Option<&'static str>,
    pub records: usize,
    pub headline: String,
}

impl SubsystemSummary {
    pub fn is_active(&self) -> bool {
        self.status_label == "active"
    }
}

/// Counts view of a profile, used for console output and JSON summaries.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub privacy_level: &'static str,
    pub service_tier: &'static str,
    pub origin: PreferenceOrigin,
    pub generated_at: DateTime<Utc>,
    pub subsystems: Vec<SubsystemSummary>,
    pub active_subsystems: usize,
    pub total_records: usize,
}

impl ProfileSummary {
    pub fn from_profile(profile: &ProtectionProfile) -> Self {
        let subsystems: Vec<SubsystemSummary> = Subsystem::ordered()
            .into_iter()
            .filter_map(|subsystem| profile.artifacts.get(&subsystem))
            .map(summarize)
            .collect();

        let active_subsystems = subsystems.iter().filter(|entry| entry.is_active()).count();
        let total_records = subsystems.iter().map(|entry| entry.records).sum();

        Self {
            customer_id: profile.customer_id.clone(),
            customer_name: profile.customer_name.clone(),
            privacy_level: profile.preferences.privacy_tier.label(),
            service_tier: profile.preferences.service_tier.label(),
            origin: profile.preferences.origin,
            generated_at: profile.generated_at,
            subsystems,
            active_subsystems,
            total_records,
        }
    }

    pub fn entry(&self, subsystem: Subsystem) -> Option<&SubsystemSummary> {
        self.subsystems
            .iter()
            .find(|entry| entry.subsystem == subsystem)
    }
}

fn summarize(artifact: &GeneratedArtifact) -> SubsystemSummary {
    let intensity_label = artifact.intensity.map(|intensity| intensity.label());
    SubsystemSummary {
        subsystem: artifact.subsystem,
        subsystem_label: artifact.subsystem.label(),
        status_label: artifact.status_label(),
        intensity_label,
        records: artifact.record_count(),
        headline: headline(artifact, intensity_label.unwrap_or("unknown")),
    }
}

/// One-line description of what a subsystem produced.
fn headline(artifact: &GeneratedArtifact, intensity: &str) -> String {
    match &artifact.payload {
        ArtifactPayload::Disabled | ArtifactPayload::NotApplicable { .. } => {
            artifact.status_label().to_string()
        }
        ArtifactPayload::DeviceSignatures(set) => format!(
            "{} signatures, {} data streams, {} noise signatures",
            set.signatures.len(),
            set.streams.len(),
            set.noise.len()
        ),
        ArtifactPayload::Location(decoys) => format!(
            "{:.1}km radius, {} trail points, {} WiFi + {} cellular",
            decoys.obfuscation_radius_km,
            decoys.trail.len(),
            decoys.wifi.len(),
            decoys.cell_towers.len()
        ),
        ArtifactPayload::Identity(batch) => format!(
            "{} false identities, {intensity} complexity",
            batch.identities.len()
        ),
        ArtifactPayload::Communication(shield) => format!(
            "{} encryption, {}, {} decoys",
            shield.encryption.level,
            if shield.steganography.is_some() {
                "stego"
            } else {
                "no-stego"
            },
            shield.decoys.len()
        ),
        ArtifactPayload::Biometric(plan) => format!(
            "{intensity} intensity, {} modalities, {} active countermeasures",
            plan.modalities.len(),
            plan.modalities
                .iter()
                .map(|modality| modality.techniques.len())
                .sum::<usize>()
        ),
    }
}
