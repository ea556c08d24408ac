//! Randomized decoy generators, one per subsystem.
//!
//! Every generator shares the same gatekeeping: a disabled policy or an
//! empty/unmatched applicability set returns a sentinel artifact before the
//! RNG is touched. Only enabled, applicable requests reach `fabricate`.

pub mod biometric;
pub mod communication;
pub mod device_signatures;
pub mod identity;
pub mod location;
mod sampling;

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::Serialize;

use crate::customers::CustomerId;
use crate::policy::{self, ActivePolicy, Intensity, PolicyParameters, Subsystem};

pub use biometric::{BiometricGenerator, BiometricPlan};
pub use communication::{CommunicationGenerator, CommunicationShield};
pub use device_signatures::{DeviceSignatureGenerator, DeviceSignatureSet};
pub use identity::{IdentityBatch, IdentityGenerator};
pub use location::{LocationDecoys, LocationGenerator};

/// Input for one generator call.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub customer_id: &'a CustomerId,
    pub policy: &'a PolicyParameters,
    pub generated_at: DateTime<Utc>,
}

/// One generator's output for one customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedArtifact {
    pub customer_id: CustomerId,
    pub subsystem: Subsystem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<Intensity>,
    pub generated_at: DateTime<Utc>,
    pub payload: ArtifactPayload,
}

impl GeneratedArtifact {
    pub fn is_disabled(&self) -> bool {
        matches!(self.payload, ArtifactPayload::Disabled)
    }

    pub fn is_not_applicable(&self) -> bool {
        matches!(self.payload, ArtifactPayload::NotApplicable { .. })
    }

    /// Short status used by summaries and reports.
    pub fn status_label(&self) -> &'static str {
        match self.payload {
            ArtifactPayload::Disabled => "disabled per customer preference",
            ArtifactPayload::NotApplicable { .. } => "not applicable to customer devices",
            _ => "active",
        }
    }

    /// Number of generated records carried by the payload.
    pub fn record_count(&self) -> usize {
        match &self.payload {
            ArtifactPayload::Disabled | ArtifactPayload::NotApplicable { .. } => 0,
            ArtifactPayload::DeviceSignatures(set) => set.record_count(),
            ArtifactPayload::Location(decoys) => decoys.record_count(),
            ArtifactPayload::Identity(batch) => batch.record_count(),
            ArtifactPayload::Communication(shield) => shield.record_count(),
            ArtifactPayload::Biometric(plan) => plan.record_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ArtifactPayload {
    Disabled,
    NotApplicable {
        #[serde(skip_serializing_if = "Option::is_none")]
        requested: Option<String>,
    },
    DeviceSignatures(DeviceSignatureSet),
    Location(LocationDecoys),
    Identity(IdentityBatch),
    Communication(CommunicationShield),
    Biometric(BiometricPlan),
}

/// A subsystem generator. Implementors only provide `fabricate`; the provided
/// methods handle the disabled and not-applicable cases.
pub trait Generator: Send + Sync {
    fn subsystem(&self) -> Subsystem;

    /// Produces the payload for an enabled, applicable policy.
    fn fabricate(
        &self,
        customer_id: &CustomerId,
        policy: &ActivePolicy,
        generated_at: DateTime<Utc>,
        rng: &mut dyn RngCore,
    ) -> ArtifactPayload;

    fn generate(&self, request: &GenerationRequest<'_>, rng: &mut dyn RngCore) -> GeneratedArtifact {
        let active = match request.policy {
            PolicyParameters::Disabled { .. } => {
                return sentinel(request, None, ArtifactPayload::Disabled);
            }
            PolicyParameters::Enabled(active) => active,
        };

        if active.subsystem != self.subsystem() {
            tracing::warn!(
                expected = self.subsystem().key(),
                received = active.subsystem.key(),
                "policy routed to the wrong generator"
            );
            return sentinel(
                request,
                Some(active.intensity),
                ArtifactPayload::NotApplicable { requested: None },
            );
        }

        if policy::requires_applicability(self.subsystem()) && active.applicability.is_empty() {
            return sentinel(
                request,
                Some(active.intensity),
                ArtifactPayload::NotApplicable { requested: None },
            );
        }

        let payload = self.fabricate(request.customer_id, active, request.generated_at, rng);
        tracing::debug!(
            customer_id = %request.customer_id,
            subsystem = self.subsystem().key(),
            intensity = active.intensity.label(),
            "generated artifact"
        );
        sentinel(request, Some(active.intensity), payload)
    }

    /// Like `generate`, restricted to one applicability item.
    fn generate_for(
        &self,
        request: &GenerationRequest<'_>,
        category: &str,
        rng: &mut dyn RngCore,
    ) -> GeneratedArtifact {
        let active = match request.policy {
            PolicyParameters::Disabled { .. } => {
                return sentinel(request, None, ArtifactPayload::Disabled);
            }
            PolicyParameters::Enabled(active) => active,
        };

        match active.narrowed_to(category) {
            Some(narrowed) => {
                let policy = PolicyParameters::Enabled(narrowed);
                let narrowed_request = GenerationRequest {
                    policy: &policy,
                    ..*request
                };
                self.generate(&narrowed_request, rng)
            }
            None => sentinel(
                request,
                Some(active.intensity),
                ArtifactPayload::NotApplicable {
                    requested: Some(category.to_string()),
                },
            ),
        }
    }
}

fn sentinel(
    request: &GenerationRequest<'_>,
    intensity: Option<Intensity>,
    payload: ArtifactPayload,
) -> GeneratedArtifact {
    GeneratedArtifact {
        customer_id: request.customer_id.clone(),
        subsystem: request.policy.subsystem(),
        intensity,
        generated_at: request.generated_at,
        payload,
    }
}

/// The full set of subsystem generators in report order.
pub struct GeneratorSet {
    generators: Vec<Box<dyn Generator>>,
}

impl GeneratorSet {
    pub fn standard() -> Self {
        Self {
            generators: vec![
                Box::new(DeviceSignatureGenerator),
                Box::new(LocationGenerator),
                Box::new(IdentityGenerator),
                Box::new(CommunicationGenerator),
                Box::new(BiometricGenerator),
            ],
        }
    }

    pub fn get(&self, subsystem: Subsystem) -> Option<&dyn Generator> {
        self.generators
            .iter()
            .find(|generator| generator.subsystem() == subsystem)
            .map(|generator| generator.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Generator> {
        self.generators.iter().map(|generator| generator.as_ref())
    }
}

impl Default for GeneratorSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for GeneratorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.generators.iter().map(|g| g.subsystem().key()))
            .finish()
    }
}

#[cfg(test)]
mod tests;
