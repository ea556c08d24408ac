//! Maps normalized customer preferences onto per-subsystem generation policy.

pub mod domain;
pub(crate) mod tables;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::customers::{DeviceCategory, NormalizedPreferences, PrivacyTier, ServiceTier};

pub use domain::{Intensity, NameStyle, PolicyFlag, Subsystem};

/// Everything a generator needs to know about an enabled subsystem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivePolicy {
    pub subsystem: Subsystem,
    pub intensity: Intensity,
    /// Set when the service tier lifted the intensity or, for identity, the
    /// name style above what the privacy tier gives on its own.
    pub escalated: bool,
    /// Identity only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_style: Option<NameStyle>,
    pub applicability: BTreeSet<&'static str>,
    pub flags: BTreeSet<PolicyFlag>,
    pub privacy_tier: PrivacyTier,
    pub service_tier: ServiceTier,
    pub device_categories: Vec<DeviceCategory>,
    pub preferred_cities: Vec<String>,
    pub identity_count: u32,
}

impl ActivePolicy {
    pub fn has_flag(&self, flag: PolicyFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn applies_to(&self, category: &str) -> bool {
        self.applicability.contains(category)
    }

    /// Copy of this policy restricted to one applicability item, or `None`
    /// when the item is not applicable.
    pub fn narrowed_to(&self, category: &str) -> Option<Self> {
        let item = self.applicability.get(category)?;
        Some(Self {
            applicability: BTreeSet::from([*item]),
            ..self.clone()
        })
    }
}

/// Resolved policy for one (customer, subsystem) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PolicyParameters {
    Disabled { subsystem: Subsystem },
    Enabled(ActivePolicy),
}

impl PolicyParameters {
    pub fn subsystem(&self) -> Subsystem {
        match self {
            Self::Disabled { subsystem } => *subsystem,
            Self::Enabled(policy) => policy.subsystem,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }

    pub fn active(&self) -> Option<&ActivePolicy> {
        match self {
            Self::Enabled(policy) => Some(policy),
            Self::Disabled { .. } => None,
        }
    }

    pub fn intensity(&self) -> Option<Intensity> {
        self.active().map(|policy| policy.intensity)
    }

    pub fn applicability(&self) -> Option<&BTreeSet<&'static str>> {
        self.active().map(|policy| &policy.applicability)
    }
}

/// Stateless table lookup from preferences to policy. Holds no I/O and no
/// randomness, so the same preferences always resolve to the same policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyResolver;

impl PolicyResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, prefs: &NormalizedPreferences, subsystem: Subsystem) -> PolicyParameters {
        if let Some(toggle) = tables::toggle_for(subsystem) {
            if !prefs.toggle(toggle) {
                return PolicyParameters::Disabled { subsystem };
            }
        }

        let base = tables::intensity_for(prefs.privacy_tier);
        let intensity_raised =
            tables::escalates(subsystem, prefs.service_tier) && base < Intensity::Comprehensive;
        let intensity = if intensity_raised {
            Intensity::Comprehensive
        } else {
            base
        };

        let name_style = (subsystem == Subsystem::Identity)
            .then(|| tables::name_style_for(prefs.privacy_tier, prefs.service_tier));
        let style_raised = name_style.is_some_and(|style| {
            style > tables::name_style_for(prefs.privacy_tier, ServiceTier::Basic)
        });

        PolicyParameters::Enabled(ActivePolicy {
            subsystem,
            intensity,
            escalated: intensity_raised || style_raised,
            name_style,
            applicability: applicability_for(subsystem, &prefs.device_categories),
            flags: tables::flags_for(subsystem, prefs.privacy_tier, prefs.service_tier).collect(),
            privacy_tier: prefs.privacy_tier,
            service_tier: prefs.service_tier,
            device_categories: prefs.device_categories.clone(),
            preferred_cities: prefs.preferred_cities.clone(),
            identity_count: prefs.identity_count,
        })
    }

    pub fn resolve_all(&self, prefs: &NormalizedPreferences) -> BTreeMap<Subsystem, PolicyParameters> {
        Subsystem::ordered()
            .into_iter()
            .map(|subsystem| (subsystem, self.resolve(prefs, subsystem)))
            .collect()
    }
}

/// Union of the per-device table rows for `subsystem`. Unknown devices add nothing.
pub fn applicability_for(
    subsystem: Subsystem,
    devices: &[DeviceCategory],
) -> BTreeSet<&'static str> {
    devices
        .iter()
        .flat_map(|device| tables::categories_for(subsystem, device).iter().copied())
        .collect()
}

/// Whether a generator for `subsystem` needs a non-empty applicability set.
pub fn requires_applicability(subsystem: Subsystem) -> bool {
    tables::requires_applicability(subsystem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customers::CustomerId;
    use rstest::rstest;

    fn prefs(privacy: PrivacyTier, service: ServiceTier, devices: &[&str]) -> NormalizedPreferences {
        let mut prefs = NormalizedPreferences::defaults_for(CustomerId::from("CUST_T"));
        prefs.privacy_tier = privacy;
        prefs.service_tier = service;
        prefs.device_categories = devices.iter().map(|d| DeviceCategory::parse(d)).collect();
        prefs
    }

    #[rstest]
    #[case(PrivacyTier::Low, Intensity::Minimal)]
    #[case(PrivacyTier::Medium, Intensity::Standard)]
    #[case(PrivacyTier::High, Intensity::Aggressive)]
    #[case(PrivacyTier::Maximum, Intensity::Comprehensive)]
    fn privacy_tier_maps_to_intensity(#[case] tier: PrivacyTier, #[case] expected: Intensity) {
        let resolver = PolicyResolver::new();
        let params = resolver.resolve(
            &prefs(tier, ServiceTier::Standard, &["smartphone"]),
            Subsystem::Location,
        );
        assert_eq!(params.intensity(), Some(expected));
    }

    #[test]
    fn intensity_is_monotonic_in_privacy_tier() {
        let resolver = PolicyResolver::new();
        for subsystem in Subsystem::ordered() {
            for service in ServiceTier::ordered() {
                let levels: Vec<Intensity> = PrivacyTier::ordered()
                    .into_iter()
                    .filter_map(|tier| {
                        resolver
                            .resolve(&prefs(tier, service, &["smartphone"]), subsystem)
                            .intensity()
                    })
                    .collect();
                assert!(
                    levels.windows(2).all(|pair| pair[0] <= pair[1]),
                    "{subsystem:?}/{service:?} not monotonic: {levels:?}"
                );
            }
        }
    }

    #[rstest]
    #[case(Subsystem::Communication, PrivacyTier::Low, ServiceTier::Enterprise, Intensity::Comprehensive)]
    #[case(Subsystem::Communication, PrivacyTier::Maximum, ServiceTier::Basic, Intensity::Comprehensive)]
    #[case(Subsystem::Communication, PrivacyTier::High, ServiceTier::Premium, Intensity::Aggressive)]
    #[case(Subsystem::Identity, PrivacyTier::Low, ServiceTier::Enterprise, Intensity::Minimal)]
    #[case(Subsystem::Identity, PrivacyTier::Maximum, ServiceTier::Basic, Intensity::Comprehensive)]
    #[case(Subsystem::Identity, PrivacyTier::Medium, ServiceTier::Premium, Intensity::Standard)]
    #[case(Subsystem::Biometric, PrivacyTier::Low, ServiceTier::Enterprise, Intensity::Minimal)]
    #[case(Subsystem::Location, PrivacyTier::Medium, ServiceTier::Enterprise, Intensity::Standard)]
    fn escalation_is_subsystem_specific(
        #[case] subsystem: Subsystem,
        #[case] privacy: PrivacyTier,
        #[case] service: ServiceTier,
        #[case] expected: Intensity,
    ) {
        let params = PolicyResolver::new().resolve(&prefs(privacy, service, &["laptop"]), subsystem);
        assert_eq!(params.intensity(), Some(expected));
    }

    #[test]
    fn escalated_marker_only_set_when_intensity_was_raised() {
        let resolver = PolicyResolver::new();
        let raised = resolver.resolve(
            &prefs(PrivacyTier::Low, ServiceTier::Enterprise, &["laptop"]),
            Subsystem::Communication,
        );
        let already_max = resolver.resolve(
            &prefs(PrivacyTier::Maximum, ServiceTier::Enterprise, &["laptop"]),
            Subsystem::Communication,
        );
        assert!(raised.active().map(|p| p.escalated).unwrap_or(false));
        assert!(!already_max.active().map(|p| p.escalated).unwrap_or(true));
    }

    #[rstest]
    #[case(PrivacyTier::Low, ServiceTier::Basic, NameStyle::Common, false)]
    #[case(PrivacyTier::Medium, ServiceTier::Standard, NameStyle::Common, false)]
    #[case(PrivacyTier::Low, ServiceTier::Premium, NameStyle::Modern, true)]
    #[case(PrivacyTier::High, ServiceTier::Basic, NameStyle::Modern, false)]
    #[case(PrivacyTier::High, ServiceTier::Premium, NameStyle::Modern, false)]
    #[case(PrivacyTier::Low, ServiceTier::Enterprise, NameStyle::International, true)]
    #[case(PrivacyTier::High, ServiceTier::Enterprise, NameStyle::International, true)]
    #[case(PrivacyTier::Maximum, ServiceTier::Basic, NameStyle::International, false)]
    #[case(PrivacyTier::Maximum, ServiceTier::Enterprise, NameStyle::International, false)]
    fn identity_name_style_follows_either_tier(
        #[case] privacy: PrivacyTier,
        #[case] service: ServiceTier,
        #[case] style: NameStyle,
        #[case] escalated: bool,
    ) {
        let params = PolicyResolver::new().resolve(&prefs(privacy, service, &[]), Subsystem::Identity);
        let active = params.active().expect("identity is always enabled");
        assert_eq!(active.name_style, Some(style));
        assert_eq!(active.escalated, escalated);
        assert_eq!(active.intensity, tables::intensity_for(privacy));
    }

    #[test]
    fn name_style_is_only_resolved_for_identity() {
        let params = PolicyResolver::new().resolve(
            &prefs(PrivacyTier::Maximum, ServiceTier::Enterprise, &["smartphone"]),
            Subsystem::Communication,
        );
        assert_eq!(params.active().and_then(|p| p.name_style), None);
    }

    #[test]
    fn applicability_is_order_independent_and_deduplicated() {
        let forward = applicability_for(
            Subsystem::Biometric,
            &[DeviceCategory::Smartphone, DeviceCategory::Laptop],
        );
        let reverse = applicability_for(
            Subsystem::Biometric,
            &[DeviceCategory::Laptop, DeviceCategory::Smartphone, DeviceCategory::Laptop],
        );
        assert_eq!(forward, reverse);
        assert_eq!(
            forward,
            BTreeSet::from([
                "facial_recognition",
                "fingerprint",
                "keystroke_dynamics",
                "voice_print"
            ])
        );
    }

    #[rstest]
    #[case("smartphone", &["cell_towers", "gps_trace", "wifi_scan"])]
    #[case("tablet", &["gps_trace", "wifi_scan"])]
    #[case("laptop", &["wifi_scan"])]
    #[case("smartwatch", &["gps_trace"])]
    #[case("toaster", &[])]
    fn location_channels_per_device(#[case] device: &str, #[case] expected: &[&str]) {
        let set = applicability_for(Subsystem::Location, &[DeviceCategory::parse(device)]);
        assert_eq!(set.into_iter().collect::<Vec<_>>(), expected.to_vec());
    }

    #[test]
    fn disabled_toggle_short_circuits() {
        let mut customer = prefs(PrivacyTier::Maximum, ServiceTier::Enterprise, &["smartphone"]);
        customer.location_obfuscation = false;
        let params = PolicyResolver::new().resolve(&customer, Subsystem::Location);
        assert_eq!(
            params,
            PolicyParameters::Disabled {
                subsystem: Subsystem::Location
            }
        );
        assert!(params.applicability().is_none());
    }

    #[test]
    fn untoggled_subsystems_are_always_enabled() {
        let mut customer = prefs(PrivacyTier::Low, ServiceTier::Basic, &["smartphone"]);
        customer.location_obfuscation = false;
        customer.communication_encryption = false;
        customer.biometric_protection = false;

        let all = PolicyResolver::new().resolve_all(&customer);
        assert!(all[&Subsystem::DeviceSignatures].is_enabled());
        assert!(all[&Subsystem::Identity].is_enabled());
        assert_eq!(all.values().filter(|p| p.is_enabled()).count(), 2);
    }

    #[test]
    fn feature_flags_follow_tier_thresholds() {
        let resolver = PolicyResolver::new();
        let customer = prefs(PrivacyTier::Maximum, ServiceTier::Premium, &["smartphone"]);

        let biometric = resolver.resolve(&customer, Subsystem::Biometric);
        let active = biometric.active().expect("biometric enabled");
        assert!(active.has_flag(PolicyFlag::ContinuousProtection));
        assert!(active.has_flag(PolicyFlag::AdaptiveCountermeasures));
        assert!(active.has_flag(PolicyFlag::MultiModalProtection));

        let comms = resolver.resolve(&customer, Subsystem::Communication);
        let active = comms.active().expect("communication enabled");
        assert!(active.has_flag(PolicyFlag::Steganography));
        assert!(!active.has_flag(PolicyFlag::MultiLayerEncryption));

        let basic = prefs(PrivacyTier::Medium, ServiceTier::Basic, &["smartphone"]);
        let identity = resolver.resolve(&basic, Subsystem::Identity);
        assert!(identity.active().map(|p| p.flags.is_empty()).unwrap_or(false));
    }

    #[test]
    fn narrowing_keeps_only_the_requested_item() {
        let params = PolicyResolver::new().resolve(
            &prefs(PrivacyTier::High, ServiceTier::Standard, &["smartphone"]),
            Subsystem::Biometric,
        );
        let active = params.active().expect("enabled");
        let narrowed = active.narrowed_to("fingerprint").expect("fingerprint applies");
        assert_eq!(narrowed.applicability, BTreeSet::from(["fingerprint"]));
        assert!(active.narrowed_to("gait_analysis").is_none());
    }
}
