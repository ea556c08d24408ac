use chrono::{TimeZone, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rstest::rstest;

use super::*;
use crate::customers::{CustomerId, PrivacyTier, ServiceTier};
use crate::policy::{NameStyle, PolicyResolver};
use crate::test_support::{preferences, CountingRng};

fn request<'a>(customer_id: &'a CustomerId, policy: &'a PolicyParameters) -> GenerationRequest<'a> {
    GenerationRequest {
        customer_id,
        policy,
        generated_at: Utc
            .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp"),
    }
}

fn policy_for(subsystem: Subsystem, privacy: PrivacyTier, devices: &[&str]) -> PolicyParameters {
    PolicyResolver::new().resolve(
        &preferences(privacy, ServiceTier::Standard, devices),
        subsystem,
    )
}

#[rstest]
#[case(Subsystem::DeviceSignatures)]
#[case(Subsystem::Location)]
#[case(Subsystem::Identity)]
#[case(Subsystem::Communication)]
#[case(Subsystem::Biometric)]
fn disabled_policy_yields_sentinel_without_sampling(#[case] subsystem: Subsystem) {
    let generators = GeneratorSet::standard();
    let generator = generators.get(subsystem).expect("generator registered");
    let customer = CustomerId::from("CUST_OFF");
    let policy = PolicyParameters::Disabled { subsystem };
    let mut rng = CountingRng::new(1);

    let artifact = generator.generate(&request(&customer, &policy), &mut rng);

    assert!(artifact.is_disabled());
    assert_eq!(artifact.intensity, None);
    assert_eq!(artifact.subsystem, subsystem);
    assert_eq!(rng.calls, 0);
}

#[rstest]
#[case(Subsystem::DeviceSignatures)]
#[case(Subsystem::Location)]
#[case(Subsystem::Communication)]
#[case(Subsystem::Biometric)]
fn empty_applicability_yields_not_applicable(#[case] subsystem: Subsystem) {
    let generators = GeneratorSet::standard();
    let generator = generators.get(subsystem).expect("generator registered");
    let customer = CustomerId::from("CUST_TOASTER");
    let policy = policy_for(subsystem, PrivacyTier::High, &["toaster"]);
    let mut rng = CountingRng::new(2);

    let artifact = generator.generate(&request(&customer, &policy), &mut rng);

    assert!(artifact.is_not_applicable());
    assert_eq!(artifact.intensity, Some(Intensity::Aggressive));
    assert_eq!(rng.calls, 0);
}

#[test]
fn identity_does_not_depend_on_devices() {
    let customer = CustomerId::from("CUST_TOASTER");
    let policy = policy_for(Subsystem::Identity, PrivacyTier::Low, &["toaster"]);
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    let artifact = IdentityGenerator.generate(&request(&customer, &policy), &mut rng);

    match artifact.payload {
        ArtifactPayload::Identity(batch) => assert_eq!(batch.identities.len(), 3),
        other => panic!("expected identities, got {other:?}"),
    }
}

#[test]
fn generate_for_unlisted_category_is_not_applicable() {
    let customer = CustomerId::from("CUST_PHONE");
    let policy = policy_for(Subsystem::Biometric, PrivacyTier::Maximum, &["smartphone"]);
    let mut rng = CountingRng::new(3);

    let artifact = BiometricGenerator.generate_for(&request(&customer, &policy), "gait_analysis", &mut rng);

    assert_eq!(
        artifact.payload,
        ArtifactPayload::NotApplicable {
            requested: Some("gait_analysis".to_string())
        }
    );
    assert_eq!(rng.calls, 0);
}

#[test]
fn generate_for_restricts_output_to_the_category() {
    let customer = CustomerId::from("CUST_PHONE");
    let policy = policy_for(Subsystem::Biometric, PrivacyTier::Medium, &["smartphone"]);
    let mut rng = ChaCha8Rng::seed_from_u64(4);

    let artifact = BiometricGenerator.generate_for(&request(&customer, &policy), "fingerprint", &mut rng);

    match artifact.payload {
        ArtifactPayload::Biometric(plan) => {
            let modalities: Vec<&str> = plan.modalities.iter().map(|m| m.modality).collect();
            assert_eq!(modalities, vec!["fingerprint"]);
        }
        other => panic!("expected biometric plan, got {other:?}"),
    }
}

#[test]
fn artifacts_are_stamped_with_customer_and_intensity() {
    let customer = CustomerId::from("CUST_STAMP");
    let generators = GeneratorSet::standard();
    let mut rng = ChaCha8Rng::seed_from_u64(6);

    for generator in generators.iter() {
        let policy = policy_for(generator.subsystem(), PrivacyTier::High, &["smartphone", "laptop"]);
        let artifact = generator.generate(&request(&customer, &policy), &mut rng);
        assert_eq!(artifact.customer_id, customer);
        assert_eq!(artifact.intensity, Some(Intensity::Aggressive));
        assert_eq!(artifact.status_label(), "active");
        assert!(artifact.record_count() > 0, "{:?}", generator.subsystem());
    }
}

#[rstest]
#[case(Subsystem::DeviceSignatures)]
#[case(Subsystem::Location)]
#[case(Subsystem::Communication)]
#[case(Subsystem::Biometric)]
fn output_volume_grows_with_intensity(#[case] subsystem: Subsystem) {
    let generators = GeneratorSet::standard();
    let generator = generators.get(subsystem).expect("generator registered");
    let customer = CustomerId::from("CUST_VOLUME");

    let counts: Vec<usize> = PrivacyTier::ordered()
        .into_iter()
        .map(|tier| {
            let policy = policy_for(subsystem, tier, &["smartphone", "laptop", "smartwatch"]);
            let mut rng = ChaCha8Rng::seed_from_u64(7);
            generator.generate(&request(&customer, &policy), &mut rng).record_count()
        })
        .collect();

    assert!(
        counts.windows(2).all(|pair| pair[0] < pair[1]),
        "{subsystem:?} volume not strictly increasing: {counts:?}"
    );
}

#[test]
fn identity_detail_grows_with_intensity() {
    let customer = CustomerId::from("CUST_DETAIL");
    let depths: Vec<usize> = PrivacyTier::ordered()
        .into_iter()
        .map(|tier| {
            let policy = policy_for(Subsystem::Identity, tier, &["smartphone"]);
            let mut rng = ChaCha8Rng::seed_from_u64(8);
            match IdentityGenerator.generate(&request(&customer, &policy), &mut rng).payload {
                ArtifactPayload::Identity(batch) => {
                    let first = &batch.identities[0];
                    usize::from(first.contact.is_some())
                        + usize::from(first.background.is_some())
                        + usize::from(first.extended.is_some())
                }
                other => panic!("expected identities, got {other:?}"),
            }
        })
        .collect();

    assert_eq!(depths, vec![0, 1, 2, 3]);
}

fn identity_batch(privacy: PrivacyTier, service: ServiceTier) -> IdentityBatch {
    let customer = CustomerId::from("CUST_STYLE");
    let policy = PolicyResolver::new().resolve(
        &preferences(privacy, service, &["smartphone"]),
        Subsystem::Identity,
    );
    match IdentityGenerator
        .generate(&request(&customer, &policy), &mut ChaCha8Rng::seed_from_u64(11))
        .payload
    {
        ArtifactPayload::Identity(batch) => batch,
        other => panic!("expected identities, got {other:?}"),
    }
}

#[rstest]
#[case(PrivacyTier::Low, ServiceTier::Basic, NameStyle::Common)]
#[case(PrivacyTier::Low, ServiceTier::Premium, NameStyle::Modern)]
#[case(PrivacyTier::High, ServiceTier::Standard, NameStyle::Modern)]
#[case(PrivacyTier::Low, ServiceTier::Enterprise, NameStyle::International)]
#[case(PrivacyTier::Maximum, ServiceTier::Basic, NameStyle::International)]
fn identity_name_style_follows_either_tier(
    #[case] privacy: PrivacyTier,
    #[case] service: ServiceTier,
    #[case] expected: NameStyle,
) {
    assert_eq!(identity_batch(privacy, service).name_style, expected);
}

#[test]
fn enterprise_changes_names_but_not_identity_detail() {
    let basic = identity_batch(PrivacyTier::Low, ServiceTier::Basic);
    let enterprise = identity_batch(PrivacyTier::Low, ServiceTier::Enterprise);

    assert_eq!(enterprise.name_style, NameStyle::International);
    assert_eq!(enterprise.identities.len(), basic.identities.len());
    for identity in &enterprise.identities {
        assert!(identity.contact.is_none());
        assert!(identity.background.is_none());
        assert!(identity.extended.is_none());
    }
}

#[test]
fn same_seed_reproduces_the_artifact() {
    let customer = CustomerId::from("CUST_SEED");
    let policy = policy_for(Subsystem::Communication, PrivacyTier::Maximum, &["smartphone"]);

    let first = CommunicationGenerator.generate(
        &request(&customer, &policy),
        &mut ChaCha8Rng::seed_from_u64(42),
    );
    let second = CommunicationGenerator.generate(
        &request(&customer, &policy),
        &mut ChaCha8Rng::seed_from_u64(42),
    );

    assert_eq!(first, second);
}

#[test]
fn location_channels_follow_applicability() {
    let customer = CustomerId::from("CUST_LAPTOP");
    let policy = policy_for(Subsystem::Location, PrivacyTier::Medium, &["laptop"]);
    let mut rng = ChaCha8Rng::seed_from_u64(9);

    match LocationGenerator.generate(&request(&customer, &policy), &mut rng).payload {
        ArtifactPayload::Location(decoys) => {
            assert!(decoys.gps_fix.is_none());
            assert!(decoys.trail.is_empty());
            assert!(decoys.cell_towers.is_empty());
            assert_eq!(decoys.wifi.len(), 10);
            assert_eq!(decoys.cities, vec!["New York", "Los Angeles"]);
        }
        other => panic!("expected location decoys, got {other:?}"),
    }
}

#[test]
fn unknown_city_falls_back_to_a_known_one() {
    let customer = CustomerId::from("CUST_ATLANTIS");
    let mut prefs = preferences(PrivacyTier::Low, ServiceTier::Basic, &["smartphone"]);
    prefs.preferred_cities = vec!["Atlantis".to_string()];
    let policy = PolicyResolver::new().resolve(&prefs, Subsystem::Location);
    let mut rng = ChaCha8Rng::seed_from_u64(10);

    match LocationGenerator.generate(&request(&customer, &policy), &mut rng).payload {
        ArtifactPayload::Location(decoys) => {
            assert_eq!(decoys.cities.len(), 1);
            assert_ne!(decoys.cities[0], "Atlantis");
            assert_eq!(decoys.trail.len(), 12);
        }
        other => panic!("expected location decoys, got {other:?}"),
    }
}
