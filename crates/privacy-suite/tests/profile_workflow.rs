use chrono::{DateTime, TimeZone, Utc};
use privacy_suite::composer::{ProfileComposer, ProfileError, ProfileSummary};
use privacy_suite::customers::{CustomerRecord, MemorySource, PreferenceStore};
use privacy_suite::generators::{
    ArtifactPayload, GenerationRequest, Generator, LocationGenerator,
};
use privacy_suite::policy::{Intensity, PolicyResolver, Subsystem};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;

struct CountingRng {
    inner: ChaCha8Rng,
    calls: usize,
}

impl CountingRng {
    fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            calls: 0,
        }
    }
}

impl RngCore for CountingRng {
    fn next_u32(&mut self) -> u32 {
        self.calls += 1;
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.calls += 1;
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        self.calls += 1;
        self.inner.fill_bytes(dst)
    }
}

fn customers() -> Vec<CustomerRecord> {
    let mut c1 = CustomerRecord::new("C1", "Dana Reyes");
    c1.privacy_level = Some("maximum".to_string());
    c1.service_tier = Some("standard".to_string());
    c1.device_types = Some(vec!["smartphone".to_string()]);
    c1.location_obfuscation = Some(true);
    c1.communication_encryption = Some(true);
    c1.biometric_protection = Some(true);
    c1.identity_multiplication_count = Some(5);

    let mut c2 = CustomerRecord::new("C2", "Evan Brooks");
    c2.privacy_level = Some("high".to_string());
    c2.device_types = Some(vec!["smartphone".to_string(), "tablet".to_string()]);
    c2.location_obfuscation = Some(false);
    c2.identity_multiplication_count = Some(3);

    vec![c1, c2]
}

fn store() -> PreferenceStore<MemorySource> {
    PreferenceStore::load(MemorySource::new(customers()))
}

fn pinned() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

#[test]
fn maximum_smartphone_customer_gets_comprehensive_biometrics() {
    let store = store();
    let prefs = store.normalized_preferences("C1");
    let params = PolicyResolver::new().resolve(&prefs, Subsystem::Biometric);

    let expected: BTreeSet<&str> = ["facial_recognition", "fingerprint", "voice_print"]
        .into_iter()
        .collect();
    assert_eq!(params.applicability(), Some(&expected));
    assert_eq!(params.intensity(), Some(Intensity::Comprehensive));

    let profile = ProfileComposer::seeded(&store, 1)
        .build_profile_at("C1", pinned())
        .expect("profile for C1");
    let biometric = profile
        .artifact(Subsystem::Biometric)
        .expect("biometric artifact");
    match &biometric.payload {
        ArtifactPayload::Biometric(plan) => {
            let modalities: BTreeSet<&str> =
                plan.modalities.iter().map(|entry| entry.modality).collect();
            assert_eq!(modalities, expected);
            assert!(plan.multi_modal.is_some(), "maximum privacy coordinates modalities");
        }
        other => panic!("expected biometric plan, got {other:?}"),
    }
}

#[test]
fn disabled_location_never_samples() {
    let store = store();
    let prefs = store.normalized_preferences("C2");
    let policy = PolicyResolver::new().resolve(&prefs, Subsystem::Location);
    assert!(!policy.is_enabled());

    let customer_id = prefs.customer_id.clone();
    let request = GenerationRequest {
        customer_id: &customer_id,
        policy: &policy,
        generated_at: pinned(),
    };
    let mut rng = CountingRng::new(3);
    let artifact = LocationGenerator.generate(&request, &mut rng);

    assert_eq!(artifact.payload, ArtifactPayload::Disabled);
    assert_eq!(rng.calls, 0, "disabled location must not touch the rng");

    let profile = ProfileComposer::seeded(&store, 3)
        .build_profile_at("C2", pinned())
        .expect("profile for C2");
    let location = profile
        .artifact(Subsystem::Location)
        .expect("location entry present");
    assert!(location.is_disabled());
    assert_eq!(location.status_label(), "disabled per customer preference");
}

#[test]
fn unknown_customer_is_reported_everywhere() {
    let store = store();
    assert!(store.get("ZZZ").is_none());

    let mut composer = ProfileComposer::seeded(&store, 1);
    let err = composer.build_profile("ZZZ").expect_err("ZZZ is unknown");
    assert!(matches!(err, ProfileError::NotFound(id) if id.as_str() == "ZZZ"));
}

#[test]
fn profile_has_exactly_the_five_subsystem_keys() {
    let store = store();
    let profile = ProfileComposer::seeded(&store, 11)
        .build_profile_at("C2", pinned())
        .expect("profile for C2");

    let json = serde_json::to_value(&profile).expect("profile serializes");
    let keys: BTreeSet<&str> = json["artifacts"]
        .as_object()
        .expect("artifacts object")
        .keys()
        .map(String::as_str)
        .collect();
    let expected: BTreeSet<&str> = [
        "device_signatures",
        "location",
        "identity",
        "communication",
        "biometric",
    ]
    .into_iter()
    .collect();
    assert_eq!(keys, expected);
    assert_eq!(json["customer_id"], "C2");
    assert_eq!(json["artifacts"]["identity"]["intensity"], "aggressive");
}

#[test]
fn seeded_runs_are_reproducible() {
    let store = store();
    let first = ProfileComposer::seeded(&store, 99)
        .build_profile_at("C1", pinned())
        .expect("first run");
    let second = ProfileComposer::seeded(&store, 99)
        .build_profile_at("C1", pinned())
        .expect("second run");

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).expect("serializes"),
        serde_json::to_string(&second).expect("serializes")
    );
}

#[test]
fn summary_reflects_generated_volume() {
    let store = store();
    let profile = ProfileComposer::seeded(&store, 4)
        .build_profile_at("C1", pinned())
        .expect("profile for C1");

    let summary = ProfileSummary::from_profile(&profile);
    assert_eq!(summary.active_subsystems, 5);
    assert!(summary.subsystems.iter().all(|entry| entry.records > 0));

    let identity = summary
        .entry(Subsystem::Identity)
        .expect("identity summary");
    assert!(identity.headline.starts_with("5 false identities"));
}
