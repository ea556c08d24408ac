use super::common::*;
use crate::customers::domain::{
    CustomerFilter, CustomerRecord, CustomerUpdate, PreferenceOrigin, PrivacyTier,
    ProtectionToggle, ServiceTier,
};
use crate::customers::source::{CustomerSource, JsonFileSource, MemorySource};
use crate::customers::store::{PreferenceStore, StoreError};

#[test]
fn list_all_returns_records_ordered_by_id() {
    let store = memory_store();
    let ids: Vec<&str> = store
        .list_all()
        .into_iter()
        .map(|record| record.customer_id.as_str())
        .collect();
    assert_eq!(ids, vec!["CUST_001", "CUST_002", "CUST_003"]);
    assert!(store.load_warning().is_none());
}

#[test]
fn get_returns_none_for_unknown_id() {
    let store = memory_store();
    assert!(store.get("ZZZ").is_none());
    assert_eq!(store.get("CUST_002").map(|r| r.name.as_str()), Some("Bob Smith"));
}

#[test]
fn filter_matches_stored_values() {
    let store = memory_store();

    let high = store.filter_by(&CustomerFilter::PrivacyLevel(PrivacyTier::High));
    assert_eq!(high.len(), 1);
    assert_eq!(high[0].customer_id.as_str(), "CUST_001");

    let enterprise = store.filter_by(&CustomerFilter::ServiceTier(ServiceTier::Enterprise));
    assert_eq!(enterprise.len(), 1);

    // CUST_002 has no stored toggle and CUST_003 stores false.
    let location = store.filter_by(&CustomerFilter::ProtectionEnabled(ProtectionToggle::Location));
    assert_eq!(location.len(), 1);
    assert_eq!(location[0].customer_id.as_str(), "CUST_001");
}

#[test]
fn tier_filters_ignore_stored_label_case() {
    let mut shouting = CustomerRecord::new("CUST_004", "Dana Lee");
    shouting.privacy_level = Some("High".to_string());
    shouting.service_tier = Some(" ENTERPRISE".to_string());
    let store = PreferenceStore::load(MemorySource::new(vec![full_record(), shouting]));

    let high = store.filter_by(&CustomerFilter::PrivacyLevel(PrivacyTier::High));
    assert_eq!(high.len(), 2);

    let enterprise = store.filter_by(&CustomerFilter::ServiceTier(ServiceTier::Enterprise));
    assert_eq!(enterprise.len(), 1);
    assert_eq!(enterprise[0].customer_id.as_str(), "CUST_004");

    assert!(store
        .filter_by(&CustomerFilter::PrivacyLevel(PrivacyTier::Maximum))
        .is_empty());
}

#[test]
fn normalized_preferences_for_unknown_id_uses_defaults() {
    let store = memory_store();
    let prefs = store.normalized_preferences("ZZZ");
    assert_eq!(prefs.origin, PreferenceOrigin::Defaults);
    assert_eq!(prefs.identity_count, 25);
}

#[test]
fn missing_file_yields_empty_store_with_warning() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = PreferenceStore::load(JsonFileSource::new(dir.path().join("nope.json")));

    assert!(store.is_empty());
    let warning = store.load_warning().expect("warning recorded");
    assert!(warning.reason.contains("not found"));
}

#[test]
fn malformed_file_yields_empty_store_with_warning() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("customers.json");
    std::fs::write(&path, "{ not json").expect("write fixture");

    let store = PreferenceStore::load(JsonFileSource::new(&path));

    assert!(store.is_empty());
    assert!(store.load_warning().is_some());
}

#[test]
fn update_merges_and_persists_to_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("customers.json");
    let seed = JsonFileSource::new(&path);
    seed.write(&[full_record(), sparse_record()]).expect("seed file");

    let mut store = PreferenceStore::load(JsonFileSource::new(&path));
    let update = CustomerUpdate {
        privacy_level: Some("maximum".to_string()),
        biometric_protection: Some(true),
        ..CustomerUpdate::default()
    };
    store.update("CUST_002", &update).expect("update succeeds");

    let reloaded = PreferenceStore::load(JsonFileSource::new(&path));
    let record = reloaded.get("CUST_002").expect("record persisted");
    assert_eq!(record.privacy_level.as_deref(), Some("maximum"));
    assert_eq!(record.biometric_protection, Some(true));
    assert_eq!(record.name, "Bob Smith");
    assert!(reloaded.get("CUST_001").is_some());
}

#[test]
fn update_unknown_id_does_not_persist() {
    let mut store = memory_store();
    let update = CustomerUpdate {
        name: Some("Nobody".to_string()),
        ..CustomerUpdate::default()
    };

    match store.update("ZZZ", &update) {
        Err(StoreError::NotFound(id)) => assert_eq!(id.as_str(), "ZZZ"),
        other => panic!("expected not found, got {other:?}"),
    }
    assert_eq!(store.source().write_count(), 0);
}

#[test]
fn persist_failure_keeps_in_memory_merge() {
    let mut store = PreferenceStore::load(MemorySource::read_only(vec![CustomerRecord::new(
        "CUST_010", "Dana",
    )]));
    let update = CustomerUpdate {
        service_tier: Some("enterprise".to_string()),
        ..CustomerUpdate::default()
    };

    let result = store.update("CUST_010", &update);

    assert!(matches!(result, Err(StoreError::Persist(_))));
    assert_eq!(
        store.get("CUST_010").and_then(|r| r.service_tier.as_deref()),
        Some("enterprise")
    );
}
