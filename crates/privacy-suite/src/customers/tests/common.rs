use crate::customers::domain::CustomerRecord;
use crate::customers::source::MemorySource;
use crate::customers::store::PreferenceStore;

pub(super) fn full_record() -> CustomerRecord {
    let mut record = CustomerRecord::new("CUST_001", "Alice Johnson");
    record.privacy_level = Some("high".to_string());
    record.service_tier = Some("premium".to_string());
    record.device_types = Some(vec!["smartphone".to_string(), "laptop".to_string()]);
    record.preferred_cities = Some(vec!["Chicago".to_string()]);
    record.location_obfuscation = Some(true);
    record.communication_encryption = Some(true);
    record.biometric_protection = Some(false);
    record.identity_multiplication_count = Some(40);
    record
}

pub(super) fn sparse_record() -> CustomerRecord {
    CustomerRecord::new("CUST_002", "Bob Smith")
}

pub(super) fn enterprise_record() -> CustomerRecord {
    let mut record = CustomerRecord::new("CUST_003", "Carol Davis");
    record.privacy_level = Some("maximum".to_string());
    record.service_tier = Some("enterprise".to_string());
    record.location_obfuscation = Some(false);
    record
}

pub(super) fn memory_store() -> PreferenceStore<MemorySource> {
    PreferenceStore::load(MemorySource::new(vec![
        full_record(),
        sparse_record(),
        enterprise_record(),
    ]))
}
