use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_IDENTITY_COUNT: u32 = 25;
/// Upper bound on identities fabricated per profile.
pub const MAX_IDENTITY_COUNT: u32 = 500;
pub const DEFAULT_CITIES: [&str; 2] = ["New York", "Los Angeles"];

/// Stable key for a stored customer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

impl CustomerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CustomerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Borrow<str> for CustomerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Customer record as it appears in the backing file. Preference fields are
/// optional; fields this crate does not know about are carried through
/// untouched so a write-back never drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub customer_id: CustomerId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_cities: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_obfuscation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication_encryption: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biometric_protection: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_multiplication_count: Option<u32>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl CustomerRecord {
    /// Bare record with only an id and display name.
    pub fn new(customer_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            customer_id: CustomerId(customer_id.into()),
            name: name.into(),
            privacy_level: None,
            service_tier: None,
            device_types: None,
            preferred_cities: None,
            location_obfuscation: None,
            communication_encryption: None,
            biometric_protection: None,
            identity_multiplication_count: None,
            extra: BTreeMap::new(),
        }
    }

    /// Stored toggle value, `None` when the field is absent.
    pub fn toggle(&self, toggle: ProtectionToggle) -> Option<bool> {
        match toggle {
            ProtectionToggle::Location => self.location_obfuscation,
            ProtectionToggle::Communication => self.communication_encryption,
            ProtectionToggle::Biometric => self.biometric_protection,
        }
    }
}

/// Partial update merged into a stored record. Only `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub privacy_level: Option<String>,
    pub service_tier: Option<String>,
    pub device_types: Option<Vec<String>>,
    pub preferred_cities: Option<Vec<String>>,
    pub location_obfuscation: Option<bool>,
    pub communication_encryption: Option<bool>,
    pub biometric_protection: Option<bool>,
    pub identity_multiplication_count: Option<u32>,
}

impl CustomerUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, record: &mut CustomerRecord) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(level) = &self.privacy_level {
            record.privacy_level = Some(level.clone());
        }
        if let Some(tier) = &self.service_tier {
            record.service_tier = Some(tier.clone());
        }
        if let Some(devices) = &self.device_types {
            record.device_types = Some(devices.clone());
        }
        if let Some(cities) = &self.preferred_cities {
            record.preferred_cities = Some(cities.clone());
        }
        if let Some(flag) = self.location_obfuscation {
            record.location_obfuscation = Some(flag);
        }
        if let Some(flag) = self.communication_encryption {
            record.communication_encryption = Some(flag);
        }
        if let Some(flag) = self.biometric_protection {
            record.biometric_protection = Some(flag);
        }
        if let Some(count) = self.identity_multiplication_count {
            record.identity_multiplication_count = Some(count);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivacyTier {
    Low,
    Medium,
    High,
    Maximum,
}

impl PrivacyTier {
    pub const fn ordered() -> [Self; 4] {
        [Self::Low, Self::Medium, Self::High, Self::Maximum]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Maximum => "maximum",
        }
    }

    /// Exact match on the stored label.
    pub fn from_label(value: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|tier| tier.label() == value.trim().to_ascii_lowercase())
    }

    /// Unrecognised labels fall back to `medium`.
    pub fn parse_lenient(value: &str) -> Self {
        Self::from_label(value).unwrap_or(Self::Medium)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceTier {
    Basic,
    Standard,
    Premium,
    Enterprise,
}

impl ServiceTier {
    pub const fn ordered() -> [Self; 4] {
        [Self::Basic, Self::Standard, Self::Premium, Self::Enterprise]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Standard => "standard",
            Self::Premium => "premium",
            Self::Enterprise => "enterprise",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|tier| tier.label() == value.trim().to_ascii_lowercase())
    }

    /// Unrecognised labels fall back to `standard`.
    pub fn parse_lenient(value: &str) -> Self {
        Self::from_label(value).unwrap_or(Self::Standard)
    }
}

/// Device category a customer carries. Unknown categories are kept so they
/// can be reported, but no table maps them to anything.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceCategory {
    Smartphone,
    Laptop,
    Tablet,
    Smartwatch,
    Unrecognized(String),
}

impl DeviceCategory {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "smartphone" => Self::Smartphone,
            "laptop" => Self::Laptop,
            "tablet" => Self::Tablet,
            "smartwatch" => Self::Smartwatch,
            _ => Self::Unrecognized(value.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Smartphone => "smartphone",
            Self::Laptop => "laptop",
            Self::Tablet => "tablet",
            Self::Smartwatch => "smartwatch",
            Self::Unrecognized(raw) => raw,
        }
    }
}

/// The three per-customer switches that can turn a subsystem off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtectionToggle {
    Location,
    Communication,
    Biometric,
}

impl ProtectionToggle {
    /// Field name used in the customer file.
    pub const fn field(self) -> &'static str {
        match self {
            Self::Location => "location_obfuscation",
            Self::Communication => "communication_encryption",
            Self::Biometric => "biometric_protection",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceOrigin {
    Stored,
    Defaults,
}

/// Fully populated preference view; every field has a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPreferences {
    pub customer_id: CustomerId,
    pub origin: PreferenceOrigin,
    pub privacy_tier: PrivacyTier,
    pub service_tier: ServiceTier,
    pub device_categories: Vec<DeviceCategory>,
    pub preferred_cities: Vec<String>,
    pub location_obfuscation: bool,
    pub communication_encryption: bool,
    pub biometric_protection: bool,
    pub identity_count: u32,
}

impl NormalizedPreferences {
    pub fn defaults_for(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            origin: PreferenceOrigin::Defaults,
            privacy_tier: PrivacyTier::Medium,
            service_tier: ServiceTier::Standard,
            device_categories: vec![DeviceCategory::Smartphone],
            preferred_cities: DEFAULT_CITIES.iter().map(|city| city.to_string()).collect(),
            location_obfuscation: true,
            communication_encryption: true,
            biometric_protection: true,
            identity_count: DEFAULT_IDENTITY_COUNT,
        }
    }

    pub fn from_record(record: &CustomerRecord) -> Self {
        let defaults = Self::defaults_for(record.customer_id.clone());
        Self {
            origin: PreferenceOrigin::Stored,
            privacy_tier: record
                .privacy_level
                .as_deref()
                .map(PrivacyTier::parse_lenient)
                .unwrap_or(defaults.privacy_tier),
            service_tier: record
                .service_tier
                .as_deref()
                .map(ServiceTier::parse_lenient)
                .unwrap_or(defaults.service_tier),
            device_categories: record
                .device_types
                .as_ref()
                .map(|devices| devices.iter().map(|raw| DeviceCategory::parse(raw)).collect())
                .unwrap_or_else(|| defaults.device_categories.clone()),
            preferred_cities: record
                .preferred_cities
                .clone()
                .unwrap_or_else(|| defaults.preferred_cities.clone()),
            location_obfuscation: record
                .location_obfuscation
                .unwrap_or(defaults.location_obfuscation),
            communication_encryption: record
                .communication_encryption
                .unwrap_or(defaults.communication_encryption),
            biometric_protection: record
                .biometric_protection
                .unwrap_or(defaults.biometric_protection),
            identity_count: record
                .identity_multiplication_count
                .map(|count| clamp_identity_count(&record.customer_id, count))
                .unwrap_or(defaults.identity_count),
            ..defaults
        }
    }

    pub fn toggle(&self, toggle: ProtectionToggle) -> bool {
        match toggle {
            ProtectionToggle::Location => self.location_obfuscation,
            ProtectionToggle::Communication => self.communication_encryption,
            ProtectionToggle::Biometric => self.biometric_protection,
        }
    }
}

fn clamp_identity_count(customer_id: &CustomerId, requested: u32) -> u32 {
    if requested > MAX_IDENTITY_COUNT {
        tracing::warn!(
            customer_id = %customer_id,
            requested,
            limit = MAX_IDENTITY_COUNT,
            "identity count capped"
        );
        MAX_IDENTITY_COUNT
    } else {
        requested
    }
}

/// Filters over stored (not normalized) field values. Tier labels compare
/// case-insensitively; absent or unknown values never match.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomerFilter {
    PrivacyLevel(PrivacyTier),
    ServiceTier(ServiceTier),
    ProtectionEnabled(ProtectionToggle),
}

impl CustomerFilter {
    pub fn matches(&self, record: &CustomerRecord) -> bool {
        match self {
            Self::PrivacyLevel(tier) => {
                record.privacy_level.as_deref().and_then(PrivacyTier::from_label) == Some(*tier)
            }
            Self::ServiceTier(tier) => {
                record.service_tier.as_deref().and_then(ServiceTier::from_label) == Some(*tier)
            }
            Self::ProtectionEnabled(toggle) => record.toggle(*toggle).unwrap_or(false),
        }
    }
}
