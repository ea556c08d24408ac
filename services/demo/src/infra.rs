use privacy_suite::config::AppConfig;
use privacy_suite::customers::{
    JsonFileSource, PreferenceStore, PrivacyTier, ProtectionToggle, ServiceTier,
};
use std::path::PathBuf;

/// Configuration plus the customer store it points at.
pub(crate) struct Session {
    pub(crate) config: AppConfig,
    pub(crate) store: PreferenceStore<JsonFileSource>,
}

impl Session {
    pub(crate) fn open(config: AppConfig) -> Self {
        let store = PreferenceStore::load(JsonFileSource::new(&config.data.customer_file));
        if let Some(warning) = store.load_warning() {
            eprintln!("warning: {warning}");
        }
        Self { config, store }
    }

    /// Explicit directory, else the configured report directory.
    pub(crate) fn report_dir(&self, requested: Option<PathBuf>) -> PathBuf {
        requested.unwrap_or_else(|| self.config.data.report_dir.clone())
    }
}

pub(crate) fn parse_privacy_tier(raw: &str) -> Result<PrivacyTier, String> {
    PrivacyTier::from_label(raw).ok_or_else(|| {
        format!("unknown privacy level '{raw}' (expected low, medium, high or maximum)")
    })
}

pub(crate) fn parse_service_tier(raw: &str) -> Result<ServiceTier, String> {
    ServiceTier::from_label(raw).ok_or_else(|| {
        format!("unknown service tier '{raw}' (expected basic, standard, premium or enterprise)")
    })
}

pub(crate) fn parse_protection(raw: &str) -> Result<ProtectionToggle, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "location" | "location_obfuscation" => Ok(ProtectionToggle::Location),
        "communication" | "communication_encryption" => Ok(ProtectionToggle::Communication),
        "biometric" | "biometric_protection" => Ok(ProtectionToggle::Biometric),
        _ => Err(format!(
            "unknown protection '{raw}' (expected location, communication or biometric)"
        )),
    }
}
