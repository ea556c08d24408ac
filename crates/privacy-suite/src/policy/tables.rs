//! Fixed lookup tables consulted by the resolver.

use crate::customers::{DeviceCategory, PrivacyTier, ProtectionToggle, ServiceTier};

use super::domain::{Intensity, NameStyle, PolicyFlag, Subsystem};

pub(crate) const fn intensity_for(tier: PrivacyTier) -> Intensity {
    match tier {
        PrivacyTier::Low => Intensity::Minimal,
        PrivacyTier::Medium => Intensity::Standard,
        PrivacyTier::High => Intensity::Aggressive,
        PrivacyTier::Maximum => Intensity::Comprehensive,
    }
}

pub(crate) const fn toggle_for(subsystem: Subsystem) -> Option<ProtectionToggle> {
    match subsystem {
        Subsystem::Location => Some(ProtectionToggle::Location),
        Subsystem::Communication => Some(ProtectionToggle::Communication),
        Subsystem::Biometric => Some(ProtectionToggle::Biometric),
        Subsystem::DeviceSignatures | Subsystem::Identity => None,
    }
}

/// Subsystem-specific escalation of intensity to `comprehensive`.
pub(crate) fn escalates(subsystem: Subsystem, service: ServiceTier) -> bool {
    match subsystem {
        Subsystem::Communication => service == ServiceTier::Enterprise,
        Subsystem::DeviceSignatures
        | Subsystem::Location
        | Subsystem::Identity
        | Subsystem::Biometric => false,
    }
}

/// Identity name pool. Either tier can lift the style; intensity is untouched.
pub(crate) const fn name_style_for(privacy: PrivacyTier, service: ServiceTier) -> NameStyle {
    match (privacy, service) {
        (PrivacyTier::Maximum, _) | (_, ServiceTier::Enterprise) => NameStyle::International,
        (PrivacyTier::High, _) | (_, ServiceTier::Premium) => NameStyle::Modern,
        _ => NameStyle::Common,
    }
}

/// Identity has no device table and is produced regardless of devices.
pub(crate) const fn requires_applicability(subsystem: Subsystem) -> bool {
    !matches!(subsystem, Subsystem::Identity)
}

pub(crate) fn categories_for(subsystem: Subsystem, device: &DeviceCategory) -> &'static [&'static str] {
    match subsystem {
        Subsystem::DeviceSignatures => device_streams(device),
        Subsystem::Location => location_channels(device),
        Subsystem::Identity => &[],
        Subsystem::Communication => message_protocols(device),
        Subsystem::Biometric => biometric_modalities(device),
    }
}

fn device_streams(device: &DeviceCategory) -> &'static [&'static str] {
    match device {
        DeviceCategory::Smartphone => &[
            "accelerometer",
            "gyroscope",
            "wifi_scan",
            "bluetooth_scan",
            "cellular_signal",
            "battery_level",
            "gps_accuracy",
            "microphone_ambient",
        ],
        DeviceCategory::Laptop => &[
            "temperature",
            "cpu_usage",
            "memory_usage",
            "network_latency",
            "wifi_scan",
            "battery_level",
            "camera_exposure",
        ],
        DeviceCategory::Tablet => &[
            "accelerometer",
            "gyroscope",
            "touch_pressure",
            "light_sensor",
            "wifi_scan",
            "battery_level",
            "gps_accuracy",
        ],
        DeviceCategory::Smartwatch => &[
            "accelerometer",
            "gyroscope",
            "heart_rate",
            "skin_temperature",
            "step_count",
            "vibration_pattern",
            "ambient_light",
        ],
        DeviceCategory::Unrecognized(_) => &[],
    }
}

fn location_channels(device: &DeviceCategory) -> &'static [&'static str] {
    match device {
        DeviceCategory::Smartphone => &["gps_trace", "wifi_scan", "cell_towers"],
        DeviceCategory::Tablet => &["gps_trace", "wifi_scan"],
        DeviceCategory::Laptop => &["wifi_scan"],
        DeviceCategory::Smartwatch => &["gps_trace"],
        DeviceCategory::Unrecognized(_) => &[],
    }
}

fn message_protocols(device: &DeviceCategory) -> &'static [&'static str] {
    match device {
        DeviceCategory::Smartphone => &["email", "chat", "social_media", "voice_note"],
        DeviceCategory::Laptop => &["email", "chat", "forum", "document"],
        DeviceCategory::Tablet => &["email", "chat", "social_media"],
        DeviceCategory::Smartwatch => &["chat"],
        DeviceCategory::Unrecognized(_) => &[],
    }
}

fn biometric_modalities(device: &DeviceCategory) -> &'static [&'static str] {
    match device {
        DeviceCategory::Smartphone | DeviceCategory::Tablet => {
            &["facial_recognition", "fingerprint", "voice_print"]
        }
        DeviceCategory::Laptop => &["facial_recognition", "keystroke_dynamics"],
        DeviceCategory::Smartwatch => &["gait_analysis", "behavioral_patterns"],
        DeviceCategory::Unrecognized(_) => &[],
    }
}

enum Threshold {
    PrivacyAtLeast(PrivacyTier),
    PrivacyIs(PrivacyTier),
    ServiceAtLeast(ServiceTier),
    ServiceIs(ServiceTier),
}

impl Threshold {
    fn holds(&self, privacy: PrivacyTier, service: ServiceTier) -> bool {
        match *self {
            Self::PrivacyAtLeast(min) => privacy >= min,
            Self::PrivacyIs(tier) => privacy == tier,
            Self::ServiceAtLeast(min) => service >= min,
            Self::ServiceIs(tier) => service == tier,
        }
    }
}

const COMMUNICATION_FLAGS: &[(PolicyFlag, Threshold)] = &[
    (
        PolicyFlag::Steganography,
        Threshold::PrivacyAtLeast(PrivacyTier::High),
    ),
    (
        PolicyFlag::NoiseGeneration,
        Threshold::PrivacyAtLeast(PrivacyTier::High),
    ),
    (
        PolicyFlag::MultiLayerEncryption,
        Threshold::ServiceIs(ServiceTier::Enterprise),
    ),
];

const IDENTITY_FLAGS: &[(PolicyFlag, Threshold)] = &[
    (
        PolicyFlag::SecureMailDomains,
        Threshold::PrivacyAtLeast(PrivacyTier::High),
    ),
    (
        PolicyFlag::BusinessMailDomains,
        Threshold::ServiceIs(ServiceTier::Enterprise),
    ),
];

const BIOMETRIC_FLAGS: &[(PolicyFlag, Threshold)] = &[
    (
        PolicyFlag::ContinuousProtection,
        Threshold::PrivacyAtLeast(PrivacyTier::High),
    ),
    (
        PolicyFlag::AdaptiveCountermeasures,
        Threshold::ServiceAtLeast(ServiceTier::Premium),
    ),
    (
        PolicyFlag::MultiModalProtection,
        Threshold::PrivacyIs(PrivacyTier::Maximum),
    ),
];

pub(crate) fn flags_for(
    subsystem: Subsystem,
    privacy: PrivacyTier,
    service: ServiceTier,
) -> impl Iterator<Item = PolicyFlag> {
    let rules: &'static [(PolicyFlag, Threshold)] = match subsystem {
        Subsystem::Communication => COMMUNICATION_FLAGS,
        Subsystem::Identity => IDENTITY_FLAGS,
        Subsystem::Biometric => BIOMETRIC_FLAGS,
        Subsystem::DeviceSignatures | Subsystem::Location => &[],
    };
    rules
        .iter()
        .filter(move |(_, threshold)| threshold.holds(privacy, service))
        .map(|(flag, _)| *flag)
}
