use serde::Serialize;

/// Ordered protection intensity scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Minimal,
    Standard,
    Aggressive,
    Comprehensive,
}

impl Intensity {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Minimal,
            Self::Standard,
            Self::Aggressive,
            Self::Comprehensive,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Standard => "standard",
            Self::Aggressive => "aggressive",
            Self::Comprehensive => "comprehensive",
        }
    }

    /// 1 for minimal through 4 for comprehensive.
    pub const fn scale(self) -> usize {
        match self {
            Self::Minimal => 1,
            Self::Standard => 2,
            Self::Aggressive => 3,
            Self::Comprehensive => 4,
        }
    }

    /// Selects the entry for this intensity from a four-row table.
    pub fn pick<T: Copy>(self, table: [T; 4]) -> T {
        table[self.scale() - 1]
    }
}

/// The five generator subsystems, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Subsystem {
    DeviceSignatures,
    Location,
    Identity,
    Communication,
    Biometric,
}

impl Subsystem {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::DeviceSignatures,
            Self::Location,
            Self::Identity,
            Self::Communication,
            Self::Biometric,
        ]
    }

    /// Key used in serialized aggregates.
    pub const fn key(self) -> &'static str {
        match self {
            Self::DeviceSignatures => "device_signatures",
            Self::Location => "location",
            Self::Identity => "identity",
            Self::Communication => "communication",
            Self::Biometric => "biometric",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::DeviceSignatures => "Device Signatures",
            Self::Location => "Location Obfuscation",
            Self::Identity => "Identity Multiplication",
            Self::Communication => "Communication Shield",
            Self::Biometric => "Biometric Countermeasures",
        }
    }
}

/// Name pool for fabricated identities, from plainest to most varied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NameStyle {
    Common,
    Modern,
    International,
}

impl NameStyle {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Modern => "modern",
            Self::International => "international",
        }
    }
}

/// Optional behaviours switched on per subsystem by tier thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyFlag {
    Steganography,
    NoiseGeneration,
    MultiLayerEncryption,
    SecureMailDomains,
    BusinessMailDomains,
    ContinuousProtection,
    AdaptiveCountermeasures,
    MultiModalProtection,
}

impl PolicyFlag {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Steganography => "steganography",
            Self::NoiseGeneration => "noise generation",
            Self::MultiLayerEncryption => "multi-layer encryption",
            Self::SecureMailDomains => "secure mail domains",
            Self::BusinessMailDomains => "business mail domains",
            Self::ContinuousProtection => "continuous protection",
            Self::AdaptiveCountermeasures => "adaptive countermeasures",
            Self::MultiModalProtection => "multi-modal protection",
        }
    }
}
