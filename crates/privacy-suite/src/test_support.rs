//! Shared fixtures for unit tests.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::customers::{CustomerId, DeviceCategory, NormalizedPreferences, PrivacyTier, ServiceTier};

/// Deterministic RNG that records how many times it was sampled.
pub(crate) struct CountingRng {
    inner: ChaCha8Rng,
    pub(crate) calls: usize,
}

impl CountingRng {
    pub(crate) fn new(seed: u64) -> Self {
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

pub(crate) fn preferences(
    privacy: PrivacyTier,
    service: ServiceTier,
    devices: &[&str],
) -> NormalizedPreferences {
    let mut prefs = NormalizedPreferences::defaults_for(CustomerId::from("CUST_TEST"));
    prefs.privacy_tier = privacy;
    prefs.service_tier = service;
    prefs.device_categories = devices.iter().map(|device| DeviceCategory::parse(device)).collect();
    prefs.identity_count = 3;
    prefs
}
