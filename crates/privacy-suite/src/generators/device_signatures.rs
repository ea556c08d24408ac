use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::Serialize;

use crate::customers::{CustomerId, DeviceCategory};
use crate::policy::{ActivePolicy, Subsystem};

use super::sampling::{between, mac_address, pick, pick_many, round_to, short_hash, uniform};
use super::{ArtifactPayload, Generator};

const NOISE_WINDOW_MINUTES: u32 = 30;
const NOISE_PATTERNS: [&str; 4] = ["random", "periodic", "burst", "gradual"];

#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceSignatureGenerator;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSignatureSet {
    pub streams: Vec<&'static str>,
    pub signatures: Vec<SensorSignature>,
    pub fingerprint: DeviceFingerprint,
    pub noise_window_minutes: u32,
    pub noise: Vec<NoiseSignature>,
}

impl DeviceSignatureSet {
    pub fn record_count(&self) -> usize {
        self.signatures.len() + self.noise.len() + self.fingerprint.hardware.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorSignature {
    pub key: String,
    pub stream: &'static str,
    pub value: f64,
    pub captured_at: DateTime<Utc>,
    pub checksum: String,
    pub variance_factor: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceFingerprint {
    pub device_types: Vec<String>,
    pub os_variants: Vec<&'static str>,
    pub hardware: Vec<HardwareSignature>,
    pub network: NetworkCharacteristics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HardwareSignature {
    pub device: String,
    pub cpu_model: &'static str,
    pub memory_gb: u32,
    pub storage_gb: u32,
    pub screen_resolution: &'static str,
    pub device_id_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkCharacteristics {
    pub ip_range_pattern: String,
    pub dns_servers: Vec<&'static str>,
    pub connection_types: Vec<&'static str>,
    pub download_mbps: f64,
    pub upload_mbps: f64,
    pub latency_ms: f64,
    pub gateway_mac: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoiseSignature {
    pub signature_id: String,
    pub emitted_at: DateTime<Utc>,
    pub stream: &'static str,
    pub value: f64,
    pub pattern: &'static str,
    pub amplitude: f64,
    pub frequency_hz: f64,
}

impl Generator for DeviceSignatureGenerator {
    fn subsystem(&self) -> Subsystem {
        Subsystem::DeviceSignatures
    }

    fn fabricate(
        &self,
        customer_id: &CustomerId,
        policy: &ActivePolicy,
        generated_at: DateTime<Utc>,
        rng: &mut dyn RngCore,
    ) -> ArtifactPayload {
        let streams: Vec<&'static str> = policy.applicability.iter().copied().collect();

        let mut signatures = Vec::with_capacity(streams.len() * policy.intensity.scale());
        for round in 0..policy.intensity.scale() {
            for &stream in &streams {
                let value = round_to(sensor_value(rng, stream), 4);
                let captured_at = generated_at - Duration::seconds(between(rng, 0, 3_600).into());
                signatures.push(SensorSignature {
                    key: format!("{customer_id}_{stream}_{round}"),
                    stream,
                    value,
                    captured_at,
                    checksum: short_hash(&format!("{value}"), 8),
                    variance_factor: round_to(uniform(rng, 0.8, 1.2), 3),
                    confidence: round_to(uniform(rng, 0.7, 0.95), 3),
                });
            }
        }

        let fingerprint = fingerprint(customer_id, &policy.device_categories, rng);

        let per_minute = policy.intensity.pick([5, 10, 20, 30]);
        let mut noise = Vec::with_capacity((per_minute * NOISE_WINDOW_MINUTES) as usize);
        for minute in 0..NOISE_WINDOW_MINUTES {
            for slot in 0..per_minute {
                let stream = pick(rng, &streams);
                let offset = i64::from(minute) * 60 + i64::from(slot * (60 / per_minute));
                noise.push(NoiseSignature {
                    signature_id: format!("NOISE_{customer_id}_{}", between(rng, 1_000, 9_999)),
                    emitted_at: generated_at + Duration::seconds(offset),
                    stream,
                    value: round_to(sensor_value(rng, stream), 4),
                    pattern: pick(rng, &NOISE_PATTERNS),
                    amplitude: round_to(uniform(rng, 0.1, 2.0), 3),
                    frequency_hz: round_to(uniform(rng, 0.1, 10.0), 3),
                });
            }
        }

        ArtifactPayload::DeviceSignatures(DeviceSignatureSet {
            streams,
            signatures,
            fingerprint,
            noise_window_minutes: NOISE_WINDOW_MINUTES,
            noise,
        })
    }
}

/// Plausible reading for a named sensor stream.
fn sensor_value(rng: &mut dyn RngCore, stream: &str) -> f64 {
    match stream {
        "accelerometer" | "gyroscope" => uniform(rng, -2.0, 2.0),
        "heart_rate" => uniform(rng, 55.0, 120.0),
        "skin_temperature" => uniform(rng, 31.0, 35.5),
        "temperature" => uniform(rng, 30.0, 80.0),
        "battery_level" => uniform(rng, 10.0, 100.0),
        "cpu_usage" | "memory_usage" => uniform(rng, 5.0, 95.0),
        "network_latency" => uniform(rng, 10.0, 200.0),
        "wifi_scan" | "bluetooth_scan" | "cellular_signal" => uniform(rng, -100.0, -30.0),
        "gps_accuracy" => uniform(rng, 3.0, 50.0),
        "step_count" => f64::from(between(rng, 0, 200)),
        "touch_pressure" => uniform(rng, 0.1, 1.0),
        "light_sensor" | "ambient_light" => uniform(rng, 0.0, 1_000.0),
        "microphone_ambient" => uniform(rng, 20.0, 80.0),
        "camera_exposure" => uniform(rng, 0.001, 0.1),
        "vibration_pattern" => uniform(rng, 0.0, 1.0),
        _ => uniform(rng, 0.0, 1.0),
    }
}

fn fingerprint(
    customer_id: &CustomerId,
    devices: &[DeviceCategory],
    rng: &mut dyn RngCore,
) -> DeviceFingerprint {
    let os_variants = devices
        .iter()
        .filter_map(|device| match device {
            DeviceCategory::Smartphone | DeviceCategory::Tablet => {
                Some(pick(rng, &["iOS 17.1", "iOS 16.7", "Android 14", "Android 13"]))
            }
            DeviceCategory::Laptop => Some(pick(
                rng,
                &["Windows 11", "macOS 14.1", "Ubuntu 22.04", "Fedora 39"],
            )),
            DeviceCategory::Smartwatch => Some(pick(rng, &["watchOS 10", "Wear OS 4"])),
            DeviceCategory::Unrecognized(_) => None,
        })
        .collect();

    let hardware = devices
        .iter()
        .map(|device| HardwareSignature {
            device: device.label().to_string(),
            cpu_model: pick(
                rng,
                &["A17 Pro", "Snapdragon 8 Gen 3", "M3", "Intel Core i7-1360P", "Ryzen 7 7840U"],
            ),
            memory_gb: pick(rng, &[4, 6, 8, 12, 16, 32]),
            storage_gb: pick(rng, &[64, 128, 256, 512, 1_024]),
            screen_resolution: pick(rng, &["1920x1080", "2560x1440", "2796x1290", "396x484"]),
            device_id_hash: short_hash(&format!("{customer_id}_{}", device.label()), 16),
        })
        .collect();

    let network = NetworkCharacteristics {
        ip_range_pattern: format!("192.168.{}.0/24", between(rng, 1, 254)),
        dns_servers: pick_many(rng, &["8.8.8.8", "1.1.1.1", "9.9.9.9", "208.67.222.222"], 2),
        connection_types: pick_many(rng, &["wifi", "cellular", "ethernet", "bluetooth"], 2),
        download_mbps: round_to(uniform(rng, 10.0, 500.0), 1),
        upload_mbps: round_to(uniform(rng, 5.0, 100.0), 1),
        latency_ms: round_to(uniform(rng, 5.0, 80.0), 1),
        gateway_mac: mac_address(rng),
    };

    DeviceFingerprint {
        device_types: devices.iter().map(|d| d.label().to_string()).collect(),
        os_variants,
        hardware,
        network,
    }
}
