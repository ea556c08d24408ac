use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::customers::{CustomerId, ServiceTier};
use crate::policy::{ActivePolicy, Intensity, PolicyFlag, Subsystem};

use super::sampling::{between, chance, pick, round_to, short_hash, uniform};
use super::{ArtifactPayload, Generator};

const NOISE_WINDOW_MINUTES: u32 = 30;
const SAMPLE_MESSAGE: &str = "Secret test message";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverStyle {
    Business,
    Casual,
    Academic,
    Technical,
}

impl CoverStyle {
    const ALL: [Self; 4] = [Self::Business, Self::Casual, Self::Academic, Self::Technical];

    fn texts(self) -> &'static [&'static str] {
        match self {
            Self::Business => &[
                "Please review the quarterly reports and provide feedback by end of week.",
                "The meeting has been rescheduled to next Tuesday at 2 PM in conference room A.",
                "Thank you for your presentation yesterday. The team found it very informative.",
                "Could you please send the updated project timeline when you have a moment?",
                "The client has requested additional information about our service offerings.",
            ],
            Self::Casual => &[
                "Hope you're having a great week! Let me know if you want to grab coffee soon.",
                "Thanks for the recommendation. I'll definitely check out that restaurant.",
                "The weather has been amazing lately. Perfect for outdoor activities.",
                "Looking forward to the weekend. Any fun plans on your end?",
                "Just wanted to catch up and see how things are going with you.",
            ],
            Self::Academic => &[
                "The research findings indicate a significant correlation between the variables.",
                "Please refer to the attached documentation for detailed methodology.",
                "The peer review process should be completed within the next two weeks.",
                "Your analysis of the dataset provides valuable insights for our study.",
                "The conference presentation schedule has been updated with new time slots.",
            ],
            Self::Technical => &[
                "The system deployment was successful with minimal downtime reported.",
                "Please update the configuration files according to the new specifications.",
                "The performance metrics show improvement after the latest optimization.",
                "Bug fixes have been implemented and pushed to the testing environment.",
                "The database migration completed without any data integrity issues.",
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CommunicationGenerator;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunicationShield {
    pub encryption: EncryptionProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steganography: Option<SteganographicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layered_envelope: Option<LayeredEnvelope>,
    pub noise: Vec<NoisePacket>,
    pub channel: SecureChannel,
    pub decoys: Vec<DecoyMessage>,
}

impl CommunicationShield {
    pub fn record_count(&self) -> usize {
        usize::from(self.steganography.is_some())
            + usize::from(self.layered_envelope.is_some())
            + self.noise.len()
            + self.decoys.len()
            + 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncryptionProfile {
    pub level: &'static str,
    pub key_bits: u32,
    pub rounds: usize,
}

impl EncryptionProfile {
    fn for_intensity(intensity: Intensity) -> Self {
        let (level, key_bits, rounds) = intensity.pick([
            ("basic", 128, 1),
            ("standard", 256, 2),
            ("high", 256, 3),
            ("maximum", 256, 5),
        ]);
        Self {
            level,
            key_bits,
            rounds,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SteganographicMessage {
    pub message_id: String,
    pub cover_text: &'static str,
    pub cover_style: CoverStyle,
    pub method: &'static str,
    pub encryption_rounds: usize,
    /// Base64 of the innermost-to-outermost AES-256-GCM wrapped message.
    /// `None` when a wrapping round failed.
    pub hidden_payload: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayeredEnvelope {
    pub layers: Vec<EnvelopeLayer>,
    pub payload: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvelopeLayer {
    pub layer: usize,
    pub method: &'static str,
    pub key_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoisePacket {
    pub packet_id: String,
    pub sent_at: DateTime<Utc>,
    pub size_bytes: u32,
    pub protocol: &'static str,
    pub destination: &'static str,
    pub content_type: &'static str,
    pub decoy_purpose: &'static str,
    pub burst_probability: f64,
    pub sustained_rate_mbps: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecureChannel {
    pub channel_id: String,
    pub key_exchange: &'static str,
    pub curve: &'static str,
    pub key_bits: u32,
    pub primary_session_key: String,
    pub backup_session_key: String,
    pub forward_secrecy: bool,
    pub traffic_analysis_resistance: bool,
    pub protocol_version: &'static str,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecoyMessage {
    pub message_id: String,
    pub content: String,
    pub style: CoverStyle,
    pub protocol: &'static str,
    pub sent_at: DateTime<Utc>,
    pub size_bytes: usize,
    pub priority: &'static str,
}

impl Generator for CommunicationGenerator {
    fn subsystem(&self) -> Subsystem {
        Subsystem::Communication
    }

    fn fabricate(
        &self,
        customer_id: &CustomerId,
        policy: &ActivePolicy,
        generated_at: DateTime<Utc>,
        rng: &mut dyn RngCore,
    ) -> ArtifactPayload {
        let encryption = EncryptionProfile::for_intensity(policy.intensity);

        let steganography = policy.has_flag(PolicyFlag::Steganography).then(|| {
            steganographic_message(customer_id, policy.intensity, encryption.rounds, generated_at, rng)
        });

        let layered_envelope = policy
            .has_flag(PolicyFlag::MultiLayerEncryption)
            .then(|| layered_envelope(customer_id, rng));

        let noise = if policy.has_flag(PolicyFlag::NoiseGeneration) {
            noise_packets(customer_id, policy.intensity, generated_at, rng)
        } else {
            Vec::new()
        };

        let channel = secure_channel(
            customer_id,
            policy.intensity,
            &encryption,
            policy.has_flag(PolicyFlag::NoiseGeneration),
            generated_at,
            rng,
        );

        let protocols: Vec<&'static str> = policy.applicability.iter().copied().collect();
        let decoys = decoy_messages(
            customer_id,
            policy.service_tier,
            &protocols,
            policy.intensity.pick([10, 25, 40, 60]),
            generated_at,
            rng,
        );

        ArtifactPayload::Communication(CommunicationShield {
            encryption,
            steganography,
            layered_envelope,
            noise,
            channel,
            decoys,
        })
    }
}

/// One AES-256-GCM pass with a key and nonce drawn from `rng`. Returns the
/// ciphertext and the key, or `None` if the cipher rejects its input.
fn seal(plaintext: &[u8], rng: &mut dyn RngCore) -> Option<(Vec<u8>, [u8; 32])> {
    let mut key = [0u8; 32];
    rng.fill_bytes(&mut key);
    let mut nonce_bytes = [0u8; 12];
    rng.fill_bytes(&mut nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(&key).ok()?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .ok()?;
    Some((ciphertext, key))
}

/// Applies `rounds` sealing passes. Key hashes are returned per pass.
fn seal_rounds(message: &[u8], rounds: usize, rng: &mut dyn RngCore) -> Option<(Vec<u8>, Vec<String>)> {
    let mut payload = message.to_vec();
    let mut key_hashes = Vec::with_capacity(rounds);
    for round in 0..rounds {
        match seal(&payload, rng) {
            Some((ciphertext, key)) => {
                payload = ciphertext;
                key_hashes.push(hex::encode(Sha256::digest(key))[..16].to_string());
            }
            None => {
                tracing::warn!(round, "message wrapping failed, payload omitted");
                return None;
            }
        }
    }
    Some((payload, key_hashes))
}

fn steganographic_message(
    customer_id: &CustomerId,
    intensity: Intensity,
    rounds: usize,
    created_at: DateTime<Utc>,
    rng: &mut dyn RngCore,
) -> SteganographicMessage {
    let cover_style = CoverStyle::Business;
    let methods: &[&str] = match intensity {
        Intensity::Minimal => &["text_spacing", "character_substitution"],
        Intensity::Standard => &["text_spacing", "character_substitution", "unicode_variation"],
        Intensity::Aggressive => &[
            "text_spacing",
            "unicode_variation",
            "semantic_hiding",
            "frequency_analysis",
        ],
        Intensity::Comprehensive => &[
            "unicode_variation",
            "semantic_hiding",
            "frequency_analysis",
            "linguistic_steganography",
        ],
    };

    // The message is sealed once, then wrapped once per encryption round.
    let hidden_payload = seal_rounds(SAMPLE_MESSAGE.as_bytes(), rounds + 1, rng)
        .map(|(payload, _)| BASE64.encode(payload));

    SteganographicMessage {
        message_id: short_hash(&format!("{customer_id}{SAMPLE_MESSAGE}"), 12),
        cover_text: pick(rng, cover_style.texts()),
        cover_style,
        method: pick(rng, methods),
        encryption_rounds: rounds,
        hidden_payload,
        created_at,
    }
}

fn layered_envelope(customer_id: &CustomerId, rng: &mut dyn RngCore) -> LayeredEnvelope {
    let message = format!("{SAMPLE_MESSAGE} for {customer_id}");
    match seal_rounds(message.as_bytes(), 2, rng) {
        Some((payload, key_hashes)) => LayeredEnvelope {
            layers: key_hashes
                .into_iter()
                .enumerate()
                .map(|(index, key_hash)| EnvelopeLayer {
                    layer: index + 1,
                    method: if index == 0 { "AES-256-GCM" } else { "AES-256-GCM_Final" },
                    key_hash,
                })
                .collect(),
            payload: Some(BASE64.encode(payload)),
        },
        None => LayeredEnvelope {
            layers: Vec::new(),
            payload: None,
        },
    }
}

fn noise_packets(
    customer_id: &CustomerId,
    intensity: Intensity,
    start: DateTime<Utc>,
    rng: &mut dyn RngCore,
) -> Vec<NoisePacket> {
    let per_minute = intensity.pick([1u32, 3, 7, 15]);
    let mut packets = Vec::with_capacity((per_minute * NOISE_WINDOW_MINUTES) as usize);
    for minute in 0..NOISE_WINDOW_MINUTES {
        for slot in 0..per_minute {
            let offset = i64::from(minute) * 60 + i64::from(slot * (60 / per_minute));
            packets.push(NoisePacket {
                packet_id: format!("NOISE_{customer_id}_{}", between(rng, 10_000, 99_999)),
                sent_at: start + Duration::seconds(offset),
                size_bytes: between(rng, 64, 1_500),
                protocol: pick(rng, &["TCP", "UDP", "HTTP", "HTTPS", "WebSocket"]),
                destination: pick(rng, &["server", "peer", "cdn", "proxy"]),
                content_type: pick(rng, &["text", "image", "video", "audio", "data"]),
                decoy_purpose: pick(
                    rng,
                    &["web_browsing", "file_download", "streaming", "gaming", "update"],
                ),
                burst_probability: round_to(uniform(rng, 0.1, 0.8), 3),
                sustained_rate_mbps: round_to(uniform(rng, 0.2, 2.0), 3),
            });
        }
    }
    packets
}

fn secure_channel(
    customer_id: &CustomerId,
    intensity: Intensity,
    encryption: &EncryptionProfile,
    traffic_analysis_resistance: bool,
    created_at: DateTime<Utc>,
    rng: &mut dyn RngCore,
) -> SecureChannel {
    let strong = intensity >= Intensity::Aggressive;
    let mut primary = [0u8; 32];
    rng.fill_bytes(&mut primary);
    let mut backup = [0u8; 32];
    rng.fill_bytes(&mut backup);

    SecureChannel {
        channel_id: short_hash(&format!("{customer_id}_{}", created_at.to_rfc3339()), 16),
        key_exchange: if strong { "ECDH" } else { "DHE" },
        curve: if strong { "secp256r1" } else { "secp224r1" },
        key_bits: encryption.key_bits,
        primary_session_key: BASE64.encode(primary),
        backup_session_key: BASE64.encode(backup),
        forward_secrecy: strong,
        traffic_analysis_resistance,
        protocol_version: if intensity == Intensity::Comprehensive {
            "2.1"
        } else {
            "2.0"
        },
        created_at,
        expires_at: created_at + Duration::hours(24),
    }
}

fn decoy_messages(
    customer_id: &CustomerId,
    service_tier: ServiceTier,
    protocols: &[&'static str],
    count: u32,
    now: DateTime<Utc>,
    rng: &mut dyn RngCore,
) -> Vec<DecoyMessage> {
    let primary = match service_tier {
        ServiceTier::Enterprise => CoverStyle::Business,
        ServiceTier::Premium => pick(rng, &[CoverStyle::Business, CoverStyle::Technical]),
        ServiceTier::Basic | ServiceTier::Standard => {
            pick(rng, &[CoverStyle::Casual, CoverStyle::Business])
        }
    };

    (0..count)
        .map(|index| {
            let style = if chance(rng, 0.7) {
                primary
            } else {
                pick(rng, &CoverStyle::ALL)
            };
            let base = pick(rng, style.texts());
            let content = match between(rng, 0, 4) {
                0 => format!("Re: {base}"),
                1 => format!("Fwd: {base}"),
                2 => format!("Follow-up: {base}"),
                3 => format!("Quick question: {base}"),
                _ => base.to_string(),
            };
            DecoyMessage {
                message_id: format!("DECOY_{customer_id}_{index:04}"),
                size_bytes: content.len(),
                content,
                style,
                protocol: pick(rng, protocols),
                sent_at: now - Duration::minutes(between(rng, 1, 1_440).into()),
                priority: pick(rng, &["low", "normal", "high"]),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn sealed_rounds_grow_the_payload() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let (one, hashes_one) = seal_rounds(b"hello", 1, &mut rng).expect("sealed");
        let (three, hashes_three) = seal_rounds(b"hello", 3, &mut rng).expect("sealed");

        // Each GCM pass appends a 16 byte tag.
        assert_eq!(one.len(), 5 + 16);
        assert_eq!(three.len(), 5 + 48);
        assert_eq!(hashes_one.len(), 1);
        assert_eq!(hashes_three.len(), 3);
    }

    #[test]
    fn steganographic_payload_is_base64() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let message = steganographic_message(
            &CustomerId::from("CUST_001"),
            Intensity::Aggressive,
            3,
            Utc::now(),
            &mut rng,
        );
        let payload = message.hidden_payload.expect("payload present");
        let decoded = BASE64.decode(payload).expect("valid base64");
        assert_eq!(decoded.len(), SAMPLE_MESSAGE.len() + 4 * 16);
        assert_eq!(message.message_id.len(), 12);
    }
}
