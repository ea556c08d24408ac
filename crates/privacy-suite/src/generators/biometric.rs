use std::f64::consts::PI;

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::Serialize;

use crate::customers::CustomerId;
use crate::policy::{ActivePolicy, Intensity, PolicyFlag, Subsystem};

use super::sampling::{between, pick, pick_many, round_to, uniform};
use super::{ArtifactPayload, Generator};

const LANDMARK_GROUPS: [(&str, u32, u32); 9] = [
    ("jaw_line", 0, 17),
    ("right_eyebrow", 17, 22),
    ("left_eyebrow", 22, 27),
    ("nose_bridge", 27, 31),
    ("nose_tip", 31, 36),
    ("right_eye", 36, 42),
    ("left_eye", 42, 48),
    ("mouth_outer", 48, 60),
    ("mouth_inner", 60, 68),
];
const LANDMARK_COUNT: u32 = 68;
const LIGHTING_ZONES: [&str; 6] = [
    "forehead",
    "left_cheek",
    "right_cheek",
    "nose",
    "chin",
    "around_eyes",
];
const TYPING_SAMPLES: [&str; 8] = [
    "password",
    "username",
    "the quick brown fox",
    "1234567890",
    "qwertyuiop",
    "common",
    "privacy",
    "security",
];

/// Techniques per modality, strongest last. An intensity unlocks the first
/// `scale()` entries.
fn techniques(modality: &str) -> &'static [&'static str] {
    match modality {
        "facial_recognition" => &[
            "landmark_modification",
            "texture_variation",
            "lighting_manipulation",
            "geometric_distortion",
        ],
        "fingerprint" => &[
            "ridge_pattern_variation",
            "minutiae_modification",
            "pressure_variation",
            "temperature_masking",
        ],
        "voice_print" => &[
            "pitch_modulation",
            "formant_shifting",
            "noise_injection",
            "prosody_alteration",
        ],
        "gait_analysis" => &[
            "step_timing_variation",
            "posture_modification",
            "stride_length_change",
            "ground_contact_pattern",
        ],
        "keystroke_dynamics" => &[
            "typing_rhythm_variation",
            "pressure_modulation",
            "dwell_time_change",
            "flight_time_alteration",
        ],
        "behavioral_patterns" => &[
            "routine_shuffling",
            "app_usage_masking",
            "dwell_pattern_variation",
            "interaction_timing_jitter",
        ],
        _ => &[],
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BiometricGenerator;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiometricPlan {
    pub continuous_protection: bool,
    pub adaptive_countermeasures: bool,
    pub modalities: Vec<ModalityCountermeasure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_modal: Option<MultiModalPlan>,
}

impl BiometricPlan {
    pub fn record_count(&self) -> usize {
        let modalities: usize = self
            .modalities
            .iter()
            .map(ModalityCountermeasure::record_count)
            .sum();
        modalities + self.multi_modal.as_ref().map_or(0, |plan| plan.coordination.len())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModalityCountermeasure {
    pub modality: &'static str,
    pub techniques: Vec<&'static str>,
    pub detail: CountermeasureDetail,
}

impl ModalityCountermeasure {
    fn record_count(&self) -> usize {
        let detail = match &self.detail {
            CountermeasureDetail::Facial(map) => {
                map.landmarks.len()
                    + map.lighting.len()
                    + map.transforms.len()
                    + map.textures.len()
                    + map.temporal.len()
            }
            CountermeasureDetail::Gait(gait) => gait.ground_contact_pattern.len(),
            CountermeasureDetail::Keystroke(keys) => keys.patterns.len(),
            CountermeasureDetail::Voice(_) => 1,
            CountermeasureDetail::Settings(settings) => settings.len(),
        };
        self.techniques.len() + detail
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "parameters", rename_all = "snake_case")]
pub enum CountermeasureDetail {
    Facial(FaceVariationMap),
    Gait(GaitModification),
    Keystroke(KeystrokeVariation),
    Voice(VoiceModification),
    Settings(Vec<TechniqueSetting>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaceVariationMap {
    pub landmarks: Vec<LandmarkOffset>,
    pub lighting: Vec<LightingAdjustment>,
    pub transforms: Vec<GeometricTransform>,
    pub textures: Vec<TextureModification>,
    pub temporal: Vec<TemporalDrift>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandmarkOffset {
    pub landmark_id: u32,
    pub feature_group: &'static str,
    pub x_offset: f64,
    pub y_offset: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightingAdjustment {
    pub zone: &'static str,
    pub brightness_delta: f64,
    pub contrast_delta: f64,
    pub shadow_intensity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometricTransform {
    pub transform: &'static str,
    pub magnitude: f64,
    pub application_probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextureModification {
    pub modification: &'static str,
    pub strength: f64,
    pub regions: Vec<&'static str>,
    pub blending_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalDrift {
    pub hour: u32,
    pub landmark_drift: f64,
    pub lighting_cycle: f64,
    pub expression_bias: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaitModification {
    pub step_length_factor: f64,
    pub step_width_factor: f64,
    pub cadence_factor: f64,
    pub stance_time_ratio: f64,
    pub knee_angle_offset_deg: f64,
    pub hip_angle_offset_deg: f64,
    pub ground_contact_pattern: Vec<f64>,
    pub surface_adjustments: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeystrokeVariation {
    pub patterns: Vec<TypingPattern>,
    pub burst_typing_probability: f64,
    pub pause_insertion_rate: f64,
    pub typo_insertion_rate: f64,
    pub fatigue_simulation: bool,
    pub stress_response_simulation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypingPattern {
    pub sequence: &'static str,
    pub dwell_ms: Vec<f64>,
    pub flight_ms: Vec<f64>,
    pub typing_speed_wpm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceModification {
    pub pitch_shift_semitones: f64,
    pub vibrato: bool,
    pub f1_shift_hz: f64,
    pub f2_shift_hz: f64,
    pub f3_shift_hz: f64,
    pub speech_rate_multiplier: f64,
    pub intonation_contour: &'static str,
    pub background_noise: &'static str,
    pub snr_db: f64,
    pub dynamic_noise: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechniqueSetting {
    pub technique: &'static str,
    pub strength: f64,
    pub application_probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiModalPlan {
    pub coordination: Vec<CoordinationPair>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinationPair {
    pub modalities: (&'static str, &'static str),
    pub synchronization: f64,
    pub mutual_reinforcement: f64,
    pub conflict_resolution: &'static str,
}

impl Generator for BiometricGenerator {
    fn subsystem(&self) -> Subsystem {
        Subsystem::Biometric
    }

    fn fabricate(
        &self,
        _customer_id: &CustomerId,
        policy: &ActivePolicy,
        _generated_at: DateTime<Utc>,
        rng: &mut dyn RngCore,
    ) -> ArtifactPayload {
        let intensity = policy.intensity;
        let modalities: Vec<ModalityCountermeasure> = policy
            .applicability
            .iter()
            .map(|&modality| ModalityCountermeasure {
                modality,
                techniques: techniques(modality)
                    .iter()
                    .take(intensity.scale())
                    .copied()
                    .collect(),
                detail: match modality {
                    "facial_recognition" => CountermeasureDetail::Facial(face_map(intensity, rng)),
                    "gait_analysis" => CountermeasureDetail::Gait(gait(intensity, rng)),
                    "keystroke_dynamics" => {
                        CountermeasureDetail::Keystroke(keystrokes(intensity, rng))
                    }
                    "voice_print" => CountermeasureDetail::Voice(voice(intensity, rng)),
                    other => CountermeasureDetail::Settings(settings(other, intensity, rng)),
                },
            })
            .collect();

        let multi_modal = policy
            .has_flag(PolicyFlag::MultiModalProtection)
            .then(|| coordination(&modalities, rng));

        ArtifactPayload::Biometric(BiometricPlan {
            continuous_protection: policy.has_flag(PolicyFlag::ContinuousProtection),
            adaptive_countermeasures: policy.has_flag(PolicyFlag::AdaptiveCountermeasures),
            modalities,
            multi_modal,
        })
    }
}

fn landmark_group(id: u32) -> &'static str {
    LANDMARK_GROUPS
        .iter()
        .find(|(_, start, end)| (*start..*end).contains(&id))
        .map_or("unknown", |&(name, _, _)| name)
}

fn face_map(intensity: Intensity, rng: &mut dyn RngCore) -> FaceVariationMap {
    let (offset, lighting, geometric) = intensity.pick([
        (1.0, 0.2, 0.05),
        (2.0, 0.4, 0.1),
        (3.5, 0.6, 0.2),
        (5.0, 0.8, 0.3),
    ]);

    let landmarks = (0..LANDMARK_COUNT)
        .map(|landmark_id| {
            let feature_group = landmark_group(landmark_id);
            let reach = match feature_group {
                "right_eye" | "left_eye" | "nose_tip" => offset * 1.5,
                _ => offset,
            };
            LandmarkOffset {
                landmark_id,
                feature_group,
                x_offset: round_to(uniform(rng, -reach, reach), 3),
                y_offset: round_to(uniform(rng, -reach, reach), 3),
                confidence: round_to(uniform(rng, 0.7, 1.0), 3),
            }
        })
        .collect();

    let lighting = LIGHTING_ZONES
        .iter()
        .map(|&zone| LightingAdjustment {
            zone,
            brightness_delta: round_to(uniform(rng, -lighting, lighting), 3),
            contrast_delta: round_to(uniform(rng, -lighting, lighting), 3),
            shadow_intensity: round_to(uniform(rng, 0.0, lighting), 3),
        })
        .collect();

    let transforms = ["rotation", "scale", "shear", "perspective"]
        .into_iter()
        .map(|transform| GeometricTransform {
            transform,
            magnitude: round_to(
                match transform {
                    "rotation" => uniform(rng, -geometric * 10.0, geometric * 10.0),
                    "scale" => uniform(rng, 1.0 - geometric, 1.0 + geometric),
                    "shear" => uniform(rng, -geometric, geometric),
                    _ => uniform(rng, 0.0, geometric),
                },
                4,
            ),
            application_probability: round_to(uniform(rng, 0.3, 0.8), 3),
        })
        .collect();

    let textures = if intensity >= Intensity::Aggressive {
        ["skin_smoothing", "pore_enhancement", "wrinkle_variation", "color_shift"]
            .into_iter()
            .map(|modification| {
                let region_count = between(rng, 1, 3) as usize;
                TextureModification {
                    modification,
                    strength: round_to(uniform(rng, 0.1, 0.4), 3),
                    regions: pick_many(rng, &["forehead", "cheeks", "nose", "chin"], region_count),
                    blending_factor: round_to(uniform(rng, 0.6, 0.9), 3),
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    let temporal = if intensity == Intensity::Comprehensive {
        (0..24)
            .map(|hour| TemporalDrift {
                hour,
                landmark_drift: round_to(uniform(rng, 0.1, 0.3), 3),
                lighting_cycle: round_to((f64::from(hour) * PI / 12.0).sin() * 0.2, 4),
                expression_bias: pick(rng, &["neutral", "slight_smile", "focused", "relaxed"]),
            })
            .collect()
    } else {
        Vec::new()
    };

    FaceVariationMap {
        landmarks,
        lighting,
        transforms,
        textures,
        temporal,
    }
}

fn gait(intensity: Intensity, rng: &mut dyn RngCore) -> GaitModification {
    let (step, cadence, posture) = intensity.pick([
        (0.05, 0.03, 0.02),
        (0.1, 0.05, 0.05),
        (0.15, 0.08, 0.1),
        (0.2, 0.12, 0.15),
    ]);
    GaitModification {
        step_length_factor: round_to(uniform(rng, 1.0 - step, 1.0 + step), 3),
        step_width_factor: round_to(uniform(rng, 1.0 - step / 2.0, 1.0 + step / 2.0), 3),
        cadence_factor: round_to(uniform(rng, 1.0 - cadence, 1.0 + cadence), 3),
        stance_time_ratio: round_to(uniform(rng, 0.6 - cadence, 0.8 + cadence), 3),
        knee_angle_offset_deg: round_to(uniform(rng, -posture * 5.0, posture * 5.0), 3),
        hip_angle_offset_deg: round_to(uniform(rng, -posture * 8.0, posture * 8.0), 3),
        ground_contact_pattern: (0..10).map(|_| round_to(uniform(rng, 0.2, 1.0), 3)).collect(),
        surface_adjustments: intensity == Intensity::Comprehensive,
    }
}

fn keystrokes(intensity: Intensity, rng: &mut dyn RngCore) -> KeystrokeVariation {
    let (low, high) = match intensity {
        Intensity::Comprehensive => (0.7, 1.4),
        Intensity::Aggressive => (0.8, 1.3),
        Intensity::Minimal | Intensity::Standard => (0.9, 1.2),
    };

    let patterns = TYPING_SAMPLES
        .iter()
        .map(|&sequence| {
            let keys = sequence.chars().count();
            let mut dwell_ms = Vec::with_capacity(keys);
            let mut flight_ms = Vec::with_capacity(keys.saturating_sub(1));
            for index in 0..keys {
                let variation = uniform(rng, low, high);
                dwell_ms.push(round_to(uniform(rng, 80.0, 150.0) * variation, 1));
                if index + 1 < keys {
                    flight_ms.push(round_to(uniform(rng, 50.0, 200.0) * variation, 1));
                }
            }
            TypingPattern {
                sequence,
                dwell_ms,
                flight_ms,
                typing_speed_wpm: round_to(uniform(rng, 40.0, 80.0), 1),
            }
        })
        .collect();

    KeystrokeVariation {
        patterns,
        burst_typing_probability: round_to(uniform(rng, 0.1, 0.3), 3),
        pause_insertion_rate: round_to(uniform(rng, 0.05, 0.15), 3),
        typo_insertion_rate: round_to(uniform(rng, 0.01, 0.04), 3),
        fatigue_simulation: intensity >= Intensity::Aggressive,
        stress_response_simulation: intensity == Intensity::Comprehensive,
    }
}

fn voice(intensity: Intensity, rng: &mut dyn RngCore) -> VoiceModification {
    let pitch_scale = if intensity == Intensity::Comprehensive { 2.0 } else { 1.0 };
    VoiceModification {
        pitch_shift_semitones: round_to(uniform(rng, -2.0, 2.0) * pitch_scale, 2),
        vibrato: intensity >= Intensity::Aggressive,
        f1_shift_hz: round_to(uniform(rng, -50.0, 50.0), 1),
        f2_shift_hz: round_to(uniform(rng, -100.0, 100.0), 1),
        f3_shift_hz: round_to(uniform(rng, -150.0, 150.0), 1),
        speech_rate_multiplier: round_to(uniform(rng, 0.85, 1.15), 3),
        intonation_contour: pick(rng, &["rising", "falling", "plateau", "variable"]),
        background_noise: pick(rng, &["white", "pink", "brown", "traffic", "crowd"]),
        snr_db: round_to(uniform(rng, 15.0, 35.0), 1),
        dynamic_noise: intensity == Intensity::Comprehensive,
    }
}

fn settings(modality: &str, intensity: Intensity, rng: &mut dyn RngCore) -> Vec<TechniqueSetting> {
    let ceiling = 0.25 * intensity.scale() as f64;
    techniques(modality)
        .iter()
        .take(intensity.scale())
        .map(|&technique| TechniqueSetting {
            technique,
            strength: round_to(uniform(rng, 0.05, ceiling), 3),
            application_probability: round_to(uniform(rng, 0.3, 0.9), 3),
        })
        .collect()
}

fn coordination(modalities: &[ModalityCountermeasure], rng: &mut dyn RngCore) -> MultiModalPlan {
    let mut pairs = Vec::new();
    for (index, first) in modalities.iter().enumerate() {
        for second in &modalities[index + 1..] {
            pairs.push(CoordinationPair {
                modalities: (first.modality, second.modality),
                synchronization: round_to(uniform(rng, 0.7, 0.95), 3),
                mutual_reinforcement: round_to(uniform(rng, 0.6, 0.9), 3),
                conflict_resolution: pick(
                    rng,
                    &["priority_based", "weighted_average", "adaptive_blend"],
                ),
            });
        }
    }
    MultiModalPlan { coordination: pairs }
}
