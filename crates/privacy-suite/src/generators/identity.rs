use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::Serialize;

use crate::customers::CustomerId;
use crate::policy::{ActivePolicy, Intensity, NameStyle, PolicyFlag, Subsystem};

use super::sampling::{between, chance, pick, pick_many, round_to, short_hash, uniform};
use super::{ArtifactPayload, Generator};

const INTERESTS: [&str; 15] = [
    "technology", "sports", "music", "travel", "cooking", "reading", "photography", "gaming",
    "fitness", "art", "science", "movies", "nature", "fashion", "education",
];

const OCCUPATIONS: [&str; 12] = [
    "Software Engineer", "Teacher", "Designer", "Manager", "Consultant", "Analyst", "Developer",
    "Coordinator", "Specialist", "Administrator", "Technician", "Director",
];

const SOCIAL_PLATFORMS: [&str; 5] = ["twitter", "instagram", "linkedin", "facebook", "tiktok"];

fn first_names(style: NameStyle) -> &'static [&'static str] {
    match style {
        NameStyle::Common => &["Alex", "Jordan", "Taylor", "Casey", "Morgan", "Riley", "Avery", "Quinn"],
        NameStyle::Modern => &["Aiden", "Emma", "Liam", "Olivia", "Noah", "Ava", "Ethan", "Sophia"],
        NameStyle::International => {
            &["Ahmed", "Priya", "Chen", "Maria", "Dimitri", "Yuki", "Hassan", "Elena"]
        }
    }
}

fn last_names(style: NameStyle) -> &'static [&'static str] {
    match style {
        NameStyle::Common => {
            &["Smith", "Johnson", "Williams", "Brown", "Davis", "Miller", "Wilson", "Moore"]
        }
        NameStyle::Modern => &[
            "Anderson", "Taylor", "Thomas", "Jackson", "White", "Harris", "Martin", "Thompson",
        ],
        NameStyle::International => &[
            "Rodriguez", "Martinez", "Garcia", "Kumar", "Chen", "Kim", "Patel", "Singh",
        ],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MailDomainPool {
    Secure,
    Business,
    Common,
}

impl MailDomainPool {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Secure => "secure",
            Self::Business => "business",
            Self::Common => "common",
        }
    }

    fn from_policy(policy: &ActivePolicy) -> Self {
        if policy.has_flag(PolicyFlag::SecureMailDomains) {
            Self::Secure
        } else if policy.has_flag(PolicyFlag::BusinessMailDomains) {
            Self::Business
        } else {
            Self::Common
        }
    }

    fn domains(self) -> &'static [&'static str] {
        match self {
            Self::Secure => &["securemail.com", "privatenet.org", "shieldmail.net", "anonmail.com", "cryptomail.io"],
            Self::Business => &["company.com", "corp.net", "business.org", "enterprise.co", "firm.io"],
            Self::Common => &["gmail.com", "yahoo.com", "outlook.com", "hotmail.com", "icloud.com"],
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityGenerator;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentityBatch {
    pub name_style: NameStyle,
    pub mail_domains: MailDomainPool,
    pub identities: Vec<FalseIdentity>,
    pub lifecycle_events: Vec<LifecycleEvent>,
}

impl IdentityBatch {
    pub fn record_count(&self) -> usize {
        self.identities.len() + self.lifecycle_events.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FalseIdentity {
    pub identity_id: String,
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub activity_score: f64,
    pub digital_fingerprint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended: Option<ExtendedProfile>,
}

impl FalseIdentity {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactProfile {
    pub phone: String,
    pub birth_year: u32,
    pub interests: Vec<&'static str>,
    pub social_handles: BTreeMap<&'static str, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Background {
    pub occupation: &'static str,
    pub education: &'static str,
    pub location_history: Vec<PastResidence>,
    pub primary_device: &'static str,
    pub browser: &'static str,
    pub daily_screen_hours: f64,
    pub social_activity: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PastResidence {
    pub city: &'static str,
    pub months: u32,
    pub purpose: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtendedProfile {
    pub income_bracket: &'static str,
    pub spending_pattern: &'static str,
    pub fitness_level: &'static str,
    pub travel_frequency: &'static str,
    pub purchase_categories: Vec<&'static str>,
    pub connection_count: u32,
    pub network_density: f64,
    pub primary_groups: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifecycleEvent {
    pub identity_id: String,
    pub event_type: &'static str,
    pub platform: &'static str,
    pub occurred_at: DateTime<Utc>,
    pub risk_score: f64,
}

impl Generator for IdentityGenerator {
    fn subsystem(&self) -> Subsystem {
        Subsystem::Identity
    }

    fn fabricate(
        &self,
        customer_id: &CustomerId,
        policy: &ActivePolicy,
        generated_at: DateTime<Utc>,
        rng: &mut dyn RngCore,
    ) -> ArtifactPayload {
        let name_style = policy.name_style.unwrap_or(NameStyle::Common);
        let mail_domains = MailDomainPool::from_policy(policy);

        let identities: Vec<FalseIdentity> = (0..policy.identity_count)
            .map(|index| {
                identity(
                    customer_id,
                    index,
                    policy.intensity,
                    name_style,
                    mail_domains,
                    generated_at,
                    rng,
                )
            })
            .collect();

        let lifecycle_events = identities
            .first()
            .map(|first| lifecycle(first, generated_at, rng))
            .unwrap_or_default();

        ArtifactPayload::Identity(IdentityBatch {
            name_style,
            mail_domains,
            identities,
            lifecycle_events,
        })
    }
}

fn identity(
    customer_id: &CustomerId,
    index: u32,
    intensity: Intensity,
    style: NameStyle,
    pool: MailDomainPool,
    now: DateTime<Utc>,
    rng: &mut dyn RngCore,
) -> FalseIdentity {
    let first_name = pick(rng, first_names(style));
    let last_name = pick(rng, last_names(style));
    let email = email_address(first_name, last_name, pool, rng);
    let digital_fingerprint = short_hash(&format!("{customer_id}{first_name}{last_name}{email}{index}"), 16);

    FalseIdentity {
        identity_id: format!("ID_{}", between(rng, 100_000, 999_999)),
        first_name,
        last_name,
        created_at: now - Duration::days(between(rng, 1, 365).into()),
        activity_score: round_to(uniform(rng, 0.1, 1.0), 3),
        digital_fingerprint,
        email,
        contact: (intensity >= Intensity::Standard)
            .then(|| contact(first_name, last_name, rng)),
        background: (intensity >= Intensity::Aggressive).then(|| background(rng)),
        extended: (intensity >= Intensity::Comprehensive).then(|| extended(rng)),
    }
}

fn email_address(first: &str, last: &str, pool: MailDomainPool, rng: &mut dyn RngCore) -> String {
    let first = first.to_ascii_lowercase();
    let last = last.to_ascii_lowercase();
    let initial = |value: &str| value.chars().next().map(String::from).unwrap_or_default();
    let local = match between(rng, 0, 5) {
        0 => format!("{first}.{last}"),
        1 => format!("{first}{last}"),
        2 => format!("{first}_{last}"),
        3 => format!("{}{last}", initial(&first)),
        4 => format!("{first}.{}", initial(&last)),
        _ => format!("{first}{}", between(rng, 1, 999)),
    };
    format!("{local}@{}", pick(rng, pool.domains()))
}

fn contact(first: &str, last: &str, rng: &mut dyn RngCore) -> ContactProfile {
    let area = pick(rng, &["212", "213", "312", "415", "617", "713", "202", "305", "404", "503"]);
    let phone = format!("+1-{area}-{}-{}", between(rng, 200, 999), between(rng, 1_000, 9_999));
    let interest_count = between(rng, 2, 5) as usize;
    let interests = pick_many(rng, &INTERESTS, interest_count);

    let first = first.to_ascii_lowercase();
    let last = last.to_ascii_lowercase();
    let mut social_handles = BTreeMap::new();
    for platform in SOCIAL_PLATFORMS {
        if chance(rng, 0.7) {
            let handle = match between(rng, 0, 4) {
                0 => format!("{first}_{last}"),
                1 => format!("{first}{last}"),
                2 => format!("{first}{}", between(rng, 10, 99)),
                3 => format!("{last}_{first}"),
                _ => format!("{first}_{}", between(rng, 100, 999)),
            };
            social_handles.insert(platform, handle);
        }
    }

    ContactProfile {
        phone,
        birth_year: between(rng, 1970, 2005),
        interests,
        social_handles,
    }
}

fn background(rng: &mut dyn RngCore) -> Background {
    let residences = between(rng, 2, 5);
    let location_history = (0..residences)
        .map(|_| PastResidence {
            city: pick(rng, &["New York", "Los Angeles", "Chicago", "Houston", "Phoenix"]),
            months: between(rng, 6, 36),
            purpose: pick(rng, &["work", "education", "family", "personal"]),
        })
        .collect();

    Background {
        occupation: pick(rng, &OCCUPATIONS),
        education: pick(rng, &["High School", "Bachelor's", "Master's", "PhD"]),
        location_history,
        primary_device: pick(rng, &["iPhone", "Android", "Windows Phone"]),
        browser: pick(rng, &["Chrome", "Firefox", "Safari", "Edge"]),
        daily_screen_hours: round_to(uniform(rng, 2.0, 12.0), 1),
        social_activity: pick(rng, &["lurker", "occasional_poster", "active", "influencer"]),
    }
}

fn extended(rng: &mut dyn RngCore) -> ExtendedProfile {
    let purchase_count = between(rng, 3, 6) as usize;
    let group_count = between(rng, 2, 4) as usize;
    ExtendedProfile {
        income_bracket: pick(rng, &["low", "medium", "high", "very_high"]),
        spending_pattern: pick(rng, &["conservative", "moderate", "liberal", "impulsive"]),
        fitness_level: pick(
            rng,
            &["sedentary", "lightly_active", "moderately_active", "very_active"],
        ),
        travel_frequency: pick(rng, &["never", "rarely", "occasionally", "frequently"]),
        purchase_categories: pick_many(
            rng,
            &["electronics", "clothing", "food", "entertainment", "travel", "books", "health"],
            purchase_count,
        ),
        connection_count: between(rng, 50, 500),
        network_density: round_to(uniform(rng, 0.1, 0.8), 3),
        primary_groups: pick_many(
            rng,
            &["family", "work", "school", "hobby", "neighborhood"],
            group_count,
        ),
    }
}

/// Account history for one identity, oldest first.
fn lifecycle(identity: &FalseIdentity, now: DateTime<Utc>, rng: &mut dyn RngCore) -> Vec<LifecycleEvent> {
    let mut events = vec![LifecycleEvent {
        identity_id: identity.identity_id.clone(),
        event_type: "account_creation",
        platform: "primary_email",
        occurred_at: identity.created_at,
        risk_score: 0.0,
    }];

    let count = between(rng, 5, 15);
    for _ in 0..count {
        events.push(LifecycleEvent {
            identity_id: identity.identity_id.clone(),
            event_type: pick(
                rng,
                &[
                    "password_change",
                    "profile_update",
                    "privacy_setting_change",
                    "device_addition",
                    "location_change",
                    "activity_spike",
                ],
            ),
            platform: pick(rng, &["email", "social_media", "banking", "shopping", "work"]),
            occurred_at: now - Duration::days(between(rng, 1, 300).into()),
            risk_score: round_to(uniform(rng, 0.1, 0.5), 3),
        });
    }

    events.sort_by_key(|event| event.occurred_at);
    events
}
