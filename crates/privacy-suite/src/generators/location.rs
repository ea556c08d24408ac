use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::Serialize;

use crate::customers::CustomerId;
use crate::policy::{ActivePolicy, Intensity, Subsystem};

use super::sampling::{between, chance, mac_address, pick, round_to, uniform};
use super::{ArtifactPayload, Generator};

const TRAIL_HOURS: u32 = 12;
/// Rough conversion used for reporting the radius.
const KM_PER_DEGREE: f64 = 111.0;

const CITIES: [(&str, f64, f64); 38] = [
    ("New York", 40.7128, -74.0060),
    ("Los Angeles", 34.0522, -118.2437),
    ("Chicago", 41.8781, -87.6298),
    ("Houston", 29.7604, -95.3698),
    ("Phoenix", 33.4484, -112.0740),
    ("Philadelphia", 39.9526, -75.1652),
    ("San Antonio", 29.4241, -98.4936),
    ("San Diego", 32.7157, -117.1611),
    ("Dallas", 32.7767, -96.7970),
    ("San Jose", 37.3382, -121.8863),
    ("Austin", 30.2672, -97.7431),
    ("Jacksonville", 30.3322, -81.6557),
    ("San Francisco", 37.7749, -122.4194),
    ("Columbus", 39.9612, -82.9988),
    ("Charlotte", 35.2271, -80.8431),
    ("Fort Worth", 32.7555, -97.3308),
    ("Detroit", 42.3314, -83.0458),
    ("El Paso", 31.7619, -106.4850),
    ("Memphis", 35.1495, -90.0490),
    ("Seattle", 47.6062, -122.3321),
    ("Denver", 39.7392, -104.9903),
    ("Washington DC", 38.9072, -77.0369),
    ("Boston", 42.3601, -71.0589),
    ("Nashville", 36.1627, -86.7816),
    ("Baltimore", 39.2904, -76.6122),
    ("Oklahoma City", 35.4676, -97.5164),
    ("Louisville", 38.2527, -85.7585),
    ("Portland", 45.5152, -122.6784),
    ("Las Vegas", 36.1699, -115.1398),
    ("Milwaukee", 43.0389, -87.9065),
    ("Albuquerque", 35.0844, -106.6504),
    ("Tucson", 32.2226, -110.9747),
    ("Fresno", 36.7378, -119.7871),
    ("Sacramento", 38.5816, -121.4944),
    ("Mesa", 33.4152, -111.8315),
    ("Kansas City", 39.0997, -94.5786),
    ("Atlanta", 33.7490, -84.3880),
    ("Miami", 25.7617, -80.1918),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct LocationGenerator;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationDecoys {
    pub cities: Vec<String>,
    pub obfuscation_radius_deg: f64,
    pub obfuscation_radius_km: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gps_fix: Option<GpsFix>,
    pub trail: Vec<TrailPoint>,
    pub wifi: Vec<WifiSignature>,
    pub cell_towers: Vec<CellTower>,
}

impl LocationDecoys {
    pub fn record_count(&self) -> usize {
        usize::from(self.gps_fix.is_some())
            + self.trail.len()
            + self.wifi.len()
            + self.cell_towers.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpsFix {
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: f64,
    pub altitude_m: f64,
    pub speed_mps: f64,
    pub bearing_deg: f64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrailPoint {
    pub sequence: u32,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: f64,
    pub recorded_at: DateTime<Utc>,
    pub jumped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WifiSignature {
    pub bssid: String,
    pub ssid: String,
    pub signal_dbm: i32,
    pub frequency_ghz: f64,
    pub security: &'static str,
    pub channel: u32,
    pub vendor: &'static str,
    pub location_context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellTower {
    pub tower_id: String,
    pub mcc: u32,
    pub mnc: u32,
    pub lac: u32,
    pub cell_id: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub signal_dbm: i32,
    pub technology: &'static str,
    pub frequency_band: &'static str,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Copy)]
struct Anchor {
    name: &'static str,
    latitude: f64,
    longitude: f64,
}

impl Generator for LocationGenerator {
    fn subsystem(&self) -> Subsystem {
        Subsystem::Location
    }

    fn fabricate(
        &self,
        _customer_id: &CustomerId,
        policy: &ActivePolicy,
        generated_at: DateTime<Utc>,
        rng: &mut dyn RngCore,
    ) -> ArtifactPayload {
        let anchors = resolve_cities(&policy.preferred_cities, rng);
        let radius = policy.intensity.pick([0.01, 0.05, 0.1, 0.2]);

        let (gps_fix, trail) = if policy.applies_to("gps_trace") {
            (
                Some(gps_fix(&anchors, radius, policy.intensity, generated_at, rng)),
                trail(&anchors, radius, policy.intensity, generated_at, rng),
            )
        } else {
            (None, Vec::new())
        };

        let wifi = if policy.applies_to("wifi_scan") {
            wifi_networks(&anchors, policy.intensity, rng)
        } else {
            Vec::new()
        };

        let cell_towers = if policy.applies_to("cell_towers") {
            cell_towers(&anchors, policy.intensity, rng)
        } else {
            Vec::new()
        };

        ArtifactPayload::Location(LocationDecoys {
            cities: anchors.iter().map(|anchor| anchor.name.to_string()).collect(),
            obfuscation_radius_deg: radius,
            obfuscation_radius_km: round_to(radius * KM_PER_DEGREE, 2),
            gps_fix,
            trail,
            wifi,
            cell_towers,
        })
    }
}

/// Known coordinates for each preferred city. Unknown names, or an empty
/// list, fall back to a random known city.
fn resolve_cities(preferred: &[String], rng: &mut dyn RngCore) -> Vec<Anchor> {
    let mut anchors = Vec::with_capacity(preferred.len().max(1));
    for city in preferred {
        match CITIES
            .iter()
            .find(|(name, _, _)| name.eq_ignore_ascii_case(city.trim()))
        {
            Some(&(name, latitude, longitude)) => anchors.push(Anchor {
                name,
                latitude,
                longitude,
            }),
            None => {
                let fallback = random_city(rng);
                tracing::debug!(requested = %city, substitute = fallback.name, "unknown city");
                anchors.push(fallback);
            }
        }
    }
    if anchors.is_empty() {
        anchors.push(random_city(rng));
    }
    anchors
}

fn random_city(rng: &mut dyn RngCore) -> Anchor {
    let (name, latitude, longitude) = pick(rng, &CITIES);
    Anchor {
        name,
        latitude,
        longitude,
    }
}

fn accuracy_band(intensity: Intensity) -> (f64, f64) {
    intensity.pick([(3.0, 10.0), (5.0, 30.0), (10.0, 50.0), (20.0, 100.0)])
}

fn gps_fix(
    anchors: &[Anchor],
    radius: f64,
    intensity: Intensity,
    recorded_at: DateTime<Utc>,
    rng: &mut dyn RngCore,
) -> GpsFix {
    let anchor = pick(rng, anchors);
    let (low, high) = accuracy_band(intensity);
    GpsFix {
        city: anchor.name.to_string(),
        latitude: round_to(anchor.latitude + uniform(rng, -radius, radius), 6),
        longitude: round_to(anchor.longitude + uniform(rng, -radius, radius), 6),
        accuracy_m: round_to(uniform(rng, low, high), 1),
        altitude_m: round_to(uniform(rng, 0.0, 100.0), 1),
        speed_mps: round_to(uniform(rng, 0.0, 30.0), 2),
        bearing_deg: round_to(uniform(rng, 0.0, 360.0), 1),
        recorded_at,
    }
}

/// Plausible movement over the last twelve hours: small steps around the
/// current city with an occasional jump to another preferred city.
fn trail(
    anchors: &[Anchor],
    radius: f64,
    intensity: Intensity,
    end: DateTime<Utc>,
    rng: &mut dyn RngCore,
) -> Vec<TrailPoint> {
    let per_hour = intensity.pick([1u32, 2, 4, 6]);
    let total = TRAIL_HOURS * per_hour;
    let step_seconds = i64::from(3_600 / per_hour);
    let start = end - Duration::hours(i64::from(TRAIL_HOURS));

    let mut current = pick(rng, anchors);
    let mut latitude = current.latitude;
    let mut longitude = current.longitude;
    let mut points = Vec::with_capacity(total as usize);

    for sequence in 0..total {
        let jumped = chance(rng, 0.1);
        if jumped {
            current = pick(rng, anchors);
            latitude = current.latitude + uniform(rng, -radius, radius);
            longitude = current.longitude + uniform(rng, -radius, radius);
        } else {
            latitude += uniform(rng, -radius / 10.0, radius / 10.0);
            longitude += uniform(rng, -radius / 10.0, radius / 10.0);
        }
        let noise = radius / 20.0;
        points.push(TrailPoint {
            sequence,
            city: current.name.to_string(),
            latitude: round_to(latitude + uniform(rng, -noise, noise), 6),
            longitude: round_to(longitude + uniform(rng, -noise, noise), 6),
            accuracy_m: round_to(uniform(rng, 5.0, 50.0), 1),
            recorded_at: start + Duration::seconds(i64::from(sequence) * step_seconds),
            jumped,
        });
    }
    points
}

fn wifi_networks(anchors: &[Anchor], intensity: Intensity, rng: &mut dyn RngCore) -> Vec<WifiSignature> {
    let count = intensity.pick([5, 10, 20, 30]);
    (0..count)
        .map(|_| {
            let bssid = mac_address(rng);
            let context = pick(rng, anchors).name;
            let ssid = match between(rng, 0, 5) {
                0 => format!("{}_WiFi_{}", context.replace(' ', ""), between(rng, 1_000, 9_999)),
                1 => format!("Network_{}", between(rng, 1_000, 9_999)),
                2 => format!("Guest_{}", between(rng, 100, 999)),
                3 => format!("Secure_{}", between(rng, 1_000, 9_999)),
                4 => format!("{}Public", context.replace(' ', "")),
                _ => format!("Business_{}", between(rng, 100, 999)),
            };
            WifiSignature {
                bssid,
                ssid,
                signal_dbm: -(between(rng, 30, 80) as i32),
                frequency_ghz: pick(rng, &[2.4, 5.0, 6.0]),
                security: pick(rng, &["WPA2", "WPA3", "Open", "WEP"]),
                channel: between(rng, 1, 165),
                vendor: pick(rng, &["Cisco", "Netgear", "Linksys", "TP-Link", "Unknown"]),
                location_context: context.to_string(),
            }
        })
        .collect()
}

fn cell_towers(anchors: &[Anchor], intensity: Intensity, rng: &mut dyn RngCore) -> Vec<CellTower> {
    let count = intensity.pick([3, 5, 8, 12]);
    (0..count)
        .map(|_| {
            let anchor = pick(rng, anchors);
            CellTower {
                tower_id: format!("CELL_{}", between(rng, 10_000, 99_999)),
                mcc: pick(rng, &[310, 311, 312]),
                mnc: between(rng, 1, 999),
                lac: between(rng, 1_000, 9_999),
                cell_id: between(rng, 100_000, 999_999),
                latitude: round_to(anchor.latitude + uniform(rng, -0.1, 0.1), 6),
                longitude: round_to(anchor.longitude + uniform(rng, -0.1, 0.1), 6),
                signal_dbm: -(between(rng, 50, 110) as i32),
                technology: pick(rng, &["LTE", "5G", "UMTS", "GSM"]),
                frequency_band: pick(rng, &["700MHz", "850MHz", "1900MHz", "2100MHz"]),
                distance_km: round_to(uniform(rng, 0.1, 10.0), 2),
            }
        })
        .collect()
}
