use std::fmt::{self, Write};

use crate::generators::{
    ArtifactPayload, BiometricPlan, CommunicationShield, DeviceSignatureSet, GeneratedArtifact,
    IdentityBatch, LocationDecoys,
};
use crate::policy::Subsystem;

use super::super::ProtectionProfile;

const FOOTER: &str = "*Generated by Privacy Protection Suite v2.0*";

/// Renders the customer-facing Markdown report for a profile.
pub fn render_markdown(profile: &ProtectionProfile) -> String {
    let mut out = String::new();
    // fmt::Write into a String does not fail.
    let _ = write_report(&mut out, profile);
    out
}

fn write_report(out: &mut String, profile: &ProtectionProfile) -> fmt::Result {
    let prefs = &profile.preferences;
    writeln!(out, "# Privacy Protection Report")?;
    writeln!(
        out,
        "**Customer:** {} ({})",
        profile.customer_name, profile.customer_id
    )?;
    writeln!(out, "**Privacy Level:** {}", title_case(prefs.privacy_tier.label()))?;
    writeln!(out, "**Service Tier:** {}", title_case(prefs.service_tier.label()))?;
    writeln!(
        out,
        "**Report Generated:** {}",
        profile.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(out)?;
    writeln!(out, "## Protection Components Summary")?;

    for (index, subsystem) in Subsystem::ordered().into_iter().enumerate() {
        writeln!(out)?;
        writeln!(out, "### {}. {}", index + 1, section_title(subsystem))?;
        match profile.artifact(subsystem) {
            Some(artifact) => write_section(out, artifact)?,
            None => writeln!(out, "- **Status:** not generated")?,
        }
    }

    writeln!(out)?;
    writeln!(out, "## Summary")?;
    writeln!(
        out,
        "This privacy protection profile covers {} of {} protection systems. \
         The configuration is tuned for the {} privacy level with {} service tier features.",
        profile.active_subsystems().count(),
        Subsystem::ordered().len(),
        prefs.privacy_tier.label(),
        prefs.service_tier.label()
    )?;
    writeln!(out)?;
    writeln!(out, "---")?;
    writeln!(out, "{FOOTER}")
}

fn section_title(subsystem: Subsystem) -> &'static str {
    match subsystem {
        Subsystem::DeviceSignatures => "COBRA Device Signatures",
        other => other.label(),
    }
}

fn write_section(out: &mut String, artifact: &GeneratedArtifact) -> fmt::Result {
    let intensity = artifact
        .intensity
        .map_or("unknown", |intensity| intensity.label());
    match &artifact.payload {
        ArtifactPayload::Disabled | ArtifactPayload::NotApplicable { .. } => {
            writeln!(out, "- **Status:** {}", artifact.status_label())
        }
        ArtifactPayload::DeviceSignatures(set) => write_device_signatures(out, set),
        ArtifactPayload::Location(decoys) => write_location(out, decoys),
        ArtifactPayload::Identity(batch) => write_identity(out, batch, intensity),
        ArtifactPayload::Communication(shield) => write_communication(out, shield),
        ArtifactPayload::Biometric(plan) => write_biometric(out, plan, intensity),
    }
}

fn write_device_signatures(out: &mut String, set: &DeviceSignatureSet) -> fmt::Result {
    writeln!(
        out,
        "- **Digital Signatures Generated:** {}",
        set.signatures.len()
    )?;
    writeln!(out, "- **Device Coverage:** {} data streams", set.streams.len())?;
    writeln!(
        out,
        "- **Device Types:** {}",
        set.fingerprint.device_types.join(", ")
    )?;
    writeln!(
        out,
        "- **Noise Signatures:** {} over {} minutes",
        set.noise.len(),
        set.noise_window_minutes
    )
}

fn write_location(out: &mut String, decoys: &LocationDecoys) -> fmt::Result {
    writeln!(
        out,
        "- **Obfuscation Radius:** {:.1} km",
        decoys.obfuscation_radius_km
    )?;
    writeln!(out, "- **Decoy Cities:** {}", decoys.cities.join(", "))?;
    if let Some(fix) = &decoys.gps_fix {
        writeln!(
            out,
            "- **False GPS Fix:** {} ({:.4}, {:.4}), accuracy {:.0} m",
            fix.city, fix.latitude, fix.longitude, fix.accuracy_m
        )?;
    }
    writeln!(out, "- **Location Trail Points:** {}", decoys.trail.len())?;
    writeln!(out, "- **WiFi Signatures:** {}", decoys.wifi.len())?;
    writeln!(out, "- **Cellular Towers:** {}", decoys.cell_towers.len())
}

fn write_identity(out: &mut String, batch: &IdentityBatch, intensity: &str) -> fmt::Result {
    writeln!(
        out,
        "- **False Identities Generated:** {}",
        batch.identities.len()
    )?;
    writeln!(out, "- **Complexity Level:** {intensity}")?;
    writeln!(out, "- **Name Style:** {}", batch.name_style.label())?;
    writeln!(out, "- **Email Domain Type:** {}", batch.mail_domains.label())?;
    if let Some(sample) = batch.identities.first() {
        writeln!(
            out,
            "- **Sample Identity:** {} <{}>",
            sample.full_name(),
            sample.email
        )?;
    }
    writeln!(
        out,
        "- **Lifecycle Events (Sample):** {}",
        batch.lifecycle_events.len()
    )
}

fn write_communication(out: &mut String, shield: &CommunicationShield) -> fmt::Result {
    writeln!(
        out,
        "- **Encryption Level:** {} ({}-bit, {} rounds)",
        shield.encryption.level, shield.encryption.key_bits, shield.encryption.rounds
    )?;
    writeln!(
        out,
        "- **Steganography:** {}",
        enabled(shield.steganography.is_some())
    )?;
    writeln!(
        out,
        "- **Multi-Layer Encryption:** {}",
        enabled(shield.layered_envelope.is_some())
    )?;
    writeln!(out, "- **Noise Generation:** {}", enabled(!shield.noise.is_empty()))?;
    writeln!(out, "- **Secure Channel ID:** {}", shield.channel.channel_id)?;
    writeln!(
        out,
        "- **Forward Secrecy:** {}",
        if shield.channel.forward_secrecy {
            "Yes"
        } else {
            "No"
        }
    )?;
    writeln!(
        out,
        "- **Communication Noise Packets:** {}",
        shield.noise.len()
    )?;
    writeln!(out, "- **Decoy Communications:** {}", shield.decoys.len())
}

fn write_biometric(out: &mut String, plan: &BiometricPlan, intensity: &str) -> fmt::Result {
    writeln!(out, "- **Protection Intensity:** {intensity}")?;
    let modalities: Vec<&str> = plan.modalities.iter().map(|entry| entry.modality).collect();
    writeln!(out, "- **Applicable Biometrics:** {}", modalities.join(", "))?;
    writeln!(out, "- **Active Countermeasures:**")?;
    for entry in &plan.modalities {
        writeln!(
            out,
            "  - **{}:** {}",
            title_case(entry.modality),
            entry.techniques.join(", ")
        )?;
    }
    if let Some(multi_modal) = &plan.multi_modal {
        writeln!(
            out,
            "- **Multi-Modal Coordination:** {} modality pairs",
            multi_modal.coordination.len()
        )?;
    }
    Ok(())
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "Enabled"
    } else {
        "Disabled"
    }
}

/// `facial_recognition` -> `Facial Recognition`.
fn title_case(value: &str) -> String {
    value
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::title_case;

    #[test]
    fn title_case_splits_snake_case_words() {
        assert_eq!(title_case("facial_recognition"), "Facial Recognition");
        assert_eq!(title_case("maximum"), "Maximum");
        assert_eq!(title_case(""), "");
    }
}
