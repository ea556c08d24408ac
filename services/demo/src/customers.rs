use crate::infra::{parse_privacy_tier, parse_protection, parse_service_tier, Session};
use clap::Args;
use privacy_suite::customers::{
    CustomerFilter, CustomerRecord, CustomerUpdate, PrivacyTier, ProtectionToggle, ServiceTier,
};
use privacy_suite::error::AppError;

#[derive(Args, Debug, Default)]
pub(crate) struct ListArgs {
    /// Only customers stored with this privacy level
    #[arg(long, value_parser = parse_privacy_tier)]
    pub(crate) privacy_level: Option<PrivacyTier>,
    /// Only customers stored with this service tier
    #[arg(long, value_parser = parse_service_tier)]
    pub(crate) service_tier: Option<ServiceTier>,
    /// Only customers with this protection switched on (location, communication, biometric)
    #[arg(long, value_parser = parse_protection)]
    pub(crate) protection: Option<ProtectionToggle>,
}

impl ListArgs {
    fn filters(&self) -> Vec<CustomerFilter> {
        let mut filters = Vec::new();
        if let Some(tier) = self.privacy_level {
            filters.push(CustomerFilter::PrivacyLevel(tier));
        }
        if let Some(tier) = self.service_tier {
            filters.push(CustomerFilter::ServiceTier(tier));
        }
        if let Some(toggle) = self.protection {
            filters.push(CustomerFilter::ProtectionEnabled(toggle));
        }
        filters
    }
}

#[derive(Args, Debug)]
pub(crate) struct UpdateArgs {
    /// Customer id to update
    #[arg(long)]
    pub(crate) customer: String,
    #[arg(long)]
    pub(crate) name: Option<String>,
    #[arg(long, value_parser = parse_privacy_tier)]
    pub(crate) privacy_level: Option<PrivacyTier>,
    #[arg(long, value_parser = parse_service_tier)]
    pub(crate) service_tier: Option<ServiceTier>,
    /// Comma-separated device types, replacing the stored list
    #[arg(long, value_delimiter = ',')]
    pub(crate) devices: Option<Vec<String>>,
    /// Comma-separated preferred cities, replacing the stored list
    #[arg(long, value_delimiter = ',')]
    pub(crate) cities: Option<Vec<String>>,
    #[arg(long)]
    pub(crate) location_obfuscation: Option<bool>,
    #[arg(long)]
    pub(crate) communication_encryption: Option<bool>,
    #[arg(long)]
    pub(crate) biometric_protection: Option<bool>,
    /// Number of false identities to generate
    #[arg(long)]
    pub(crate) identity_count: Option<u32>,
}

impl UpdateArgs {
    fn to_update(&self) -> CustomerUpdate {
        CustomerUpdate {
            name: self.name.clone(),
            privacy_level: self.privacy_level.map(|tier| tier.label().to_string()),
            service_tier: self.service_tier.map(|tier| tier.label().to_string()),
            device_types: self.devices.clone(),
            preferred_cities: self.cities.clone(),
            location_obfuscation: self.location_obfuscation,
            communication_encryption: self.communication_encryption,
            biometric_protection: self.biometric_protection,
            identity_multiplication_count: self.identity_count,
        }
    }
}

pub(crate) fn run_list(session: &Session, args: ListArgs) -> Result<(), AppError> {
    let filters = args.filters();
    let records: Vec<&CustomerRecord> = session
        .store
        .list_all()
        .into_iter()
        .filter(|record| filters.iter().all(|filter| filter.matches(record)))
        .collect();

    if records.is_empty() {
        println!("No matching customers.");
        return Ok(());
    }

    for record in records {
        println!("{}", describe(record));
    }
    Ok(())
}

pub(crate) fn run_update(session: &mut Session, args: UpdateArgs) -> Result<(), AppError> {
    let update = args.to_update();
    if update.is_empty() {
        println!("Nothing to update for {}.", args.customer);
        return Ok(());
    }

    session.store.update(&args.customer, &update)?;
    if let Some(record) = session.store.get(&args.customer) {
        println!("Updated {}", describe(record));
    }
    Ok(())
}

fn describe(record: &CustomerRecord) -> String {
    let switches = [
        ProtectionToggle::Location,
        ProtectionToggle::Communication,
        ProtectionToggle::Biometric,
    ]
    .into_iter()
    .map(|toggle| {
        let state = match record.toggle(toggle) {
            Some(true) => "on",
            Some(false) => "off",
            None => "default",
        };
        format!("{}={state}", toggle.field())
    })
    .collect::<Vec<_>>()
    .join(" ");

    format!(
        "{} | {} | privacy {} | service {} | devices {} | {}",
        record.customer_id,
        record.name,
        record.privacy_level.as_deref().unwrap_or("-"),
        record.service_tier.as_deref().unwrap_or("-"),
        record
            .device_types
            .as_ref()
            .map_or_else(|| "-".to_string(), |devices| devices.join(",")),
        switches
    )
}
