use std::path::Path;

use chrono::{NaiveDate, Utc};
use serde_json::{Value, json};

use crate::error::AppError;
use crate::models::Record;

/// Which built-in initial record the intake form starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultsProfile {
    /// Cloud-hosted request for the school domain.
    Standard,
    /// On-premises request hosted in the data center.
    OnPrem,
}

impl std::str::FromStr for DefaultsProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "" => Ok(DefaultsProfile::Standard),
            "on_prem" | "on-prem" | "onprem" => Ok(DefaultsProfile::OnPrem),
            other => Err(format!("unknown defaults profile '{other}'")),
        }
    }
}

impl DefaultsProfile {
    /// The initial record for this profile with `dateRequested` set to `today`.
    pub fn record(self, today: NaiveDate) -> Record {
        let (domain, azure, on_prem, data_center, azure_type, azure_volume, on_prem_storage) =
            match self {
                DefaultsProfile::Standard => ("School", "Yes", "No", "No", "Blob", "300TB", "No"),
                DefaultsProfile::OnPrem => ("District", "No", "Yes", "Yes", "None", "0TB", "Yes"),
            };

        let fields: [(&str, Value); 39] = [
            ("appName", json!("")),
            ("requestor", json!("")),
            ("appOwner", json!("")),
            ("l1Leadership", json!("")),
            ("dateRequested", json!(today.format("%Y-%m-%d").to_string())),
            ("domain", json!(domain)),
            ("fundingAvailable", json!("No")),
            ("fundCode", json!("")),
            ("asgIrb", json!("Pending")),

            ("azure", json!(azure)),
            ("onPrem", json!(on_prem)),
            ("dataCenterLocation", json!(data_center)),
            ("physical", json!("No")),
            ("locationPhysicalReason", json!("")),

            ("prodServerCount", json!(1)),
            ("nonProdServerCount", json!(0)),
            ("drServerCount", json!(0)),

            ("prodEnv", json!("Yes")),
            ("nonProdEnv", json!("No")),
            ("drEnv", json!("No")),

            ("cmsFullSupport", json!("Yes")),
            ("cmsExceptions", json!("")),

            ("sql", json!("Yes")),
            ("oracle", json!("No")),
            ("otherDb", json!("No")),
            ("otherDbExplain", json!("")),

            ("azureType", json!(azure_type)),
            ("azureVolume", json!(azure_volume)),
            ("onPremStorage", json!(on_prem_storage)),
            ("onPremVolume", json!("No")),

            ("backup", json!("Yes")),
            ("dr", json!("No")),
            ("physical_exceptions", json!("No")),
            ("physicalReason", json!("")),
            ("onPremExceptions", json!("No")),
            ("onPremReason", json!("")),
            ("noTestEnvSignOff", json!("Pending")),

            ("otherNotes", json!("• DB size 10G\n• SQL on VM:\n  • 4 vCPU & 32G RAM\n  • Windows 2022 license\n• Azure SQL MI\n• Azure SQL DB")),

            ("tabManagerSignoff", json!("No")),
        ];

        fields
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    }
}

/// Initial field values for a new submission.
#[derive(Debug, Clone)]
pub struct FormDefaults {
    record: Record,
}

impl FormDefaults {
    pub fn from_profile(profile: DefaultsProfile) -> Self {
        FormDefaults {
            record: profile.record(Utc::now().date_naive()),
        }
    }

    /// Start from `profile` and overlay the JSON object in `path`, if any.
    pub async fn load(profile: DefaultsProfile, path: Option<&Path>) -> Result<Self, AppError> {
        let mut defaults = Self::from_profile(profile);

        if let Some(path) = path {
            let bytes = tokio::fs::read(path).await.map_err(|e| {
                AppError::Config(format!("reading defaults file {}: {e}", path.display()))
            })?;
            let overrides: Record = serde_json::from_slice(&bytes).map_err(|e| {
                AppError::Config(format!("defaults file {} is not a JSON object: {e}", path.display()))
            })?;
            tracing::debug!(
                "Applying {} default overrides from {}",
                overrides.len(),
                path.display()
            );
            defaults.overlay(overrides);
        }

        Ok(defaults)
    }

    pub fn overlay(&mut self, fields: Record) {
        for (key, value) in fields {
            self.record.insert(key, value);
        }
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Fill a new submission: defaults first, `input` wins on conflicts.
    pub fn fill(&self, input: Record) -> Record {
        let mut record = self.record.clone();
        for (key, value) in input {
            record.insert(key, value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
    }

    #[test]
    fn profiles_differ_on_domain_and_location() {
        let standard = DefaultsProfile::Standard.record(day());
        let on_prem = DefaultsProfile::OnPrem.record(day());

        assert_eq!(standard["domain"], json!("School"));
        assert_eq!(standard["azure"], json!("Yes"));
        assert_eq!(on_prem["onPrem"], json!("Yes"));
        assert_ne!(standard["domain"], on_prem["domain"]);
        assert_eq!(standard.len(), on_prem.len());
    }

    #[test]
    fn date_requested_is_today() {
        let record = DefaultsProfile::Standard.record(day());
        assert_eq!(record["dateRequested"], json!("2024-05-17"));
    }

    #[test]
    fn input_overrides_defaults_in_place() {
        let defaults = FormDefaults {
            record: DefaultsProfile::Standard.record(day()),
        };
        let mut input = Record::new();
        input.insert("appName".into(), json!("Portal"));
        input.insert("extra".into(), json!(1));

        let filled = defaults.fill(input);
        assert_eq!(filled["appName"], json!("Portal"));
        assert_eq!(filled.keys().next().map(String::as_str), Some("appName"));
        assert_eq!(filled.keys().last().map(String::as_str), Some("extra"));
    }

    #[test]
    fn profile_names_parse() {
        assert_eq!("on-prem".parse::<DefaultsProfile>(), Ok(DefaultsProfile::OnPrem));
        assert_eq!("Standard".parse::<DefaultsProfile>(), Ok(DefaultsProfile::Standard));
        assert!("cloud".parse::<DefaultsProfile>().is_err());
    }
}
