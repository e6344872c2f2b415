use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::PlacesError;

const ROWS_SUFFIX: &str = "/rows.csv";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    pub year: u16,
    pub source_url: String,
    pub dataset_name: String,
    pub metadata_url: String,
}

impl DatasetDescriptor {
    pub fn new(year: u16, source_url: impl Into<String>, dataset_name: impl Into<String>) -> Self {
        let source_url = source_url.into();
        let metadata_url = source_url
            .strip_suffix(ROWS_SUFFIX)
            .unwrap_or(&source_url)
            .to_string();
        Self {
            year,
            source_url,
            dataset_name: dataset_name.into(),
            metadata_url,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchAction {
    Cache,
    Download,
    Failed,
}

impl fmt::Display for FetchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchAction::Cache => write!(f, "cache"),
            FetchAction::Download => write!(f, "download"),
            FetchAction::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadResult {
    pub year: u16,
    pub local_path: Option<String>,
    pub succeeded: bool,
    pub action: FetchAction,
    pub validated: bool,
    pub error: Option<String>,
}

impl DownloadResult {
    pub fn failed(year: u16, local_path: Option<String>, error: impl Into<String>) -> Self {
        Self {
            year,
            local_path,
            succeeded: false,
            action: FetchAction::Failed,
            validated: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum MeasureCategory {
    HealthOutcomes,
    Prevention,
    HealthRiskBehaviors,
    Disabilities,
    HealthStatus,
    SocialNeeds,
    Sdoh,
}

impl MeasureCategory {
    pub const ALL: [MeasureCategory; 7] = [
        MeasureCategory::HealthOutcomes,
        MeasureCategory::Prevention,
        MeasureCategory::HealthRiskBehaviors,
        MeasureCategory::Disabilities,
        MeasureCategory::HealthStatus,
        MeasureCategory::SocialNeeds,
        MeasureCategory::Sdoh,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MeasureCategory::HealthOutcomes => "health_outcomes",
            MeasureCategory::Prevention => "prevention",
            MeasureCategory::HealthRiskBehaviors => "health_risk_behaviors",
            MeasureCategory::Disabilities => "disabilities",
            MeasureCategory::HealthStatus => "health_status",
            MeasureCategory::SocialNeeds => "social_needs",
            MeasureCategory::Sdoh => "sdoh",
        }
    }
}

impl fmt::Display for MeasureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for MeasureCategory {
    type Err = PlacesError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        MeasureCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| PlacesError::InvalidCategory(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn metadata_url_strips_rows_export() {
        let descriptor = DatasetDescriptor::new(
            2024,
            "https://data.cdc.gov/api/views/yjkw-uj5s/rows.csv",
            "PLACES-Census-Tract-Data-GIS-Friendly-Format-2024",
        );
        assert_eq!(
            descriptor.metadata_url,
            "https://data.cdc.gov/api/views/yjkw-uj5s"
        );
    }

    #[test]
    fn metadata_url_falls_back_to_source() {
        let descriptor = DatasetDescriptor::new(2030, "http://localhost/places.csv", "local");
        assert_eq!(descriptor.metadata_url, "http://localhost/places.csv");
    }

    #[test]
    fn parse_category_accepts_kebab_case() {
        let category: MeasureCategory = "health-risk-behaviors".parse().unwrap();
        assert_eq!(category, MeasureCategory::HealthRiskBehaviors);
    }

    #[test]
    fn parse_category_invalid() {
        let err = "vitals".parse::<MeasureCategory>().unwrap_err();
        assert_matches!(err, PlacesError::InvalidCategory(_));
    }
}
