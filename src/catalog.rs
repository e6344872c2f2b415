use std::fmt;

use serde::Serialize;

use crate::domain::MeasureCategory;
use crate::error::PlacesError;

pub const PREVALENCE_SUFFIX: &str = "_CrudePrev";
pub const CONFIDENCE_INTERVAL_SUFFIX: &str = "_Crude95CI";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MeasureCode(String);

impl MeasureCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn prevalence_column(&self) -> String {
        prevalence_column(&self.0)
    }

    pub fn ci_column(&self) -> String {
        ci_column(&self.0)
    }
}

impl fmt::Display for MeasureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn prevalence_column(measure: &str) -> String {
    format!("{measure}{PREVALENCE_SUFFIX}")
}

pub fn ci_column(measure: &str) -> String {
    format!("{measure}{CONFIDENCE_INTERVAL_SUFFIX}")
}

#[derive(Debug, Clone, Serialize)]
pub struct MeasureEntry {
    pub code: String,
    pub category: MeasureCategory,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct MeasureCatalog {
    entries: Vec<MeasureEntry>,
}

impl MeasureCatalog {
    pub fn new(entries: Vec<MeasureEntry>) -> Self {
        Self { entries }
    }

    pub fn builtin() -> Self {
        let entries = BUILTIN_MEASURES
            .iter()
            .flat_map(|(category, measures)| {
                measures.iter().map(|(code, description)| MeasureEntry {
                    code: code.to_string(),
                    category: *category,
                    description: description.to_string(),
                })
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[MeasureEntry] {
        &self.entries
    }

    pub fn measures_by_category(&self, category: MeasureCategory) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.category == category)
            .map(|entry| entry.code.as_str())
            .collect()
    }

    pub fn all_measures(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.code.as_str()).collect()
    }

    pub fn description(&self, code: &str) -> Option<&str> {
        self.find(code).map(|entry| entry.description.as_str())
    }

    pub fn category_of(&self, code: &str) -> Option<MeasureCategory> {
        self.find(code).map(|entry| entry.category)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.find(code).is_some()
    }

    pub fn measure(&self, value: &str) -> Result<MeasureCode, PlacesError> {
        let normalized = value.trim().to_ascii_uppercase();
        match self.find(&normalized) {
            Some(entry) => Ok(MeasureCode(entry.code.clone())),
            None => Err(PlacesError::InvalidMeasure(value.to_string())),
        }
    }

    fn find(&self, code: &str) -> Option<&MeasureEntry> {
        self.entries.iter().find(|entry| entry.code == code)
    }
}

impl Default for MeasureCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

type CategoryTable = (MeasureCategory, &'static [(&'static str, &'static str)]);

const BUILTIN_MEASURES: &[CategoryTable] = &[
    (
        MeasureCategory::HealthOutcomes,
        &[
            ("ARTHRITIS", "Arthritis among adults aged ≥18 years"),
            ("BPHIGH", "High blood pressure among adults aged ≥18 years"),
            (
                "CANCER",
                "Cancer (excluding skin cancer) among adults aged ≥18 years",
            ),
            ("CASTHMA", "Current asthma among adults aged ≥18 years"),
            ("CHD", "Coronary heart disease among adults aged ≥18 years"),
            (
                "COPD",
                "Chronic obstructive pulmonary disease among adults aged ≥18 years",
            ),
            ("DEPRESSION", "Depression among adults aged ≥18 years"),
            ("DIABETES", "Diagnosed diabetes among adults aged ≥18 years"),
            ("HIGHCHOL", "High cholesterol among adults aged ≥18 years"),
            ("STROKE", "Stroke among adults aged ≥18 years"),
        ],
    ),
    (
        MeasureCategory::Prevention,
        &[
            (
                "ACCESS2",
                "Current lack of health insurance among adults aged 18-64 years",
            ),
            (
                "CHECKUP",
                "Visits to doctor for routine checkup within the past year among adults aged ≥18 years",
            ),
            ("CHOLSCREEN", "Cholesterol screening among adults aged ≥18 years"),
            (
                "COLON_SCREEN",
                "Fecal occult blood test, sigmoidoscopy, or colonoscopy among adults aged 50-75 years",
            ),
            (
                "DENTAL",
                "Visits to dentist or dental clinic among adults aged ≥18 years",
            ),
            ("MAMMOUSE", "Mammography use among women aged 50-74 years"),
            (
                "BPMED",
                "Taking medicine for high blood pressure control among adults aged ≥18 years with high blood pressure",
            ),
        ],
    ),
    (
        MeasureCategory::HealthRiskBehaviors,
        &[
            ("BINGE", "Binge drinking among adults aged ≥18 years"),
            ("CSMOKING", "Current smoking among adults aged ≥18 years"),
            (
                "LPA",
                "No leisure-time physical activity among adults aged ≥18 years",
            ),
            ("OBESITY", "Obesity among adults aged ≥18 years"),
            ("SLEEP", "Sleeping less than 7 hours among adults aged ≥18 years"),
        ],
    ),
    (
        MeasureCategory::Disabilities,
        &[
            ("HEARING", "Hearing disability among adults aged ≥18 years"),
            ("VISION", "Vision disability among adults aged ≥18 years"),
            ("COGNITION", "Cognitive disability among adults aged ≥18 years"),
            ("MOBILITY", "Mobility disability among adults aged ≥18 years"),
            ("SELFCARE", "Self-care disability among adults aged ≥18 years"),
            (
                "INDEPLIVE",
                "Independent living disability among adults aged ≥18 years",
            ),
            ("DISABILITY", "All disability types among adults aged ≥18 years"),
        ],
    ),
    (
        MeasureCategory::HealthStatus,
        &[
            (
                "GHLTH",
                "Fair or poor self-rated health status among adults aged ≥18 years",
            ),
            (
                "MHLTH",
                "Mental health not good for ≥14 days among adults aged ≥18 years",
            ),
            (
                "PHLTH",
                "Physical health not good for ≥14 days among adults aged ≥18 years",
            ),
            ("TEETHLOST", "All teeth lost among adults aged ≥65 years"),
        ],
    ),
    (
        MeasureCategory::SocialNeeds,
        &[
            ("ISOLATION", "Social isolation among adults aged ≥18 years"),
            ("FOODINSECU", "Food insecurity among adults aged ≥18 years"),
            ("HOUSINSECU", "Housing insecurity among adults aged ≥18 years"),
            ("SHUTUTILITY", "Utility shutoff among adults aged ≥18 years"),
            ("LACKTRPT", "Lack of transportation among adults aged ≥18 years"),
            (
                "EMOTIONSPT",
                "Lack of emotional support among adults aged ≥18 years",
            ),
        ],
    ),
    (
        MeasureCategory::Sdoh,
        &[("FOODSTAMP", "Food stamp benefits among adults aged ≥18 years")],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_has_measures() {
        let catalog = MeasureCatalog::builtin();
        for category in MeasureCategory::ALL {
            assert!(
                !catalog.measures_by_category(category).is_empty(),
                "{category} is empty"
            );
        }
    }

    #[test]
    fn codes_are_unique() {
        let catalog = MeasureCatalog::builtin();
        let mut codes = catalog.all_measures();
        let total = codes.len();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), total);
    }
}
