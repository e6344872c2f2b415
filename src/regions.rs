use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Region {
    Northeast,
    Midwest,
    South,
    West,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::Northeast, Region::Midwest, Region::South, Region::West];

    pub fn states(&self) -> &'static [&'static str] {
        match self {
            Region::Northeast => &["CT", "ME", "MA", "NH", "RI", "VT", "NJ", "NY", "PA"],
            Region::Midwest => &[
                "IL", "IN", "MI", "OH", "WI", "IA", "KS", "MN", "MO", "NE", "ND", "SD",
            ],
            Region::South => &[
                "DE", "FL", "GA", "MD", "NC", "SC", "VA", "WV", "AL", "KY", "MS", "TN", "AR",
                "LA", "OK", "TX",
            ],
            Region::West => &[
                "AZ", "CO", "ID", "MT", "NV", "NM", "UT", "WY", "AK", "CA", "HI", "OR", "WA",
            ],
        }
    }

    pub fn for_state(abbr: &str) -> Option<Region> {
        let abbr = abbr.trim().to_ascii_uppercase();
        Region::ALL
            .into_iter()
            .find(|region| region.states().contains(&abbr.as_str()))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Region::Northeast => "Northeast",
            Region::Midwest => "Midwest",
            Region::South => "South",
            Region::West => "West",
        };
        f.pad(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PopulationCategory {
    Small,
    Medium,
    Large,
}

impl PopulationCategory {
    pub const MEDIUM_FLOOR: u64 = 50_000;
    pub const LARGE_FLOOR: u64 = 500_000;

    pub fn for_population(population: u64) -> Self {
        if population >= Self::LARGE_FLOOR {
            PopulationCategory::Large
        } else if population >= Self::MEDIUM_FLOOR {
            PopulationCategory::Medium
        } else {
            PopulationCategory::Small
        }
    }
}

impl fmt::Display for PopulationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PopulationCategory::Small => "small",
            PopulationCategory::Medium => "medium",
            PopulationCategory::Large => "large",
        };
        f.pad(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_lookup() {
        assert_eq!(Region::for_state("tx"), Some(Region::South));
        assert_eq!(Region::for_state("WA"), Some(Region::West));
        assert_eq!(Region::for_state("PR"), None);
    }

    #[test]
    fn regions_do_not_overlap() {
        let total: usize = Region::ALL.iter().map(|region| region.states().len()).sum();
        assert_eq!(total, 50);
        for region in Region::ALL {
            for state in region.states() {
                assert_eq!(Region::for_state(state), Some(region));
            }
        }
    }

    #[test]
    fn display_names() {
        assert_eq!(format!("{:<10}|", Region::West), "West      |");
        assert_eq!(PopulationCategory::for_population(0).to_string(), "small");
    }

    #[test]
    fn population_bounds_are_half_open() {
        assert_eq!(
            PopulationCategory::for_population(49_999),
            PopulationCategory::Small
        );
        assert_eq!(
            PopulationCategory::for_population(50_000),
            PopulationCategory::Medium
        );
        assert_eq!(
            PopulationCategory::for_population(500_000),
            PopulationCategory::Large
        );
    }
}
