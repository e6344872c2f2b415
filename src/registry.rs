use std::collections::BTreeMap;

use crate::domain::DatasetDescriptor;
use crate::error::PlacesError;

#[derive(Debug, Clone)]
pub struct DatasetRegistry {
    datasets: BTreeMap<u16, DatasetDescriptor>,
}

impl DatasetRegistry {
    pub fn new(datasets: impl IntoIterator<Item = DatasetDescriptor>) -> Self {
        Self {
            datasets: datasets
                .into_iter()
                .map(|descriptor| (descriptor.year, descriptor))
                .collect(),
        }
    }

    pub fn builtin() -> Self {
        Self::new([
            places_release(2024, "yjkw-uj5s"),
            places_release(2023, "hky2-3tpn"),
            places_release(2022, "shc3-fzig"),
            places_release(2021, "mb5y-ytti"),
            places_release(2020, "ib3w-k9rq"),
        ])
    }

    pub fn get(&self, year: u16) -> Result<&DatasetDescriptor, PlacesError> {
        self.datasets
            .get(&year)
            .ok_or(PlacesError::InvalidYear(year))
    }

    pub fn contains(&self, year: u16) -> bool {
        self.datasets.contains_key(&year)
    }

    pub fn years(&self) -> Vec<u16> {
        self.datasets.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DatasetDescriptor> {
        self.datasets.values()
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

impl Default for DatasetRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn places_release(year: u16, view_id: &str) -> DatasetDescriptor {
    DatasetDescriptor::new(
        year,
        format!("https://data.cdc.gov/api/views/{view_id}/rows.csv"),
        format!("PLACES-Census-Tract-Data-GIS-Friendly-Format-{year}"),
    )
}
