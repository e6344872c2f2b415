use std::fs;
use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::catalog::MeasureCode;
use crate::error::PlacesError;

pub const DEFAULT_DATA_DIR: &str = "data";

const ARTIFACT_NAME_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9_.-]*$";

#[derive(Debug, Clone)]
pub struct Layout {
    root: Utf8PathBuf,
}

impl Layout {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub fn from_path(root: &Path) -> Result<Self, PlacesError> {
        let root = Utf8PathBuf::from_path_buf(root.to_path_buf()).map_err(|path| {
            PlacesError::Filesystem(format!("non-utf8 data directory: {}", path.display()))
        })?;
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn raw_dir(&self) -> Utf8PathBuf {
        self.root.join("raw")
    }

    pub fn processed_dir(&self) -> Utf8PathBuf {
        self.root.join("processed")
    }

    pub fn figures_dir(&self) -> Utf8PathBuf {
        self.root.join("figures")
    }

    pub fn cache_dir(&self) -> Utf8PathBuf {
        self.root.join("cache")
    }

    pub fn raw_path(&self, year: u16) -> Utf8PathBuf {
        self.raw_dir().join(format!("places_{year}.csv"))
    }

    pub fn metadata_path(&self, year: u16) -> Utf8PathBuf {
        self.raw_dir().join(format!("places_{year}.meta.json"))
    }

    pub fn processed_path(&self, year: u16, measure: &MeasureCode) -> Utf8PathBuf {
        self.processed_dir().join(format!(
            "places_{year}_{}.csv",
            measure.as_str().to_ascii_lowercase()
        ))
    }

    pub fn figure_path(&self, name: &str, year: Option<u16>) -> Result<Utf8PathBuf, PlacesError> {
        validate_artifact_name(name)?;
        let file_name = match year {
            Some(year) => format!("{name}_{year}.png"),
            None => format!("{name}.png"),
        };
        Ok(self.figures_dir().join(file_name))
    }

    pub fn cache_path(&self, name: &str) -> Result<Utf8PathBuf, PlacesError> {
        validate_artifact_name(name)?;
        Ok(self.cache_dir().join(format!("{name}.pkl")))
    }

    pub fn ensure_dirs(&self) -> Result<(), PlacesError> {
        for dir in [
            self.root.clone(),
            self.raw_dir(),
            self.processed_dir(),
            self.figures_dir(),
            self.cache_dir(),
        ] {
            fs::create_dir_all(dir.as_std_path())
                .map_err(|err| PlacesError::Filesystem(format!("create {dir}: {err}")))?;
        }
        Ok(())
    }

    pub fn write_metadata(path: &Utf8Path, metadata: &DownloadMetadata) -> Result<(), PlacesError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent.as_std_path())
                .map_err(|err| PlacesError::Filesystem(err.to_string()))?;
        }
        let tmp_path = path.with_extension("json.tmp");
        let content = serde_json::to_vec_pretty(metadata)
            .map_err(|err| PlacesError::Filesystem(err.to_string()))?;
        fs::write(tmp_path.as_std_path(), &content)
            .map_err(|err| PlacesError::Filesystem(err.to_string()))?;
        fs::rename(tmp_path.as_std_path(), path.as_std_path())
            .map_err(|err| PlacesError::Filesystem(err.to_string()))?;
        Ok(())
    }

    pub fn read_metadata(path: &Utf8Path) -> Result<Option<DownloadMetadata>, PlacesError> {
        if !path.as_std_path().exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path.as_std_path())
            .map_err(|err| PlacesError::Filesystem(err.to_string()))?;
        let metadata = serde_json::from_str(&content)
            .map_err(|err| PlacesError::Filesystem(format!("parse {path}: {err}")))?;
        Ok(Some(metadata))
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(Utf8PathBuf::from(DEFAULT_DATA_DIR))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadMetadata {
    pub year: u16,
    pub dataset_name: String,
    pub source_url: String,
    pub metadata_url: String,
    pub bytes: u64,
    pub downloaded_at: String,
    pub tool: String,
}

fn validate_artifact_name(name: &str) -> Result<(), PlacesError> {
    let pattern = Regex::new(ARTIFACT_NAME_PATTERN)
        .map_err(|err| PlacesError::InvalidName(format!("{name}: {err}")))?;
    if pattern.is_match(name) && !name.contains("..") {
        Ok(())
    } else {
        Err(PlacesError::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn layout_paths() {
        let layout = Layout::default();
        assert!(layout.raw_path(2024).ends_with("raw/places_2024.csv"));
        assert!(
            layout
                .metadata_path(2024)
                .ends_with("raw/places_2024.meta.json")
        );
        assert!(
            layout
                .figure_path("bubble", Some(2023))
                .unwrap()
                .ends_with("figures/bubble_2023.png")
        );
        assert!(
            layout
                .cache_path("county_means")
                .unwrap()
                .ends_with("cache/county_means.pkl")
        );
    }

    #[test]
    fn artifact_names_cannot_escape_tree() {
        let layout = Layout::default();
        assert_matches!(
            layout.cache_path("../secrets"),
            Err(PlacesError::InvalidName(_))
        );
        assert_matches!(
            layout.figure_path("a/b", None),
            Err(PlacesError::InvalidName(_))
        );
        assert_matches!(layout.cache_path(""), Err(PlacesError::InvalidName(_)));
        assert_matches!(layout.cache_path("x..y"), Err(PlacesError::InvalidName(_)));
    }
}
