use std::fs::File;
use std::path::Path;

use serde::Serialize;
use tracing::error;

use crate::error::PlacesError;

pub const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub path: String,
    pub columns: usize,
    pub rows_checked: usize,
}

pub fn validate(path: &Path) -> bool {
    match check(path) {
        Ok(_) => true,
        Err(err) => {
            error!(path = %path.display(), "error validating file: {err}");
            false
        }
    }
}

pub fn check(path: &Path) -> Result<ValidationReport, PlacesError> {
    let file = File::open(path)
        .map_err(|err| PlacesError::Validation(format!("open {}: {err}", path.display())))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|err| PlacesError::Validation(format!("header row: {err}")))?
        .clone();
    if headers.iter().all(|field| field.trim().is_empty()) {
        return Err(PlacesError::Validation("missing header row".to_string()));
    }
    if headers.iter().any(|field| field.contains('\0')) {
        return Err(PlacesError::Validation("binary content in header".to_string()));
    }

    let mut rows_checked = 0;
    for result in reader.records().take(PREVIEW_ROWS) {
        let record = result.map_err(|err| PlacesError::Validation(err.to_string()))?;
        if record.iter().any(|field| field.contains('\0')) {
            return Err(PlacesError::Validation(format!(
                "binary content in record {}",
                rows_checked + 1
            )));
        }
        rows_checked += 1;
    }
    if rows_checked == 0 {
        return Err(PlacesError::Validation("no data rows".to_string()));
    }

    Ok(ValidationReport {
        path: path.display().to_string(),
        columns: headers.len(),
        rows_checked,
    })
}
