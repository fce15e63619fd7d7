//! Upload Validation
//!
//! Companies are submitted as a spreadsheet. Contents are never parsed here;
//! only the size and extension are checked before a task is created.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utils::error::{AppError, AppResult};

/// Largest accepted upload (50 MiB)
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Accepted extensions, lowercase without the dot
pub const ALLOWED_EXTENSIONS: &[&str] = &["csv", "xlsx"];

/// Suggested file name for the downloadable template
pub const CSV_TEMPLATE_FILE_NAME: &str = "prospectiq-template.csv";

const CSV_TEMPLATE: &str = "Company Name,Company Website
Example Corp,example.com
Tech Solutions Inc,techsolutions.com
Innovate LLC,innovate.com";

/// The template users fill in with companies to analyze
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CsvTemplate {
    pub file_name: String,
    pub content: String,
}

pub fn csv_template() -> CsvTemplate {
    CsvTemplate {
        file_name: CSV_TEMPLATE_FILE_NAME.to_string(),
        content: CSV_TEMPLATE.to_string(),
    }
}

/// An upload that passed validation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadInfo {
    pub file_name: String,
    pub size_bytes: u64,
    /// Lowercase extension, `csv` or `xlsx`
    pub extension: String,
}

/// Check an upload's name and size
pub fn validate_upload(file_name: &str, size_bytes: u64) -> AppResult<UploadInfo> {
    let base_name = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if base_name.trim().is_empty() {
        return Err(AppError::validation("Please choose a file to upload"));
    }

    let extension = Path::new(base_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::validation(format!(
            "Unsupported file type for {}: upload a .csv or .xlsx file",
            base_name
        )));
    }

    if size_bytes > MAX_UPLOAD_BYTES {
        return Err(AppError::validation(format!(
            "{} is {:.1} MB; the limit is 50 MB",
            base_name,
            size_bytes as f64 / (1024.0 * 1024.0)
        )));
    }

    Ok(UploadInfo {
        file_name: base_name.to_string(),
        size_bytes,
        extension,
    })
}

/// Validate a file on disk, reading only its metadata
pub fn validate_upload_path(path: &Path) -> AppResult<UploadInfo> {
    let metadata = std::fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(AppError::validation(format!(
            "{} is not a file",
            path.display()
        )));
    }
    validate_upload(&path.to_string_lossy(), metadata.len())
}
