//! Upload Commands

use std::path::Path;

use crate::models::response::CommandResponse;
use crate::services::upload::{csv_template, validate_upload, validate_upload_path, CsvTemplate, UploadInfo};

/// The downloadable company-list template
pub fn get_csv_template() -> CommandResponse<CsvTemplate> {
    CommandResponse::ok(csv_template())
}

/// Check a file name and size against the upload rules
pub fn validate_upload_file(file_name: &str, size_bytes: u64) -> CommandResponse<UploadInfo> {
    validate_upload(file_name, size_bytes).into()
}

/// Check a file on disk against the upload rules
pub fn validate_upload_at(path: &Path) -> CommandResponse<UploadInfo> {
    validate_upload_path(path).into()
}
