/*
 * Responsibility
 * - upload (multipart) / download (raw response) の DTO
 */
use serde::{Deserialize, Serialize};

use crate::plugin::FormFile;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadRequest {
    pub title: String,
    pub file: Option<FormFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub title: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadRequest {
    pub name: String,
}

impl DownloadRequest {
    /// A bare file name: no path separators, no quotes.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.is_empty() {
            return Err("name is required");
        }
        if self.name.contains(['/', '\\', '"']) || self.name.starts_with('.') {
            return Err("name must be a plain file name");
        }
        Ok(())
    }
}
