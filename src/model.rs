// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Records exchanged with the stores and the decoded submission form.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{RegistrationError, Result};
use crate::store::Row;

/// Category used when the form omits one.
pub const DEFAULT_CATEGORY: &str = "General";

/// Content type assumed for a photo part that declares none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// One tournament registration, as inserted into the inscriptions table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inscription {
    pub player_name: String,
    pub club: String,
    pub category: String,
    /// Public URL of the uploaded photo, or empty.
    pub photo_url: String,
}

impl Inscription {
    pub fn to_row(&self) -> Result<Row> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => Ok(map),
            Ok(other) => Err(RegistrationError::Decode(format!(
                "inscription serialized to non-object {other}"
            ))),
            Err(e) => Err(RegistrationError::Decode(e.to_string())),
        }
    }
}

/// Ranking row decoded for the CLI table. Any column may be null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: Option<String>,
    pub club: Option<String>,
    pub rating: Option<f64>,
    pub category: Option<String>,
}

impl Player {
    /// Columns projected by the ranking read.
    pub const COLUMNS: [&'static str; 4] = ["name", "club", "rating", "category"];

    pub fn from_row(row: Row) -> Result<Self> {
        serde_json::from_value(serde_json::Value::Object(row))
            .map_err(|e| RegistrationError::Decode(format!("player row: {e}")))
    }
}

/// Photo file attached to a submission.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl PhotoUpload {
    /// Text after the last `.` of the file name; the whole name when it has none.
    pub fn extension(&self) -> &str {
        self.file_name.rsplit('.').next().unwrap_or(&self.file_name)
    }
}

/// Fields of a submission exactly as received. No server-side validation.
#[derive(Debug, Clone, Default)]
pub struct SubmissionForm {
    pub name: Option<String>,
    pub club: Option<String>,
    pub category: Option<String>,
    pub photo: Option<PhotoUpload>,
}

impl SubmissionForm {
    pub fn player_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Build the record to insert, applying the optional-field defaults.
    pub fn to_inscription(&self, photo_url: String) -> Inscription {
        Inscription {
            player_name: self.player_name().to_string(),
            club: self.club.clone().unwrap_or_default(),
            category: self
                .category
                .clone()
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            photo_url,
        }
    }
}
