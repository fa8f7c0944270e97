// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Submission pipeline: optional photo upload, then row insertion.
//!
//!  1. `upload_photo` never fails the submission. Any upload or URL error
//!     becomes [`PhotoOutcome::Failed`], whose `photo_url()` is empty.
//!  2. `persist` returns the insert error to the caller, which answers 400.
//!
//! An object uploaded before a failed insert is left in the bucket.

use tracing::{info, warn};

use crate::error::{RegistrationError, Result};
use crate::model::{Inscription, PhotoUpload, SubmissionForm};
use crate::store::{ObjectStore, RelationalStore, StoreLayout, Stores};

/// Result of the upload stage.
#[derive(Debug)]
pub enum PhotoOutcome {
    /// No file was attached.
    Skipped,
    /// Upload succeeded; holds the public URL.
    Stored(String),
    /// Upload or URL lookup failed; the submission continues without photo.
    Failed(RegistrationError),
}

impl PhotoOutcome {
    pub fn photo_url(&self) -> String {
        match self {
            PhotoOutcome::Stored(url) => url.clone(),
            PhotoOutcome::Skipped | PhotoOutcome::Failed(_) => String::new(),
        }
    }
}

/// Object key for a photo: `<unix-seconds>_<name, spaces as '_'>.<ext>`.
pub fn object_key(timestamp: i64, player_name: &str, photo: &PhotoUpload) -> String {
    format!(
        "{timestamp}_{}.{}",
        player_name.replace(' ', "_"),
        photo.extension()
    )
}

/// Stage 1: upload the attached photo, if any, and resolve its public URL.
pub async fn upload_photo(
    objects: &dyn ObjectStore,
    bucket: &str,
    form: &SubmissionForm,
    timestamp: i64,
) -> PhotoOutcome {
    let Some(photo) = &form.photo else {
        return PhotoOutcome::Skipped;
    };
    let key = object_key(timestamp, form.player_name(), photo);

    let stored: Result<String> = async {
        objects
            .upload(bucket, &key, photo.bytes.clone(), &photo.content_type)
            .await?;
        objects.public_url(bucket, &key).await
    }
    .await;

    match stored {
        Ok(url) => {
            info!(bucket, key, size = photo.bytes.len(), "Photo uploaded");
            PhotoOutcome::Stored(url)
        }
        Err(e) => {
            warn!(error = %e, bucket, key, "Photo upload failed, continuing without photo");
            PhotoOutcome::Failed(e)
        }
    }
}

/// Stage 2: insert the inscription row.
pub async fn persist(rows: &dyn RelationalStore, table: &str, inscription: &Inscription) -> Result<()> {
    rows.insert(table, inscription.to_row()?).await
}

/// Run both stages for one submission. Returns the inserted record.
pub async fn register(stores: &Stores, form: &SubmissionForm, timestamp: i64) -> Result<Inscription> {
    let StoreLayout { photo_bucket, inscriptions_table, .. } = &stores.layout;

    if form.player_name().is_empty() {
        // Required fields are only checked by the page script.
        warn!("Submission without player name accepted as-is");
    }

    let outcome = upload_photo(stores.objects.as_ref(), photo_bucket, form, timestamp).await;
    let inscription = form.to_inscription(outcome.photo_url());

    persist(stores.rows.as_ref(), inscriptions_table, &inscription).await?;
    info!(
        player = inscription.player_name,
        category = inscription.category,
        has_photo = !inscription.photo_url.is_empty(),
        "Inscription recorded"
    );
    Ok(inscription)
}
