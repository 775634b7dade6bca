//! Avatar resize pipeline
//!
//! Decode the uploaded bytes, crop-resize to the configured frame, re-encode as JPEG and
//! write the result under the public asset directory.

use chrono::{DateTime, Utc};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::ExtendedColorType;
use std::path::PathBuf;
use uuid::Uuid;

use crate::config::UploadConfig;
use crate::user::error::UserError;

/// True for any `image/*` content type
pub fn is_image_content_type(content_type: &str) -> bool {
    content_type.starts_with("image")
}

/// An uploaded file that passed the content-type filter, held in memory
#[derive(Debug, Clone)]
pub struct UploadedPhoto {
    content_type: String,
    bytes: Vec<u8>,
}

impl UploadedPhoto {
    /// Accept `bytes` only if the declared content type is an image
    pub fn new(content_type: &str, bytes: Vec<u8>) -> Result<Self, UserError> {
        if !is_image_content_type(content_type) {
            return Err(UserError::NotAnImage);
        }
        Ok(Self {
            content_type: content_type.to_string(),
            bytes,
        })
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Owns the upload settings and turns uploads into stored avatars
#[derive(Debug, Clone)]
pub struct PhotoProcessor {
    config: UploadConfig,
}

impl PhotoProcessor {
    pub fn new(config: UploadConfig) -> Self {
        Self {
            config,
        }
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// `user-<id>-<unix millis>.jpeg`
    pub fn filename_for(user_id: &Uuid, at: DateTime<Utc>) -> String {
        format!("user-{}-{}.jpeg", user_id, at.timestamp_millis())
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.config.public_dir.join(filename)
    }

    /// Decode, cover-resize and JPEG-encode. CPU bound.
    pub fn render(&self, source: &[u8]) -> Result<Vec<u8>, UserError> {
        let decoded = image::load_from_memory(source)?;
        let resized =
            decoded.resize_to_fill(self.config.width, self.config.height, FilterType::Lanczos3);
        let rgb = resized.to_rgb8();

        let mut encoded = Vec::new();
        JpegEncoder::new_with_quality(&mut encoded, self.config.quality).encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ExtendedColorType::Rgb8,
        )?;
        Ok(encoded)
    }

    /// Render `photo` and write it for `user_id`; returns the stored filename
    pub async fn store(&self, user_id: &Uuid, photo: UploadedPhoto) -> Result<String, UserError> {
        let filename = Self::filename_for(user_id, Utc::now());
        let path = self.path_for(&filename);

        log::debug!("Rendering {} upload of {} bytes for {}", photo.content_type(), photo.len(), user_id);
        let processor = self.clone();
        let encoded = actix_web::web::block(move || processor.render(&photo.bytes)).await??;

        tokio::fs::create_dir_all(&self.config.public_dir).await?;
        tokio::fs::write(&path, &encoded).await?;

        log::info!("Stored avatar {} ({} bytes)", path.display(), encoded.len());
        Ok(filename)
    }
}
