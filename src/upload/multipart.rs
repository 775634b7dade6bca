//! Multipart intake for the profile form
//!
//! Text parts become an attribute bag; the `image` file part is buffered in memory after its
//! content type has been checked.

use actix_multipart::{Field, Multipart};
use futures_util::TryStreamExt;
use serde_json::{Map, Value};

use crate::upload::photo::{is_image_content_type, UploadedPhoto};
use crate::user::error::UserError;

/// Form part carrying the avatar
pub const IMAGE_FIELD: &str = "image";

/// Text fields larger than this are refused
const MAX_TEXT_FIELD_BYTES: usize = 16 * 1024;

/// Everything submitted in one profile form
#[derive(Debug, Default)]
pub struct ProfileForm {
    pub fields: Map<String, Value>,
    pub photo: Option<UploadedPhoto>,
}

/// Drain the multipart stream into a [`ProfileForm`]
///
/// Only a file part named `image` with a non-empty filename counts as an upload, and a
/// non-image one is rejected before any of its bytes are read. Parts without a filename
/// are text fields; file parts with no file chosen, or under another name, are skipped.
pub async fn read_profile_form(
    mut payload: Multipart,
    max_image_bytes: usize,
) -> Result<ProfileForm, UserError> {
    let mut form = ProfileForm::default();

    while let Some(mut field) = payload.try_next().await? {
        let Some(name) = field.name().map(ToString::to_string) else {
            discard_field(&mut field).await?;
            continue;
        };
        let filename = field
            .content_disposition()
            .and_then(|disposition| disposition.get_filename())
            .map(ToString::to_string);

        match filename {
            None => {
                let bytes = read_field(&mut field, MAX_TEXT_FIELD_BYTES, |limit| {
                    UserError::ValidationError(format!("field `{name}` exceeds {limit} bytes"))
                })
                .await?;
                let text = String::from_utf8(bytes).map_err(|_| {
                    UserError::ValidationError(format!("field `{name}` is not valid UTF-8"))
                })?;
                form.fields.insert(name, Value::String(text));
            },
            Some(filename) if name == IMAGE_FIELD && !filename.is_empty() => {
                let content_type =
                    field.content_type().map(|mime| mime.to_string()).unwrap_or_default();
                if !is_image_content_type(&content_type) {
                    return Err(UserError::NotAnImage);
                }

                let bytes =
                    read_field(&mut field, max_image_bytes, UserError::FileTooLarge).await?;
                if bytes.is_empty() {
                    continue;
                }
                form.photo = Some(UploadedPhoto::new(&content_type, bytes)?);
            },
            Some(_) => discard_field(&mut field).await?,
        }
    }

    Ok(form)
}

async fn discard_field(field: &mut Field) -> Result<(), UserError> {
    while field.try_next().await?.is_some() {}
    Ok(())
}

async fn read_field(
    field: &mut Field,
    limit: usize,
    too_large: impl Fn(usize) -> UserError,
) -> Result<Vec<u8>, UserError> {
    let mut buffer = Vec::new();
    while let Some(chunk) = field.try_next().await? {
        if buffer.len() + chunk.len() > limit {
            return Err(too_large(limit));
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer)
}
