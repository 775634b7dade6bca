//! Avatar upload
//!
//! In-memory intake, content-type filtering, resize/re-encode and durable write.

pub mod multipart;
pub mod photo;

pub use multipart::{read_profile_form, ProfileForm};
pub use photo::{PhotoProcessor, UploadedPhoto};
