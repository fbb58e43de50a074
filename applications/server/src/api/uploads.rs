/// Multipart upload helpers
use crate::{
    error::{Result, ServerError},
    validation,
};
use axum::extract::Multipart;

/// A single file read from a multipart body
#[derive(Debug)]
pub struct Upload {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Read the part named `field`, checking its content type
///
/// Other parts are skipped. A missing part is a validation failure.
pub async fn read_file(
    multipart: &mut Multipart,
    field: &str,
    check: fn(Option<&str>) -> Result<()>,
) -> Result<Upload> {
    while let Some(part) = multipart.next_field().await? {
        if part.name() != Some(field) {
            continue;
        }

        check(part.content_type())?;
        let filename = part.file_name().unwrap_or(field).to_string();
        let data = part.bytes().await?.to_vec();

        return Ok(Upload { filename, data });
    }

    Err(ServerError::BadRequest(format!("\"{field}\" is required")))
}

pub async fn read_image(multipart: &mut Multipart, field: &str) -> Result<Upload> {
    read_file(multipart, field, validation::image_content_type).await
}

pub async fn read_audio(multipart: &mut Multipart, field: &str) -> Result<Upload> {
    read_file(multipart, field, validation::audio_content_type).await
}
