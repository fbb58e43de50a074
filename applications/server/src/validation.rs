//! Payload validation
//!
//! Every inbound JSON body implements [`Validate`]; handlers call it before
//! touching storage. Uploads are checked by content type.

use crate::error::{Result, ServerError};
use chrono::Datelike;
use regex::Regex;
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("email pattern")
});

static USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.]+$").expect("username pattern"));

static OTP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{6}$").expect("otp pattern"));

pub const MAX_USERNAME_LEN: usize = 50;

/// Image types accepted for covers and pictures
pub const IMAGE_CONTENT_TYPES: &[&str] = &[
    "image/apng",
    "image/avif",
    "image/gif",
    "image/jpeg",
    "image/png",
    "image/webp",
];

/// Audio types accepted for song uploads
pub const AUDIO_CONTENT_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/ogg",
    "audio/aac",
    "audio/midi",
    "audio/opus",
    "audio/wav",
];

/// Implemented by request payloads
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(message: String) -> ServerError {
    ServerError::BadRequest(message)
}

/// Non-blank string
pub fn required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(format!("\"{field}\" is not allowed to be empty")));
    }
    Ok(())
}

pub fn max_len(field: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(invalid(format!(
            "\"{field}\" length must be less than or equal to {max} characters long"
        )));
    }
    Ok(())
}

pub fn email(field: &str, value: &str) -> Result<()> {
    required(field, value)?;
    if !EMAIL.is_match(value) {
        return Err(invalid(format!("\"{field}\" must be a valid email")));
    }
    Ok(())
}

pub fn username(field: &str, value: &str) -> Result<()> {
    required(field, value)?;
    max_len(field, value, MAX_USERNAME_LEN)?;
    if !USERNAME.is_match(value) {
        return Err(invalid(format!(
            "\"{field}\" may only contain letters, digits, dots and underscores"
        )));
    }
    Ok(())
}

/// Release year between 1900 and next year
pub fn year(field: &str, value: i32) -> Result<()> {
    let latest = chrono::Utc::now().year() + 1;
    if !(1900..=latest).contains(&value) {
        return Err(invalid(format!(
            "\"{field}\" must be between 1900 and {latest}"
        )));
    }
    Ok(())
}

pub fn positive(field: &str, value: i32) -> Result<()> {
    if value <= 0 {
        return Err(invalid(format!("\"{field}\" must be a positive number")));
    }
    Ok(())
}

/// Six-digit one-time code
pub fn otp(value: &str) -> Result<()> {
    if !OTP.is_match(value) {
        return Err(invalid("\"otp\" must be a 6 digit code".to_string()));
    }
    Ok(())
}

fn content_type(allowed: &[&str], value: Option<&str>) -> Result<()> {
    let value = value.unwrap_or_default();
    let essence = value.split(';').next().unwrap_or_default().trim();
    if allowed.iter().any(|t| t.eq_ignore_ascii_case(essence)) {
        return Ok(());
    }
    Err(invalid(format!(
        "\"content-type\" must be one of [{}]",
        allowed.join(", ")
    )))
}

pub fn image_content_type(value: Option<&str>) -> Result<()> {
    content_type(IMAGE_CONTENT_TYPES, value)
}

pub fn audio_content_type(value: Option<&str>) -> Result<()> {
    content_type(AUDIO_CONTENT_TYPES, value)
}
