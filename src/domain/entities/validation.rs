use std::borrow::Cow;

use url::Url;
use validator::ValidationError;

pub const MAX_IMAGE_URL_LENGTH: u64 = 500;

fn validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Rejects strings made only of whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(validation_error("blank", "Must not be blank"));
    }
    Ok(())
}

/// Accepts absolute http(s) URLs only.
pub fn validate_http_url(value: &str) -> Result<(), ValidationError> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => Ok(()),
        _ => Err(validation_error("url", "Must be a valid http(s) URL")),
    }
}

/// Image references are either absolute http(s) URLs or site-relative paths.
pub fn validate_image_url(value: &str) -> Result<(), ValidationError> {
    if value.starts_with('/') && !value.starts_with("//") {
        if value.split('/').any(|segment| segment == "..") {
            return Err(validation_error("image_url", "Path must not contain '..' segments"));
        }
        return Ok(());
    }

    validate_http_url(value)
        .map_err(|_| validation_error("image_url", "Must be an http(s) URL or a path starting with '/'"))
}

/// Sorts and de-duplicates association ids, dropping non-positive values.
pub fn normalize_ids(ids: &[i32]) -> Vec<i32> {
    let mut ids: Vec<i32> = ids.iter().copied().filter(|id| *id > 0).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}
