//! Upload validation: extension allowlist, declared content type, size cap.

use crate::error::ApiError;

/// Largest accepted upload, per file. Independent of the large-file
/// threshold the sync engine uses for routing.
pub const MAX_UPLOAD_BYTES: u64 = 1024 * 1024;

/// Accepted extensions and the content types each may be declared with.
const ALLOWED_TYPES: &[(&str, &[&str])] = &[
    ("jpeg", &["image/jpeg"]),
    ("jpg", &["image/jpeg"]),
    ("png", &["image/png"]),
    ("gif", &["image/gif"]),
    ("pdf", &["application/pdf"]),
    ("txt", &["text/plain"]),
    ("doc", &["application/msword"]),
    (
        "docx",
        &["application/vnd.openxmlformats-officedocument.wordprocessingml.document"],
    ),
];

/// Check one upload against the allowlist and the size cap.
///
/// The extension and the declared content type must both match the same
/// allowlist row. A missing extension or a missing content type is
/// rejected outright.
pub fn check_upload(
    file_name: &str,
    content_type: Option<&str>,
    size: u64,
) -> Result<(), ApiError> {
    let ext = extension(file_name).ok_or_else(|| {
        ApiError::unsupported_type(format!("no file extension on {file_name}"))
    })?;

    let allowed_mimes = ALLOWED_TYPES
        .iter()
        .find(|(allowed, _)| *allowed == ext)
        .map(|(_, mimes)| *mimes)
        .ok_or_else(|| ApiError::unsupported_type(format!("extension {ext} is not allowed")))?;

    let declared = content_type.ok_or_else(|| {
        ApiError::unsupported_type(format!("no content type declared for {file_name}"))
    })?;
    if !mime_matches(allowed_mimes, declared) {
        return Err(ApiError::unsupported_type(format!(
            "content type {declared} does not match extension {ext}"
        )));
    }

    if size > MAX_UPLOAD_BYTES {
        return Err(ApiError::payload_too_large(format!(
            "{file_name} is {size} bytes, the limit is {MAX_UPLOAD_BYTES}"
        )));
    }

    Ok(())
}

/// Lowercased extension without the dot, if the name has one.
fn extension(file_name: &str) -> Option<String> {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Match the media type only; parameters such as `charset` are ignored.
fn mime_matches(allowed: &[&str], declared: &str) -> bool {
    let media_type = declared.split(';').next().unwrap_or(declared).trim();
    allowed.iter().any(|mime| media_type.eq_ignore_ascii_case(mime))
}
