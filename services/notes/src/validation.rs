//! Input validation utilities

use crate::error::ApiError;
use crate::models::{NotePayload, RegisterRequest};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 128;

/// Reject empty (or whitespace-only) values
pub fn validate_required(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field));
    }
    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        ));
    }

    if len > MAX_PASSWORD_LEN {
        return Err(format!(
            "Password must be at most {} characters long",
            MAX_PASSWORD_LEN
        ));
    }

    Ok(())
}

/// Emails compare case-insensitively
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate a registration request as a whole. Only presence is checked
/// here; password strength applies when a reset sets a new password.
pub fn validate_registration(request: &RegisterRequest) -> Result<(), ApiError> {
    let all_present = [
        &request.first_name,
        &request.last_name,
        &request.email,
        &request.password,
    ]
    .iter()
    .all(|value| !value.trim().is_empty());

    if !all_present {
        return Err(ApiError::Validation("All fields are required".to_string()));
    }
    Ok(())
}

/// Validate a note body. Both fields must be non-empty after trimming.
pub fn validate_note(payload: &NotePayload) -> Result<(), ApiError> {
    if payload.title.trim().is_empty() || payload.content.trim().is_empty() {
        return Err(ApiError::Validation(
            "Title and content are required".to_string(),
        ));
    }
    Ok(())
}
