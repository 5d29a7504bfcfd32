//! Input validation helpers
//!
//! Centralized limits and validation for checkout requests. Everything here
//! runs before any seat lock is taken.

use shared::BuyerContact;

use crate::utils::AppError;

// ── Limits ──────────────────────────────────────────────────────────

/// Buyer display names
pub const MAX_NAME_LEN: usize = 200;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Phone numbers and other short identifiers
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Seats a single order may claim
pub const MAX_SEATS_PER_ORDER: usize = 10;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate buyer contact details captured at checkout.
pub fn validate_contact(contact: &BuyerContact) -> Result<(), AppError> {
    validate_required_text(&contact.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&contact.email, "email", MAX_EMAIL_LEN)?;
    // Cheap shape check; providers do their own verification downstream
    if !contact.email.contains('@') || contact.email.starts_with('@') {
        return Err(AppError::validation(format!(
            "email is not a valid address: {}",
            contact.email
        )));
    }
    validate_optional_text(&contact.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    Ok(())
}

/// Validate a seat selection: non-empty, bounded, no duplicates.
pub fn validate_seat_selection(seat_ids: &[String]) -> Result<(), AppError> {
    if seat_ids.is_empty() {
        return Err(AppError::validation("seat selection must not be empty"));
    }
    if seat_ids.len() > MAX_SEATS_PER_ORDER {
        return Err(AppError::validation(format!(
            "too many seats in one order ({}, max {MAX_SEATS_PER_ORDER})",
            seat_ids.len()
        )));
    }
    let mut seen = std::collections::HashSet::new();
    for id in seat_ids {
        if !seen.insert(id.as_str()) {
            return Err(AppError::validation(format!("duplicate seat in selection: {id}")));
        }
    }
    Ok(())
}
