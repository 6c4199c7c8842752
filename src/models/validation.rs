use uuid::Uuid;

use crate::{error::NotificationError, models::request::NotificationRequest};

pub fn validate_request(request: &NotificationRequest) -> Result<(), NotificationError> {
    require_non_empty("type", &request.notification_type)?;
    require_non_empty("title", &request.title)?;
    require_non_empty("message", &request.message)?;

    validate_identifier("tenant_scope_id", &request.tenant_scope_id)?;
    validate_identifier("recipient_id", &request.recipient_id)?;

    validate_email(&request.recipient_email)?;

    if let Some(entity_id) = &request.related_entity_id {
        validate_identifier("related_entity_id", entity_id)?;
    }

    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), NotificationError> {
    if email.trim().is_empty() {
        return Err(NotificationError::validation("recipient_email is required"));
    }

    if email.chars().any(char::is_whitespace) {
        return Err(NotificationError::validation(
            "recipient_email contains whitespace",
        ));
    }

    let (local, domain) = match email.split_once('@') {
        Some(parts) => parts,
        None => return Err(NotificationError::validation("recipient_email is missing '@'")),
    };

    if local.is_empty() || domain.contains('@') {
        return Err(NotificationError::validation("recipient_email is malformed"));
    }

    let labels_ok = domain.split('.').count() >= 2 && domain.split('.').all(|l| !l.is_empty());
    if !labels_ok {
        return Err(NotificationError::validation(
            "recipient_email domain is malformed",
        ));
    }

    Ok(())
}

/// Strips common separators from a phone number and checks what is left is an
/// optional `+` followed by 7 to 15 digits.
pub fn normalize_phone(phone: &str) -> Result<String, NotificationError> {
    let compact: String = phone
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();
    let digits = compact.strip_prefix('+').unwrap_or(&compact);

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(NotificationError::validation(
            "recipient_phone contains invalid characters",
        ));
    }

    if !(7..=15).contains(&digits.len()) {
        return Err(NotificationError::validation(
            "recipient_phone must have between 7 and 15 digits",
        ));
    }

    Ok(compact)
}

fn require_non_empty(field: &str, value: &str) -> Result<(), NotificationError> {
    if value.trim().is_empty() {
        return Err(NotificationError::validation(format!("{} is required", field)));
    }
    Ok(())
}

fn validate_identifier(field: &str, value: &str) -> Result<(), NotificationError> {
    require_non_empty(field, value)?;
    Uuid::parse_str(value.trim())
        .map_err(|_| NotificationError::validation(format!("{} must be a UUID", field)))?;
    Ok(())
}
