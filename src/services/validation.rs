use thiserror::Error;

/// A single violated constraint, reported as "<field>: <rule>".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: &'static str,
}

const MUST_NOT_BE_BLANK: &str = "must not be blank";

pub fn probation_area_code(value: &str) -> Result<(), ValidationError> {
    code(value, "probationAreaCode", "Invalid Probation Area code")
}

pub fn local_delivery_unit_code(value: &str) -> Result<(), ValidationError> {
    code(value, "localDeliveryUnitCode", "Invalid Local Delivery Unit code")
}

pub fn team_code(value: &str) -> Result<(), ValidationError> {
    code(value, "teamCode", "Invalid Team code")
}

// Pattern ^[A-Z0-9_]+$
fn code(value: &str, field: &'static str, message: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError { field, message: MUST_NOT_BE_BLANK });
    }
    let valid = value
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ValidationError { field, message })
    }
}

pub fn email(value: &str) -> Result<(), ValidationError> {
    let field = "proposedFunctionalMailbox";
    if value.trim().is_empty() {
        return Err(ValidationError { field, message: MUST_NOT_BE_BLANK });
    }

    let malformed = ValidationError {
        field,
        message: "must be a well-formed email address",
    };

    if value.chars().any(char::is_whitespace) {
        return Err(malformed);
    }
    let (local, domain) = match value.split_once('@') {
        Some(parts) => parts,
        None => return Err(malformed),
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(malformed);
    }
    if domain.starts_with('.') || domain.ends_with('.') {
        return Err(malformed);
    }
    Ok(())
}
