//! # Validation Module
//!
//! Passenger detail validation for ticket creation.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Booking form (UI)                                            │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: BookingSession::ticket_requests (Rust)                       │
//! │  ├── Head counts match passenger list                                  │
//! │  └── THIS MODULE: per-passenger detail rules                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Booking API                                                  │
//! │  └── Authoritative acceptance or rejection of the ticket               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use marina_core::validation::{validate_email, validate_passenger_count};
//!
//! validate_email("ada@example.com").unwrap();
//! validate_passenger_count(3).unwrap();
//! ```

use chrono::NaiveDate;

use crate::error::{ValidationError, ValidationResult};
use crate::types::Passenger;
use crate::MAX_PASSENGERS_PER_LEG;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a given name or surname.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Letters, spaces, hyphens and apostrophes only
///
/// ## Example
/// ```rust
/// use marina_core::validation::validate_person_name;
///
/// assert!(validate_person_name("name", "Ayşe").is_ok());
/// assert!(validate_person_name("surname", "O'Brien-Smith").is_ok());
/// assert!(validate_person_name("name", "").is_err());
/// assert!(validate_person_name("name", "R2D2").is_err());
/// ```
pub fn validate_person_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > 50 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 50,
        });
    }

    if !value
        .chars()
        .all(|c| c.is_alphabetic() || c == ' ' || c == '-' || c == '\'')
    {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only letters, spaces, hyphens, and apostrophes".to_string(),
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - Exactly one `@` with a non-empty local part
/// - Domain contains a dot that is neither first nor last
/// - No whitespace, at most 254 characters
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > 254 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 254,
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@domain.tld".to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    match domain.rfind('.') {
        Some(dot) if dot > 0 && dot < domain.len() - 1 => Ok(()),
        _ => Err(invalid()),
    }
}

/// Validates a phone number.
///
/// ## Rules
/// - Optional leading `+`
/// - Spaces, hyphens and parentheses are ignored
/// - 10 to 15 digits remain
///
/// ## Example
/// ```rust
/// use marina_core::validation::validate_phone;
///
/// assert!(validate_phone("+90 (532) 123-4567").is_ok());
/// assert!(validate_phone("12345").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone_no".to_string(),
        });
    }

    let body = phone.strip_prefix('+').unwrap_or(phone);
    let mut digits = 0usize;
    for c in body.chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '-' | '(' | ')' => {}
            _ => {
                return Err(ValidationError::InvalidFormat {
                    field: "phone_no".to_string(),
                    reason: "must contain only digits and separators".to_string(),
                })
            }
        }
    }

    if !(10..=15).contains(&digits) {
        return Err(ValidationError::OutOfRange {
            field: "phone_no digits".to_string(),
            min: 10,
            max: 15,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the passenger count of one leg.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_PASSENGERS_PER_LEG
pub fn validate_passenger_count(count: u32) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::MustBePositive {
            field: "passenger count".to_string(),
        });
    }

    if count > MAX_PASSENGERS_PER_LEG {
        return Err(ValidationError::OutOfRange {
            field: "passenger count".to_string(),
            min: 1,
            max: MAX_PASSENGERS_PER_LEG as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Passenger Validator
// =============================================================================

/// Validates one passenger's details.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Checkout: Submit                                                       │
/// │                                                                         │
/// │  For each passenger on each pending leg:                               │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_passenger(p, travel_date) ← THIS FUNCTION                    │
/// │       │                                                                 │
/// │       ├── name / surname malformed? → Error                            │
/// │       │                                                                 │
/// │       ├── born after the voyage? → Error                               │
/// │       │                                                                 │
/// │       ├── not a child and no email/phone? → Error                      │
/// │       │                                                                 │
/// │       └── OK → ticket request built                                    │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// Contact details a child does provide are still checked for format.
pub fn validate_passenger(passenger: &Passenger, travel_date: NaiveDate) -> ValidationResult<()> {
    validate_person_name("name", &passenger.name)?;
    validate_person_name("surname", &passenger.surname)?;

    if passenger.birth_date > travel_date {
        return Err(ValidationError::InvalidFormat {
            field: "birth_date".to_string(),
            reason: "must not be after the travel date".to_string(),
        });
    }

    let required = passenger.passenger_type.requires_contact();

    match passenger.email.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(email) => validate_email(email)?,
        None if required => {
            return Err(ValidationError::Required {
                field: "email".to_string(),
            })
        }
        None => {}
    }

    match passenger.phone_no.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(phone) => validate_phone(phone)?,
        None if required => {
            return Err(ValidationError::Required {
                field: "phone_no".to_string(),
            })
        }
        None => {}
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PassengerType;

    fn passenger(passenger_type: PassengerType) -> Passenger {
        Passenger {
            name: "Deniz".to_string(),
            surname: "Kaya".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
            email: Some("deniz@example.com".to_string()),
            phone_no: Some("+90 532 123 4567".to_string()),
            passenger_type,
        }
    }

    fn travel_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()
    }

    #[test]
    fn test_validate_person_name() {
        assert!(validate_person_name("name", "Deniz").is_ok());
        assert!(validate_person_name("name", "Jean-Luc").is_ok());
        assert!(validate_person_name("name", "   ").is_err());
        assert!(validate_person_name("name", &"a".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("a@b@c.com").is_err());
        assert!(validate_email("a@nodot").is_err());
        assert!(validate_email("a@.com").is_err());
        assert!(validate_email("a b@c.com").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("05321234567").is_ok());
        assert!(validate_phone("+44 20 7946 0958").is_ok());
        assert!(validate_phone("call me").is_err());
        assert!(validate_phone("123").is_err());
    }

    #[test]
    fn test_validate_passenger_count() {
        assert!(validate_passenger_count(1).is_ok());
        assert!(validate_passenger_count(MAX_PASSENGERS_PER_LEG).is_ok());
        assert!(validate_passenger_count(0).is_err());
        assert!(validate_passenger_count(MAX_PASSENGERS_PER_LEG + 1).is_err());
    }

    #[test]
    fn test_adult_requires_contact() {
        let mut adult = passenger(PassengerType::Adult);
        assert!(validate_passenger(&adult, travel_date()).is_ok());

        adult.email = None;
        assert_eq!(
            validate_passenger(&adult, travel_date()),
            Err(ValidationError::Required {
                field: "email".to_string()
            })
        );
    }

    #[test]
    fn test_child_may_omit_contact() {
        let mut child = passenger(PassengerType::Child);
        child.birth_date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        child.email = None;
        child.phone_no = Some("  ".to_string());
        assert!(validate_passenger(&child, travel_date()).is_ok());

        child.email = Some("broken".to_string());
        assert!(validate_passenger(&child, travel_date()).is_err());
    }

    #[test]
    fn test_birth_after_travel_rejected() {
        let mut p = passenger(PassengerType::Adult);
        p.birth_date = NaiveDate::from_ymd_opt(2027, 1, 1).unwrap();
        assert!(validate_passenger(&p, travel_date()).is_err());
    }
}
