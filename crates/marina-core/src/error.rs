//! # Error Types
//!
//! Domain-specific error types for marina-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  marina-core errors (this file)                                        │
//! │  ├── CoreError        - Seat, fare and booking rule failures           │
//! │  └── ValidationError  - Passenger detail input failures                │
//! │                                                                         │
//! │  marina-gateway errors (separate crate)                                │
//! │  └── GatewayError     - HTTP, config and ticket rejection failures     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → GatewayError → caller             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT an Error
//! Clicking an occupied or restricted seat is a no-op. The seating state
//! machine reports it as `ClickOutcome::Ignored`, never as an `Err`.

use thiserror::Error;

use crate::types::Leg;

// =============================================================================
// Core Error
// =============================================================================

/// Core booking rule errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Fewer matching-class seats are available than passengers requested.
    ///
    /// ## User Workflow
    /// ```text
    /// 4 economy passengers, 3 economy seats left
    ///      │
    ///      ▼
    /// auto_assign → 3 seats, shortfall 1
    ///      │
    ///      ▼
    /// confirm() → SeatShortfall { requested: 4, assigned: 3 }
    ///      │
    ///      ▼
    /// UI shows: "1 more seat needed"
    /// ```
    #[error("Not enough seats: requested {requested}, only {assigned} available")]
    SeatShortfall { requested: usize, assigned: usize },

    /// Manual selection is shorter than the passenger count.
    #[error("Seat selection incomplete: {selected} of {required} seats chosen")]
    SelectionIncomplete { selected: usize, required: usize },

    /// More seats are held than the leg has passengers.
    #[error("Too many seats: {selected} chosen for {required} passengers")]
    TooManySeats { selected: usize, required: usize },

    /// The seating state machine does not allow this action in its current state.
    #[error("Cannot {action} while seating is {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },

    /// No layout template is registered for the ship type.
    #[error("Unknown ship type: {0}")]
    UnknownShipType(String),

    /// Passenger details do not match the per-type head counts.
    #[error("{leg} leg expects {expected} passengers, got {actual}")]
    PassengerCountMismatch {
        leg: Leg,
        expected: u32,
        actual: u32,
    },

    /// Currency code is not one the booking flow can display.
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    /// A leg has no voyage chosen yet.
    #[error("No voyage selected for the {0} leg")]
    VoyageMissing(Leg),

    /// Seats must be confirmed before a ticket request is built.
    #[error("Seats for the {0} leg are not confirmed")]
    SeatingNotConfirmed(Leg),

    /// The booking has no return leg.
    #[error("Booking has no return leg")]
    NoReturnLeg,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised while building ticket requests from passenger details.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed email, seat code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Convenience type alias for validation results.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::SeatShortfall {
            requested: 4,
            assigned: 3,
        };
        assert_eq!(
            err.to_string(),
            "Not enough seats: requested 4, only 3 available"
        );

        let err = CoreError::PassengerCountMismatch {
            leg: Leg::Return,
            expected: 3,
            actual: 2,
        };
        assert_eq!(err.to_string(), "return leg expects 3 passengers, got 2");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "email".to_string(),
        };
        assert_eq!(err.to_string(), "email is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "surname".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
