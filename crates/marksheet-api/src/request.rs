//! Request parsing helpers shared by every handler module.

use rust_decimal::Decimal;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::ApiError;

/// Parse a UUID from a path segment.
pub fn parse_uuid(s: &str) -> Result<Uuid, ApiError> {
    s.parse::<Uuid>()
        .map_err(|e| ApiError::InvalidUuid(format!("{s}: {e}")))
}

/// Run field validation on a request body.
pub fn validated<T: Validate>(request: T) -> Result<T, ApiError> {
    request.validate()?;
    Ok(request)
}

/// Field validator: the decimal must be zero or more.
pub fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("non_negative")
            .with_message(std::borrow::Cow::Borrowed("must not be negative")));
    }
    Ok(())
}

/// Field validator: the decimal must be a percentage in `0..=100`.
pub fn percentage(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > Decimal::ONE_HUNDRED {
        return Err(ValidationError::new("percentage")
            .with_message(std::borrow::Cow::Borrowed("must be between 0 and 100")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_errors_name_the_input() {
        let err = parse_uuid("not-a-uuid").err();
        assert!(matches!(err, Some(ApiError::InvalidUuid(msg)) if msg.starts_with("not-a-uuid")));
        assert!(parse_uuid("0192d5f0-7a3c-7b4e-8f00-000000000001").is_ok());
    }

    #[test]
    fn decimal_validators() {
        assert!(non_negative(&Decimal::ZERO).is_ok());
        assert!(non_negative(&Decimal::NEGATIVE_ONE).is_err());
        assert!(percentage(&Decimal::ONE_HUNDRED).is_ok());
        assert!(percentage(&Decimal::new(1001, 1)).is_err());
    }
}
