use crate::utils::error::ApiError;
use regex::Regex;

const EMAIL_PATTERN: &str = r"^.+@.+\..+$";

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    // Check password length
    if password.len() < 8 || password.len() > 20 {
        return Err(ApiError::ValidationError(
            "Password must be between 8 and 20 characters long.".into(),
        ));
    }

    // Check for at least one lowercase letter, one uppercase letter, and one digit
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !has_lowercase || !has_uppercase || !has_digit {
        return Err(ApiError::ValidationError(
            "Password must include at least one uppercase letter, one lowercase letter, and one number.".into(),
        ));
    }

    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ApiError> {
    let re = Regex::new(EMAIL_PATTERN)
        .map_err(|e| ApiError::InternalServerError(format!("Invalid email pattern: {}", e)))?;

    if !re.is_match(email) {
        return Err(ApiError::ValidationError(
            "Email address is not valid.".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_email, validate_password};

    #[test]
    fn password_length_bounds() {
        assert!(validate_password("Ab1").is_err());
        assert!(validate_password("Abcdefg1").is_ok());
        assert!(validate_password("Abcdefg1Abcdefg1Abcdefg1").is_err());
    }

    #[test]
    fn password_character_classes() {
        assert!(validate_password("alllowercase1").is_err());
        assert!(validate_password("ALLUPPERCASE1").is_err());
        assert!(validate_password("NoDigitsHere").is_err());
        assert!(validate_password("MixedCase123").is_ok());
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("someone@example.com").is_ok());
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
        assert!(validate_email("@example.com").is_err());
    }
}
