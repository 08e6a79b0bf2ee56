// Common validation types and traits

#[derive(Debug)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.is_valid = false;
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn merge(&mut self, other: ValidationResult) {
        if !other.is_valid {
            self.is_valid = false;
            self.errors.extend(other.errors);
        }
    }

    /// Turn the result into `Err(ApiError::ValidationError)` when anything failed
    pub fn into_result(self) -> Result<(), super::ApiError> {
        if self.is_valid {
            Ok(())
        } else {
            Err(self.into())
        }
    }
}

pub trait Validator<T> {
    fn validate(&self, data: &T) -> ValidationResult;
}

// ---- Field checks shared by the domain validators ----

/// Loose email check: something before and after a single '@' and a dot in the domain
pub fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        _ => false,
    }
}

/// Ghana phone numbers: `0XXXXXXXXX` (10 chars) or `+233XXXXXXXXX` (13 chars)
pub fn is_ghana_phone(phone: &str) -> bool {
    let phone = phone.trim();
    let digits = if let Some(rest) = phone.strip_prefix("+233") {
        rest
    } else if let Some(rest) = phone.strip_prefix('0') {
        rest
    } else {
        return false;
    };
    digits.len() == 9 && digits.chars().all(|c| c.is_ascii_digit())
}

/// ISO 4217 shaped currency code (three uppercase ASCII letters)
pub fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase())
}

/// Positive, finite money amount
pub fn is_positive_amount(amount: f64) -> bool {
    amount.is_finite() && amount > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_checks() {
        assert!(is_plausible_email("donor@example.com"));
        assert!(is_plausible_email("  a.b@agapay.gh "));
        assert!(!is_plausible_email("donor.example.com"));
        assert!(!is_plausible_email("a@b@c.com"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("donor@localhost"));
        assert!(!is_plausible_email("do nor@example.com"));
    }

    #[test]
    fn test_ghana_phone_checks() {
        assert!(is_ghana_phone("0241234567"));
        assert!(is_ghana_phone("+233241234567"));
        assert!(!is_ghana_phone("241234567"));
        assert!(!is_ghana_phone("+23324123456"));
        assert!(!is_ghana_phone("02412345ab"));
    }

    #[test]
    fn test_currency_and_amount() {
        assert!(is_currency_code("GHS"));
        assert!(!is_currency_code("ghs"));
        assert!(!is_currency_code("CEDI"));
        assert!(is_positive_amount(0.5));
        assert!(!is_positive_amount(0.0));
        assert!(!is_positive_amount(-3.0));
        assert!(!is_positive_amount(f64::NAN));
        assert!(!is_positive_amount(f64::INFINITY));
    }

    #[test]
    fn test_merge_keeps_errors() {
        let mut first = ValidationResult::new();
        let mut second = ValidationResult::new();
        second.add_error("email", "Email is required");
        first.merge(second);
        assert!(!first.is_valid);
        assert_eq!(first.errors.len(), 1);
        assert!(first.into_result().is_err());
    }
}
