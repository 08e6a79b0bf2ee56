use super::models::{PaymentMethod, SubmitPaymentRequest};
use crate::common::validation::{
    is_currency_code, is_ghana_phone, is_plausible_email, is_positive_amount,
};
use crate::common::{ValidationResult, Validator};

impl Validator<SubmitPaymentRequest> for SubmitPaymentRequest {
    fn validate(&self, data: &SubmitPaymentRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if !is_positive_amount(data.amount) {
            result.add_error("amount", "Amount must be greater than 0");
        }

        if let Some(currency) = &data.currency {
            if !is_currency_code(currency) {
                result.add_error("currency", "Currency must be a 3-letter uppercase code");
            }
        }

        if data.customer_email.trim().is_empty() {
            result.add_error("customer_email", "Email is required");
        } else if !is_plausible_email(data.customer_email.trim()) {
            result.add_error("customer_email", "Email address is not valid");
        }

        if data.customer_name.trim().is_empty() {
            result.add_error("customer_name", "Name is required");
        }

        if let Some(phone) = data.customer_phone.as_deref().filter(|p| !p.trim().is_empty()) {
            if !is_ghana_phone(phone) {
                result.add_error(
                    "customer_phone",
                    "Phone number must be +233XXXXXXXXX or 0XXXXXXXXX",
                );
            }
        }

        if data.payment_method == PaymentMethod::MobileMoney {
            if data.mobile_money_provider.is_none() {
                result.add_error(
                    "mobile_money_provider",
                    "Mobile money payments need a provider",
                );
            }
            if data
                .customer_phone
                .as_deref()
                .map_or(true, |p| p.trim().is_empty())
            {
                result.add_error("customer_phone", "Mobile money payments need a phone number");
            }
        }

        result
    }
}
