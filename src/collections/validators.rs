use chrono::NaiveDate;

use super::models::{CreateCollectionRequest, UpdateCollectionRequest};
use crate::common::validation::{is_currency_code, is_positive_amount};
use crate::common::{ValidationResult, Validator};

pub const MAX_TITLE_LEN: usize = 200;

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn check_title(result: &mut ValidationResult, title: &str) {
    if title.trim().is_empty() {
        result.add_error("title", "Title is required");
    } else if title.chars().count() > MAX_TITLE_LEN {
        result.add_error("title", "Title must not exceed 200 characters");
    }
}

fn check_target(result: &mut ValidationResult, target: Option<f64>) {
    if let Some(target) = target {
        if !is_positive_amount(target) {
            result.add_error("target_amount", "Target amount must be greater than 0");
        }
    }
}

fn check_currency(result: &mut ValidationResult, currency: Option<&str>) {
    if let Some(currency) = currency {
        if !is_currency_code(currency) {
            result.add_error(
                "currency",
                "Currency must be a 3-letter uppercase code such as GHS",
            );
        }
    }
}

/// Each date must be `YYYY-MM-DD` and the end must not precede the start
pub fn check_dates(result: &mut ValidationResult, start: Option<&str>, end: Option<&str>) {
    let start_date = start.map(|s| (s, parse_date(s)));
    let end_date = end.map(|s| (s, parse_date(s)));

    if let Some((_, None)) = start_date {
        result.add_error("start_date", "Start date must be in YYYY-MM-DD format");
    }
    if let Some((_, None)) = end_date {
        result.add_error("end_date", "End date must be in YYYY-MM-DD format");
    }

    if let (Some((_, Some(start))), Some((_, Some(end)))) = (start_date, end_date) {
        if end < start {
            result.add_error("end_date", "End date must not be before the start date");
        }
    }
}

impl Validator<CreateCollectionRequest> for CreateCollectionRequest {
    fn validate(&self, data: &CreateCollectionRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        check_title(&mut result, &data.title);
        check_target(&mut result, data.target_amount);
        check_currency(&mut result, data.currency.as_deref());
        check_dates(
            &mut result,
            data.start_date.as_deref(),
            data.end_date.as_deref(),
        );

        result
    }
}

impl Validator<UpdateCollectionRequest> for UpdateCollectionRequest {
    fn validate(&self, data: &UpdateCollectionRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(title) = &data.title {
            check_title(&mut result, title);
        }
        check_target(&mut result, data.target_amount);
        check_currency(&mut result, data.currency.as_deref());

        // Date ordering against stored values is checked by the service
        check_dates(
            &mut result,
            data.start_date.as_deref(),
            data.end_date.as_deref(),
        );

        result
    }
}

pub fn validate_increment(amount: f64) -> ValidationResult {
    let mut result = ValidationResult::new();
    if !is_positive_amount(amount) {
        result.add_error("amount", "Amount must be a finite number greater than 0");
    }
    result
}
