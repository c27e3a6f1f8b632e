use chrono::NaiveDate;

use crate::errors::FieldError;
use crate::models::BookingRequest;

/// Every problem with the draft, one entry per offending field.
pub fn validate_request(request: &BookingRequest, today: NaiveDate) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if request.name.trim().chars().count() < 2 {
        errors.push(FieldError::new("name", "name is required"));
    }

    if !is_valid_phone(&request.phone) {
        errors.push(FieldError::new("phone", "enter a phone number with 8 to 15 digits"));
    }

    if request.email.trim().is_empty() {
        errors.push(FieldError::new("email", "email is required"));
    } else if !is_valid_email(&request.email) {
        errors.push(FieldError::new("email", "email address is not valid"));
    }

    match request.date {
        None => errors.push(FieldError::new("date", "date is required")),
        Some(date) if date < today => {
            errors.push(FieldError::new("date", "date cannot be in the past"))
        }
        Some(_) => {}
    }

    if request.time.as_deref().map_or(true, |t| t.trim().is_empty()) {
        errors.push(FieldError::new("time", "pick a time"));
    }

    let has_address = request
        .address
        .as_deref()
        .is_some_and(|a| !a.trim().is_empty());
    if request.is_home_service && !has_address {
        errors.push(FieldError::new("address", "address is required for home service"));
    }

    errors
}

pub fn is_valid_phone(phone: &str) -> bool {
    let mut digits = 0;
    for c in phone.trim().chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '+' | '-' | '(' | ')' => {}
            _ => return false,
        }
    }
    (8..=15).contains(&digits)
}

pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2,
        None => false,
    }
}
