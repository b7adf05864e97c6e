// Client-side validation for the lead-capture forms, run before anything is
// POSTed upstream.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, FieldError};
use crate::models::{EnquiryForm, RatingForm};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").expect("email regex"));

// 7-15 digits, optional leading +, separators stripped before matching.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9]{7,15}$").expect("phone regex"));

pub fn validate_enquiry(form: &EnquiryForm) -> Result<(), AppError> {
    let mut fields = Vec::new();

    if form.name.trim().is_empty() {
        fields.push(field("name", "Name is required."));
    }
    if form.email.trim().is_empty() {
        fields.push(field("email", "Email is required."));
    } else if !EMAIL_RE.is_match(form.email.trim()) {
        fields.push(field("email", "Enter a valid email address."));
    }

    let phone: String = form
        .phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    if phone.is_empty() {
        fields.push(field("phone", "Phone number is required."));
    } else if !PHONE_RE.is_match(&phone) {
        fields.push(field("phone", "Enter a valid phone number."));
    }

    if form.item_id <= 0 {
        fields.push(field("item_id", "A listing must be selected."));
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(AppError::validation("Please check the submitted fields.", fields))
    }
}

pub fn validate_rating(form: &RatingForm) -> Result<(), AppError> {
    let mut fields = Vec::new();

    if !(1..=5).contains(&form.rating) {
        fields.push(field("rating", "Rating must be between 1 and 5 stars."));
    }
    if form.item_id <= 0 {
        fields.push(field("item_id", "A listing must be selected."));
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(AppError::validation("Please check the submitted fields.", fields))
    }
}

fn field(name: &str, message: &str) -> FieldError {
    FieldError {
        field: name.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn enquiry() -> EnquiryForm {
        EnquiryForm {
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "+91 98765 43210".to_string(),
            message: Some("Is this still available?".to_string()),
            item_id: 12,
            category: Category::Bike,
        }
    }

    fn failed_fields(err: AppError) -> Vec<String> {
        match err {
            AppError::Validation { fields, .. } => {
                fields.into_iter().map(|f| f.field).collect()
            }
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn well_formed_enquiry_passes() {
        assert!(validate_enquiry(&enquiry()).is_ok());
    }

    #[test]
    fn missing_required_fields_are_each_reported() {
        let form = EnquiryForm {
            name: "  ".to_string(),
            email: String::new(),
            phone: String::new(),
            ..enquiry()
        };
        let fields = failed_fields(validate_enquiry(&form).unwrap_err());
        assert_eq!(fields, vec!["name", "email", "phone"]);
    }

    #[test]
    fn bad_email_and_phone_formats_are_rejected() {
        let mut form = enquiry();
        form.email = "not-an-email".to_string();
        form.phone = "12ab34".to_string();
        let fields = failed_fields(validate_enquiry(&form).unwrap_err());
        assert!(fields.contains(&"email".to_string()));
        assert!(fields.contains(&"phone".to_string()));
    }

    #[test]
    fn phone_separators_are_tolerated() {
        let mut form = enquiry();
        form.phone = "(987) 654-3210".to_string();
        assert!(validate_enquiry(&form).is_ok());
    }

    #[test]
    fn rating_outside_one_to_five_is_rejected() {
        let form = RatingForm {
            item_id: 3,
            rating: 0,
            comment: None,
        };
        let fields = failed_fields(validate_rating(&form).unwrap_err());
        assert_eq!(fields, vec!["rating"]);

        let form = RatingForm {
            item_id: 3,
            rating: 5,
            comment: Some("great seller".to_string()),
        };
        assert!(validate_rating(&form).is_ok());
    }
}
