//! Required-field checks for [`CampaignInput`], run before any remote call.

use thiserror::Error;

use crate::campaign::CampaignInput;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field that failed validation, in form order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid campaign input: {}", join_fields(.fields))]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    /// Returns the error for `field`, if that field was rejected.
    #[must_use]
    pub fn field(&self, field: &str) -> Option<&FieldError> {
        self.fields.iter().find(|f| f.field == field)
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Checks that `company_name`, `website`, and `industry` are non-blank.
///
/// # Errors
///
/// Returns [`ValidationError`] listing every blank required field.
pub fn validate_campaign_input(input: &CampaignInput) -> Result<(), ValidationError> {
    let required = [
        ("company_name", &input.company_name),
        ("website", &input.website),
        ("industry", &input.industry),
    ];

    let fields: Vec<FieldError> = required
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| FieldError {
            field,
            message: "is required".to_string(),
        })
        .collect();

    if fields.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { fields })
    }
}
