//! Shared request validation helpers.
//!
//! Request DTOs keep every field optional so a missing value surfaces as a
//! structured `invalid_request` instead of a bare deserialisation failure.

use serde_json::json;

use crate::domain::{Error, IdentifierValidationError};

/// Validation error codes reported in `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationCode {
    MissingField,
    InvalidIdentifier,
    EmptyList,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidIdentifier => "invalid_identifier",
            Self::EmptyList => "empty_list",
        }
    }
}

/// Wire name of a request field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, code: ValidationCode, message: String) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    field_error(
        field,
        ValidationCode::MissingField,
        format!("missing required field: {}", field.as_str()),
    )
}

pub(crate) fn empty_list_error(field: FieldName) -> Error {
    field_error(
        field,
        ValidationCode::EmptyList,
        format!("{} must not be empty", field.as_str()),
    )
}

/// Require a present field.
pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

/// Require a present, well-formed identifier. Blank strings count as missing.
pub(crate) fn require_identifier<T>(value: Option<String>, field: FieldName) -> Result<T, Error>
where
    T: TryFrom<String, Error = IdentifierValidationError>,
{
    parse_identifier(require(value, field)?, field)
}

pub(crate) fn parse_identifier<T>(raw: String, field: FieldName) -> Result<T, Error>
where
    T: TryFrom<String, Error = IdentifierValidationError>,
{
    T::try_from(raw).map_err(|err| match err {
        IdentifierValidationError::Empty { .. } => missing_field_error(field),
        IdentifierValidationError::Padded { .. } => field_error(
            field,
            ValidationCode::InvalidIdentifier,
            format!("{} must not start or end with whitespace", field.as_str()),
        ),
    })
}

/// Require a present, non-blank free-text field.
pub(crate) fn require_text(value: Option<String>, field: FieldName) -> Result<String, Error> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(missing_field_error(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, UserId};
    use rstest::rstest;

    const USER_ID: FieldName = FieldName::new("user_id");

    fn detail_code(err: &Error) -> Option<&str> {
        err.details()
            .and_then(|d| d.get("code"))
            .and_then(|c| c.as_str())
    }

    #[rstest]
    #[case(None)]
    #[case(Some(String::new()))]
    #[case(Some("   ".to_owned()))]
    fn absent_or_blank_identifier_is_missing(#[case] raw: Option<String>) {
        let err = require_identifier::<UserId>(raw, USER_ID).expect_err("rejected");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), "missing required field: user_id");
        assert_eq!(detail_code(&err), Some("missing_field"));
    }

    #[rstest]
    fn padded_identifier_is_invalid() {
        let err =
            require_identifier::<UserId>(Some(" u1".to_owned()), USER_ID).expect_err("rejected");
        assert_eq!(detail_code(&err), Some("invalid_identifier"));
    }

    #[rstest]
    fn valid_identifier_parses() {
        let id: UserId = require_identifier(Some("u1".to_owned()), USER_ID).expect("valid");
        assert_eq!(id.as_str(), "u1");
    }

    #[rstest]
    #[case(None, false)]
    #[case(Some("  ".to_owned()), false)]
    #[case(Some("Add search".to_owned()), true)]
    fn text_must_be_non_blank(#[case] raw: Option<String>, #[case] accepted: bool) {
        let field = FieldName::new("pull_request_name");
        assert_eq!(require_text(raw, field).is_ok(), accepted);
    }
}
