//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request bodies arrive with loosely typed fields; these helpers turn them
//! into domain values and produce `invalid_request` errors whose `details`
//! name the offending field.

use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Awb, CodAmount, DeliveryStatus, Error, EventDate, Role};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidValue,
    InvalidDate,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::InvalidDate => "invalid_date",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

/// A JSON field that clients send either as a number or as numeric text,
/// which is what HTML number inputs produce.
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum Numeric {
    /// Plain JSON number.
    Number(f64),
    /// Numeric string such as `"150000"`.
    Text(String),
}

impl Numeric {
    fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(raw) if raw.trim().is_empty() => Some(0.0),
            Self::Text(raw) => raw.trim().parse().ok(),
        }
    }

    fn render(&self) -> String {
        match self {
            Self::Number(value) => value.to_string(),
            Self::Text(raw) => raw.clone(),
        }
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_value_error(
    field: FieldName,
    value: &str,
    reason: impl Into<String>,
) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field}: {}", reason.into()))
        .with_value(ErrorCode::InvalidValue, value)
}

pub(crate) fn invalid_date_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a YYYY-MM-DD date"))
        .with_value(ErrorCode::InvalidDate, value)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

/// Trim optional free text, mapping blank input to `None`.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    non_blank(value).map(|raw| raw.trim().to_owned())
}

pub(crate) fn parse_awb(value: &str, field: FieldName) -> Result<Awb, Error> {
    Awb::new(value).map_err(|err| invalid_value_error(field, value, err.to_string()))
}

pub(crate) fn require_awb(value: Option<String>, field: FieldName) -> Result<Awb, Error> {
    let raw = non_blank(value).ok_or_else(|| missing_field_error(field))?;
    parse_awb(&raw, field)
}

pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<EventDate, Error> {
    EventDate::parse(value).map_err(|_| invalid_date_error(field, value))
}

pub(crate) fn require_date(value: Option<String>, field: FieldName) -> Result<EventDate, Error> {
    let raw = non_blank(value).ok_or_else(|| missing_field_error(field))?;
    parse_date(&raw, field)
}

/// Blank or absent status means `Proses`.
pub(crate) fn parse_status(
    value: Option<String>,
    field: FieldName,
) -> Result<DeliveryStatus, Error> {
    match non_blank(value) {
        None => Ok(DeliveryStatus::default()),
        Some(raw) => raw
            .parse::<DeliveryStatus>()
            .map_err(|err| invalid_value_error(field, &raw, err.to_string())),
    }
}

/// Blank or absent amount means zero.
pub(crate) fn parse_cod(value: Option<Numeric>, field: FieldName) -> Result<CodAmount, Error> {
    let Some(numeric) = value else {
        return Ok(CodAmount::default());
    };
    let amount = numeric
        .to_f64()
        .ok_or_else(|| invalid_value_error(field, &numeric.render(), "must be a number"))?;
    CodAmount::new(amount)
        .map_err(|err| invalid_value_error(field, &numeric.render(), err.to_string()))
}

/// Absent counter means zero; fractional or negative values are rejected.
pub(crate) fn parse_counter(value: Option<Numeric>, field: FieldName) -> Result<u32, Error> {
    let Some(numeric) = value else {
        return Ok(0);
    };
    let rendered = numeric.render();
    let invalid = || invalid_value_error(field, &rendered, "must be a whole number of at least 0");
    match &numeric {
        Numeric::Number(value) => {
            if value.fract() != 0.0 || *value < 0.0 || *value > f64::from(u32::MAX) {
                return Err(invalid());
            }
            format!("{value:.0}").parse().map_err(|_| invalid())
        }
        Numeric::Text(raw) if raw.trim().is_empty() => Ok(0),
        Numeric::Text(raw) => raw.trim().parse().map_err(|_| invalid()),
    }
}

pub(crate) fn parse_role(value: Option<String>, field: FieldName) -> Result<Role, Error> {
    let raw = non_blank(value).ok_or_else(|| missing_field_error(field))?;
    raw.parse::<Role>()
        .map_err(|err| invalid_value_error(field, &raw, err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode as DomainCode;
    use rstest::rstest;

    const AWB: FieldName = FieldName::new("AWB");
    const DATE: FieldName = FieldName::new("Tanggal");
    const COD: FieldName = FieldName::new("COD Amount");
    const COUNTER: FieldName = FieldName::new("pickup_success");

    fn detail_code(err: &Error) -> Option<&str> {
        err.details()
            .and_then(|details| details.get("code"))
            .and_then(serde_json::Value::as_str)
    }

    #[rstest]
    #[case(None)]
    #[case(Some("   ".to_owned()))]
    fn absent_awb_is_a_missing_field(#[case] raw: Option<String>) {
        let err = require_awb(raw, AWB).expect_err("missing AWB");
        assert_eq!(err.code(), DomainCode::InvalidRequest);
        assert_eq!(err.message(), "missing required field: AWB");
        assert_eq!(detail_code(&err), Some("missing_field"));
    }

    #[rstest]
    fn dates_must_be_iso() {
        let err = require_date(Some("20/07/2024".to_owned()), DATE).expect_err("bad date");
        assert_eq!(detail_code(&err), Some("invalid_date"));
        assert_eq!(
            err.details().and_then(|d| d.get("value")),
            Some(&json!("20/07/2024"))
        );
        assert!(require_date(Some("2024-07-20".to_owned()), DATE).is_ok());
    }

    #[rstest]
    #[case(None, 0.0)]
    #[case(Some(Numeric::Number(50_000.0)), 50_000.0)]
    #[case(Some(Numeric::Text("150000".to_owned())), 150_000.0)]
    #[case(Some(Numeric::Text(String::new())), 0.0)]
    fn cod_accepts_numbers_and_numeric_text(#[case] raw: Option<Numeric>, #[case] expected: f64) {
        let amount = parse_cod(raw, COD).expect("valid amount");
        assert!((amount.value() - expected).abs() < f64::EPSILON);
    }

    #[rstest]
    #[case(Numeric::Number(-1.0))]
    #[case(Numeric::Text("lima ribu".to_owned()))]
    fn cod_rejects_negative_and_non_numeric(#[case] raw: Numeric) {
        let err = parse_cod(Some(raw), COD).expect_err("invalid amount");
        assert_eq!(detail_code(&err), Some("invalid_value"));
    }

    #[rstest]
    #[case(Some(Numeric::Number(12.0)), Ok(12))]
    #[case(Some(Numeric::Text("7".to_owned())), Ok(7))]
    #[case(None, Ok(0))]
    #[case(Some(Numeric::Number(1.5)), Err(()))]
    #[case(Some(Numeric::Number(-3.0)), Err(()))]
    fn counters_are_whole_numbers(#[case] raw: Option<Numeric>, #[case] expected: Result<u32, ()>) {
        assert_eq!(parse_counter(raw, COUNTER).map_err(|_| ()), expected);
    }

    #[rstest]
    fn blank_status_defaults_to_proses() {
        let status = parse_status(Some(String::new()), FieldName::new("Status")).expect("status");
        assert_eq!(status, DeliveryStatus::Proses);
    }

    #[rstest]
    fn unknown_roles_are_rejected() {
        let err = parse_role(Some("root".to_owned()), FieldName::new("role")).expect_err("role");
        assert_eq!(detail_code(&err), Some("invalid_value"));
    }
}
