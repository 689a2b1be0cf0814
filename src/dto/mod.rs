//! Request and response bodies. Request types only describe the wire shape;
//! each one has a `validate()` that parses it into a command the services
//! consume, so services never see unchecked input.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod content;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod shops;

use serde::{Deserialize, Deserializer};

use crate::error::{AppError, AppResult};

/// Trim, and treat blank as absent.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn required_text(field: &str, value: Option<String>) -> AppResult<String> {
    optional_text(value).ok_or_else(|| AppError::BadRequest(format!("{field} is required")))
}

/// Prices are decimals kept as text; reject anything that is not a finite,
/// non-negative number.
pub fn validate_price(field: &str, raw: &str) -> AppResult<String> {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(trimmed.to_string()),
        _ => Err(AppError::BadRequest(format!("{field} must be a non-negative number"))),
    }
}

/// Case-insensitive `true`/`false`; blank means unset.
pub fn parse_flag(field: &str, raw: Option<&str>) -> AppResult<Option<bool>> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) if v.eq_ignore_ascii_case("true") => Ok(Some(true)),
        Some(v) if v.eq_ignore_ascii_case("false") => Ok(Some(false)),
        Some(_) => Err(AppError::BadRequest(format!("{field} must be true or false"))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Int(i64),
    Float(f64),
}

/// Accept `"100"` and `100` alike for text-typed numeric fields.
pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|value| match value {
            StringOrNumber::Text(s) => s,
            StringOrNumber::Int(n) => n.to_string(),
            StringOrNumber::Float(n) => n.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_validation() {
        assert_eq!(validate_price("price", " 17999 ").unwrap(), "17999");
        assert_eq!(validate_price("price", "2499.50").unwrap(), "2499.50");
        assert!(validate_price("price", "-1").is_err());
        assert!(validate_price("price", "free").is_err());
        assert!(validate_price("price", "NaN").is_err());
    }

    #[test]
    fn flags_are_case_insensitive() {
        assert_eq!(parse_flag("includeAll", Some("TRUE")).unwrap(), Some(true));
        assert_eq!(parse_flag("includeAll", Some("false")).unwrap(), Some(false));
        assert_eq!(parse_flag("includeAll", Some(" ")).unwrap(), None);
        assert_eq!(parse_flag("includeAll", None).unwrap(), None);
        assert!(parse_flag("includeAll", Some("yes")).is_err());
    }

    #[test]
    fn blank_text_is_absent() {
        assert_eq!(optional_text(Some("  ".into())), None);
        assert_eq!(optional_text(Some(" a ".into())), Some("a".into()));
        assert!(required_text("name", None).is_err());
    }
}
