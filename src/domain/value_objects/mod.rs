//! Value Objects for seller and buyer forms

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order-independent identity of a SKU combination.
///
/// Two combinations are the same logical SKU iff they choose the same set of
/// option ids, so the key stores the ids sorted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComboKey(Vec<String>);

impl ComboKey {
    pub fn from_option_ids<S: AsRef<str>>(option_ids: &[S]) -> Self {
        let mut ids: Vec<String> = option_ids.iter().map(|s| s.as_ref().to_string()).collect();
        ids.sort();
        Self(ids)
    }
}

impl fmt::Display for ComboKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0.join("|")) }
}

/// Opaque handle to an uploaded image (blob id, object URL, remote URL).
/// Carried through the matrix merge untouched.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(value: impl Into<String>) -> Self { Self(value.into()) }
    pub fn as_str(&self) -> &str { &self.0 }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    G,
    Lb,
    Oz,
}

impl WeightUnit {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Kg => "kg", Self::G => "g", Self::Lb => "lb", Self::Oz => "oz" }
    }
}

impl FromStr for WeightUnit {
    type Err = ParseUnitError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kg" => Ok(Self::Kg),
            "g" => Ok(Self::G),
            "lb" | "lbs" => Ok(Self::Lb),
            "oz" => Ok(Self::Oz),
            other => Err(ParseUnitError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown weight unit: {0}")]
pub struct ParseUnitError(String);

/// Parses a free-text amount field. Blank, unparseable and negative input all
/// read as "not entered".
pub fn parse_amount(input: &str) -> Option<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() { return None; }
    let value = Decimal::from_str(trimmed).ok()?;
    if value.is_sign_negative() { None } else { Some(value) }
}

/// Parses a free-text whole-number field (stock, alert threshold).
pub fn parse_count(input: &str) -> Option<u32> {
    let trimmed = input.trim();
    if trimmed.is_empty() { return None; }
    trimmed.parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_combo_key_ignores_order() {
        assert_eq!(ComboKey::from_option_ids(&["red", "xl"]), ComboKey::from_option_ids(&["xl", "red"]));
        assert_ne!(ComboKey::from_option_ids(&["red", "xl"]), ComboKey::from_option_ids(&["red", "l"]));
    }
    #[test]
    fn test_combo_key_does_not_collide_on_separator() {
        assert_ne!(ComboKey::from_option_ids(&["a|b"]), ComboKey::from_option_ids(&["a", "b"]));
    }
    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(" 99.99 "), Some(Decimal::new(9999, 2)));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("-5"), None);
        assert_eq!(parse_amount("0"), Some(Decimal::ZERO));
    }
    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("12"), Some(12));
        assert_eq!(parse_count("   "), None);
        assert_eq!(parse_count("1.5"), None);
    }
    #[test]
    fn test_weight_unit_parse() {
        assert_eq!("LBS".parse::<WeightUnit>().unwrap(), WeightUnit::Lb);
        assert!("stone".parse::<WeightUnit>().is_err());
        assert_eq!(WeightUnit::default().as_str(), "kg");
    }
}
