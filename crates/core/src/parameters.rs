//! Parameter extraction
//!
//! Turns a predicate expression into a flat, immutable map of field name to
//! canonical string value. Only equality comparisons joined with AND are
//! accepted, and only on the fields a resource declares.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::expression::{Expr, Op, Value, Variant, Visitor};

/// Field name to canonical value, as supplied by the caller
///
/// A field that was not mentioned is absent, which is not the same as a field
/// set to an empty or zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterMap(BTreeMap<String, String>);

impl ParameterMap {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Owned copy of a text field
    pub fn text(&self, field: &str) -> Option<String> {
        self.get(field).map(str::to_string)
    }

    /// Parse a field into `T`, failing with [`Error::InvalidParameter`]
    pub fn parse<T: FromStr>(&self, field: &str) -> Result<Option<T>> {
        self.get(field)
            .map(|raw| {
                raw.trim()
                    .parse::<T>()
                    .map_err(|_| Error::invalid_parameter(field, raw))
            })
            .transpose()
    }

    /// Parse an RFC 3339 date field, normalised to UTC
    pub fn date(&self, field: &str) -> Result<Option<DateTime<Utc>>> {
        self.get(field)
            .map(|raw| {
                DateTime::parse_from_rfc3339(raw.trim())
                    .map(|d| d.with_timezone(&Utc))
                    .map_err(|_| Error::invalid_parameter(field, raw))
            })
            .transpose()
    }

    /// Read the mandatory variant field
    ///
    /// Both an absent field and an unknown name are [`Error::InvalidVariant`].
    pub fn variant<V: Variant>(&self, field: &str) -> Result<V> {
        let raw = self.get(field).ok_or_else(|| Error::InvalidVariant {
            field: field.to_string(),
            value: None,
        })?;

        V::from_name(raw.trim()).ok_or_else(|| Error::InvalidVariant {
            field: field.to_string(),
            value: Some(raw.to_string()),
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParameterMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ParameterMap(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Visitor collecting `field == value` pairs from an AND-only predicate
pub struct ParameterFinder<'a> {
    allowed: &'a [&'a str],
    parameters: BTreeMap<String, String>,
}

impl<'a> ParameterFinder<'a> {
    pub fn new(allowed: &'a [&'a str]) -> Self {
        Self {
            allowed,
            parameters: BTreeMap::new(),
        }
    }

    pub fn find(mut self, expr: &Expr) -> Result<ParameterMap> {
        expr.accept(&mut self)?;
        Ok(ParameterMap(self.parameters))
    }
}

impl Visitor for ParameterFinder<'_> {
    fn visit_compare(&mut self, field: &str, op: Op, value: &Value) -> Result<()> {
        if op != Op::Eq {
            return Err(Error::UnsupportedExpression(format!(
                "only equality comparisons are supported, found `{field} {} {value}`",
                op.symbol()
            )));
        }

        if !self.allowed.contains(&field) {
            return Err(Error::UnsupportedExpression(format!(
                "`{field}` is not a queryable field (expected one of: {})",
                self.allowed.join(", ")
            )));
        }

        let canonical = value.canonical();
        match self.parameters.get(field) {
            Some(existing) if *existing != canonical => {
                Err(Error::UnsupportedExpression(format!(
                    "`{field}` is compared against both {existing:?} and {canonical:?}"
                )))
            }
            Some(_) => Ok(()),
            None => {
                self.parameters.insert(field.to_string(), canonical);
                Ok(())
            }
        }
    }

    fn visit_or(&mut self, left: &Expr, right: &Expr) -> Result<()> {
        Err(Error::UnsupportedExpression(format!(
            "OR is not supported in `{left} || {right}`"
        )))
    }

    fn visit_not(&mut self, inner: &Expr) -> Result<()> {
        Err(Error::UnsupportedExpression(format!(
            "negation is not supported in `!({inner})`"
        )))
    }
}

/// Extract the parameter map of `expr`, restricted to `allowed` fields
pub fn extract(expr: &Expr, allowed: &[&str]) -> Result<ParameterMap> {
    ParameterFinder::new(allowed).find(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::field;

    const FIELDS: &[&str] = &["type", "id", "count", "flag", "since"];

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Kind {
        One,
        Two,
    }

    impl Variant for Kind {
        fn name(self) -> &'static str {
            match self {
                Kind::One => "One",
                Kind::Two => "Two",
            }
        }

        fn from_name(name: &str) -> Option<Self> {
            match name {
                "One" => Some(Kind::One),
                "Two" => Some(Kind::Two),
                _ => None,
            }
        }
    }

    #[test]
    fn test_extracts_and_chain() {
        let expr = field("type")
            .eq(Value::Variant("Two"))
            .and(field("id").eq("123"))
            .and(field("count").eq(20u64));

        let params = extract(&expr, FIELDS).unwrap();

        assert_eq!(params.len(), 3);
        assert_eq!(params.get("id"), Some("123"));
        assert_eq!(params.parse::<u32>("count").unwrap(), Some(20));
        assert_eq!(params.variant::<Kind>("type").unwrap(), Kind::Two);
        assert!(!params.contains("flag"));
    }

    #[test]
    fn test_rejects_non_equality() {
        let expr = field("count").gt(5u64);
        let err = extract(&expr, FIELDS).unwrap_err();
        assert!(matches!(err, Error::UnsupportedExpression(_)));
    }

    #[test]
    fn test_rejects_or_and_not() {
        let or = field("id").eq("1").or(field("id").eq("2"));
        assert!(matches!(
            extract(&or, FIELDS),
            Err(Error::UnsupportedExpression(_))
        ));

        let not = field("id").eq("1").not();
        assert!(matches!(
            extract(&not, FIELDS),
            Err(Error::UnsupportedExpression(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_field() {
        let expr = field("id").eq("1").and(field("bogus").eq("x"));
        let err = extract(&expr, FIELDS).unwrap_err();
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn test_duplicate_fields() {
        let same = field("id").eq("1").and(field("id").eq("1"));
        assert_eq!(extract(&same, FIELDS).unwrap().get("id"), Some("1"));

        let conflicting = field("id").eq("1").and(field("id").eq("2"));
        assert!(extract(&conflicting, FIELDS).is_err());
    }

    #[test]
    fn test_variant_errors() {
        let missing = ParameterMap::default();
        assert_eq!(
            missing.variant::<Kind>("type").unwrap_err(),
            Error::InvalidVariant {
                field: "type".to_string(),
                value: None
            }
        );

        let unknown: ParameterMap = [("type", "Three")].into_iter().collect();
        assert_eq!(
            unknown.variant::<Kind>("type").unwrap_err(),
            Error::InvalidVariant {
                field: "type".to_string(),
                value: Some("Three".to_string())
            }
        );
    }

    #[test]
    fn test_invalid_parameter() {
        let params: ParameterMap = [("count", "lots"), ("since", "yesterday")]
            .into_iter()
            .collect();
        assert_eq!(
            params.parse::<u32>("count").unwrap_err().parameter(),
            Some("count")
        );
        assert!(params.date("since").is_err());
    }

    #[test]
    fn test_date_round_trip_through_canonical_form() {
        use chrono::TimeZone;
        let when = Utc.with_ymd_and_hms(2020, 6, 1, 12, 5, 0).unwrap();
        let params = extract(&field("since").eq(when), FIELDS).unwrap();
        assert_eq!(params.get("since"), Some("2020-06-01T12:05:00Z"));
        assert_eq!(params.date("since").unwrap(), Some(when));
    }
}
