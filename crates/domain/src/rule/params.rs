//! Rule-storage parameters and the builder protocol that consumes them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ParamError;
use crate::sensor::ValueType;

/// Name/value pairs describing one rule element, as produced by rule storage.
///
/// Order is preserved but carries no meaning: builders accept parameters in
/// any order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Map<String, Value>", into = "serde_json::Map<String, Value>")]
pub struct RuleParams {
    entries: Vec<(String, Value)>,
}

impl RuleParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push((name.into(), value.into()));
        self
    }

    /// Value of the first parameter called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the element targets a device owned by this hub (`local == 1`).
    ///
    /// Remote elements are handled by another factory.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.get("local").and_then(Value::as_i64) == Some(1)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for RuleParams {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl From<serde_json::Map<String, Value>> for RuleParams {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl From<RuleParams> for serde_json::Map<String, Value> {
    fn from(params: RuleParams) -> Self {
        params.entries.into_iter().collect()
    }
}

/// Accumulates rule-storage parameters into a typed parameter struct.
pub trait ParamBuilder: Sized {
    type Output;

    /// Consume one parameter.
    ///
    /// Unknown names are ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`ParamError`] when the value of a known parameter cannot be
    /// interpreted. The builder keeps the previous value for that field.
    fn parse_param(&mut self, name: &str, value: &Value) -> Result<(), ParamError>;

    /// Finalize, applying range clamping.
    fn build(self) -> Self::Output;

    /// Feed every pair of `params`, returning the errors of the rejected ones.
    fn parse_all(&mut self, params: &RuleParams) -> Vec<ParamError> {
        params
            .iter()
            .filter_map(|(name, value)| self.parse_param(name, value).err())
            .collect()
    }
}

/// Interpret `value` as an integer, accepting JSON numbers and numeric strings.
///
/// Floats are accepted when they carry no fractional part (`3.0`).
pub(crate) fn integer(name: &str, value: &Value) -> Result<i64, ParamError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ParamError::NotAnInteger {
        name: name.to_string(),
        value: value.clone(),
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn integral(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (in_range && value.fract() == 0.0).then_some(value as i64)
}

/// Interpret `value` as an integer and convert it into a narrower type.
pub(crate) fn ranged<T: TryFrom<i64>>(name: &str, value: &Value) -> Result<T, ParamError> {
    let raw = integer(name, value)?;
    T::try_from(raw).map_err(|_| ParamError::OutOfRange {
        name: name.to_string(),
        value: raw,
    })
}

/// Interpret `value` as a finite float, accepting JSON numbers and numeric strings.
pub(crate) fn number(name: &str, value: &Value) -> Result<f64, ParamError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParamError::NotANumber {
            name: name.to_string(),
            value: value.clone(),
        })
}

pub(crate) fn value_type(value: &Value) -> Result<ValueType, ParamError> {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ParamError::UnknownValueType(value.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_detect_local_flag() {
        assert!(RuleParams::new().with("local", 1).is_local());
        assert!(!RuleParams::new().with("local", 0).is_local());
        assert!(!RuleParams::new().is_local());
    }

    #[test]
    fn should_return_first_value_for_name() {
        let params = RuleParams::new().with("method", 1).with("method", 2);
        assert_eq!(params.get("method"), Some(&json!(1)));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn should_deserialize_from_json_object() {
        let params: RuleParams =
            serde_json::from_value(json!({"clientDeviceId": 4, "method": "2"})).unwrap();
        assert_eq!(params.get("clientDeviceId"), Some(&json!(4)));
        assert_eq!(params.get("method"), Some(&json!("2")));
    }

    #[test]
    fn should_parse_integers_from_numbers_and_strings() {
        assert_eq!(integer("x", &json!(7)).unwrap(), 7);
        assert_eq!(integer("x", &json!(" -3 ")).unwrap(), -3);
        assert!(integer("x", &json!(2.5)).is_err());
        assert!(integer("x", &json!(f64::MAX)).is_err());
        assert!(integer("x", &json!("abc")).is_err());
        assert!(integer("x", &json!(null)).is_err());
    }

    #[test]
    fn should_accept_integral_float_when_integer_expected() {
        assert_eq!(integer("repeats", &json!(3.0)).unwrap(), 3);
        assert_eq!(integer("edge", &json!(-1.0)).unwrap(), -1);
        let scale: u8 = ranged("scale", &json!(2.0)).unwrap();
        assert_eq!(scale, 2);
    }

    #[test]
    fn should_parse_finite_numbers_only() {
        assert!((number("x", &json!("21.5")).unwrap() - 21.5).abs() < f64::EPSILON);
        assert!((number("x", &json!(3)).unwrap() - 3.0).abs() < f64::EPSILON);
        assert!(number("x", &json!("NaN")).is_err());
        assert!(number("x", &json!("inf")).is_err());
        assert!(number("x", &json!(true)).is_err());
    }

    #[test]
    fn should_report_out_of_range_integers() {
        let result: Result<u8, _> = ranged("scale", &json!(300));
        assert_eq!(
            result,
            Err(ParamError::OutOfRange {
                name: "scale".to_string(),
                value: 300
            })
        );
    }
}
