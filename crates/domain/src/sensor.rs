//! Sensor vocabulary: value types and scales.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of reading a sensor reports.
///
/// Serialized with the names rule storage uses (`temp`, `wgust`, …).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    #[serde(rename = "temp", alias = "temperature")]
    Temperature,
    #[serde(rename = "humidity")]
    Humidity,
    #[serde(rename = "rrate")]
    RainRate,
    #[serde(rename = "wavg")]
    WindAverage,
    #[serde(rename = "wgust")]
    WindGust,
    #[serde(rename = "uv")]
    Uv,
    #[serde(rename = "watt")]
    Watt,
    #[serde(rename = "lum")]
    Luminance,
    #[serde(rename = "genmeter")]
    GenericMeter,
    #[serde(rename = "weight")]
    Weight,
    #[serde(rename = "co2")]
    Co2,
    #[serde(rename = "volume")]
    Volume,
    #[serde(rename = "loudness")]
    Loudness,
    #[serde(rename = "particulatematter25")]
    Pm25,
    #[serde(rename = "co")]
    Co,
    #[serde(rename = "moisture")]
    Moisture,
}

impl ValueType {
    pub const ALL: [Self; 16] = [
        Self::Temperature,
        Self::Humidity,
        Self::RainRate,
        Self::WindAverage,
        Self::WindGust,
        Self::Uv,
        Self::Watt,
        Self::Luminance,
        Self::GenericMeter,
        Self::Weight,
        Self::Co2,
        Self::Volume,
        Self::Loudness,
        Self::Pm25,
        Self::Co,
        Self::Moisture,
    ];

    /// Name used by rule storage.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Temperature => "temp",
            Self::Humidity => "humidity",
            Self::RainRate => "rrate",
            Self::WindAverage => "wavg",
            Self::WindGust => "wgust",
            Self::Uv => "uv",
            Self::Watt => "watt",
            Self::Luminance => "lum",
            Self::GenericMeter => "genmeter",
            Self::Weight => "weight",
            Self::Co2 => "co2",
            Self::Volume => "volume",
            Self::Loudness => "loudness",
            Self::Pm25 => "particulatematter25",
            Self::Co => "co",
            Self::Moisture => "moisture",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a string names no known [`ValueType`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sensor value type `{0}`")]
pub struct UnknownValueType(pub String);

impl FromStr for ValueType {
    type Err = UnknownValueType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "temperature" {
            return Ok(Self::Temperature);
        }
        Self::ALL
            .into_iter()
            .find(|vt| vt.name() == s)
            .ok_or_else(|| UnknownValueType(s.to_string()))
    }
}

/// Unit variant of a reading (for example Celsius vs Fahrenheit).
///
/// Scales are opaque small integers; a rule bound to one scale never
/// matches readings reported in another.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Scale(u8);

impl Scale {
    #[must_use]
    pub const fn new(scale: u8) -> Self {
        Self(scale)
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Scale {
    type Error = std::num::TryFromIntError;

    fn try_from(scale: i64) -> Result<Self, Self::Error> {
        u8::try_from(scale).map(Self)
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One reading as delivered by the device registry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub value_type: ValueType,
    pub value: f64,
    pub scale: Scale,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_every_rule_storage_name() {
        for vt in ValueType::ALL {
            assert_eq!(vt.name().parse::<ValueType>().unwrap(), vt);
        }
    }

    #[test]
    fn should_accept_temperature_alias() {
        assert_eq!(
            "temperature".parse::<ValueType>().unwrap(),
            ValueType::Temperature
        );
    }

    #[test]
    fn should_reject_unknown_value_type() {
        let err = "dewpoint".parse::<ValueType>().unwrap_err();
        assert_eq!(err, UnknownValueType("dewpoint".to_string()));
    }

    #[test]
    fn should_serialize_value_type_with_storage_name() {
        let json = serde_json::to_value(ValueType::Pm25).unwrap();
        assert_eq!(json, serde_json::json!("particulatematter25"));
        let parsed: ValueType = serde_json::from_value(serde_json::json!("temperature")).unwrap();
        assert_eq!(parsed, ValueType::Temperature);
    }

    #[test]
    fn should_reject_scale_outside_u8() {
        assert!(Scale::try_from(256_i64).is_err());
        assert!(Scale::try_from(-1_i64).is_err());
        assert_eq!(Scale::try_from(1_i64).unwrap(), Scale::new(1));
    }
}
