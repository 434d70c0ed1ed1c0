//! Comparator shared by device and sensor threshold rules.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ParamError;

/// Comparison direction of a threshold rule.
///
/// Rule storage encodes it as a signed integer: `1` greater-than,
/// `0` equal, `-1` less-than.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Greater,
    #[default]
    Equal,
    Less,
}

impl Edge {
    /// Signed code used by rule storage.
    #[must_use]
    pub const fn code(self) -> i8 {
        match self {
            Self::Greater => 1,
            Self::Equal => 0,
            Self::Less => -1,
        }
    }
}

impl TryFrom<i64> for Edge {
    type Error = ParamError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Greater),
            0 => Ok(Self::Equal),
            -1 => Ok(Self::Less),
            other => Err(ParamError::UnknownEdge(other)),
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Greater => ">",
            Self::Equal => "==",
            Self::Less => "<",
        })
    }
}

/// Compare `value` against `reference` in the direction given by `edge`.
///
/// Equality is exact: no epsilon is applied, so `0.1 + 0.2` does not equal
/// `0.3`.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn compare(value: f64, reference: f64, edge: Edge) -> bool {
    match edge {
        Edge::Greater => value > reference,
        Edge::Equal => value == reference,
        Edge::Less => value < reference,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [f64; 7] = [-40.0, -0.5, 0.0, 0.3, 19.999, 20.0, 1e9];

    #[test]
    #[allow(clippy::float_cmp)]
    fn should_match_native_operators_for_every_edge() {
        for v in SAMPLES {
            for r in SAMPLES {
                assert_eq!(compare(v, r, Edge::Greater), v > r);
                assert_eq!(compare(v, r, Edge::Equal), v == r);
                assert_eq!(compare(v, r, Edge::Less), v < r);
            }
        }
    }

    #[test]
    fn should_not_apply_tolerance_on_equality() {
        assert!(!compare(0.1 + 0.2, 0.3, Edge::Equal));
    }

    #[test]
    fn should_parse_edge_codes() {
        assert_eq!(Edge::try_from(1).unwrap(), Edge::Greater);
        assert_eq!(Edge::try_from(0).unwrap(), Edge::Equal);
        assert_eq!(Edge::try_from(-1).unwrap(), Edge::Less);
        assert_eq!(Edge::try_from(2), Err(ParamError::UnknownEdge(2)));
    }

    #[test]
    fn should_roundtrip_edge_code() {
        for edge in [Edge::Greater, Edge::Equal, Edge::Less] {
            assert_eq!(Edge::try_from(i64::from(edge.code())).unwrap(), edge);
        }
    }
}
