//! Sensor trigger parameters and the hysteresis state machine that decides
//! when a threshold crossing fires.
//!
//! A trigger fires once per crossing, not once per reading. After firing it
//! stays armed until the reading has left the reload band around the
//! threshold (`|value - threshold| >= reload_value`), and, for directional
//! edges, until the comparison no longer holds. Equality triggers disarm as
//! soon as the reading leaves the band.

use serde_json::Value;

use super::params::{ParamBuilder, integer, number, ranged, value_type};
use crate::compare::{Edge, compare};
use crate::error::{EvaluationError, ParamError};
use crate::id::DeviceId;
use crate::sensor::{Scale, SensorReading, ValueType};

pub const MIN_RELOAD_VALUE: f64 = 0.1;
pub const MAX_RELOAD_VALUE: f64 = 15.0;
const DEFAULT_RELOAD_VALUE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorTriggerParams {
    pub sensor_id: DeviceId,
    pub value_type: Option<ValueType>,
    pub scale: Option<Scale>,
    pub threshold: Option<f64>,
    pub edge: Edge,
    /// Width of the hysteresis band, within `MIN_RELOAD_VALUE..=MAX_RELOAD_VALUE`.
    pub reload_value: f64,
}

impl SensorTriggerParams {
    #[must_use]
    pub fn builder() -> SensorTriggerBuilder {
        SensorTriggerBuilder::default()
    }

    fn accepts(&self, reading: &SensorReading) -> bool {
        self.value_type == Some(reading.value_type) && self.scale == Some(reading.scale)
    }
}

#[derive(Debug)]
pub struct SensorTriggerBuilder {
    params: SensorTriggerParams,
}

impl Default for SensorTriggerBuilder {
    fn default() -> Self {
        Self {
            params: SensorTriggerParams {
                sensor_id: DeviceId::default(),
                value_type: None,
                scale: None,
                threshold: None,
                edge: Edge::default(),
                reload_value: DEFAULT_RELOAD_VALUE,
            },
        }
    }
}

impl SensorTriggerBuilder {
    #[must_use]
    pub fn sensor_id(mut self, sensor_id: DeviceId) -> Self {
        self.params.sensor_id = sensor_id;
        self
    }

    #[must_use]
    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.params.value_type = Some(value_type);
        self
    }

    #[must_use]
    pub fn scale(mut self, scale: Scale) -> Self {
        self.params.scale = Some(scale);
        self
    }

    #[must_use]
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.params.threshold = Some(threshold);
        self
    }

    #[must_use]
    pub fn edge(mut self, edge: Edge) -> Self {
        self.params.edge = edge;
        self
    }

    #[must_use]
    pub fn reload_value(mut self, reload_value: f64) -> Self {
        self.params.reload_value = reload_value;
        self
    }
}

impl ParamBuilder for SensorTriggerBuilder {
    type Output = SensorTriggerParams;

    fn parse_param(&mut self, name: &str, value: &Value) -> Result<(), ParamError> {
        match name {
            "clientSensorId" => self.params.sensor_id = ranged(name, value)?,
            "value" => self.params.threshold = Some(number(name, value)?),
            "edge" => self.params.edge = Edge::try_from(integer(name, value)?)?,
            "reloadValue" => self.params.reload_value = number(name, value)?,
            "scale" => self.params.scale = Some(ranged(name, value)?),
            "valueType" => self.params.value_type = Some(value_type(value)?),
            _ => {}
        }
        Ok(())
    }

    fn build(mut self) -> SensorTriggerParams {
        self.params.reload_value = self
            .params
            .reload_value
            .clamp(MIN_RELOAD_VALUE, MAX_RELOAD_VALUE);
        self.params
    }
}

/// Whether the trigger may fire on the next crossing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriggerState {
    #[default]
    Idle,
    /// Already fired (or armed silently on the first reading).
    Armed {
        /// The reading has not yet left the reload band.
        require_reload: bool,
    },
}

/// Outcome of feeding one reading to a [`SensorHysteresis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Value type or scale did not match; state untouched.
    Ignored,
    Unchanged,
    /// The very first reading satisfied the edge: armed without firing.
    ArmedSilently,
    Fired,
    Disarmed,
}

/// Per-trigger hysteresis state.
#[derive(Debug, Clone)]
pub struct SensorHysteresis {
    params: SensorTriggerParams,
    state: TriggerState,
    first_value: bool,
}

impl SensorHysteresis {
    #[must_use]
    pub fn new(params: SensorTriggerParams) -> Self {
        Self {
            params,
            state: TriggerState::Idle,
            first_value: true,
        }
    }

    #[must_use]
    pub fn params(&self) -> &SensorTriggerParams {
        &self.params
    }

    #[must_use]
    pub fn state(&self) -> TriggerState {
        self.state
    }

    /// Feed one reading.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::ThresholdNotSet`] when no threshold was
    /// configured and [`EvaluationError::NonFiniteReading`] for NaN or
    /// infinite readings. State is left untouched in both cases.
    pub fn process(&mut self, reading: &SensorReading) -> Result<Transition, EvaluationError> {
        if !self.params.accepts(reading) {
            return Ok(Transition::Ignored);
        }
        let threshold = self
            .params
            .threshold
            .ok_or(EvaluationError::ThresholdNotSet)?;
        let value = reading.value;
        if !value.is_finite() {
            return Err(EvaluationError::NonFiniteReading(value));
        }

        let first_value = std::mem::replace(&mut self.first_value, false);
        let edge = self.params.edge;

        let transition = match self.state {
            TriggerState::Idle if compare(value, threshold, edge) => {
                self.state = TriggerState::Armed {
                    require_reload: true,
                };
                if first_value {
                    Transition::ArmedSilently
                } else {
                    Transition::Fired
                }
            }
            TriggerState::Idle => Transition::Unchanged,
            TriggerState::Armed { require_reload } => {
                let require_reload = require_reload
                    && (value - threshold).abs() < self.params.reload_value;
                if require_reload {
                    Transition::Unchanged
                } else if edge == Edge::Equal || !compare(value, threshold, edge) {
                    self.state = TriggerState::Idle;
                    Transition::Disarmed
                } else {
                    self.state = TriggerState::Armed {
                        require_reload: false,
                    };
                    Transition::Unchanged
                }
            }
        };
        Ok(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RuleParams;

    fn temperature(value: f64) -> SensorReading {
        SensorReading {
            value_type: ValueType::Temperature,
            value,
            scale: Scale::new(0),
        }
    }

    fn trigger(threshold: f64, edge: Edge, reload_value: f64) -> SensorHysteresis {
        SensorHysteresis::new(
            SensorTriggerParams::builder()
                .sensor_id(DeviceId::new(1))
                .value_type(ValueType::Temperature)
                .scale(Scale::new(0))
                .threshold(threshold)
                .edge(edge)
                .reload_value(reload_value)
                .build(),
        )
    }

    fn count_fired(hysteresis: &mut SensorHysteresis, values: &[f64]) -> usize {
        values
            .iter()
            .map(|v| hysteresis.process(&temperature(*v)).unwrap())
            .filter(|t| *t == Transition::Fired)
            .count()
    }

    #[test]
    fn should_fire_once_per_crossing() {
        let mut hysteresis = trigger(20.0, Edge::Greater, 2.0);
        let fired = count_fired(&mut hysteresis, &[10.0, 10.0, 25.0, 25.0, 25.0, 19.0, 19.0, 25.0]);
        assert_eq!(fired, 2);
    }

    #[test]
    fn should_stay_armed_while_inside_reload_band() {
        let mut hysteresis = trigger(20.0, Edge::Greater, 2.0);
        // 21 and 20.5 are inside the band, 19.5 too: no re-arm yet
        let fired = count_fired(&mut hysteresis, &[10.0, 21.0, 19.5, 20.5, 19.5, 21.0]);
        assert_eq!(fired, 1);
        assert_eq!(
            hysteresis.state(),
            TriggerState::Armed {
                require_reload: true
            }
        );
    }

    #[test]
    fn should_arm_silently_on_first_value() {
        let mut hysteresis = trigger(20.0, Edge::Greater, 1.0);
        let transition = hysteresis.process(&temperature(30.0)).unwrap();
        assert_eq!(transition, Transition::ArmedSilently);
        assert_eq!(
            hysteresis.state(),
            TriggerState::Armed {
                require_reload: true
            }
        );
    }

    #[test]
    fn should_not_fire_again_after_silent_arm_until_disarmed() {
        let mut hysteresis = trigger(20.0, Edge::Greater, 1.0);
        let fired = count_fired(&mut hysteresis, &[30.0, 30.0, 10.0, 30.0]);
        assert_eq!(fired, 1);
    }

    #[test]
    fn should_auto_disarm_equality_trigger() {
        let mut hysteresis = trigger(5.0, Edge::Equal, 1.0);
        let transitions: Vec<_> = [0.0, 5.0, 5.0, 3.0, 5.0]
            .iter()
            .map(|v| hysteresis.process(&temperature(*v)).unwrap())
            .collect();
        assert_eq!(
            transitions,
            vec![
                Transition::Unchanged,
                Transition::Fired,
                Transition::Unchanged,
                Transition::Disarmed,
                Transition::Fired,
            ]
        );
    }

    #[test]
    fn should_arm_equality_trigger_silently_on_first_matching_value() {
        let mut hysteresis = trigger(5.0, Edge::Equal, 1.0);
        assert_eq!(count_fired(&mut hysteresis, &[5.0, 5.0, 3.0]), 0);
        assert_eq!(hysteresis.state(), TriggerState::Idle);
    }

    #[test]
    fn should_disarm_less_than_trigger_once_value_rises() {
        let mut hysteresis = trigger(0.0, Edge::Less, 0.5);
        let fired = count_fired(&mut hysteresis, &[3.0, -1.0, -2.0, 0.2, 1.0, -1.0]);
        assert_eq!(fired, 2);
    }

    #[test]
    fn should_ignore_mismatched_type_or_scale_without_touching_state() {
        let mut hysteresis = trigger(20.0, Edge::Greater, 1.0);
        let other_type = SensorReading {
            value_type: ValueType::Humidity,
            value: 90.0,
            scale: Scale::new(0),
        };
        let other_scale = SensorReading {
            value_type: ValueType::Temperature,
            value: 90.0,
            scale: Scale::new(1),
        };
        assert_eq!(hysteresis.process(&other_type).unwrap(), Transition::Ignored);
        assert_eq!(hysteresis.process(&other_scale).unwrap(), Transition::Ignored);
        assert_eq!(hysteresis.state(), TriggerState::Idle);

        // first matching reading is still treated as the first value
        assert_eq!(
            hysteresis.process(&temperature(25.0)).unwrap(),
            Transition::ArmedSilently
        );
    }

    #[test]
    fn should_ignore_everything_when_type_and_scale_are_unconfigured() {
        let mut hysteresis = SensorHysteresis::new(
            SensorTriggerParams::builder()
                .threshold(1.0)
                .edge(Edge::Greater)
                .build(),
        );
        assert_eq!(
            hysteresis.process(&temperature(2.0)).unwrap(),
            Transition::Ignored
        );
    }

    #[test]
    fn should_report_missing_threshold() {
        let mut hysteresis = SensorHysteresis::new(
            SensorTriggerParams::builder()
                .value_type(ValueType::Temperature)
                .scale(Scale::new(0))
                .build(),
        );
        assert_eq!(
            hysteresis.process(&temperature(2.0)),
            Err(EvaluationError::ThresholdNotSet)
        );
    }

    #[test]
    fn should_reject_non_finite_reading_and_keep_first_value_pending() {
        let mut hysteresis = trigger(20.0, Edge::Greater, 1.0);
        assert!(matches!(
            hysteresis.process(&temperature(f64::NAN)),
            Err(EvaluationError::NonFiniteReading(_))
        ));
        assert_eq!(
            hysteresis.process(&temperature(25.0)).unwrap(),
            Transition::ArmedSilently
        );
    }

    #[test]
    fn should_clamp_reload_value_on_build() {
        let params = RuleParams::new().with("reloadValue", 40).with("value", 1);
        let mut builder = SensorTriggerParams::builder();
        assert!(builder.parse_all(&params).is_empty());
        assert!((builder.build().reload_value - MAX_RELOAD_VALUE).abs() < f64::EPSILON);

        let low = SensorTriggerParams::builder().reload_value(0.0).build();
        assert!((low.reload_value - MIN_RELOAD_VALUE).abs() < f64::EPSILON);
    }

    #[test]
    fn should_default_reload_value_to_one() {
        let params = SensorTriggerParams::builder().build();
        assert!((params.reload_value - 1.0).abs() < f64::EPSILON);
        assert_eq!(params.threshold, None);
        assert_eq!(params.scale, None);
    }
}
