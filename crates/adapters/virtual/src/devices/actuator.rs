//! Actuator behaviour: how a method changes the reported state.

use devrules_domain::device::{DeviceState, Method};

/// State reached after executing `method` from `current`, or `None` for a
/// method the virtual devices do not understand.
///
/// `TOGGLE` resolves to `TURN_ON` or `TURN_OFF`; `DIM` keeps its level as
/// the state value, every other method clears it.
#[must_use]
pub fn apply_method(current: &DeviceState, method: Method, value: Option<i64>) -> Option<DeviceState> {
    let (method, value) = match method {
        Method::TOGGLE if current.method == Method::TURN_OFF => (Method::TURN_ON, String::new()),
        Method::TOGGLE => (Method::TURN_OFF, String::new()),
        Method::DIM => (Method::DIM, value.unwrap_or_default().to_string()),
        Method::TURN_ON
        | Method::TURN_OFF
        | Method::BELL
        | Method::LEARN
        | Method::EXECUTE
        | Method::UP
        | Method::DOWN
        | Method::STOP => (method, String::new()),
        _ => return None,
    };
    Some(DeviceState { method, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(method: Method) -> DeviceState {
        DeviceState {
            method,
            value: String::new(),
        }
    }

    #[test]
    fn should_turn_on_when_toggled_from_off() {
        let next = apply_method(&state(Method::TURN_OFF), Method::TOGGLE, None).unwrap();
        assert_eq!(next.method, Method::TURN_ON);
    }

    #[test]
    fn should_turn_off_when_toggled_from_dimmed() {
        let next = apply_method(&state(Method::DIM), Method::TOGGLE, None).unwrap();
        assert_eq!(next.method, Method::TURN_OFF);
    }

    #[test]
    fn should_keep_level_when_dimmed() {
        let next = apply_method(&state(Method::TURN_OFF), Method::DIM, Some(120)).unwrap();
        assert_eq!(next, DeviceState { method: Method::DIM, value: "120".to_string() });
    }

    #[test]
    fn should_clear_level_when_turned_on() {
        let dimmed = DeviceState {
            method: Method::DIM,
            value: "120".to_string(),
        };
        let next = apply_method(&dimmed, Method::TURN_ON, None).unwrap();
        assert_eq!(next, state(Method::TURN_ON));
    }

    #[test]
    fn should_reject_combined_method_codes() {
        assert_eq!(apply_method(&state(Method::TURN_OFF), Method::new(3), None), None);
    }
}
