//! Keyboard rate gestures
//!
//! Shift + `+` speeds up, Shift + `-` slows down. Browsers report the shifted
//! character for the key, so `=` and `_` are accepted as the same keys.

use serde::Deserialize;

/// A key press as reported by the control surface
#[derive(Debug, Clone, Deserialize)]
pub struct KeyGesture {
    pub key: String,
    #[serde(default)]
    pub shift: bool,
}

/// Rate delta for a key, or `None` when the key has no rate meaning
///
/// The modifier is not checked here; the engine filters unmodified requests.
pub fn rate_delta(key: &str, step: u32) -> Option<i32> {
    let step = i32::try_from(step).unwrap_or(i32::MAX);
    match key {
        "+" | "=" => Some(step),
        "-" | "_" => Some(-step),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plus_and_equals_increase() {
        assert_eq!(rate_delta("+", 50), Some(50));
        assert_eq!(rate_delta("=", 50), Some(50));
    }

    #[test]
    fn test_minus_and_underscore_decrease() {
        assert_eq!(rate_delta("-", 50), Some(-50));
        assert_eq!(rate_delta("_", 25), Some(-25));
    }

    #[test]
    fn test_other_keys_ignored() {
        for key in ["a", "Shift", "ArrowUp", "", "++"] {
            assert_eq!(rate_delta(key, 50), None);
        }
    }

    #[test]
    fn test_gesture_shift_defaults_false() {
        let gesture: KeyGesture = serde_json::from_str(r#"{"key": "+"}"#).unwrap();
        assert!(!gesture.shift);
    }
}
